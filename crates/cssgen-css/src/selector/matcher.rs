//! Token matcher catalogue
//!
//! A fixed, priority-ordered list of anchored patterns. Matching is
//! first-match-wins, not longest-match-wins, so the order below is part of
//! the grammar: `Tag` must precede `Descendant`, `PseudoSimple` must precede
//! `PseudoElement`, the quoted and equation pseudo-functions must precede the
//! catch-all argument form, and so on.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Equation, Sign, Token, TokenKind};

/// Tag, id, class and attribute names
const NAME: &str = "[A-Za-z][A-Za-z0-9]*";
/// Pseudo-class / pseudo-function names (hyphens allowed inside)
const FUNC: &str = "[A-Za-z][-A-Za-z0-9]*[A-Za-z0-9]+";

type Build = fn(&Captures<'_>) -> TokenKind;

/// One catalogue entry
pub(crate) struct Matcher {
    pub name: &'static str,
    regex: Regex,
    build: Build,
}

impl Matcher {
    fn new(name: &'static str, pattern: &str, build: Build) -> Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("bad {name} pattern: {e}"));
        Self { name, regex, build }
    }

    /// Does this matcher accept a prefix of `remaining`?
    pub fn test(&self, remaining: &str) -> bool {
        self.regex.is_match(remaining)
    }

    /// Consume the matched prefix of `remaining` in a single regex pass,
    /// building the token from the named captures of that same match.
    pub fn consume(&self, remaining: &str) -> Option<Token> {
        let caps = self.regex.captures(remaining)?;
        let whole = caps.get(0)?;
        if whole.is_empty() {
            return None;
        }
        Some(Token {
            kind: (self.build)(&caps),
            source: whole.as_str().to_string(),
        })
    }
}

fn cap(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name).map_or_else(String::new, |m| m.as_str().to_string())
}

fn attribute(op: &str) -> String {
    format!(r#"^\[(?<name>{NAME}){op}"(?<value>[^"]*)"\]"#)
}

fn name_value(caps: &Captures<'_>) -> (String, String) {
    (cap(caps, "name"), cap(caps, "value"))
}

fn equation(caps: &Captures<'_>) -> TokenKind {
    TokenKind::PseudoFunctionEquation(Equation {
        function: cap(caps, "func"),
        scalar_sign: caps.name("scalar_sign").and_then(|m| Sign::parse(m.as_str())),
        scalar: cap(caps, "scalar"),
        variable: caps
            .name("var")
            .map(|m| m.as_str().to_string())
            .filter(|v| !v.is_empty()),
        offset_sign: caps.name("offset_sign").and_then(|m| Sign::parse(m.as_str())),
        offset: cap(caps, "offset"),
    })
}

static CATALOGUE: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new("Tag", &format!("^(?<name>{NAME})"), |c: &Captures<'_>| {
            TokenKind::Tag(cap(c, "name"))
        }),
        Matcher::new("Child", r"^[ \t\n\r\f]*>[ \t\n\r\f]*", |_: &Captures<'_>| TokenKind::Child),
        Matcher::new("Universal", r"^\*", |_: &Captures<'_>| TokenKind::Universal),
        Matcher::new("NextAdjacent", r"^[ \t\n\r\f]*\+[ \t\n\r\f]*", |_: &Captures<'_>| {
            TokenKind::NextAdjacent
        }),
        Matcher::new("NextSibling", r"^[ \t\n\r\f]*~[ \t\n\r\f]*", |_: &Captures<'_>| {
            TokenKind::NextSibling
        }),
        Matcher::new("Descendant", r"^[ \t\n\r\f]+", |_: &Captures<'_>| TokenKind::Descendant),
        Matcher::new("Id", &format!("^#(?<name>{NAME})"), |c: &Captures<'_>| {
            TokenKind::Id(cap(c, "name"))
        }),
        Matcher::new("Class", &format!(r"^\.(?<name>{NAME})"), |c: &Captures<'_>| {
            TokenKind::Class(cap(c, "name"))
        }),
        Matcher::new(
            "AttributePresence",
            &format!(r"^\[(?<name>{NAME})\]"),
            |c: &Captures<'_>| TokenKind::AttributePresence(cap(c, "name")),
        ),
        Matcher::new("AttributeEquals", &attribute("="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeEquals { name, value }
        }),
        Matcher::new("AttributeNotEquals", &attribute("!="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeNotEquals { name, value }
        }),
        Matcher::new("AttributePrefix", &attribute(r"\|="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributePrefix { name, value }
        }),
        Matcher::new("AttributeContains", &attribute(r"\*="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeContains { name, value }
        }),
        Matcher::new("AttributeContainsWord", &attribute("~="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeContainsWord { name, value }
        }),
        Matcher::new("AttributeEndsWith", &attribute(r"\$="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeEndsWith { name, value }
        }),
        Matcher::new("AttributeStartsWith", &attribute(r"\^="), |c: &Captures<'_>| {
            let (name, value) = name_value(c);
            TokenKind::AttributeStartsWith { name, value }
        }),
        Matcher::new("ListSeparator", "^,", |_: &Captures<'_>| TokenKind::ListSeparator),
        Matcher::new(
            "PseudoFunctionQuotedArg",
            &format!(r#"^:(?<func>{FUNC})\("(?<arg>[^"]*)"\)"#),
            |c: &Captures<'_>| TokenKind::PseudoFunctionQuotedArg {
                function: cap(c, "func"),
                argument: cap(c, "arg"),
            },
        ),
        Matcher::new(
            "PseudoFunctionEquation",
            &format!(
                r"^:(?<func>{FUNC})\((?:(?<scalar_sign>[+-]?)(?<scalar>[0-9]*))?(?<var>[a-z]+)?(?:(?<offset_sign>[+-])(?<offset>[0-9]*))?\)"
            ),
            equation,
        ),
        Matcher::new(
            "PseudoFunctionArg",
            &format!(r"^:(?<func>{FUNC})\((?<arg>[^)]+)\)"),
            |c: &Captures<'_>| TokenKind::PseudoFunctionArg {
                function: cap(c, "func"),
                argument: cap(c, "arg"),
            },
        ),
        Matcher::new(
            "PseudoFunctionNoArg",
            &format!(r"^:(?<func>{FUNC})\(\)"),
            |c: &Captures<'_>| TokenKind::PseudoFunctionNoArg(cap(c, "func")),
        ),
        Matcher::new("PseudoSimple", &format!("^:(?<name>{FUNC})"), |c: &Captures<'_>| {
            TokenKind::PseudoSimple(cap(c, "name"))
        }),
        Matcher::new("PseudoElement", &format!("^::(?<name>{FUNC})"), |c: &Captures<'_>| {
            TokenKind::PseudoElement(cap(c, "name"))
        }),
    ]
});

/// The catalogue, in priority order
pub(crate) fn catalogue() -> &'static [Matcher] {
    &CATALOGUE
}

/// Names of the catalogue entries, in priority order
pub fn catalogue_names() -> Vec<&'static str> {
    catalogue().iter().map(|m| m.name).collect()
}
