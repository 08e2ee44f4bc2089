//! Selector front end
//!
//! Turns selector text such as `body>ul>li:nth-last-child(-n+3).item` into a
//! typed token stream, then folds the stream into compound groups separated by
//! combinators.

mod equation;
mod group;
mod matcher;
mod tokenizer;

pub use equation::interpret;
pub use group::{group, parse_selector, CompoundGroup, Item, ParsedSequence};
pub use matcher::catalogue_names;
pub use tokenizer::{tokenize, tokenize_with_elided, Tokenized};

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Unparseable selector text: {remaining:?}")]
    Parse { remaining: String },
}

/// Whether a token constrains a single node or relates two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    PerNode,
    Structural,
}

/// Sign prefix captured from an equation argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            _ => None,
        }
    }
}

/// Captured parts of `:function(<scalar><variable><offset>)`
///
/// Every part is optional in the grammar, so `:eq(1)`, `:nth-child(odd)` and
/// `:nth-last-child(-n+4)` all produce an `Equation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    pub function: String,
    pub scalar_sign: Option<Sign>,
    /// Scalar digits, empty when only a sign (or nothing) was written
    pub scalar: String,
    pub variable: Option<String>,
    /// `None` when the argument has no trailing `+k` / `-k`
    pub offset_sign: Option<Sign>,
    pub offset: String,
}

/// Attribute relation operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr="v"]`
    Equals,
    /// `[attr!="v"]`
    NotEquals,
    /// `[attr|="v"]`
    DashMatch,
    /// `[attr*="v"]`
    Substring,
    /// `[attr~="v"]`
    Word,
    /// `[attr$="v"]`
    Suffix,
    /// `[attr^="v"]`
    Prefix,
}

/// Borrowed view of any attribute token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeTest<'a> {
    pub name: &'a str,
    pub op: AttrOp,
    pub value: Option<&'a str>,
}

/// Atomic selector kinds, with their captured sub-values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Tag(String),
    Id(String),
    Class(String),
    PseudoSimple(String),
    PseudoElement(String),
    PseudoFunctionNoArg(String),
    PseudoFunctionQuotedArg { function: String, argument: String },
    PseudoFunctionArg { function: String, argument: String },
    PseudoFunctionEquation(Equation),
    AttributePresence(String),
    AttributeEquals { name: String, value: String },
    AttributeNotEquals { name: String, value: String },
    AttributePrefix { name: String, value: String },
    AttributeContains { name: String, value: String },
    AttributeContainsWord { name: String, value: String },
    AttributeEndsWith { name: String, value: String },
    AttributeStartsWith { name: String, value: String },
    Child,
    Descendant,
    NextAdjacent,
    NextSibling,
    ListSeparator,
    Universal,
}

impl TokenKind {
    /// Classify the kind. Exhaustive on purpose: a new kind must pick a side.
    pub fn class(&self) -> TokenClass {
        match self {
            Self::Tag(_)
            | Self::Id(_)
            | Self::Class(_)
            | Self::PseudoSimple(_)
            | Self::PseudoElement(_)
            | Self::PseudoFunctionNoArg(_)
            | Self::PseudoFunctionQuotedArg { .. }
            | Self::PseudoFunctionArg { .. }
            | Self::PseudoFunctionEquation(_)
            | Self::AttributePresence(_)
            | Self::AttributeEquals { .. }
            | Self::AttributeNotEquals { .. }
            | Self::AttributePrefix { .. }
            | Self::AttributeContains { .. }
            | Self::AttributeContainsWord { .. }
            | Self::AttributeEndsWith { .. }
            | Self::AttributeStartsWith { .. } => TokenClass::PerNode,
            Self::Child
            | Self::Descendant
            | Self::NextAdjacent
            | Self::NextSibling
            | Self::ListSeparator
            | Self::Universal => TokenClass::Structural,
        }
    }

    /// Attribute relation carried by this kind, if it is an attribute test
    pub fn as_attribute(&self) -> Option<AttributeTest<'_>> {
        let (name, op, value) = match self {
            Self::AttributePresence(name) => (name, AttrOp::Exists, None),
            Self::AttributeEquals { name, value } => (name, AttrOp::Equals, Some(value)),
            Self::AttributeNotEquals { name, value } => (name, AttrOp::NotEquals, Some(value)),
            Self::AttributePrefix { name, value } => (name, AttrOp::DashMatch, Some(value)),
            Self::AttributeContains { name, value } => (name, AttrOp::Substring, Some(value)),
            Self::AttributeContainsWord { name, value } => (name, AttrOp::Word, Some(value)),
            Self::AttributeEndsWith { name, value } => (name, AttrOp::Suffix, Some(value)),
            Self::AttributeStartsWith { name, value } => (name, AttrOp::Prefix, Some(value)),
            _ => return None,
        };
        Some(AttributeTest {
            name: name.as_str(),
            op,
            value: value.map(String::as_str),
        })
    }
}

/// One atomic selector fragment and the exact text it was parsed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub source: String,
}

impl Token {
    pub fn class(&self) -> TokenClass {
        self.kind.class()
    }

    pub fn is_structural(&self) -> bool {
        self.class() == TokenClass::Structural
    }
}
