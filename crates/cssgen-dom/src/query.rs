//! Selector queries
//!
//! Compiles selector text into a list of complex selectors and matches them
//! against the tree right to left, backtracking over ancestors and siblings.
//! Results come back in document order.

use cssgen_css::{tokenize, AttrOp, Token, TokenKind};

use crate::{DomTree, NodeData, NodeId, QueryError};

/// Comma-separated selector list
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compounds joined by combinators, left to right
#[derive(Debug, Clone, Default)]
struct ComplexSelector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    NextAdjacent,
    NextSibling,
}

#[derive(Debug, Clone, Default)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    filters: Vec<Filter>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && !self.universal && self.filters.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        op: AttrOp,
        value: Option<String>,
    },
    Pseudo(Pseudo),
}

#[derive(Debug, Clone)]
enum Pseudo {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    Nth {
        expr: NthExpression,
        of_type: bool,
        from_end: bool,
    },
    Not(Box<Compound>),
    Contains(String),
    /// `:lang()`, dash-matched against the nearest `lang` attribute
    Lang(String),
    /// `:link` / `:any-link`
    AnyLink,
    Checked,
    Disabled,
    Enabled,
    Required,
    Optional,
    /// User-action and history states; a static tree never has them
    Never,
}

/// `An+B` position test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NthExpression {
    a: i64,
    b: i64,
}

impl NthExpression {
    /// Whether the 1-based position `n` is selected
    fn matches(&self, n: i64) -> bool {
        if self.a == 0 {
            return n == self.b;
        }
        let Some(diff) = n.checked_sub(self.b) else {
            return false;
        };
        let in_range = if self.a > 0 { diff >= 0 } else { diff <= 0 };
        in_range && diff.checked_rem(self.a) == Some(0)
    }
}

fn unsupported(what: impl Into<String>) -> QueryError {
    QueryError::Unsupported(what.into())
}

impl SelectorList {
    /// Compile selector text
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        let tokens = tokenize(text).map_err(|e| unsupported(e.to_string()))?;
        let mut selectors = Vec::new();
        let mut current = ComplexSelector::default();
        let mut compound = Compound::default();
        let mut pending: Option<Combinator> = None;

        for token in &tokens {
            let combinator = match token.kind {
                TokenKind::Descendant => Some(Combinator::Descendant),
                TokenKind::Child => Some(Combinator::Child),
                TokenKind::NextAdjacent => Some(Combinator::NextAdjacent),
                TokenKind::NextSibling => Some(Combinator::NextSibling),
                _ => None,
            };

            if let Some(combinator) = combinator {
                if compound.is_empty() && current.compounds.is_empty() {
                    return Err(unsupported(format!("leading combinator {:?}", token.source)));
                }
                pending = match (pending, combinator) {
                    (None, c) | (Some(Combinator::Descendant), c) => Some(c),
                    (Some(c), Combinator::Descendant) => Some(c),
                    _ => return Err(unsupported(format!("doubled combinator {:?}", token.source))),
                };
                continue;
            }

            if matches!(token.kind, TokenKind::ListSeparator) {
                finish(&mut current, &mut compound, pending.take())?;
                selectors.push(std::mem::take(&mut current));
                continue;
            }

            if let Some(combinator) = pending.take() {
                if !compound.is_empty() {
                    current.compounds.push(std::mem::take(&mut compound));
                }
                current.combinators.push(combinator);
            }
            push_simple(&mut compound, token)?;
        }

        finish(&mut current, &mut compound, pending)?;
        selectors.push(current);
        Ok(Self { selectors })
    }

    /// Whether element `id` matches any selector in the list
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        tree.element(id).is_some()
            && self
                .selectors
                .iter()
                .any(|sel| matches_from(tree, sel, sel.compounds.len() - 1, id))
    }
}

/// Close one complex selector. A trailing descendant combinator is dropped;
/// any other dangling combinator, or an empty selector, is rejected.
fn finish(
    current: &mut ComplexSelector,
    compound: &mut Compound,
    pending: Option<Combinator>,
) -> Result<(), QueryError> {
    match pending {
        None | Some(Combinator::Descendant) => {}
        Some(c) => return Err(unsupported(format!("dangling {c:?} combinator"))),
    }
    if compound.is_empty() {
        return Err(unsupported("empty selector"));
    }
    current.compounds.push(std::mem::take(compound));
    Ok(())
}

fn push_simple(compound: &mut Compound, token: &Token) -> Result<(), QueryError> {
    if let Some(test) = token.kind.as_attribute() {
        compound.filters.push(Filter::Attribute {
            name: test.name.to_string(),
            op: test.op,
            value: test.value.map(str::to_string),
        });
        return Ok(());
    }

    match &token.kind {
        TokenKind::Tag(name) => {
            if compound.tag.is_some() || compound.universal {
                return Err(unsupported(format!("second type selector {name:?}")));
            }
            compound.tag = Some(name.to_ascii_lowercase());
        }
        TokenKind::Universal => compound.universal = true,
        TokenKind::Id(id) => compound.filters.push(Filter::Id(id.clone())),
        TokenKind::Class(class) => compound.filters.push(Filter::Class(class.clone())),
        TokenKind::PseudoSimple(name) => {
            let pseudo = match name.as_str() {
                "root" => Pseudo::Root,
                "empty" => Pseudo::Empty,
                "first-child" => Pseudo::FirstChild,
                "last-child" => Pseudo::LastChild,
                "only-child" => Pseudo::OnlyChild,
                "first-of-type" => Pseudo::FirstOfType,
                "last-of-type" => Pseudo::LastOfType,
                "only-of-type" => Pseudo::OnlyOfType,
                "link" | "any-link" => Pseudo::AnyLink,
                "checked" => Pseudo::Checked,
                "disabled" => Pseudo::Disabled,
                "enabled" => Pseudo::Enabled,
                "required" => Pseudo::Required,
                "optional" => Pseudo::Optional,
                "hover" | "active" | "focus" | "focus-visible" | "focus-within" | "visited"
                | "target" => Pseudo::Never,
                _ => return Err(unsupported(format!(":{name}"))),
            };
            compound.filters.push(Filter::Pseudo(pseudo));
        }
        TokenKind::PseudoFunctionEquation(eq) => {
            let (of_type, from_end) = match eq.function.as_str() {
                "nth-child" => (false, false),
                "nth-last-child" => (false, true),
                "nth-of-type" => (true, false),
                "nth-last-of-type" => (true, true),
                "not" | "contains" | "lang" => {
                    return push_function(compound, token, &eq.function);
                }
                _ => return Err(unsupported(token.source.clone())),
            };
            let (a, b) = eq
                .affine()
                .ok_or_else(|| unsupported(token.source.clone()))?;
            compound.filters.push(Filter::Pseudo(Pseudo::Nth {
                expr: NthExpression { a, b },
                of_type,
                from_end,
            }));
        }
        TokenKind::PseudoFunctionArg { function, .. } => {
            return push_function(compound, token, function);
        }
        TokenKind::PseudoFunctionQuotedArg { function, argument } => {
            let pseudo = match function.as_str() {
                "contains" => Pseudo::Contains(argument.clone()),
                "lang" if !argument.is_empty() => Pseudo::Lang(argument.to_ascii_lowercase()),
                _ => return Err(unsupported(token.source.clone())),
            };
            compound.filters.push(Filter::Pseudo(pseudo));
        }
        _ => return Err(unsupported(token.source.clone())),
    }
    Ok(())
}

/// `:not(...)`, `:lang(...)` and unquoted `:contains(...)`, whose argument is
/// taken verbatim from the token text since the tokenizer may have split it as
/// an equation
fn push_function(compound: &mut Compound, token: &Token, function: &str) -> Result<(), QueryError> {
    let argument = token
        .source
        .strip_prefix(':')
        .and_then(|s| s.strip_prefix(function))
        .and_then(|s| s.strip_prefix('('))
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| unsupported(token.source.clone()))?;

    let pseudo = match function {
        "contains" => Pseudo::Contains(argument.to_string()),
        "lang" => {
            let range = argument.trim();
            if range.is_empty() {
                return Err(unsupported(":lang()"));
            }
            Pseudo::Lang(range.to_ascii_lowercase())
        }
        "not" => {
            let mut inner = Compound::default();
            let tokens = tokenize(argument).map_err(|e| unsupported(e.to_string()))?;
            for inner_token in &tokens {
                if inner_token.is_structural() && !matches!(inner_token.kind, TokenKind::Universal) {
                    return Err(unsupported(format!("complex :not argument {argument:?}")));
                }
                push_simple(&mut inner, inner_token)?;
            }
            if inner.is_empty() {
                return Err(unsupported(":not()"));
            }
            Pseudo::Not(Box::new(inner))
        }
        _ => return Err(unsupported(token.source.clone())),
    };
    compound.filters.push(Filter::Pseudo(pseudo));
    Ok(())
}

fn matches_from(tree: &DomTree, sel: &ComplexSelector, index: usize, id: NodeId) -> bool {
    if !compound_matches(tree, &sel.compounds[index], id) {
        return false;
    }
    if index == 0 {
        return true;
    }

    let next = index - 1;
    match sel.combinators[next] {
        Combinator::Child => {
            parent_element(tree, id).is_some_and(|p| matches_from(tree, sel, next, p))
        }
        Combinator::Descendant => {
            let mut ancestor = parent_element(tree, id);
            while let Some(a) = ancestor {
                if matches_from(tree, sel, next, a) {
                    return true;
                }
                ancestor = parent_element(tree, a);
            }
            false
        }
        Combinator::NextAdjacent => tree
            .prev_element_sibling(id)
            .is_some_and(|s| matches_from(tree, sel, next, s)),
        Combinator::NextSibling => {
            let mut sibling = tree.prev_element_sibling(id);
            while let Some(s) = sibling {
                if matches_from(tree, sel, next, s) {
                    return true;
                }
                sibling = tree.prev_element_sibling(s);
            }
            false
        }
    }
}

fn parent_element(tree: &DomTree, id: NodeId) -> Option<NodeId> {
    tree.parent(id).filter(|&p| tree.element(p).is_some())
}

fn compound_matches(tree: &DomTree, compound: &Compound, id: NodeId) -> bool {
    let Some(elem) = tree.element(id) else {
        return false;
    };
    if let Some(tag) = &compound.tag {
        if !elem.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }

    compound.filters.iter().all(|filter| match filter {
        Filter::Id(want) => elem.id() == Some(want.as_str()),
        Filter::Class(class) => elem.has_class(class),
        Filter::Attribute { name, op, value } => {
            attribute_matches(*op, elem.get_attr(name), value.as_deref().unwrap_or(""))
        }
        Filter::Pseudo(pseudo) => pseudo_matches(tree, pseudo, id),
    })
}

fn attribute_matches(op: AttrOp, actual: Option<&str>, want: &str) -> bool {
    let Some(actual) = actual else {
        return op == AttrOp::NotEquals;
    };
    match op {
        AttrOp::Exists => true,
        AttrOp::Equals => actual == want,
        AttrOp::NotEquals => actual != want,
        AttrOp::DashMatch => {
            actual == want
                || actual
                    .strip_prefix(want)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Substring => !want.is_empty() && actual.contains(want),
        AttrOp::Word => {
            !want.is_empty()
                && !want.contains(char::is_whitespace)
                && actual.split_whitespace().any(|w| w == want)
        }
        AttrOp::Suffix => !want.is_empty() && actual.ends_with(want),
        AttrOp::Prefix => !want.is_empty() && actual.starts_with(want),
    }
}

/// 1-based position among element siblings, and the sibling count
fn position(tree: &DomTree, id: NodeId, of_type: bool, from_end: bool) -> (i64, i64) {
    let Some(parent) = tree.parent(id) else {
        return (1, 1);
    };
    let tag = tree.tag(id);
    let mut index = 0;
    let mut count = 0;
    for sibling in tree.element_children(parent) {
        if of_type && tree.tag(sibling) != tag {
            continue;
        }
        count += 1;
        if sibling == id {
            index = count;
        }
    }
    if from_end {
        (count - index + 1, count)
    } else {
        (index, count)
    }
}

fn pseudo_matches(tree: &DomTree, pseudo: &Pseudo, id: NodeId) -> bool {
    match pseudo {
        Pseudo::Root => tree.parent(id) == Some(tree.root()),
        Pseudo::Empty => tree.children(id).all(|(_, child)| match &child.data {
            NodeData::Text(text) => text.is_empty(),
            NodeData::Comment(_) => true,
            _ => false,
        }),
        Pseudo::FirstChild => position(tree, id, false, false).0 == 1,
        Pseudo::LastChild => position(tree, id, false, true).0 == 1,
        Pseudo::OnlyChild => position(tree, id, false, false).1 == 1,
        Pseudo::FirstOfType => position(tree, id, true, false).0 == 1,
        Pseudo::LastOfType => position(tree, id, true, true).0 == 1,
        Pseudo::OnlyOfType => position(tree, id, true, false).1 == 1,
        Pseudo::Nth {
            expr,
            of_type,
            from_end,
        } => expr.matches(position(tree, id, *of_type, *from_end).0),
        Pseudo::Not(inner) => !compound_matches(tree, inner, id),
        Pseudo::Contains(text) => tree.text_content(id).contains(text.as_str()),
        Pseudo::Lang(range) => language(tree, id).is_some_and(|lang| {
            let lang = lang.to_ascii_lowercase();
            lang == *range
                || lang
                    .strip_prefix(range.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }),
        Pseudo::AnyLink => has_tag(tree, id, &["a", "area"]) && has_attr(tree, id, "href"),
        Pseudo::Checked => {
            (has_tag(tree, id, &["input"]) && has_attr(tree, id, "checked"))
                || (has_tag(tree, id, &["option"]) && has_attr(tree, id, "selected"))
        }
        Pseudo::Disabled => has_tag(tree, id, FORM_CONTROLS) && has_attr(tree, id, "disabled"),
        Pseudo::Enabled => has_tag(tree, id, FORM_CONTROLS) && !has_attr(tree, id, "disabled"),
        Pseudo::Required => {
            has_tag(tree, id, &["input", "select", "textarea"]) && has_attr(tree, id, "required")
        }
        Pseudo::Optional => {
            has_tag(tree, id, &["input", "select", "textarea"]) && !has_attr(tree, id, "required")
        }
        Pseudo::Never => false,
    }
}

const FORM_CONTROLS: &[&str] = &[
    "button", "input", "select", "textarea", "optgroup", "option", "fieldset",
];

fn has_tag(tree: &DomTree, id: NodeId, tags: &[&str]) -> bool {
    tree.tag(id).is_some_and(|tag| tags.contains(&tag))
}

fn has_attr(tree: &DomTree, id: NodeId, name: &str) -> bool {
    tree.element(id).is_some_and(|e| e.attrs.has_attribute(name))
}

/// `lang` of the element or its nearest ancestor that declares one
fn language(tree: &DomTree, id: NodeId) -> Option<&str> {
    let mut current = Some(id);
    while let Some(node) = current {
        if let Some(lang) = tree.element(node).and_then(|e| e.get_attr("lang")) {
            return Some(lang);
        }
        current = tree.parent(node);
    }
    None
}

impl DomTree {
    /// All connected elements matching `selector`, in document order
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, QueryError> {
        let list = SelectorList::parse(selector)?;
        Ok(self
            .descendants(self.root())
            .filter(|&id| list.matches(self, id))
            .collect())
    }
}
