//! Compound grouping
//!
//! Folds a token stream into `Compound, Combinator, Compound, ...`.

use super::{tokenize, SelectorError, Token, TokenClass, TokenKind};

/// Per-node tokens that all constrain one tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundGroup {
    tokens: Vec<Token>,
    source: String,
}

impl CompoundGroup {
    fn new(tokens: Vec<Token>) -> Self {
        let source = tokens.iter().map(|t| t.source.as_str()).collect();
        Self { tokens, source }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tag name when the group starts with a tag token
    pub fn tag(&self) -> Option<&str> {
        match self.tokens.first().map(|t| &t.kind) {
            Some(TokenKind::Tag(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// One entry of a parsed sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Compound(CompoundGroup),
    Combinator(Token),
}

impl Item {
    pub fn source(&self) -> &str {
        match self {
            Self::Compound(group) => group.source(),
            Self::Combinator(token) => &token.source,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundGroup> {
        match self {
            Self::Compound(group) => Some(group),
            Self::Combinator(_) => None,
        }
    }
}

/// Alternating compound groups and combinators
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSequence {
    items: Vec<Item>,
}

impl ParsedSequence {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Cumulative selector text of items `0..=index`
    pub fn prefix(&self, index: usize) -> String {
        self.items
            .iter()
            .take(index + 1)
            .map(Item::source)
            .collect()
    }

    /// Full selector text
    pub fn source(&self) -> String {
        self.items.iter().map(Item::source).collect()
    }
}

/// Group a token stream
pub fn group(tokens: Vec<Token>) -> ParsedSequence {
    let mut items = Vec::new();
    let mut pending: Vec<Token> = Vec::new();

    for token in tokens {
        match token.class() {
            TokenClass::PerNode => pending.push(token),
            TokenClass::Structural => {
                if !pending.is_empty() {
                    items.push(Item::Compound(CompoundGroup::new(std::mem::take(
                        &mut pending,
                    ))));
                }
                items.push(Item::Combinator(token));
            }
        }
    }
    if !pending.is_empty() {
        items.push(Item::Compound(CompoundGroup::new(pending)));
    }

    ParsedSequence { items }
}

/// Tokenize and group selector text
pub fn parse_selector(text: &str) -> Result<ParsedSequence, SelectorError> {
    Ok(group(tokenize(text)?))
}
