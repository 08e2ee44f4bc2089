//! Selector tokenizer
//!
//! Repeatedly consumes the first catalogue match from the remaining text.

use super::matcher::catalogue;
use super::{SelectorError, Token, TokenKind};

/// Tokenizer output, including the descendant tokens that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<Token>,
    /// Elided tokens, each paired with the index in `tokens` it preceded
    pub elided: Vec<(usize, Token)>,
}

impl Tokenized {
    /// Reassemble the selector text from emitted and elided tokens
    pub fn source_text(&self) -> String {
        let mut out = String::new();
        let mut elided = self.elided.iter().peekable();
        for (index, token) in self.tokens.iter().enumerate() {
            while let Some((_, dropped)) = elided.next_if(|(at, _)| *at == index) {
                out.push_str(&dropped.source);
            }
            out.push_str(&token.source);
        }
        for (_, dropped) in elided {
            out.push_str(&dropped.source);
        }
        out
    }
}

/// Tokenize selector text
pub fn tokenize(text: &str) -> Result<Vec<Token>, SelectorError> {
    tokenize_with_elided(text).map(|t| t.tokens)
}

/// Tokenize selector text, keeping track of elided whitespace
///
/// Whitespace at the very start, or directly after a `,`, carries no
/// structural meaning and is not emitted as a `Descendant` token.
pub fn tokenize_with_elided(text: &str) -> Result<Tokenized, SelectorError> {
    let mut out = Tokenized::default();
    let mut remaining = text;

    while !remaining.is_empty() {
        let token = catalogue()
            .iter()
            .filter(|m| m.test(remaining))
            .find_map(|m| m.consume(remaining))
            .ok_or_else(|| SelectorError::Parse {
                remaining: remaining.to_string(),
            })?;
        remaining = &remaining[token.source.len()..];

        let after_separator = match out.tokens.last() {
            None => true,
            Some(last) => last.kind == TokenKind::ListSeparator,
        };
        if token.kind == TokenKind::Descendant && after_separator {
            out.elided.push((out.tokens.len(), token));
        } else {
            out.tokens.push(token);
        }
    }

    tracing::trace!("tokenized {:?} into {} tokens", text, out.tokens.len());
    Ok(out)
}
