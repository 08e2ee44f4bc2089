//! cssgen CSS front end
//!
//! Selector tokenizing and grouping, plus stylesheet rule enumeration
//! built on lightningcss.

pub mod selector;
mod stylesheet;

pub use selector::{
    group, interpret, parse_selector, tokenize, tokenize_with_elided, AttrOp, AttributeTest,
    CompoundGroup, Equation, Item, ParsedSequence, SelectorError, Sign, Token, TokenClass,
    TokenKind, Tokenized,
};
pub use stylesheet::{
    flatten_rules, LoadedSheet, SheetItem, StyleRule, Stylesheet, StylesheetLoader,
    StylesheetParser,
};

/// Parse a CSS stylesheet
pub fn parse_stylesheet(css: &str) -> Result<Stylesheet, CssError> {
    StylesheetParser::new().parse(css)
}

/// CSS parsing error
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: u32, message: String },

    #[error("Failed to load import {url}: {message}")]
    Import { url: String, message: String },
}
