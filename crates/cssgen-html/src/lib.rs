//! cssgen HTML input
//!
//! HTML5 parsing built on html5ever, producing a cssgen `Document`.

mod parser;

pub use parser::HtmlParser;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<cssgen_dom::Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// HTML input error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),
}
