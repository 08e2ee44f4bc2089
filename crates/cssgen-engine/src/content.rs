//! Content decoding
//!
//! A rule's `content` value either carries the text for the synthesized leaf
//! directly, or names a JSON resource through `url(...)` whose body arrives
//! later.

use std::fmt;
use std::sync::LazyLock;

use cssgen_net::{FetchJson, JsonFuture};
use regex::Regex;

/// `url("...")` with a JSON string literal, or the bare `url(...)` form
/// lightningcss prints
static URL_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^url\([ \t\n\r\f]*(?:(?<quoted>"(?:[^"\\]|\\.)*")|(?<bare>[^ \t\n\r\f"'()]+))[ \t\n\r\f]*\)$"#)
        .expect("valid url() pattern")
});

/// Content whose JSON body is still being fetched
pub struct PendingContent {
    pub url: String,
    pub(crate) future: JsonFuture,
}

impl PendingContent {
    pub fn new(url: impl Into<String>, future: JsonFuture) -> Self {
        Self {
            url: url.into(),
            future,
        }
    }
}

impl fmt::Debug for PendingContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingContent")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Decoded `content` value of one rule
#[derive(Debug)]
pub enum ContentPayload {
    Literal(String),
    Pending(PendingContent),
    Absent,
}

impl ContentPayload {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Decode a raw `content` declaration value
///
/// A fetch is started only for the `url(...)` form; anything else must parse
/// as JSON to count as content.
pub fn decode_content(raw: Option<&str>, fetcher: &dyn FetchJson) -> ContentPayload {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return ContentPayload::Absent;
    };

    if let Some(caps) = URL_FUNCTION.captures(raw) {
        let url = match (caps.name("quoted"), caps.name("bare")) {
            (Some(quoted), _) => match serde_json::from_str::<String>(quoted.as_str()) {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!("Bad url() argument {}: {}", quoted.as_str(), e);
                    return ContentPayload::Absent;
                }
            },
            (None, Some(bare)) => bare.as_str().to_string(),
            (None, None) => return ContentPayload::Absent,
        };
        tracing::debug!("Deferring content from {}", url);
        let future = fetcher.fetch_json(&url);
        return ContentPayload::Pending(PendingContent::new(url, future));
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::String(text)) => ContentPayload::Literal(text),
        Ok(other) => ContentPayload::Literal(other.to_string()),
        Err(_) => {
            tracing::debug!("Content {:?} is not JSON, ignored", raw);
            ContentPayload::Absent
        }
    }
}
