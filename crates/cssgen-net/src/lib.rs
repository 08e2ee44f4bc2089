//! cssgen Networking
//!
//! Resource loading for stylesheet imports and remote JSON content.

mod fetch;
mod loader;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use fetch::FetchResponse;
pub use loader::{ResourceLoader, ResourceLoaderBuilder};
pub use url::Url;

/// Future resolving to a decoded JSON document
pub type JsonFuture = Pin<Box<dyn Future<Output = Result<serde_json::Value, NetError>> + Send>>;

/// Source of JSON documents
///
/// Returned futures own everything they need, so they can be driven after the
/// call that created them has returned.
pub trait FetchJson: Send + Sync {
    fn fetch_json(&self, url: &str) -> JsonFuture;
}

/// Raw response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Network error
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode body: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
