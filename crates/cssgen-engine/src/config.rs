//! Engine Configuration

use std::time::Duration;

use serde::Deserialize;

use crate::Limits;

/// Engine configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Upper bound for `nth-last-child(-n+K)` repeat counts
    pub max_multiplier: u32,

    /// Per-fetch timeout, for HTTP and for pending content
    pub fetch_timeout_ms: u64,

    /// `@import` nesting limit
    pub max_import_depth: usize,

    /// User agent string
    pub user_agent: String,

    /// Base for relative content and import URLs
    pub base_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_multiplier: 1000,
            fetch_timeout_ms: 10_000,
            max_import_depth: 16,
            user_agent: format!("cssgen/{}", crate::VERSION),
            base_url: None,
        }
    }
}

impl Config {
    /// Parse a JSON config document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_multiplier: self.max_multiplier,
        }
    }
}
