//! cssgen Engine
//!
//! Treats stylesheet rules as templates: every rule's selector is resolved
//! against a document, and whatever part of the selector matches nothing is
//! created, so that the selector matches afterwards. A rule's `content`
//! becomes the text of the element it created last.
//!
//! # Example
//! ```rust,ignore
//! use cssgen_engine::{Config, Engine, NetStylesheetLoader};
//! use cssgen_engine::dom::Document;
//!
//! let mut doc = Document::new();
//! let mut engine = Engine::with_network(Config::default())?;
//! let loader = engine.fetcher().clone();
//! let imports = NetStylesheetLoader::new(&loader);
//! engine.apply_stylesheet(&mut doc, r#"body > ul > li:nth-last-child(-n+3) { content: "x"; }"#, &imports)?;
//! engine.settle(&mut doc);
//! ```

mod binder;
mod config;
mod content;
mod engine;
mod imports;
mod materializer;
mod synthesis;

pub use binder::{apply, CorrelationIds, DeferredBinder, SettleReport};
pub use config::Config;
pub use content::{decode_content, ContentPayload, PendingContent};
pub use engine::{ApplyReport, Engine, RuleError, RuleFailure};
pub use imports::NetStylesheetLoader;
pub use materializer::{
    materialize, Limits, MaterializeError, MaterializeReport, Step, StepOutcome,
};
pub use synthesis::BuildSpec;

// Re-export sub-crates for advanced usage
pub use cssgen_css as css;
pub use cssgen_dom as dom;
pub use cssgen_html as html;
pub use cssgen_net as net;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
