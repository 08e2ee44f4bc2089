//! cssgen - Main Entry Point
//!
//! Builds an HTML document out of stylesheet rules and prints it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use cssgen_engine::dom::{Document, HtmlSerializer};
use cssgen_engine::net::{ResourceLoader, Url};
use cssgen_engine::{Config, Engine, NetStylesheetLoader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cssgen", version, about = "Generate HTML from CSS selectors")]
struct Cli {
    /// Stylesheets to apply in order (paths or URLs)
    #[arg(value_name = "STYLESHEET", required = true)]
    stylesheets: Vec<String>,

    /// Start from this HTML document instead of an empty skeleton
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// JSON config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base for relative content URLs
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Indent the output
    #[arg(long)]
    pretty: bool,

    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let mut doc = match &cli.html {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            cssgen_engine::html::parse(&html)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => Document::new(),
    };

    let loader = ResourceLoader::builder()
        .user_agent(&config.user_agent)
        .timeout(config.fetch_timeout())
        .base_url(config.base_url.as_deref())
        .build()
        .context("creating resource loader")?;
    let mut engine = Engine::new(config, loader.clone());

    for sheet in &cli.stylesheets {
        let location = sheet_location(sheet)?;
        let (url, css) = smol::block_on(loader.fetch_text(&location, None))
            .with_context(|| format!("loading stylesheet {sheet}"))?;
        let imports = NetStylesheetLoader::new(&loader).with_base(Some(url.as_str()));
        let report = engine
            .apply_stylesheet(&mut doc, &css, &imports)
            .with_context(|| format!("parsing stylesheet {url}"))?;
        tracing::info!(
            "{}: {}/{} rule(s) applied, {} element(s) created",
            url,
            report.applied,
            report.rules,
            report.created
        );
    }

    let settled = engine.settle(&mut doc);
    if settled.resolved + settled.failed > 0 {
        tracing::info!(
            "Content: {} resolved, {} failed, {} node(s) updated",
            settled.resolved,
            settled.failed,
            settled.nodes_updated
        );
    }

    let serializer = if cli.pretty {
        HtmlSerializer::pretty()
    } else {
        HtmlSerializer::new()
    };
    let mut html = serializer.serialize_document(&doc);
    if !html.ends_with('\n') {
        html.push('\n');
    }
    match &cli.output {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{html}"),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Config::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(base) = &cli.base_url {
        config.base_url = Some(base.clone());
    }
    Ok(config)
}

/// Existing local files become file URLs; anything else goes to the loader as is
fn sheet_location(sheet: &str) -> Result<String> {
    let path = std::path::Path::new(sheet);
    if !path.exists() {
        return Ok(sheet.to_string());
    }
    let absolute = std::path::absolute(path).with_context(|| format!("resolving {sheet}"))?;
    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|_| anyhow::anyhow!("cannot express {} as a URL", absolute.display()))
}
