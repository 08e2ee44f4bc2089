//! Stylesheet rule source using lightningcss
//!
//! Enumerates a stylesheet as an ordered list of style rules and imports.
//! Only the selector text and the `content` declaration of each rule matter
//! to cssgen; every other declaration is ignored.

use lightningcss::declaration::DeclarationBlock;
use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::traits::ToCss;

use crate::CssError;

/// A style rule reduced to what the materializer consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    /// Serialized selector list, as `CSSStyleRule.selectorText` would report it
    pub selector_text: String,
    /// Raw value of the `content` declaration, if any
    pub content: Option<String>,
}

impl StyleRule {
    pub fn new(selector_text: impl Into<String>, content: Option<&str>) -> Self {
        Self {
            selector_text: selector_text.into(),
            content: content.map(str::to_string),
        }
    }
}

/// Top-level stylesheet entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetItem {
    Rule(StyleRule),
    /// `@import` target URL, unresolved
    Import(String),
}

/// Parsed stylesheet
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub items: Vec<SheetItem>,
}

impl Stylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Style rules of this sheet only, imports not followed
    pub fn rules(&self) -> impl Iterator<Item = &StyleRule> {
        self.items.iter().filter_map(|item| match item {
            SheetItem::Rule(rule) => Some(rule),
            SheetItem::Import(_) => None,
        })
    }
}

/// CSS Parser
pub struct StylesheetParser;

impl StylesheetParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CSS stylesheet
    pub fn parse(&self, css: &str) -> Result<Stylesheet, CssError> {
        let options = ParserOptions {
            error_recovery: true,
            ..ParserOptions::default()
        };

        let stylesheet = StyleSheet::parse(css, options).map_err(|e| CssError::ParseError {
            line: e.loc.as_ref().map_or(0, |loc| loc.line + 1),
            message: e.kind.to_string(),
        })?;

        let mut result = Stylesheet::new();
        for rule in stylesheet.rules.0.iter() {
            self.convert_rule(rule, &mut result.items);
        }

        tracing::debug!("Parsed stylesheet with {} entries", result.len());
        Ok(result)
    }

    fn convert_rule(&self, rule: &CssRule, out: &mut Vec<SheetItem>) {
        match rule {
            CssRule::Style(style_rule) => {
                let selector_text = match style_rule.selectors.to_css_string(PrinterOptions::default()) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Failed to serialize selector: {}", e);
                        return;
                    }
                };
                let content = self.content_value(&style_rule.declarations);
                out.push(SheetItem::Rule(StyleRule {
                    selector_text,
                    content,
                }));
            }
            CssRule::Import(import) => {
                out.push(SheetItem::Import(import.url.to_string()));
            }
            _ => {
                tracing::debug!("Skipping non-style rule");
            }
        }
    }

    /// Last `content` declaration wins, `!important` ones first
    fn content_value(&self, declarations: &DeclarationBlock) -> Option<String> {
        declarations
            .important_declarations
            .iter()
            .rev()
            .chain(declarations.declarations.iter().rev())
            .find(|decl| decl.property_id().name() == "content")
            .and_then(|decl| decl.value_to_css_string(PrinterOptions::default()).ok())
    }
}

impl Default for StylesheetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Stylesheet text fetched for an `@import`
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    /// Resolved URL, used as the base for nested imports
    pub url: String,
    pub css: String,
}

/// Loads imported stylesheets
pub trait StylesheetLoader {
    /// Load `url`, resolved against `base` (the importing sheet) when given
    fn load(&self, url: &str, base: Option<&str>) -> Result<LoadedSheet, CssError>;
}

/// Flatten a stylesheet into rule order, expanding each `@import` in place
///
/// Imports that fail to load or parse, that would revisit a sheet already on
/// the import chain, or that nest deeper than `max_depth` are skipped.
pub fn flatten_rules(
    sheet: &Stylesheet,
    loader: &dyn StylesheetLoader,
    max_depth: usize,
) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    let mut chain = Vec::new();
    flatten_into(sheet, None, loader, max_depth, &mut chain, &mut rules);
    rules
}

fn flatten_into(
    sheet: &Stylesheet,
    base: Option<&str>,
    loader: &dyn StylesheetLoader,
    max_depth: usize,
    chain: &mut Vec<String>,
    rules: &mut Vec<StyleRule>,
) {
    for item in &sheet.items {
        let url = match item {
            SheetItem::Rule(rule) => {
                rules.push(rule.clone());
                continue;
            }
            SheetItem::Import(url) => url,
        };

        if chain.len() >= max_depth {
            tracing::warn!("Import depth limit {} reached at {}", max_depth, url);
            continue;
        }

        let loaded = match loader.load(url, base) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };
        if chain.contains(&loaded.url) {
            tracing::warn!("Import cycle through {}", loaded.url);
            continue;
        }

        let imported = match StylesheetParser::new().parse(&loaded.css) {
            Ok(imported) => imported,
            Err(e) => {
                tracing::warn!("Imported sheet {}: {}", loaded.url, e);
                continue;
            }
        };

        tracing::info!("Expanding import {}", loaded.url);
        chain.push(loaded.url.clone());
        flatten_into(&imported, Some(&loaded.url), loader, max_depth, chain, rules);
        chain.pop();
    }
}
