//! Comprehensive tests for cssgen-engine
//!
//! Rules applied to in-memory documents, with content served by a fake
//! fetcher.

use std::collections::HashMap;
use std::sync::Mutex;

use cssgen_engine::css::{CssError, LoadedSheet, StyleRule, StylesheetLoader};
use cssgen_engine::dom::{Document, ElementTree, HtmlSerializer, NodeId};
use cssgen_engine::net::{FetchJson, JsonFuture, NetError};
use cssgen_engine::{Config, Engine, MaterializeError, RuleError, StepOutcome};
use serde_json::{json, Value};

/// Serves JSON from a map and records every requested URL
#[derive(Default)]
struct FakeFetcher {
    documents: HashMap<String, Value>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    fn with(mut self, url: &str, value: Value) -> Self {
        self.documents.insert(url.to_string(), value);
        self
    }
}

impl FetchJson for FakeFetcher {
    fn fetch_json(&self, url: &str) -> JsonFuture {
        self.requested.lock().unwrap().push(url.to_string());
        let result = self
            .documents
            .get(url)
            .cloned()
            .ok_or(NetError::HttpError { status: 404 });
        Box::pin(async move { result })
    }
}

struct MapLoader(HashMap<&'static str, &'static str>);

impl StylesheetLoader for MapLoader {
    fn load(&self, url: &str, _base: Option<&str>) -> Result<LoadedSheet, CssError> {
        self.0
            .get(url)
            .map(|css| LoadedSheet {
                url: url.to_string(),
                css: css.to_string(),
            })
            .ok_or_else(|| CssError::Import {
                url: url.to_string(),
                message: "not found".into(),
            })
    }
}

fn engine() -> Engine<FakeFetcher> {
    Engine::new(Config::default(), FakeFetcher::default())
}

fn rule(selector: &str, content: Option<&str>) -> StyleRule {
    StyleRule::new(selector, content)
}

fn texts(doc: &Document, nodes: &[NodeId]) -> Vec<String> {
    nodes.iter().map(|&n| doc.tree.text_content(n)).collect()
}

// ============================================================================
// SYNTHESIS
// ============================================================================

#[test]
fn test_chain_with_literal_content() {
    let mut doc = Document::new();
    let mut engine = engine();

    let report = engine
        .apply_rule(&mut doc, &rule("body>div.test1>span.redText", Some(r#""hello""#)))
        .unwrap();
    assert_eq!(report.created, 2);
    assert!(report.content_bound);

    let body = doc.body();
    assert_eq!(
        HtmlSerializer::new().serialize_outer(&doc.tree, body),
        r#"<body><div class="test1"><span class="redText">hello</span></div></body>"#
    );
}

#[test]
fn test_intermediate_groups_get_no_content() {
    let mut doc = Document::new();
    let mut engine = engine();
    engine
        .apply_rule(&mut doc, &rule("body > section > h1", Some(r#""Title""#)))
        .unwrap();

    let section = doc.query("section").unwrap();
    let h1 = doc.query("h1").unwrap();
    assert_eq!(doc.tree.text_content(section[0]), "Title");
    assert_eq!(doc.tree.children(section[0]).count(), 1);
    assert_eq!(texts(&doc, &h1), vec!["Title"]);
}

#[test]
fn test_fan_out_creates_distinct_nodes() {
    let mut doc = Document::new();
    let mut engine = engine();
    let report = engine
        .apply_rule(
            &mut doc,
            &rule(
                "body > div.row:nth-last-child(-n+2) > span.cell:nth-last-child(-n+3)",
                None,
            ),
        )
        .unwrap();
    assert_eq!(report.created, 2 + 6);

    let rows = doc.query("div.row").unwrap();
    let cells = doc.query("span.cell").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(cells.len(), 6);

    let mut unique = cells.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 6);
    for &row in &rows {
        assert_eq!(doc.tree.element_children(row).count(), 3);
    }
}

#[test]
fn test_repeat_index_recorded() {
    let mut doc = Document::new();
    let mut engine = engine();
    engine
        .apply_rule(&mut doc, &rule("body > li:nth-last-child(-n+3)", None))
        .unwrap();

    let indexes: Vec<Option<u32>> = doc
        .query("li")
        .unwrap()
        .into_iter()
        .map(|li| doc.tree.element(li).unwrap().repeat_index)
        .collect();
    assert_eq!(indexes, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn test_rule_is_idempotent() {
    let mut doc = Document::new();
    let mut engine = engine();
    let rule = rule("body > ul.list > li:nth-last-child(-n+3)", Some(r#""x""#));

    let first = engine.apply_rule(&mut doc, &rule).unwrap();
    let before = HtmlSerializer::new().serialize_document(&doc);
    let second = engine.apply_rule(&mut doc, &rule).unwrap();

    assert_eq!(first.created, 4);
    assert_eq!(second.created, 0);
    assert!(!second.content_bound);
    assert!(second
        .steps
        .iter()
        .all(|s| matches!(s.outcome, StepOutcome::Matched(_) | StepOutcome::Skipped(_))));
    assert_eq!(HtmlSerializer::new().serialize_document(&doc), before);
}

#[test]
fn test_existing_match_is_reused() {
    let mut doc = cssgen_engine::html::parse(
        "<html><body><div></div><div></div></body></html>",
    )
    .unwrap();
    let mut engine = engine();
    let report = engine.apply_rule(&mut doc, &rule("body > div > em", None)).unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(doc.query("div").unwrap().len(), 2);
    assert_eq!(doc.query("div > em").unwrap().len(), 2);
}

#[test]
fn test_attributes_and_id() {
    let mut doc = Document::new();
    let mut engine = engine();
    engine
        .apply_rule(
            &mut doc,
            &rule(r#"body > a#home.nav[href="/"][title="Home"]"#, Some(r#""Home""#)),
        )
        .unwrap();

    let a = doc.get_element_by_id("home").unwrap();
    let data = doc.tree.element(a).unwrap();
    assert_eq!(data.tag, "a");
    assert_eq!(data.get_attr("href"), Some("/"));
    assert_eq!(data.get_attr("title"), Some("Home"));
    assert!(data.has_class("nav"));
    assert_eq!(doc.tree.text_content(a), "Home");
}

#[test]
fn test_unsupported_tokens_are_reported() {
    let mut doc = Document::new();
    let mut engine = engine();
    let report = engine
        .apply_rule(&mut doc, &rule("body > p[lang]:first-child", None))
        .unwrap();
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, vec!["[lang]", ":first-child"]);
}

#[test]
fn test_user_action_state_builds_plain_element() {
    let mut doc = Document::new();
    let mut engine = engine();
    let report = engine
        .apply_rule(&mut doc, &rule("body > a:hover", Some(r#""x""#)))
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, vec![":hover"]);
    let a = doc.query("body > a").unwrap();
    assert_eq!(texts(&doc, &a), vec!["x"]);
}

#[test]
fn test_state_pseudos_synthesize_their_tag() {
    for (selector, tag, skipped) in [
        ("body > input:checked", "input", ":checked"),
        ("body > p:lang(en)", "p", ":lang(en)"),
        ("body > button:disabled", "button", ":disabled"),
    ] {
        let mut doc = Document::new();
        let mut engine = engine();
        let report = engine.apply_rule(&mut doc, &rule(selector, None)).unwrap();

        assert_eq!(report.created, 1, "{selector}");
        assert_eq!(report.skipped, vec![skipped], "{selector}");
        assert_eq!(doc.query(&format!("body > {tag}")).unwrap().len(), 1);
    }
}

#[test]
fn test_state_pseudos_match_existing_markup() {
    let mut doc = cssgen_engine::html::parse(
        r#"<html lang="en"><body><input type="checkbox" checked><button disabled></button><p></p></body></html>"#,
    )
    .unwrap();
    let mut engine = engine();
    for selector in ["body > input:checked", "body > button:disabled", "body > p:lang(en)"] {
        let report = engine.apply_rule(&mut doc, &rule(selector, None)).unwrap();
        assert_eq!(report.created, 0, "{selector}");
    }
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_anchor_error_when_nothing_matches_first() {
    let mut doc = Document::new();
    let mut engine = engine();
    let err = engine
        .apply_rule(&mut doc, &rule("section.missing > p", None))
        .unwrap_err();
    assert!(matches!(
        err,
        RuleError::Materialize(MaterializeError::Anchor { .. })
    ));
    assert!(doc.query("p").unwrap().is_empty());
}

#[test]
fn test_group_without_tag_cannot_be_synthesized() {
    let mut doc = Document::new();
    let mut engine = engine();
    let err = engine
        .apply_rule(&mut doc, &rule("body > .lonely", None))
        .unwrap_err();
    assert!(matches!(
        err,
        RuleError::Materialize(MaterializeError::InvalidSynthesis { .. })
    ));
}

#[test]
fn test_untokenizable_selector() {
    let mut doc = Document::new();
    let mut engine = engine();
    let err = engine.apply_rule(&mut doc, &rule("body > div-x", None)).unwrap_err();
    assert!(matches!(err, RuleError::Selector(_)));
}

#[test]
fn test_failing_rule_does_not_stop_later_rules() {
    let mut doc = Document::new();
    let mut engine = engine();
    let rules = vec![
        rule("nav.missing > a", None),
        rule("body > footer", Some(r#""bye""#)),
    ];
    let report = engine.apply_rules(&mut doc, &rules);

    assert_eq!(report.rules, 2);
    assert_eq!(report.applied, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].selector, "nav.missing > a");
    let footer = doc.query("footer").unwrap();
    assert_eq!(texts(&doc, &footer), vec!["bye"]);
}

// ============================================================================
// PENDING CONTENT
// ============================================================================

#[test]
fn test_pending_content_binds_json_text() {
    let mut doc = Document::new();
    let fetcher = FakeFetcher::default()
        .with("a.json", json!({"a": 1}))
        .with("b.json", json!("plain"));
    let mut engine = Engine::new(Config::default(), fetcher);

    let first = engine
        .apply_rule(&mut doc, &rule("body > p.first", Some(r#"url("a.json")"#)))
        .unwrap();
    let second = engine
        .apply_rule(&mut doc, &rule("body > p.second", Some(r#"url("b.json")"#)))
        .unwrap();
    assert_ne!(first.correlation, second.correlation);
    assert_eq!(engine.pending(), 2);

    let p1 = doc.query("p.first").unwrap();
    let p2 = doc.query("p.second").unwrap();
    assert_eq!(texts(&doc, &p1), vec![""]);

    let settled = engine.settle(&mut doc);
    assert_eq!(settled.resolved, 2);
    assert_eq!(settled.nodes_updated, 2);
    assert_eq!(texts(&doc, &p1), vec![r#"{"a":1}"#]);
    assert_eq!(texts(&doc, &p2), vec![r#""plain""#]);
    assert_eq!(engine.pending(), 0);
    assert_eq!(*engine.fetcher().requested.lock().unwrap(), vec!["a.json", "b.json"]);
}

#[test]
fn test_pending_content_reaches_every_copy() {
    let mut doc = Document::new();
    let fetcher = FakeFetcher::default().with("items.json", json!([1, 2]));
    let mut engine = Engine::new(Config::default(), fetcher);
    engine
        .apply_rule(
            &mut doc,
            &rule("body > ul > li:nth-last-child(-n+3)", Some(r#"url("items.json")"#)),
        )
        .unwrap();

    let settled = engine.settle(&mut doc);
    assert_eq!(settled.nodes_updated, 3);
    let lis = doc.query("li").unwrap();
    assert_eq!(texts(&doc, &lis), vec!["[1,2]"; 3]);
}

#[test]
fn test_failed_fetch_leaves_nodes_empty() {
    let mut doc = Document::new();
    let mut engine = engine();
    engine
        .apply_rule(&mut doc, &rule("body > p", Some(r#"url("missing.json")"#)))
        .unwrap();

    let settled = engine.settle(&mut doc);
    assert_eq!(settled.failed, 1);
    assert_eq!(settled.nodes_updated, 0);
    let p = doc.query("p").unwrap();
    assert_eq!(texts(&doc, &p), vec![""]);
}

#[test]
fn test_no_fetch_when_final_group_already_matches() {
    let mut doc = Document::new();
    let mut engine = engine();
    engine.apply_rule(&mut doc, &rule("body > p", None)).unwrap();
    let report = engine
        .apply_rule(&mut doc, &rule("body > p", Some(r#"url("late.json")"#)))
        .unwrap();

    assert!(!report.content_bound);
    assert_eq!(report.correlation, None);
    assert_eq!(engine.pending(), 0);
}

// ============================================================================
// STYLESHEETS
// ============================================================================

#[test]
fn test_apply_stylesheet_in_rule_order() {
    let mut doc = Document::new();
    let mut engine = engine();
    let loader = MapLoader(HashMap::new());
    let report = engine
        .apply_stylesheet(
            &mut doc,
            r#"
            body > h1 { content: "Heading"; color: red; }
            body > p { content: "Body"; }
            "#,
            &loader,
        )
        .unwrap();

    assert_eq!(report.rules, 2);
    assert_eq!(report.applied, 2);
    let body = doc.body();
    let tags: Vec<_> = doc
        .tree
        .element_children(body)
        .filter_map(|n| doc.tree.tag(n).map(str::to_string))
        .collect();
    assert_eq!(tags, vec!["h1", "p"]);
}

#[test]
fn test_imports_expand_in_place() {
    let mut doc = Document::new();
    let mut engine = engine();
    let loader = MapLoader(HashMap::from([(
        "more.css",
        r#"body > p.zero { content: "0"; }"#,
    )]));
    engine
        .apply_stylesheet(
            &mut doc,
            r#"@import "more.css"; body > p.first { content: "1"; }"#,
            &loader,
        )
        .unwrap();

    let body = doc.body();
    let texts: Vec<_> = doc
        .tree
        .element_children(body)
        .map(|n| doc.tree.text_content(n))
        .collect();
    assert_eq!(texts, vec!["0", "1"]);
}

#[test]
fn test_apply_stylesheets_merges_reports() {
    let mut doc = Document::new();
    let mut engine = engine();
    let loader = MapLoader(HashMap::new());
    let report = engine
        .apply_stylesheets(
            &mut doc,
            ["body > header {}", "body > main {} aside.none > p {}"],
            &loader,
        )
        .unwrap();

    assert_eq!(report.rules, 3);
    assert_eq!(report.applied, 2);
    assert_eq!(report.created, 2);
    assert_eq!(report.failures.len(), 1);
}
