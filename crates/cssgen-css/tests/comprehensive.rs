//! Comprehensive tests for cssgen-css
//!
//! Tokenizer shapes, round-tripping and grouping over the supported selector
//! subset.

use cssgen_css::{
    group, parse_selector, tokenize, tokenize_with_elided, Item, SelectorError, TokenKind,
};

fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Tag(_) => "Tag",
        TokenKind::Id(_) => "Id",
        TokenKind::Class(_) => "Class",
        TokenKind::PseudoSimple(_) => "PseudoSimple",
        TokenKind::PseudoElement(_) => "PseudoElement",
        TokenKind::PseudoFunctionNoArg(_) => "PseudoFunctionNoArg",
        TokenKind::PseudoFunctionQuotedArg { .. } => "PseudoFunctionQuotedArg",
        TokenKind::PseudoFunctionArg { .. } => "PseudoFunctionArg",
        TokenKind::PseudoFunctionEquation(_) => "PseudoFunctionEquation",
        TokenKind::AttributePresence(_) => "AttributePresence",
        TokenKind::AttributeEquals { .. } => "AttributeEquals",
        TokenKind::AttributeNotEquals { .. } => "AttributeNotEquals",
        TokenKind::AttributePrefix { .. } => "AttributePrefix",
        TokenKind::AttributeContains { .. } => "AttributeContains",
        TokenKind::AttributeContainsWord { .. } => "AttributeContainsWord",
        TokenKind::AttributeEndsWith { .. } => "AttributeEndsWith",
        TokenKind::AttributeStartsWith { .. } => "AttributeStartsWith",
        TokenKind::Child => "Child",
        TokenKind::Descendant => "Descendant",
        TokenKind::NextAdjacent => "NextAdjacent",
        TokenKind::NextSibling => "NextSibling",
        TokenKind::ListSeparator => "ListSeparator",
        TokenKind::Universal => "Universal",
    }
}

fn names(text: &str) -> Vec<&'static str> {
    tokenize(text)
        .unwrap_or_else(|e| panic!("{text}: {e}"))
        .iter()
        .map(|t| kind_name(&t.kind))
        .collect()
}

const SHAPES: &[(&str, &[&str])] = &[
    ("*", &["Universal"]),
    (":animated", &["PseudoSimple"]),
    (r#"[name|="value"]"#, &["AttributePrefix"]),
    (r#"[name*="value"]"#, &["AttributeContains"]),
    (r#"[name~="value"]"#, &["AttributeContainsWord"]),
    (r#"[name$="value"]"#, &["AttributeEndsWith"]),
    (r#"[name="value"]"#, &["AttributeEquals"]),
    (r#"[name!="value"]"#, &["AttributeNotEquals"]),
    (r#"[name^="value"]"#, &["AttributeStartsWith"]),
    (":checked", &["PseudoSimple"]),
    ("parent > child", &["Tag", "Child", "Tag"]),
    (".class", &["Class"]),
    (r#":contains("text")"#, &["PseudoFunctionQuotedArg"]),
    ("ancestor descendant", &["Tag", "Descendant", "Tag"]),
    ("element", &["Tag"]),
    (":nth-last-child(3n+1)", &["PseudoFunctionEquation"]),
    (":eq(1)", &["PseudoFunctionEquation"]),
    (":first-of-type", &["PseudoSimple"]),
    (":gt(1)", &["PseudoFunctionEquation"]),
    ("[name]", &["AttributePresence"]),
    ("#id", &["Id"]),
    (":lang(en-us)", &["PseudoFunctionArg"]),
    (
        r#"[name="value"][name2="value2"]"#,
        &["AttributeEquals", "AttributeEquals"],
    ),
    (
        "selector1, selector2, selectorN",
        &["Tag", "ListSeparator", "Tag", "ListSeparator", "Tag"],
    ),
    ("prev + next", &["Tag", "NextAdjacent", "Tag"]),
    ("prev ~ siblings", &["Tag", "NextSibling", "Tag"]),
    (":nth-child(4n)", &["PseudoFunctionEquation"]),
    (":nth-last-of-type(2)", &["PseudoFunctionEquation"]),
    (":only-child", &["PseudoSimple"]),
    ("::before", &["PseudoElement"]),
    ("::after", &["PseudoElement"]),
];

// ============================================================================
// TOKENIZER SHAPES
// ============================================================================

#[test]
fn test_selector_shapes() {
    for (text, expected) in SHAPES {
        assert_eq!(&names(text), expected, "shape of {text:?}");
    }
}

#[test]
fn test_round_trip_reconstructs_source() {
    let extra = [
        "  body>div.test1>span.redText",
        "ul > li:nth-last-child(-n+4).item",
        "h1 ,  h2",
        "a[href^=\"https\"] + span ~ em",
    ];
    for text in SHAPES.iter().map(|(t, _)| *t).chain(extra) {
        let out = tokenize_with_elided(text).unwrap();
        assert_eq!(out.source_text(), text);
    }
}

#[test]
fn test_no_leading_descendant() {
    assert_eq!(names("   div"), vec!["Tag"]);
    assert_eq!(names(", x"), vec!["ListSeparator", "Tag"]);
    assert_eq!(names("a,\tb"), vec!["Tag", "ListSeparator", "Tag"]);
}

#[test]
fn test_whitespace_before_comma_is_descendant() {
    assert_eq!(names("a ,b"), vec!["Tag", "Descendant", "ListSeparator", "Tag"]);
}

#[test]
fn test_compound_tokens_kept_in_order() {
    let tokens = tokenize("div#main.a.b[role=\"list\"]").unwrap();
    let kinds: Vec<_> = tokens.iter().map(|t| kind_name(&t.kind)).collect();
    assert_eq!(kinds, vec!["Tag", "Id", "Class", "Class", "AttributeEquals"]);
    assert_eq!(tokens[1].kind, TokenKind::Id("main".into()));
}

// ============================================================================
// PARSE ERRORS
// ============================================================================

#[test]
fn test_unsupported_syntax_fails() {
    for text in ["div > @x", "a[b='c']", "my-element", "div:not(p)x{"] {
        assert!(
            matches!(tokenize(text), Err(SelectorError::Parse { .. })),
            "{text} should not parse"
        );
    }
}

#[test]
fn test_escaped_quote_fails() {
    let err = tokenize(r#"a[title="x\"y"]"#).unwrap_err();
    let SelectorError::Parse { remaining } = err;
    assert!(remaining.starts_with('['));
}

// ============================================================================
// GROUPING
// ============================================================================

#[test]
fn test_group_alternates() {
    let seq = parse_selector("main article > p.lead + p").unwrap();
    let shape: Vec<_> = seq
        .iter()
        .map(|item| match item {
            Item::Compound(g) => g.source().to_string(),
            Item::Combinator(t) => kind_name(&t.kind).to_string(),
        })
        .collect();
    assert_eq!(
        shape,
        vec!["main", "Descendant", "article", "Child", "p.lead", "NextAdjacent", "p"]
    );
}

#[test]
fn test_group_list_separator() {
    let seq = group(tokenize("h1, h2.x").unwrap());
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.prefix(1), "h1,");
    assert_eq!(seq.source(), "h1,h2.x");
}

#[test]
fn test_group_of_empty_input() {
    assert!(parse_selector("").unwrap().is_empty());
}
