//! Comprehensive tests for cssgen-html
//!
//! Parsed documents must be queryable and serialize back faithfully.

use cssgen_dom::{ElementTree, HtmlSerializer};
use cssgen_html::HtmlParser;

#[test]
fn test_parse_empty_input() {
    let doc = HtmlParser::new().parse("").unwrap();
    assert!(doc.body().is_valid(), "html5ever always supplies a body");
}

#[test]
fn test_attributes_preserved() {
    let html = r#"<div id="main" class="a b" data-x="1"><p lang="en">Hi</p></div>"#;
    let doc = HtmlParser::new().parse(html).unwrap();
    let main = doc.get_element_by_id("main").unwrap();
    let elem = doc.tree().element(main).unwrap();
    assert!(elem.has_class("b"));
    assert_eq!(elem.get_attr("data-x"), Some("1"));
    assert_eq!(doc.query("p[lang=\"en\"]").unwrap().len(), 1);
}

#[test]
fn test_doctype_round_trip() {
    let html = "<!DOCTYPE html><html><head></head><body><p>x</p></body></html>";
    let doc = HtmlParser::new().parse(html).unwrap();
    assert_eq!(HtmlSerializer::new().serialize_document(&doc), html);
}

#[test]
fn test_nested_structure_queries() {
    let html = r#"
        <html>
            <body>
                <div class="test1">
                    <span class="redText">one</span>
                </div>
                <ul>
                    <li>1</li>
                    <li>2</li>
                    <li>3</li>
                </ul>
            </body>
        </html>
    "#;
    let doc = HtmlParser::new().parse(html).unwrap();
    assert_eq!(doc.query("body>div.test1>span.redText").unwrap().len(), 1);
    assert_eq!(doc.query("ul>li:nth-last-child(-n+2)").unwrap().len(), 2);
}

#[test]
fn test_comments_kept() {
    let doc = HtmlParser::new().parse("<body><!-- note --><p>a</p></body>").unwrap();
    let out = HtmlSerializer::new().serialize_inner(doc.tree(), doc.body());
    assert_eq!(out, "<!-- note --><p>a</p>");
}
