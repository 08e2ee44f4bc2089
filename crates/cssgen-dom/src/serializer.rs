//! HTML Serialization
//!
//! Writes a document or subtree back out as HTML text.

use crate::{Document, DomTree, NodeData, NodeId};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Raw text elements (content is not escaped)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// HTML serializer
#[derive(Debug, Clone)]
pub struct HtmlSerializer {
    /// Put each element on its own indented line
    pub pretty_print: bool,
    pub indent: String,
}

impl Default for HtmlSerializer {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent: "  ".to_string(),
        }
    }
}

impl HtmlSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    /// Serialize a whole document
    pub fn serialize_document(&self, doc: &Document) -> String {
        let mut output = String::new();
        self.serialize_children(&doc.tree, doc.tree.root(), &mut output, 0);
        if self.pretty_print {
            output.push('\n');
        }
        output
    }

    /// Children of a node only
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_children(tree, node_id, &mut output, 0);
        output
    }

    /// The node itself and its subtree
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output, 0);
        output
    }

    fn newline(&self, output: &mut String, depth: usize) {
        if !self.pretty_print || output.is_empty() {
            return;
        }
        output.push('\n');
        for _ in 0..depth {
            output.push_str(&self.indent);
        }
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String, depth: usize) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => self.serialize_children(tree, node_id, output, depth),
            NodeData::Element(elem) => {
                let tag = elem.tag.as_str();
                self.newline(output, depth);

                output.push('<');
                output.push_str(tag);
                for attr in elem.attrs.iter() {
                    output.push(' ');
                    output.push_str(&attr.name);
                    output.push_str("=\"");
                    escape_attribute(&attr.value, output);
                    output.push('"');
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }

                if RAW_TEXT_ELEMENTS.contains(&tag) {
                    for (_, child) in tree.children(node_id) {
                        if let Some(text) = child.as_text() {
                            output.push_str(text);
                        }
                    }
                } else {
                    self.serialize_children(tree, node_id, output, depth + 1);
                    let has_element_child = tree.element_children(node_id).next().is_some();
                    if has_element_child {
                        self.newline(output, depth);
                    }
                }

                output.push_str("</");
                output.push_str(tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(text, output),
            NodeData::Comment(text) => {
                self.newline(output, depth);
                output.push_str("<!--");
                output.push_str(text);
                output.push_str("-->");
            }
            NodeData::Doctype { name } => {
                output.push_str("<!DOCTYPE ");
                output.push_str(name);
                output.push('>');
            }
        }
    }

    fn serialize_children(&self, tree: &DomTree, parent_id: NodeId, output: &mut String, depth: usize) {
        for (child_id, _) in tree.children(parent_id) {
            self.serialize_node(tree, child_id, output, depth);
        }
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        let mut output = String::new();
        escape_text("Hello <world> & \"friends\"", &mut output);
        assert_eq!(output, "Hello &lt;world&gt; &amp; \"friends\"");
    }

    #[test]
    fn test_escape_attribute() {
        let mut output = String::new();
        escape_attribute("a < b & \"c\"", &mut output);
        assert_eq!(output, "a < b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_serialize_skeleton() {
        let doc = Document::new();
        assert_eq!(
            HtmlSerializer::new().serialize_document(&doc),
            "<html><head></head><body></body></html>"
        );
    }

    #[test]
    fn test_void_and_attributes() {
        let mut doc = Document::new();
        let img = doc.tree.create_element("img");
        doc.tree.element_mut(img).unwrap().set_attr("alt", "x\"y");
        doc.tree.append_child(doc.body(), img);
        assert_eq!(
            HtmlSerializer::new().serialize_outer(&doc.tree, doc.body()),
            "<body><img alt=\"x&quot;y\"></body>"
        );
    }

    #[test]
    fn test_pretty_print() {
        let mut doc = Document::new();
        let p = doc.tree.create_element("p");
        doc.tree.set_text_content(p, "hi");
        doc.tree.append_child(doc.body(), p);
        let out = HtmlSerializer::pretty().serialize_document(&doc);
        assert_eq!(
            out,
            "<html>\n  <head></head>\n  <body>\n    <p>hi</p>\n  </body>\n</html>\n"
        );
    }
}
