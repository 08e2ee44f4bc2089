//! Tree operations used by the materializer
//!
//! `ElementTree` is the narrow surface the synthesis core needs from a
//! document: query, create, decorate, copy and attach elements, plus the
//! bookkeeping that ties late-arriving content back to its nodes.

use std::fmt::Debug;

use crate::{Document, NodeId};

/// Selector query failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// Syntax the query engine does not evaluate, or an incomplete selector
    #[error("Unsupported selector: {0}")]
    Unsupported(String),
}

/// Marker linking nodes to a content fetch that has not completed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(pub u64);

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element tree operations
pub trait ElementTree {
    type Node: Copy + Eq + Debug;

    /// Connected elements matching `selector`, in document order
    fn query(&self, selector: &str) -> Result<Vec<Self::Node>, QueryError>;

    /// New detached element
    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn set_id(&mut self, node: Self::Node, id: &str);

    fn add_class(&mut self, node: Self::Node, class: &str);

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn set_text_content(&mut self, node: Self::Node, text: &str);

    fn clear_text_content(&mut self, node: Self::Node);

    /// Detached copy of `node` and its subtree, bookkeeping included
    fn clone_deep(&mut self, node: Self::Node) -> Self::Node;

    /// Append `children` to `parent`, in order
    fn append_children(&mut self, parent: Self::Node, children: &[Self::Node]);

    fn tag_with_repeat_index(&mut self, node: Self::Node, index: u32);

    fn tag_with_correlation_id(&mut self, node: Self::Node, id: CorrelationId);

    /// Connected elements carrying `id`, in document order
    fn find_by_correlation_id(&self, id: CorrelationId) -> Vec<Self::Node>;
}

impl ElementTree for Document {
    type Node = NodeId;

    fn query(&self, selector: &str) -> Result<Vec<NodeId>, QueryError> {
        let found = self.tree.query_selector_all(selector)?;
        tracing::trace!("query {:?} matched {} element(s)", selector, found.len());
        Ok(found)
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(elem) = self.tree.element_mut(node) {
            elem.set_attr("id", id);
        }
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(elem) = self.tree.element_mut(node) {
            elem.add_class(class);
        }
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(elem) = self.tree.element_mut(node) {
            elem.set_attr(name, value);
        }
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        self.tree.set_text_content(node, text);
    }

    fn clear_text_content(&mut self, node: NodeId) {
        self.tree.remove_children(node);
    }

    fn clone_deep(&mut self, node: NodeId) -> NodeId {
        self.tree.clone_deep(node)
    }

    fn append_children(&mut self, parent: NodeId, children: &[NodeId]) {
        for &child in children {
            self.tree.append_child(parent, child);
        }
    }

    fn tag_with_repeat_index(&mut self, node: NodeId, index: u32) {
        if let Some(elem) = self.tree.element_mut(node) {
            elem.repeat_index = Some(index);
        }
    }

    fn tag_with_correlation_id(&mut self, node: NodeId, id: CorrelationId) {
        if let Some(elem) = self.tree.element_mut(node) {
            elem.correlation = Some(id);
        }
    }

    fn find_by_correlation_id(&self, id: CorrelationId) -> Vec<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .filter(|&node| self.tree.element(node).and_then(|e| e.correlation) == Some(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_survives_clone() {
        let mut doc = Document::new();
        let li = doc.create_element("li");
        doc.tag_with_correlation_id(li, CorrelationId(4));
        doc.tag_with_repeat_index(li, 1);

        let a = doc.clone_deep(li);
        let b = doc.clone_deep(li);
        let body = doc.body();
        doc.append_children(body, &[a, b]);

        assert_eq!(doc.find_by_correlation_id(CorrelationId(4)), vec![a, b]);
        assert!(doc.find_by_correlation_id(CorrelationId(5)).is_empty());
        assert_eq!(doc.tree.element(b).unwrap().repeat_index, Some(1));
    }

    #[test]
    fn test_detached_template_invisible() {
        let mut doc = Document::new();
        let li = doc.create_element("li");
        doc.tag_with_correlation_id(li, CorrelationId(1));
        assert!(doc.find_by_correlation_id(CorrelationId(1)).is_empty());
        assert!(doc.query("li").unwrap().is_empty());
    }

    #[test]
    fn test_decorate_element() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_id(div, "x");
        doc.add_class(div, "a");
        doc.add_class(div, "b");
        doc.set_attribute(div, "role", "list");
        let body = doc.body();
        doc.append_children(body, &[div]);

        assert_eq!(doc.query("div#x.a.b[role=\"list\"]").unwrap(), vec![div]);
    }

    #[test]
    fn test_clear_text_content() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_text_content(body, "hello");
        assert_eq!(doc.tree.text_content(body), "hello");
        doc.clear_text_content(body);
        assert_eq!(doc.tree.text_content(body), "");
    }
}
