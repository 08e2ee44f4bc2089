//! cssgen DOM - Document Object Model
//!
//! Arena-based DOM tree, a selector query engine over it, and the
//! `ElementTree` trait through which the materializer drives any tree.

mod attributes;
mod classlist;
mod document;
mod node;
mod operations;
mod query;
pub mod serializer;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::ClassList;
pub use document::Document;
pub use node::{ElementData, Node, NodeData};
pub use operations::{CorrelationId, ElementTree, QueryError};
pub use query::SelectorList;
pub use serializer::HtmlSerializer;
pub use tree::{ChildIterator, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Document root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
