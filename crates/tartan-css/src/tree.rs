//! The document contract the cascade runs against.
//!
//! The engine never owns a document. It walks any host tree through
//! [`DocumentTree`] and reads elements through [`ElementView`], so a parser's
//! own node type can be styled without conversion. [`tartan_dom::DomTree`]
//! implements both.

use std::fmt::Debug;
use std::hash::Hash;

use tartan_dom::{DomTree, ElementData, NodeId};

/// Read access to one element.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
pub trait ElementView {
    /// "An element's local name", exactly as stored by the host.
    fn local_name(&self) -> &str;

    /// Attribute value by exact name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// All `(name, value)` attribute pairs, in no particular order.
    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_>;
}

/// Ordered traversal over a host document.
///
/// Only the relationships selector matching needs are required: parent,
/// ordered children, and previous/next sibling. Element-only helpers are
/// provided on top of them.
pub trait DocumentTree {
    /// Node handle. Used as the key of the resulting style map.
    type Node: Copy + Eq + Hash + Debug;

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    fn document_element(&self) -> Option<Self::Node>;

    /// The parent of `node`, which may be a non-element (the document).
    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;

    /// The children of `node` in document order, including non-elements.
    fn child_nodes(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_;

    /// The sibling immediately before `node`.
    fn previous_sibling_node(&self, node: Self::Node) -> Option<Self::Node>;

    /// The sibling immediately after `node`.
    fn next_sibling_node(&self, node: Self::Node) -> Option<Self::Node>;

    /// The element behind `node`, or `None` for text, comments and the document.
    fn element(&self, node: Self::Node) -> Option<&dyn ElementView>;

    /// The character data of a text node.
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Whether `node` is an element.
    fn is_element(&self, node: Self::Node) -> bool {
        self.element(node).is_some()
    }

    /// The parent of `node` if that parent is an element.
    fn parent_element(&self, node: Self::Node) -> Option<Self::Node> {
        self.parent_node(node).filter(|&parent| self.is_element(parent))
    }

    /// Element children of `node` in document order.
    fn element_children(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_ {
        self.child_nodes(node).filter(move |&child| self.is_element(child))
    }

    /// Nearest preceding sibling that is an element.
    fn previous_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.previous_sibling_node(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling_node(sibling);
        }
        None
    }

    /// Nearest following sibling that is an element.
    fn next_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.next_sibling_node(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling_node(sibling);
        }
        None
    }
}

impl ElementView for ElementData {
    fn local_name(&self) -> &str {
        &self.tag_name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attr(name)
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(
            self.attrs
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}

impl DocumentTree for DomTree {
    type Node = NodeId;

    fn document_element(&self) -> Option<NodeId> {
        Self::document_element(self)
    }

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn child_nodes(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node).iter().copied()
    }

    fn previous_sibling_node(&self, node: NodeId) -> Option<NodeId> {
        self.prev_sibling(node)
    }

    fn next_sibling_node(&self, node: NodeId) -> Option<NodeId> {
        self.next_sibling(node)
    }

    fn element(&self, node: NodeId) -> Option<&dyn ElementView> {
        self.as_element(node).map(|data| data as &dyn ElementView)
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        self.as_text(node)
    }
}
