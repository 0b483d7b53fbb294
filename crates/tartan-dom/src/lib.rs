//! Arena document tree for the Tartan cascade engine.
//!
//! This crate provides the reference host document: an arena-based tree
//! following the [DOM Living Standard](https://dom.spec.whatwg.org/) node
//! model, trimmed to what selector matching needs (element names, attributes,
//! text, and ordered parent/child/sibling links).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Node
//! identity is the index, which is what the cascade keys its style map on.
//!
//! Documents can also be described as JSON ([`NodeSpec`]) and loaded with
//! [`DomTree::from_spec`].

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Map of attribute names to values for an element.
pub type AttributesMap = HashMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    pub parent: Option<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    pub children: Vec<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,
    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// NOTE: Namespaces are not modelled. The tag name is stored as written; case
/// folding is left to the selector matcher, which knows whether the document
/// is HTML or XML.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data from a tag name and `(name, value)` attribute pairs.
    #[must_use]
    pub fn new(tag_name: &str, attrs: &[(&str, &str)]) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            attrs: attrs
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
        }
    }

    /// Look up an attribute by its exact name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns the element's id attribute value if present.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The id attribute specifies its element's unique identifier (ID)."
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Returns the set of class names from the class attribute.
    ///
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.attr("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// JSON description of a document subtree.
///
/// ```json
/// { "tag": "p", "attrs": { "id": "y", "class": "x" },
///   "children": [ { "text": "Hello" }, { "comment": "note" } ] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    /// An element with attributes and children.
    Element {
        /// Tag name.
        tag: String,
        /// Attributes by name.
        #[serde(default)]
        attrs: HashMap<String, String>,
        /// Child nodes in document order.
        #[serde(default)]
        children: Vec<NodeSpec>,
    },
    /// A text node.
    Text {
        /// Text content.
        text: String,
    },
    /// A comment node.
    Comment {
        /// Comment content.
        comment: String,
    },
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// All nodes live in a contiguous vector, using indices for all relationships.
/// The Document node is always at index 0 ([`NodeId::ROOT`]).
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
        }
    }

    /// Build a tree whose document element is described by `spec`.
    #[must_use]
    pub fn from_spec(spec: &NodeSpec) -> Self {
        let mut tree = Self::new();
        let _ = tree.append_spec(NodeId::ROOT, spec);
        tree
    }

    /// Append the subtree described by `spec` under `parent`, returning its id.
    pub fn append_spec(&mut self, parent: NodeId, spec: &NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Element {
                tag,
                attrs,
                children,
            } => {
                let id = self.alloc(NodeType::Element(ElementData {
                    tag_name: tag.clone(),
                    attrs: attrs.clone(),
                }));
                self.append_child(parent, id);
                for child in children {
                    let _ = self.append_spec(id, child);
                }
                id
            }
            NodeSpec::Text { text } => self.append_text(parent, text),
            NodeSpec::Comment { comment } => {
                let id = self.alloc(NodeType::Comment(comment.clone()));
                self.append_child(parent, id);
                id
            }
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get the number of nodes in the tree (including the Document).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (it always holds at least the Document).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// Appends `child` as the last child of `parent`, updating all relationships.
    ///
    /// # Panics
    ///
    /// Panics if either id was not allocated by this tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Allocate an element with the given attributes and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.alloc(NodeType::Element(ElementData::new(tag, attrs)));
        self.append_child(parent, id);
        id
    }

    /// Allocate a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.alloc(NodeType::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the element children of a node, in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.as_element(child).is_some())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub const fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: Some(id),
            started: false,
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// Short CSS-like label for an element, e.g. `p#intro.note.wide`.
    #[must_use]
    pub fn label(&self, id: NodeId) -> String {
        let Some(element) = self.as_element(id) else {
            return match self.get(id).map(|n| &n.node_type) {
                Some(NodeType::Document) => "#document".to_string(),
                Some(NodeType::Text(_)) => "#text".to_string(),
                Some(NodeType::Comment(_)) => "#comment".to_string(),
                _ => String::new(),
            };
        };
        let mut label = element.tag_name.clone();
        if let Some(id_attr) = element.id() {
            let _ = write!(label, "#{id_attr}");
        }
        let mut classes: Vec<&str> = element.classes().into_iter().collect();
        classes.sort_unstable();
        for class in classes {
            let _ = write!(label, ".{class}");
        }
        label
    }

    /// Path of element labels from the document element down to `id`,
    /// joined with ` > `.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        let mut chain: Vec<NodeId> = self
            .ancestors(id)
            .filter(|&a| a != id && self.as_element(a).is_some())
            .collect();
        chain.reverse();
        chain.push(id);
        chain
            .iter()
            .map(|&n| self.label(n))
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the strict ancestors of a node (parent first).
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
    started: bool,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            self.current = self.current.and_then(|id| self.tree.parent(id));
        }
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
