//! The result of evaluating a document.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::NodeData;
use crate::selector::PseudoElementType;

/// The style of one element and of its pseudo-elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStyle {
    /// The element's own style.
    pub base: NodeData,
    /// Styles of pseudo-elements that received declarations.
    pub pseudo: BTreeMap<PseudoElementType, NodeData>,
}

impl ElementStyle {
    /// A style with no pseudo-element data.
    #[must_use]
    pub const fn new(base: NodeData) -> Self {
        Self {
            base,
            pseudo: BTreeMap::new(),
        }
    }

    /// The element's style for `None`, or a pseudo-element's style.
    #[must_use]
    pub fn get(&self, pseudo: Option<PseudoElementType>) -> Option<&NodeData> {
        match pseudo {
            None => Some(&self.base),
            Some(kind) => self.pseudo.get(&kind),
        }
    }
}

/// Element handle → [`ElementStyle`], built in one traversal.
#[derive(Debug, Clone)]
pub struct StyleMap<N> {
    styles: HashMap<N, ElementStyle>,
    order: Vec<N>,
}

impl<N> Default for StyleMap<N> {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<N: Copy + Eq + Hash> StyleMap<N> {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `node`'s style. Nodes are inserted in document order.
    pub(crate) fn insert(&mut self, node: N, style: ElementStyle) {
        if self.styles.insert(node, style).is_none() {
            self.order.push(node);
        }
    }

    /// The full style record of `node`.
    #[must_use]
    pub fn get(&self, node: N) -> Option<&ElementStyle> {
        self.styles.get(&node)
    }

    /// The style of `node`, or of one of its pseudo-elements.
    #[must_use]
    pub fn node_data(&self, node: N, pseudo: Option<PseudoElementType>) -> Option<&NodeData> {
        self.get(node)?.get(pseudo)
    }

    /// Whether `node` was styled.
    #[must_use]
    pub fn contains(&self, node: N) -> bool {
        self.styles.contains_key(&node)
    }

    /// Number of styled elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether no element was styled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Styled elements in document order.
    pub fn iter(&self) -> impl Iterator<Item = (N, &ElementStyle)> {
        self.order
            .iter()
            .filter_map(|node| self.styles.get(node).map(|style| (*node, style)))
    }
}
