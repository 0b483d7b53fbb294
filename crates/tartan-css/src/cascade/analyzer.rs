//! Document-wide style evaluation.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)

use std::collections::BTreeMap;
use std::sync::Arc;

use super::index::RuleIndex;
use super::order::{CascadePriority, MatchedDeclaration, SourceOrder, sort_declarations};
use crate::config::StyleConfig;
use crate::error::ConfigError;
use crate::media::MediaSpec;
use crate::selector::PseudoElementType;
use crate::style::{ElementStyle, NodeData, StyleMap};
use crate::stylesheet::{Declaration, StyleSheet, parse_inline_style};
use crate::tree::DocumentTree;

type InlineSource<'f, N> = &'f dyn Fn(N) -> Vec<Declaration>;

/// Evaluates style sheets against documents.
///
/// Holds only shared references, so one analyzer can style several documents
/// or media profiles, also from several threads.
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    config: &'a StyleConfig,
    sheets: &'a [StyleSheet],
}

impl<'a> Analyzer<'a> {
    /// An analyzer over `sheets`, in cascade order of appearance.
    #[must_use]
    pub const fn new(config: &'a StyleConfig, sheets: &'a [StyleSheet]) -> Self {
        Self { config, sheets }
    }

    /// Index the style rules that apply under `media`. Rules inside a
    /// non-matching `@media` block are left out; other at-rules never
    /// contribute.
    #[must_use]
    pub fn index(&self, media: &MediaSpec) -> RuleIndex<'a> {
        let mut index = RuleIndex::new();
        for (sheet_index, sheet) in self.sheets.iter().enumerate() {
            for numbered in sheet.applicable_rules(media) {
                index.add_rule(numbered.rule, sheet.origin, sheet_index, numbered.index);
            }
        }
        index
    }

    /// Style every element of `tree`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingDocumentElement`] when the tree has no root
    /// element; nothing is evaluated in that case.
    pub fn evaluate<T: DocumentTree>(
        &self,
        tree: &T,
        media: &MediaSpec,
    ) -> Result<StyleMap<T::Node>, ConfigError> {
        self.evaluate_with_inline(tree, media, |_| Vec::new())
    }

    /// Style every element, adding `inline(node)` as that element's `style`
    /// attribute declarations.
    ///
    /// # Errors
    ///
    /// As [`Analyzer::evaluate`].
    pub fn evaluate_with_inline<T: DocumentTree>(
        &self,
        tree: &T,
        media: &MediaSpec,
        inline: impl Fn(T::Node) -> Vec<Declaration>,
    ) -> Result<StyleMap<T::Node>, ConfigError> {
        let root = tree
            .document_element()
            .ok_or(ConfigError::MissingDocumentElement)?;
        let index = self.index(media);
        let mut styles = StyleMap::new();
        self.walk(tree, root, &index, &inline, &mut styles);
        Ok(styles)
    }

    /// The style of one element, evaluating only its ancestor chain.
    /// `Ok(None)` when `node` is not an element or the pseudo-element received
    /// no declarations.
    ///
    /// # Errors
    ///
    /// As [`Analyzer::evaluate`].
    pub fn element_style<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        media: &MediaSpec,
        pseudo: Option<PseudoElementType>,
    ) -> Result<Option<NodeData>, ConfigError> {
        self.element_style_with_inline(tree, node, media, pseudo, |_| Vec::new())
    }

    /// [`Analyzer::element_style`] with inline declarations.
    ///
    /// # Errors
    ///
    /// As [`Analyzer::evaluate`].
    pub fn element_style_with_inline<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        media: &MediaSpec,
        pseudo: Option<PseudoElementType>,
        inline: impl Fn(T::Node) -> Vec<Declaration>,
    ) -> Result<Option<NodeData>, ConfigError> {
        if tree.document_element().is_none() {
            return Err(ConfigError::MissingDocumentElement);
        }
        if !tree.is_element(node) {
            return Ok(None);
        }
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = tree.parent_element(current) {
            chain.push(parent);
            current = parent;
        }

        let index = self.index(media);
        let mut style: Option<ElementStyle> = None;
        for &element in chain.iter().rev() {
            let parent = style.as_ref().map(|s| &s.base);
            style = Some(self.style_element(tree, element, parent, &index, &inline));
        }
        Ok(style.and_then(|s| s.get(pseudo).cloned()))
    }

    /// Pre-order walk: an element is styled before its children, which
    /// inherit from it. Uses an explicit stack so deep documents cannot
    /// exhaust the call stack.
    fn walk<T: DocumentTree>(
        &self,
        tree: &T,
        root: T::Node,
        index: &RuleIndex<'a>,
        inline: InlineSource<'_, T::Node>,
        styles: &mut StyleMap<T::Node>,
    ) {
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            let parent = tree
                .parent_element(node)
                .and_then(|parent| styles.get(parent))
                .map(|style| &style.base);
            let style = self.style_element(tree, node, parent, index, inline);
            styles.insert(node, style);
            let first = pending.len();
            pending.extend(tree.element_children(node));
            pending[first..].reverse();
        }
    }

    fn style_element<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        parent: Option<&NodeData>,
        index: &RuleIndex<'a>,
        inline: InlineSource<'_, T::Node>,
    ) -> ElementStyle {
        let inline_declarations = inline(node);
        let mut all: Vec<MatchedDeclaration<'_>> = self.matched_declarations(tree, node, index);
        all.extend(inline_matches(&inline_declarations));

        let mut groups: BTreeMap<Option<PseudoElementType>, Vec<MatchedDeclaration<'_>>> =
            BTreeMap::new();
        for matched in all {
            groups.entry(matched.pseudo_element).or_default().push(matched);
        }

        let parent = parent.filter(|_| self.config.inherit());
        let own = groups.remove(&None).unwrap_or_default();
        let mut style = ElementStyle::new(self.fold(own, parent));
        // Pseudo-elements always inherit from their originating element, even
        // with inheritance between elements turned off.
        for (pseudo, matched) in groups {
            if let Some(kind) = pseudo {
                let data = self.fold(matched, Some(&style.base));
                let _ = style.pseudo.insert(kind, data);
            }
        }
        style
    }

    /// Every declaration of every rule whose selector matches `node`.
    fn matched_declarations<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        index: &RuleIndex<'a>,
    ) -> Vec<MatchedDeclaration<'a>> {
        let Some(element) = tree.element(node) else {
            return Vec::new();
        };
        let matcher = self.config.element_matcher();
        let condition = self.config.match_condition();
        let mut matched = Vec::new();
        for candidate in index.candidates(element, matcher) {
            if !candidate.selector.matches(tree, node, matcher, condition) {
                continue;
            }
            #[cfg(feature = "cascade-trace")]
            eprintln!(
                "[cascade] {node:?} <{}> matched '{}' {}",
                element.local_name(),
                candidate.selector,
                candidate.selector.specificity()
            );
            let pseudo = candidate.selector.pseudo_element();
            for (position, declaration) in candidate.rule.declarations.iter().enumerate() {
                let priority = CascadePriority::new(
                    candidate.origin,
                    declaration.important,
                    candidate.selector.compute_specificity(false),
                    SourceOrder::new(
                        candidate.sheet,
                        candidate.rule_index,
                        candidate.selector_index,
                        position,
                    ),
                );
                matched.push(MatchedDeclaration::new(declaration, priority, pseudo));
            }
        }
        matched
    }

    fn fold(
        &self,
        mut matched: Vec<MatchedDeclaration<'_>>,
        parent: Option<&NodeData>,
    ) -> NodeData {
        sort_declarations(&mut matched);
        let mut data = NodeData::new(Arc::clone(self.config.catalog()));
        for declaration in &matched {
            data.push(declaration);
        }
        if let Some(parent) = parent {
            data.inherit_from(parent);
        }
        data.concretize();
        data
    }
}

fn inline_matches(declarations: &[Declaration]) -> impl Iterator<Item = MatchedDeclaration<'_>> {
    declarations.iter().enumerate().map(|(position, declaration)| {
        MatchedDeclaration::new(
            declaration,
            CascadePriority::inline(declaration.important, position),
            None,
        )
    })
}

/// An inline source that reads each element's `style` attribute.
pub fn style_attributes<T: DocumentTree>(tree: &T) -> impl Fn(T::Node) -> Vec<Declaration> + '_ {
    move |node| {
        tree.element(node)
            .and_then(|element| element.attribute("style"))
            .map(parse_inline_style)
            .unwrap_or_default()
    }
}
