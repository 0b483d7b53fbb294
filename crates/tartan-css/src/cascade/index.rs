//! Candidate lookup for rule selectors.
//!
//! Every selector is filed under one key taken from its subject: the ID if it
//! has one, else its first class, else its element name, else the universal
//! bucket. An element then only has to be matched against the selectors filed
//! under its own ID, classes and name, plus the universal ones.

use std::collections::HashMap;

use crate::selector::{CombinedSelector, ElementMatcher, SelectorPart};
use crate::stylesheet::{Origin, RuleSet};
use crate::tree::ElementView;

/// One selector of one applicable rule.
#[derive(Debug, Clone, Copy)]
pub struct IndexedSelector<'a> {
    /// The selector.
    pub selector: &'a CombinedSelector,
    /// Its rule.
    pub rule: &'a RuleSet,
    /// Origin of the rule's sheet.
    pub origin: Origin,
    /// Sheet position.
    pub sheet: usize,
    /// Rule number within the sheet.
    pub rule_index: usize,
    /// Selector position within the rule.
    pub selector_index: usize,
}

/// Selectors of all applicable rules, bucketed by subject key.
#[derive(Debug, Default)]
pub struct RuleIndex<'a> {
    entries: Vec<IndexedSelector<'a>>,
    by_id: HashMap<String, Vec<usize>>,
    by_class: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
    universal: Vec<usize>,
}

enum Key<'s> {
    Id(&'s str),
    Class(&'s str),
    Name(&'s str),
    Universal,
}

fn subject_key(selector: &CombinedSelector) -> Key<'_> {
    let parts = &selector.subject().parts;
    let id = parts.iter().find_map(|part| match part {
        SelectorPart::ElementId(id) => Some(Key::Id(id)),
        _ => None,
    });
    let class = || {
        parts.iter().find_map(|part| match part {
            SelectorPart::ElementClass(class) => Some(Key::Class(class)),
            _ => None,
        })
    };
    let name = || {
        parts.iter().find_map(|part| match part {
            SelectorPart::ElementName(name) if name != "*" => Some(Key::Name(name)),
            _ => None,
        })
    };
    id.or_else(class).or_else(name).unwrap_or(Key::Universal)
}

impl<'a> RuleIndex<'a> {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File every selector of `rule`.
    pub fn add_rule(&mut self, rule: &'a RuleSet, origin: Origin, sheet: usize, rule_index: usize) {
        for (selector_index, selector) in rule.selectors.iter().enumerate() {
            let position = self.entries.len();
            self.entries.push(IndexedSelector {
                selector,
                rule,
                origin,
                sheet,
                rule_index,
                selector_index,
            });
            // Keys are folded so that case-insensitive matchers still find
            // their candidates; matching itself decides.
            let bucket = match subject_key(selector) {
                Key::Id(id) => self.by_id.entry(id.to_ascii_lowercase()).or_default(),
                Key::Class(class) => self.by_class.entry(class.to_ascii_lowercase()).or_default(),
                Key::Name(name) => self.by_name.entry(name.to_ascii_lowercase()).or_default(),
                Key::Universal => &mut self.universal,
            };
            bucket.push(position);
        }
    }

    /// Number of indexed selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Selectors that might match `element`, in indexing order.
    #[must_use]
    pub fn candidates(
        &self,
        element: &dyn ElementView,
        matcher: &dyn ElementMatcher,
    ) -> Vec<&IndexedSelector<'a>> {
        let mut positions: Vec<usize> = self.universal.clone();
        if let Some(bucket) = matcher
            .element_id(element)
            .and_then(|id| self.by_id.get(&id.to_ascii_lowercase()))
        {
            positions.extend(bucket);
        }
        for class in matcher.element_classes(element) {
            if let Some(bucket) = self.by_class.get(&class.to_ascii_lowercase()) {
                positions.extend(bucket);
            }
        }
        if let Some(bucket) = self
            .by_name
            .get(&matcher.element_name(element).to_ascii_lowercase())
        {
            positions.extend(bucket);
        }
        positions.sort_unstable();
        positions.dedup();
        positions.iter().map(|&i| &self.entries[i]).collect()
    }
}
