//! Pluggable element access and dynamic state for selector matching.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use super::{AttributeSelector, PseudoClassType, SelectorPart};
use crate::tree::ElementView;

/// How selector names, classes, IDs and attributes are read from an element
/// and compared.
///
/// [§ 3 Case sensitivity](https://www.w3.org/TR/selectors-3/#casesens)
/// "All Selectors syntax is case-insensitive within the ASCII range [...]
/// The case sensitivity of document language element names, attribute names,
/// and attribute values in selectors depends on the document language."
pub trait ElementMatcher: Send + Sync + Debug {
    /// Look up an attribute value by name.
    fn attribute<'a>(&self, element: &'a dyn ElementView, name: &str) -> Option<&'a str>;

    /// The element's class names.
    fn element_classes<'a>(&self, element: &'a dyn ElementView) -> Vec<&'a str> {
        self.attribute(element, "class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the element carries `class`.
    fn matches_class(&self, element: &dyn ElementView, class: &str) -> bool;

    /// The element's ID.
    fn element_id<'a>(&self, element: &'a dyn ElementView) -> Option<&'a str> {
        self.attribute(element, "id")
    }

    /// Whether the element's ID is `id`.
    fn matches_id(&self, element: &dyn ElementView, id: &str) -> bool;

    /// The element's name as the matcher sees it.
    fn element_name<'a>(&self, element: &'a dyn ElementView) -> &'a str {
        element.local_name()
    }

    /// Whether the element's name is `name`.
    fn matches_name(&self, element: &dyn ElementView, name: &str) -> bool;

    /// Whether the element satisfies an attribute selector.
    fn matches_attribute(&self, element: &dyn ElementView, selector: &AttributeSelector) -> bool {
        self.attribute(element, &selector.name)
            .is_some_and(|value| selector.matches_value(value))
    }
}

/// The standard matcher for HTML, quirks-mode HTML and XML documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardElementMatcher {
    names_case_sensitive: bool,
    identifiers_case_sensitive: bool,
}

impl StandardElementMatcher {
    /// HTML: element and attribute names are case-insensitive, classes and
    /// IDs are case-sensitive.
    #[must_use]
    pub const fn html() -> Self {
        Self {
            names_case_sensitive: false,
            identifiers_case_sensitive: true,
        }
    }

    /// [Quirks mode](https://quirks.spec.whatwg.org/#the-class-and-id-selectors-quirk):
    /// class and ID selectors also "match in an ASCII case-insensitive manner".
    #[must_use]
    pub const fn quirks() -> Self {
        Self {
            names_case_sensitive: false,
            identifiers_case_sensitive: false,
        }
    }

    /// XML: everything is case-sensitive.
    #[must_use]
    pub const fn xml() -> Self {
        Self {
            names_case_sensitive: true,
            identifiers_case_sensitive: true,
        }
    }

    fn same_name(&self, a: &str, b: &str) -> bool {
        if self.names_case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }

    fn same_identifier(&self, a: &str, b: &str) -> bool {
        if self.identifiers_case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}

impl Default for StandardElementMatcher {
    fn default() -> Self {
        Self::html()
    }
}

impl ElementMatcher for StandardElementMatcher {
    fn attribute<'a>(&self, element: &'a dyn ElementView, name: &str) -> Option<&'a str> {
        if let Some(value) = element.attribute(name) {
            return Some(value);
        }
        if self.names_case_sensitive {
            return None;
        }
        element
            .attributes()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    fn matches_class(&self, element: &dyn ElementView, class: &str) -> bool {
        self.element_classes(element)
            .iter()
            .any(|candidate| self.same_identifier(candidate, class))
    }

    fn matches_id(&self, element: &dyn ElementView, id: &str) -> bool {
        self.element_id(element)
            .is_some_and(|candidate| self.same_identifier(candidate, id))
    }

    fn matches_name(&self, element: &dyn ElementView, name: &str) -> bool {
        self.same_name(element.local_name(), name)
    }
}

/// Host-supplied answers for selector parts, typically dynamic pseudo-classes.
///
/// Consulted before the built-in rules for every part: `Some(true)` forces a
/// match, `Some(false)` vetoes it, `None` defers.
pub trait MatchCondition: Send + Sync + Debug {
    /// Decide `part` for `element`, or defer.
    fn is_satisfied(&self, element: &dyn ElementView, part: &SelectorPart) -> Option<bool>;
}

/// [§ 6.6.1.1 The link pseudo-classes](https://www.w3.org/TR/selectors-3/#link)
///
/// Treats every hyperlink as unvisited: `:link` matches `a`, `area` and `link`
/// elements with an `href` attribute. Everything else is deferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMatchCondition;

const LINK_ELEMENTS: &[&str] = &["a", "area", "link"];

fn is_link(element: &dyn ElementView) -> bool {
    LINK_ELEMENTS
        .iter()
        .any(|name| element.local_name().eq_ignore_ascii_case(name))
        && element.attribute("href").is_some()
}

impl MatchCondition for DefaultMatchCondition {
    fn is_satisfied(&self, element: &dyn ElementView, part: &SelectorPart) -> Option<bool> {
        match part {
            SelectorPart::PseudoClass(pseudo) if pseudo.kind == PseudoClassType::Link => {
                Some(is_link(element))
            }
            _ => None,
        }
    }
}

/// Declares pseudo-class states for particular elements, by ID or by element
/// name, e.g. "`#menu` is hovered" or "every `input` is focused".
///
/// Undeclared parts fall back to [`DefaultMatchCondition`].
#[derive(Debug, Clone, Default)]
pub struct ElementStateCondition {
    by_id: HashMap<String, HashSet<PseudoClassType>>,
    by_name: HashMap<String, HashSet<PseudoClassType>>,
}

impl ElementStateCondition {
    /// No declared states.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `state` for the element whose ID is `id`.
    #[must_use]
    pub fn with_id(mut self, id: &str, state: PseudoClassType) -> Self {
        let _ = self.by_id.entry(id.to_string()).or_default().insert(state);
        self
    }

    /// Declare `state` for every element named `name` (ASCII case-insensitive).
    #[must_use]
    pub fn with_name(mut self, name: &str, state: PseudoClassType) -> Self {
        let _ = self
            .by_name
            .entry(name.to_ascii_lowercase())
            .or_default()
            .insert(state);
        self
    }

    fn declares(&self, element: &dyn ElementView, state: PseudoClassType) -> bool {
        let by_id = element
            .attribute("id")
            .and_then(|id| self.by_id.get(id))
            .is_some_and(|states| states.contains(&state));
        by_id
            || self
                .by_name
                .get(&element.local_name().to_ascii_lowercase())
                .is_some_and(|states| states.contains(&state))
    }
}

impl MatchCondition for ElementStateCondition {
    fn is_satisfied(&self, element: &dyn ElementView, part: &SelectorPart) -> Option<bool> {
        let declared = matches!(
            part,
            SelectorPart::PseudoClass(pseudo) if self.declares(element, pseudo.kind)
        );
        if declared {
            return Some(true);
        }
        DefaultMatchCondition.is_satisfied(element, part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tartan_dom::ElementData;

    #[test]
    fn test_html_matcher_case_rules() {
        let element = ElementData::new("DIV", &[("CLASS", "Note"), ("id", "Main")]);
        let html = StandardElementMatcher::html();
        assert!(html.matches_name(&element, "div"));
        assert!(html.matches_class(&element, "Note"));
        assert!(!html.matches_class(&element, "note"));
        assert!(!html.matches_id(&element, "main"));

        let quirks = StandardElementMatcher::quirks();
        assert!(quirks.matches_class(&element, "note"));
        assert!(quirks.matches_id(&element, "main"));

        let xml = StandardElementMatcher::xml();
        assert!(!xml.matches_name(&element, "div"));
        assert!(xml.element_classes(&element).is_empty());
    }

    #[test]
    fn test_default_condition_links() {
        let link = ElementData::new("a", &[("href", "/")]);
        let anchor = ElementData::new("a", &[("name", "top")]);
        let part = SelectorPart::pseudo(PseudoClassType::Link);
        assert_eq!(DefaultMatchCondition.is_satisfied(&link, &part), Some(true));
        assert_eq!(DefaultMatchCondition.is_satisfied(&anchor, &part), Some(false));
        assert_eq!(
            DefaultMatchCondition.is_satisfied(&link, &SelectorPart::class("x")),
            None
        );
    }

    #[test]
    fn test_element_state_condition() {
        let condition = ElementStateCondition::new()
            .with_id("menu", PseudoClassType::Hover)
            .with_name("INPUT", PseudoClassType::Focus);
        let menu = ElementData::new("ul", &[("id", "menu")]);
        let input = ElementData::new("input", &[]);
        let hover = SelectorPart::pseudo(PseudoClassType::Hover);
        let focus = SelectorPart::pseudo(PseudoClassType::Focus);
        assert_eq!(condition.is_satisfied(&menu, &hover), Some(true));
        assert_eq!(condition.is_satisfied(&menu, &focus), None);
        assert_eq!(condition.is_satisfied(&input, &focus), Some(true));
    }
}
