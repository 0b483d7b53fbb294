//! CSS selector model and matching
//!
//! This module implements selector matching per
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/), with the
//! `:not()` and `:lang()` extensions from
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
//!
//! A [`CombinedSelector`] is a chain of compound [`Selector`]s. Each selector
//! after the first carries the [`Combinator`] that relates it to the one
//! before, so `div > p.note` is `[div]`, `[> p .note]`. Matching starts at the
//! subject (the last selector) and walks left through the tree.

mod matcher;
mod parser;
mod specificity;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::error::SelectorError;
use crate::tree::{DocumentTree, ElementView};

pub use matcher::{
    DefaultMatchCondition, ElementMatcher, ElementStateCondition, MatchCondition,
    StandardElementMatcher,
};
pub use parser::{parse_selector, parse_selector_list};
pub use specificity::Specificity;

/// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum AttributeOperator {
    /// `[att]` "Represents an element with the att attribute"
    #[strum(serialize = "")]
    Exists,
    /// `[att=val]` "whose value is exactly 'val'"
    #[strum(serialize = "=")]
    Equals,
    /// `[att~=val]` "a whitespace-separated list of words, one of which is exactly 'val'"
    #[strum(serialize = "~=")]
    Includes,
    /// `[att|=val]` "either being exactly 'val' or beginning with 'val'
    /// immediately followed by '-'"
    #[strum(serialize = "|=")]
    DashMatch,
    /// `[att*=val]` "contains at least one instance of the substring 'val'"
    #[strum(serialize = "*=")]
    Contains,
    /// `[att^=val]` "begins with the prefix 'val'"
    #[strum(serialize = "^=")]
    StartsWith,
    /// `[att$=val]` "ends with the suffix 'val'"
    #[strum(serialize = "$=")]
    EndsWith,
}

/// An attribute condition, e.g. `[lang|="en"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Comparison.
    pub operator: AttributeOperator,
    /// Value compared against; empty for [`AttributeOperator::Exists`].
    #[serde(default)]
    pub value: String,
    /// Whether the value was written as a quoted string.
    #[serde(default)]
    pub is_string: bool,
}

impl AttributeSelector {
    /// An attribute selector.
    #[must_use]
    pub fn new(name: &str, operator: AttributeOperator, value: &str) -> Self {
        Self {
            name: name.to_string(),
            operator,
            value: value.to_string(),
            is_string: true,
        }
    }

    /// Compare an attribute value that is present on the element.
    ///
    /// "If 'val' is the empty string, the selector does not represent
    /// anything" for the `~=`, `^=`, `$=` and `*=` forms.
    #[must_use]
    pub fn matches_value(&self, actual: &str) -> bool {
        let expected = self.value.as_str();
        match self.operator {
            AttributeOperator::Exists => true,
            AttributeOperator::Equals => actual == expected,
            AttributeOperator::Includes => {
                !expected.is_empty() && actual.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeOperator::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            AttributeOperator::Contains => !expected.is_empty() && actual.contains(expected),
            AttributeOperator::StartsWith => !expected.is_empty() && actual.starts_with(expected),
            AttributeOperator::EndsWith => !expected.is_empty() && actual.ends_with(expected),
        }
    }
}

/// How a pseudo-class takes its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Not functional.
    None,
    /// An identifier, e.g. `:lang(en)`.
    Identifier,
    /// An `An+B` expression, e.g. `:nth-child(2n+1)`.
    Nth,
    /// A nested selector, e.g. `:not(.x)`.
    Selector,
}

/// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoClassType {
    /// `:active` (dynamic)
    Active,
    /// `:checked` "radio and checkbox elements that are toggled on"
    Checked,
    /// `:disabled`
    Disabled,
    /// `:empty` "an element that has no children at all"
    Empty,
    /// `:enabled`
    Enabled,
    /// `:first-child`
    FirstChild,
    /// `:first-of-type`
    FirstOfType,
    /// `:focus` (dynamic)
    Focus,
    /// `:focus-within` (dynamic)
    FocusWithin,
    /// `:hover` (dynamic)
    Hover,
    /// `:lang(C)`
    Lang,
    /// `:last-child`
    LastChild,
    /// `:last-of-type`
    LastOfType,
    /// `:link` (dynamic)
    Link,
    /// `:not(X)`
    Not,
    /// `:nth-child(an+b)`
    NthChild,
    /// `:nth-last-child(an+b)`
    NthLastChild,
    /// `:nth-last-of-type(an+b)`
    NthLastOfType,
    /// `:nth-of-type(an+b)`
    NthOfType,
    /// `:only-child`
    OnlyChild,
    /// `:only-of-type`
    OnlyOfType,
    /// `:root`
    Root,
    /// `:target` (dynamic)
    Target,
    /// `:visited` (dynamic)
    Visited,
}

impl PseudoClassType {
    /// The argument this pseudo-class requires.
    #[must_use]
    pub const fn argument_kind(self) -> ArgumentKind {
        match self {
            Self::Lang => ArgumentKind::Identifier,
            Self::NthChild | Self::NthLastChild | Self::NthOfType | Self::NthLastOfType => {
                ArgumentKind::Nth
            }
            Self::Not => ArgumentKind::Selector,
            _ => ArgumentKind::None,
        }
    }

    /// Whether the pseudo-class depends on user interaction or navigation
    /// state, which only a [`MatchCondition`] can supply.
    #[must_use]
    pub const fn is_dynamic(self) -> bool {
        matches!(
            self,
            Self::Active
                | Self::Focus
                | Self::FocusWithin
                | Self::Hover
                | Self::Link
                | Self::Target
                | Self::Visited
        )
    }
}

/// [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PseudoElementType {
    /// `::before`
    Before,
    /// `::after`
    After,
    /// `::first-line`
    FirstLine,
    /// `::first-letter`
    FirstLetter,
    /// `::marker`
    Marker,
    /// `::selection`
    Selection,
    /// `::placeholder`
    Placeholder,
    /// `::backdrop`
    Backdrop,
}

impl PseudoElementType {
    /// "For compatibility with existing style sheets, user agents must also
    /// accept the previous one-colon notation for pseudo-elements introduced
    /// in CSS levels 1 and 2 (namely, :first-line, :first-letter, :before and
    /// :after)."
    #[must_use]
    pub const fn allows_single_colon(self) -> bool {
        matches!(
            self,
            Self::Before | Self::After | Self::FirstLine | Self::FirstLetter
        )
    }
}

/// [§ 6.6.5.2 :nth-child() pseudo-class](https://www.w3.org/TR/selectors-3/#nth-child-pseudo)
///
/// "represents an element that has an+b-1 siblings before it in the document
/// tree, for any positive integer or zero value of n"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NthExpression {
    /// Step.
    pub a: i32,
    /// Offset.
    pub b: i32,
}

impl NthExpression {
    /// `odd`, i.e. `2n+1`.
    pub const ODD: Self = Self { a: 2, b: 1 };
    /// `even`, i.e. `2n`.
    pub const EVEN: Self = Self { a: 2, b: 0 };

    /// Whether a 1-based sibling position satisfies `an+b` for some n >= 0.
    #[must_use]
    pub fn matches(self, position: i32) -> bool {
        // Widened so that offsets at the i32 bounds cannot overflow.
        let diff = i64::from(position) - i64::from(self.b);
        let a = i64::from(self.a);
        if a == 0 {
            return diff == 0;
        }
        diff % a == 0 && diff / a >= 0
    }
}

impl fmt::Display for NthExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}n"),
            (a, b) => write!(f, "{a}n{b:+}"),
        }
    }
}

/// The argument of a functional pseudo-class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PseudoArgument {
    /// An identifier, for `:lang()`.
    Identifier(String),
    /// An `An+B` expression, for the `:nth-*()` family.
    Nth(NthExpression),
    /// A compound selector, for `:not()`.
    Selector(Box<Selector>),
}

/// A pseudo-class with its optional argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PseudoClass {
    /// Which pseudo-class.
    pub kind: PseudoClassType,
    /// Argument, for functional pseudo-classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<PseudoArgument>,
}

impl PseudoClass {
    /// A non-functional pseudo-class.
    #[must_use]
    pub const fn new(kind: PseudoClassType) -> Self {
        Self {
            kind,
            argument: None,
        }
    }

    /// A functional pseudo-class with its argument.
    #[must_use]
    pub const fn with_argument(kind: PseudoClassType, argument: PseudoArgument) -> Self {
        Self {
            kind,
            argument: Some(argument),
        }
    }
}

/// One simple selector: a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SelectorPart {
    /// [§ 6.1 Type selector](https://www.w3.org/TR/selectors-3/#type-selectors);
    /// `*` is the [universal selector](https://www.w3.org/TR/selectors-3/#universal-selector).
    ElementName(String),
    /// [§ 6.4 Class selectors](https://www.w3.org/TR/selectors-3/#class-html)
    ElementClass(String),
    /// [§ 6.5 ID selectors](https://www.w3.org/TR/selectors-3/#id-selectors)
    ElementId(String),
    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    Attribute(AttributeSelector),
    /// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
    PseudoClass(PseudoClass),
    /// [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
    PseudoElement(PseudoElementType),
}

impl SelectorPart {
    /// Type selector.
    #[must_use]
    pub fn name(name: &str) -> Self {
        Self::ElementName(name.to_string())
    }

    /// Universal selector.
    #[must_use]
    pub fn universal() -> Self {
        Self::ElementName("*".to_string())
    }

    /// Class selector.
    #[must_use]
    pub fn class(class: &str) -> Self {
        Self::ElementClass(class.to_string())
    }

    /// ID selector.
    #[must_use]
    pub fn id(id: &str) -> Self {
        Self::ElementId(id.to_string())
    }

    /// Non-functional pseudo-class.
    #[must_use]
    pub const fn pseudo(kind: PseudoClassType) -> Self {
        Self::PseudoClass(PseudoClass::new(kind))
    }

    /// Whether this is the universal selector.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        matches!(self, Self::ElementName(name) if name == "*")
    }
}

/// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    /// [§ 8.1 Descendant combinator](https://www.w3.org/TR/selectors-3/#descendant-combinators)
    /// "A descendant combinator is whitespace that separates two sequences of
    /// simple selectors."
    #[strum(serialize = " ")]
    Descendant,
    /// [§ 8.2 Child combinators](https://www.w3.org/TR/selectors-3/#child-combinators)
    /// "A child combinator describes a childhood relationship between two elements."
    #[strum(serialize = ">")]
    Child,
    /// [§ 8.3.1 Next-sibling combinator](https://www.w3.org/TR/selectors-3/#adjacent-sibling-combinators)
    /// "the element represented by the first sequence immediately precedes the
    /// element represented by the second one."
    #[strum(serialize = "+")]
    AdjacentSibling,
    /// [§ 8.3.2 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-3/#general-sibling-combinators)
    /// "the element represented by the first sequence precedes (not necessarily
    /// immediately) the element represented by the second one."
    #[strum(serialize = "~")]
    PrecedingSibling,
}

/// [§ 5 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax):
/// a "sequence of simple selectors" applying to one element, plus the
/// combinator relating it to the previous selector in its chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Relation to the previous selector; `None` for the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<Combinator>,
    /// Conditions that must all hold for the element.
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// A selector without a combinator.
    #[must_use]
    pub const fn new(parts: Vec<SelectorPart>) -> Self {
        Self {
            combinator: None,
            parts,
        }
    }

    /// A selector related to the previous one by `combinator`.
    #[must_use]
    pub const fn combined(combinator: Combinator, parts: Vec<SelectorPart>) -> Self {
        Self {
            combinator: Some(combinator),
            parts,
        }
    }

    /// The pseudo-element this selector names, if any.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<PseudoElementType> {
        self.parts.iter().rev().find_map(|part| match part {
            SelectorPart::PseudoElement(kind) => Some(*kind),
            _ => None,
        })
    }

    /// Whether every part matches `node`. Non-elements never match.
    pub fn matches<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        matcher: &dyn ElementMatcher,
        condition: &dyn MatchCondition,
    ) -> bool {
        let Some(element) = tree.element(node) else {
            return false;
        };
        self.parts
            .iter()
            .all(|part| part_matches(part, tree, node, element, matcher, condition))
    }
}

/// A full selector: one or more [`Selector`]s joined by combinators, with its
/// specificity computed at construction.
///
/// Serialized as selector text; deserialized from either text or a list of
/// structured selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CombinedSelectorInput", into = "String")]
pub struct CombinedSelector {
    selectors: Vec<Selector>,
    specificity: Specificity,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CombinedSelectorInput {
    Text(String),
    Parts(Vec<Selector>),
}

impl TryFrom<CombinedSelectorInput> for CombinedSelector {
    type Error = SelectorError;

    fn try_from(input: CombinedSelectorInput) -> Result<Self, Self::Error> {
        match input {
            CombinedSelectorInput::Text(text) => parse_selector(&text),
            CombinedSelectorInput::Parts(selectors) => Self::new(selectors),
        }
    }
}

impl From<CombinedSelector> for String {
    fn from(selector: CombinedSelector) -> Self {
        selector.to_string()
    }
}

impl CombinedSelector {
    /// Validate a selector chain and compute its specificity.
    ///
    /// # Errors
    ///
    /// Rejects an empty chain, a combinator on the first selector, a missing
    /// combinator on a later one, a selector with no parts, and a
    /// pseudo-element anywhere but the last selector.
    pub fn new(selectors: Vec<Selector>) -> Result<Self, SelectorError> {
        let Some(first) = selectors.first() else {
            return Err(SelectorError::EmptyCombinedSelector);
        };
        if first.combinator.is_some() {
            return Err(SelectorError::LeadingCombinator);
        }
        let last = selectors.len() - 1;
        for (index, selector) in selectors.iter().enumerate() {
            if selector.parts.is_empty() {
                return Err(SelectorError::EmptySelector { index });
            }
            if index > 0 && selector.combinator.is_none() {
                return Err(SelectorError::MissingCombinator { index });
            }
            if index < last && selector.pseudo_element().is_some() {
                return Err(SelectorError::MisplacedPseudoElement);
            }
        }
        let specificity = Specificity::of_selectors(&selectors);
        Ok(Self {
            selectors,
            specificity,
        })
    }

    /// The chain, leftmost first.
    #[must_use]
    pub fn selectors(&self) -> &[Selector] {
        &self.selectors
    }

    /// [§ 9 Calculating a selector's specificity](https://www.w3.org/TR/selectors-3/#specificity)
    #[must_use]
    pub const fn specificity(&self) -> Specificity {
        self.specificity
    }

    /// Specificity of a declaration reached through this selector; `a` is set
    /// when the declaration comes from a `style` attribute.
    #[must_use]
    pub fn compute_specificity(&self, inline: bool) -> Specificity {
        let Specificity { b, c, d, .. } = self.specificity;
        Specificity::new(u32::from(inline), b, c, d)
    }

    /// The subject: the selector matched against the candidate element.
    #[must_use]
    pub fn subject(&self) -> &Selector {
        // Non-empty by construction.
        &self.selectors[self.selectors.len() - 1]
    }

    /// The pseudo-element whose style this selector contributes to.
    #[must_use]
    pub fn pseudo_element(&self) -> Option<PseudoElementType> {
        self.subject().pseudo_element()
    }

    /// [§ 3 Case sensitivity / matching](https://www.w3.org/TR/selectors-3/#selectors)
    ///
    /// Match the subject against `node`, then walk the chain right to left
    /// through the tree. For the descendant and subsequent-sibling
    /// combinators the nearest matching element is taken.
    pub fn matches<T: DocumentTree>(
        &self,
        tree: &T,
        node: T::Node,
        matcher: &dyn ElementMatcher,
        condition: &dyn MatchCondition,
    ) -> bool {
        let Some((subject, rest)) = self.selectors.split_last() else {
            return false;
        };
        if !subject.matches(tree, node, matcher, condition) {
            return false;
        }

        let mut current = node;
        let mut combinator = subject.combinator;
        for selector in rest.iter().rev() {
            let Some(relation) = combinator else {
                return false;
            };
            let is_match =
                |candidate: T::Node| selector.matches(tree, candidate, matcher, condition);
            let found = match relation {
                // "an element B that is an arbitrary descendant of some ancestor element A"
                Combinator::Descendant => {
                    let mut ancestor = tree.parent_element(current);
                    while let Some(candidate) = ancestor {
                        if is_match(candidate) {
                            break;
                        }
                        ancestor = tree.parent_element(candidate);
                    }
                    ancestor
                }
                Combinator::Child => tree.parent_element(current).filter(|&p| is_match(p)),
                Combinator::AdjacentSibling => tree
                    .previous_element_sibling(current)
                    .filter(|&s| is_match(s)),
                Combinator::PrecedingSibling => {
                    let mut sibling = tree.previous_element_sibling(current);
                    while let Some(candidate) = sibling {
                        if is_match(candidate) {
                            break;
                        }
                        sibling = tree.previous_element_sibling(candidate);
                    }
                    sibling
                }
            };
            let Some(next) = found else {
                return false;
            };
            current = next;
            combinator = selector.combinator;
        }
        true
    }
}

/// Match one part. The [`MatchCondition`] may force or veto any part before
/// the built-in rules run.
fn part_matches<T: DocumentTree>(
    part: &SelectorPart,
    tree: &T,
    node: T::Node,
    element: &dyn ElementView,
    matcher: &dyn ElementMatcher,
    condition: &dyn MatchCondition,
) -> bool {
    if let Some(forced) = condition.is_satisfied(element, part) {
        return forced;
    }
    match part {
        SelectorPart::ElementName(name) => name == "*" || matcher.matches_name(element, name),
        SelectorPart::ElementClass(class) => matcher.matches_class(element, class),
        SelectorPart::ElementId(id) => matcher.matches_id(element, id),
        SelectorPart::Attribute(attribute) => matcher.matches_attribute(element, attribute),
        SelectorPart::PseudoClass(pseudo) => {
            pseudo_class_matches(pseudo, tree, node, element, matcher, condition)
        }
        // Pseudo-elements pick which style receives declarations; they do not
        // constrain the element.
        SelectorPart::PseudoElement(_) => true,
    }
}

/// "form controls" for `:enabled` and `:disabled`.
const FORM_ELEMENTS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
fn pseudo_class_matches<T: DocumentTree>(
    pseudo: &PseudoClass,
    tree: &T,
    node: T::Node,
    element: &dyn ElementView,
    matcher: &dyn ElementMatcher,
    condition: &dyn MatchCondition,
) -> bool {
    let name = element.local_name();
    let same_type = |sibling: T::Node| {
        tree.element(sibling)
            .is_some_and(|other| matcher.matches_name(other, name))
    };
    // `before` counts the qualifying siblings on the relevant side.
    let nth = |before: i32| match &pseudo.argument {
        Some(PseudoArgument::Nth(expr)) => expr.matches(before.saturating_add(1)),
        _ => false,
    };

    match pseudo.kind {
        // "an element that is the root of the document"
        PseudoClassType::Root => tree.document_element() == Some(node),

        // "an element that has no children at all"; comments are ignored and
        // whitespace-only text does not count as content.
        PseudoClassType::Empty => tree.child_nodes(node).all(|child| {
            !tree.is_element(child) && tree.text(child).is_none_or(|t| t.trim().is_empty())
        }),

        PseudoClassType::FirstChild => tree.previous_element_sibling(node).is_none(),
        PseudoClassType::LastChild => tree.next_element_sibling(node).is_none(),
        PseudoClassType::OnlyChild => {
            tree.previous_element_sibling(node).is_none()
                && tree.next_element_sibling(node).is_none()
        }

        PseudoClassType::FirstOfType => count_before(tree, node, &same_type) == 0,
        PseudoClassType::LastOfType => count_after(tree, node, &same_type) == 0,
        PseudoClassType::OnlyOfType => {
            count_before(tree, node, &same_type) == 0 && count_after(tree, node, &same_type) == 0
        }

        PseudoClassType::NthChild => nth(count_before(tree, node, &|_| true)),
        PseudoClassType::NthLastChild => nth(count_after(tree, node, &|_| true)),
        PseudoClassType::NthOfType => nth(count_before(tree, node, &same_type)),
        PseudoClassType::NthLastOfType => nth(count_after(tree, node, &same_type)),

        // [§ 6.6.7 The negation pseudo-class](https://www.w3.org/TR/selectors-3/#negation)
        PseudoClassType::Not => match &pseudo.argument {
            Some(PseudoArgument::Selector(inner)) => !inner.matches(tree, node, matcher, condition),
            _ => false,
        },

        // [§ 6.6.3 The language pseudo-class](https://www.w3.org/TR/selectors-3/#lang-pseudo)
        PseudoClassType::Lang => match &pseudo.argument {
            Some(PseudoArgument::Identifier(lang)) => {
                language_of(tree, node, matcher).is_some_and(|value| lang_matches(value, lang))
            }
            _ => false,
        },

        // [§ 6.6.4 The UI element states pseudo-classes](https://www.w3.org/TR/selectors-3/#UIstates)
        PseudoClassType::Enabled => {
            is_form_element(name) && matcher.attribute(element, "disabled").is_none()
        }
        PseudoClassType::Disabled => {
            is_form_element(name) && matcher.attribute(element, "disabled").is_some()
        }
        PseudoClassType::Checked => {
            let checkable = name.eq_ignore_ascii_case("input")
                && matcher.attribute(element, "type").is_some_and(|t| {
                    t.eq_ignore_ascii_case("checkbox") || t.eq_ignore_ascii_case("radio")
                });
            (checkable && matcher.attribute(element, "checked").is_some())
                || (name.eq_ignore_ascii_case("option")
                    && matcher.attribute(element, "selected").is_some())
        }

        // User-action and navigation states are only known to the host.
        PseudoClassType::Active
        | PseudoClassType::Focus
        | PseudoClassType::FocusWithin
        | PseudoClassType::Hover
        | PseudoClassType::Link
        | PseudoClassType::Target
        | PseudoClassType::Visited => false,
    }
}

fn is_form_element(name: &str) -> bool {
    FORM_ELEMENTS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

fn count_before<T: DocumentTree>(
    tree: &T,
    node: T::Node,
    filter: &dyn Fn(T::Node) -> bool,
) -> i32 {
    let mut count = 0;
    let mut current = tree.previous_element_sibling(node);
    while let Some(sibling) = current {
        if filter(sibling) {
            count += 1;
        }
        current = tree.previous_element_sibling(sibling);
    }
    count
}

fn count_after<T: DocumentTree>(
    tree: &T,
    node: T::Node,
    filter: &dyn Fn(T::Node) -> bool,
) -> i32 {
    let mut count = 0;
    let mut current = tree.next_element_sibling(node);
    while let Some(sibling) = current {
        if filter(sibling) {
            count += 1;
        }
        current = tree.next_element_sibling(sibling);
    }
    count
}

/// The language of `node`: the nearest `lang` or `xml:lang` attribute on the
/// element or its ancestors.
fn language_of<'t, T: DocumentTree>(
    tree: &'t T,
    node: T::Node,
    matcher: &dyn ElementMatcher,
) -> Option<&'t str> {
    let mut current = Some(node);
    while let Some(candidate) = current {
        if let Some(element) = tree.element(candidate) {
            let value = matcher
                .attribute(element, "xml:lang")
                .or_else(|| matcher.attribute(element, "lang"));
            if value.is_some() {
                return value;
            }
        }
        current = tree.parent_element(candidate);
    }
    None
}

/// "The matching of C against the element's content language value is
/// performed by comparing C to the language value as per the '|=' operator",
/// case-insensitively.
fn lang_matches(value: &str, lang: &str) -> bool {
    if lang.is_empty() {
        return false;
    }
    value.eq_ignore_ascii_case(lang)
        || (value.len() > lang.len()
            && value
                .get(..lang.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(lang))
            && value.as_bytes()[lang.len()] == b'-')
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator == AttributeOperator::Exists {
            return write!(f, "[{}]", self.name);
        }
        if self.is_string {
            write!(f, "[{}{}\"{}\"]", self.name, self.operator, self.value.replace('"', "\\\""))
        } else {
            write!(f, "[{}{}{}]", self.name, self.operator, self.value)
        }
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementName(name) => f.write_str(name),
            Self::ElementClass(class) => write!(f, ".{class}"),
            Self::ElementId(id) => write!(f, "#{id}"),
            Self::Attribute(attribute) => write!(f, "{attribute}"),
            Self::PseudoClass(pseudo) => {
                write!(f, ":{}", pseudo.kind)?;
                match &pseudo.argument {
                    None => Ok(()),
                    Some(PseudoArgument::Identifier(ident)) => write!(f, "({ident})"),
                    Some(PseudoArgument::Nth(expr)) => write!(f, "({expr})"),
                    Some(PseudoArgument::Selector(inner)) => write!(f, "({inner})"),
                }
            }
            Self::PseudoElement(kind) => write!(f, "::{kind}"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CombinedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for selector in &self.selectors {
            match selector.combinator {
                None => {}
                Some(Combinator::Descendant) => f.write_str(" ")?,
                Some(combinator) => write!(f, " {combinator} ")?,
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_expression() {
        assert!(NthExpression::ODD.matches(1));
        assert!(!NthExpression::ODD.matches(2));
        assert!(NthExpression::EVEN.matches(4));
        let third_onwards = NthExpression { a: 1, b: 3 };
        assert!(!third_onwards.matches(2));
        assert!(third_onwards.matches(5));
        let first_three = NthExpression { a: -1, b: 3 };
        assert!(first_three.matches(1));
        assert!(first_three.matches(3));
        assert!(!first_three.matches(4));
        assert!(NthExpression { a: 0, b: 2 }.matches(2));
        assert_eq!(NthExpression { a: 2, b: -1 }.to_string(), "2n-1");
    }

    #[test]
    fn test_attribute_value_operators() {
        let includes = AttributeSelector::new("class", AttributeOperator::Includes, "b");
        assert!(includes.matches_value("a b c"));
        assert!(!includes.matches_value("abc"));

        let dash = AttributeSelector::new("lang", AttributeOperator::DashMatch, "en");
        assert!(dash.matches_value("en"));
        assert!(dash.matches_value("en-US"));
        assert!(!dash.matches_value("english"));

        for operator in [
            AttributeOperator::Includes,
            AttributeOperator::Contains,
            AttributeOperator::StartsWith,
            AttributeOperator::EndsWith,
        ] {
            assert!(!AttributeSelector::new("x", operator, "").matches_value("anything"));
        }
    }

    #[test]
    fn test_combined_selector_validation() {
        assert_eq!(
            CombinedSelector::new(vec![]),
            Err(SelectorError::EmptyCombinedSelector)
        );
        assert_eq!(
            CombinedSelector::new(vec![Selector::combined(
                Combinator::Child,
                vec![SelectorPart::name("p")]
            )]),
            Err(SelectorError::LeadingCombinator)
        );
        assert_eq!(
            CombinedSelector::new(vec![
                Selector::new(vec![SelectorPart::name("div")]),
                Selector::new(vec![SelectorPart::name("p")]),
            ]),
            Err(SelectorError::MissingCombinator { index: 1 })
        );
        assert_eq!(
            CombinedSelector::new(vec![Selector::new(vec![])]),
            Err(SelectorError::EmptySelector { index: 0 })
        );
    }

    #[test]
    fn test_display_round_trips_structure() {
        let selector = CombinedSelector::new(vec![
            Selector::new(vec![SelectorPart::name("div")]),
            Selector::combined(
                Combinator::Child,
                vec![SelectorPart::name("p"), SelectorPart::class("note")],
            ),
            Selector::combined(
                Combinator::Descendant,
                vec![SelectorPart::PseudoElement(PseudoElementType::FirstLine)],
            ),
        ])
        .expect("valid chain");
        assert_eq!(selector.to_string(), "div > p.note ::first-line");
        assert_eq!(selector.pseudo_element(), Some(PseudoElementType::FirstLine));
    }
}
