//! Selector specificity.
//!
//! [§ 9 Calculating a selector's specificity](https://www.w3.org/TR/selectors-3/#specificity)

use std::fmt;
use std::ops::Add;

use serde::Serialize;

use super::{PseudoArgument, PseudoClassType, Selector, SelectorPart};

/// Specificity `(a, b, c, d)`, compared lexicographically.
///
/// * `a`: 1 for declarations from a `style` attribute, 0 otherwise
/// * `b`: "count the number of ID selectors in the selector"
/// * `c`: "count the number of class selectors, attributes selectors, and
///   pseudo-classes in the selector"
/// * `d`: "count the number of type selectors and pseudo-elements in the selector"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Specificity {
    /// Inline style.
    pub a: u32,
    /// ID selectors.
    pub b: u32,
    /// Class, attribute and pseudo-class selectors.
    pub c: u32,
    /// Type selectors and pseudo-elements.
    pub d: u32,
}

impl Specificity {
    /// `(0, 0, 0, 0)`
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// `(1, 0, 0, 0)`, the specificity of inline declarations.
    pub const INLINE: Self = Self::new(1, 0, 0, 0);

    /// Specificity from its components.
    #[must_use]
    pub const fn new(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self { a, b, c, d }
    }

    /// Sum of the contributions of every selector in a chain.
    #[must_use]
    pub fn of_selectors(selectors: &[Selector]) -> Self {
        selectors
            .iter()
            .fold(Self::ZERO, |total, selector| total + Self::of_parts(&selector.parts))
    }

    /// Contribution of one compound selector.
    #[must_use]
    pub fn of_parts(parts: &[SelectorPart]) -> Self {
        let mut spec = Self::ZERO;
        for part in parts {
            match part {
                SelectorPart::ElementId(_) => spec.b = spec.b.saturating_add(1),
                SelectorPart::ElementClass(_) | SelectorPart::Attribute(_) => {
                    spec.c = spec.c.saturating_add(1);
                }
                // "Selectors inside the negation pseudo-class are counted like
                // any other, but the negation itself does not count as a
                // pseudo-class."
                SelectorPart::PseudoClass(pseudo) if pseudo.kind == PseudoClassType::Not => {
                    if let Some(PseudoArgument::Selector(inner)) = &pseudo.argument {
                        spec = spec + Self::of_parts(&inner.parts);
                    }
                }
                SelectorPart::PseudoClass(_) => spec.c = spec.c.saturating_add(1),
                // "ignore the universal selector"
                SelectorPart::ElementName(name) if name == "*" => {}
                SelectorPart::ElementName(_) | SelectorPart::PseudoElement(_) => {
                    spec.d = spec.d.saturating_add(1);
                }
            }
        }
        spec
    }
}

impl Add for Specificity {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            a: self.a.saturating_add(other.a),
            b: self.b.saturating_add(other.b),
            c: self.c.saturating_add(other.c),
            d: self.d.saturating_add(other.d),
        }
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.a, self.b, self.c, self.d)
    }
}
