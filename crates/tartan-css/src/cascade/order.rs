//! Cascade ordering of matched declarations.
//!
//! [§ 6.4 Cascade Sorting Order](https://www.w3.org/TR/css-cascade-4/#cascade-sort)

use std::fmt;

use serde::Serialize;

use crate::selector::{PseudoElementType, Specificity};
use crate::stylesheet::{Declaration, Origin};

/// [§ 6.4.1 Origin and Importance](https://www.w3.org/TR/css-cascade-4/#cascade-origin)
///
/// "Declarations from origins earlier in this list win over declarations from
/// later origins", listed here from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadeLevel {
    /// "Normal user-agent declarations"
    AgentNormal,
    /// "Normal user declarations"
    UserNormal,
    /// "Normal author declarations"
    AuthorNormal,
    /// "Important user agent declarations"
    AgentImportant,
    /// "Important author declarations"
    AuthorImportant,
    /// "Important user declarations"
    UserImportant,
}

impl CascadeLevel {
    /// The level of a declaration from `origin`.
    #[must_use]
    pub const fn new(origin: Origin, important: bool) -> Self {
        match (origin, important) {
            (Origin::Agent, false) => Self::AgentNormal,
            (Origin::User, false) => Self::UserNormal,
            (Origin::Author, false) => Self::AuthorNormal,
            (Origin::Agent, true) => Self::AgentImportant,
            (Origin::Author, true) => Self::AuthorImportant,
            (Origin::User, true) => Self::UserImportant,
        }
    }
}

/// [§ 6.4.4 Order of Appearance](https://www.w3.org/TR/css-cascade-4/#cascade-order)
///
/// "The last declaration in document order wins."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SourceOrder {
    /// Style sheet position; inline declarations use [`SourceOrder::INLINE_SHEET`].
    pub sheet: usize,
    /// Rule number within the sheet.
    pub rule: usize,
    /// Selector position within the rule.
    pub selector: usize,
    /// Declaration position within the rule.
    pub declaration: usize,
}

impl SourceOrder {
    /// Sheet index reserved for `style` attribute declarations, after every sheet.
    pub const INLINE_SHEET: usize = usize::MAX;

    /// A position in a style sheet.
    #[must_use]
    pub const fn new(sheet: usize, rule: usize, selector: usize, declaration: usize) -> Self {
        Self {
            sheet,
            rule,
            selector,
            declaration,
        }
    }

    /// Position of the `declaration`th inline declaration.
    #[must_use]
    pub const fn inline(declaration: usize) -> Self {
        Self::new(Self::INLINE_SHEET, 0, 0, declaration)
    }
}

/// The full cascade key. Field order is comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CascadePriority {
    /// Origin and importance.
    pub level: CascadeLevel,
    /// [§ 6.4.3 Specificity](https://www.w3.org/TR/css-cascade-4/#cascade-specificity)
    pub specificity: Specificity,
    /// Order of appearance.
    pub order: SourceOrder,
}

impl CascadePriority {
    /// Priority of a declaration matched through a selector of `specificity`.
    #[must_use]
    pub const fn new(
        origin: Origin,
        important: bool,
        specificity: Specificity,
        order: SourceOrder,
    ) -> Self {
        Self {
            level: CascadeLevel::new(origin, important),
            specificity,
            order,
        }
    }

    /// "Declarations within style attributes" have author origin and the
    /// `(1,0,0,0)` specificity.
    #[must_use]
    pub const fn inline(important: bool, index: usize) -> Self {
        Self::new(
            Origin::Author,
            important,
            Specificity::INLINE,
            SourceOrder::inline(index),
        )
    }
}

impl fmt::Display for CascadePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} {} @{}:{}:{}:{}",
            self.level,
            self.specificity,
            self.order.sheet,
            self.order.rule,
            self.order.selector,
            self.order.declaration
        )
    }
}

/// A declaration that applies to an element, with its cascade key.
#[derive(Debug, Clone, Copy)]
pub struct MatchedDeclaration<'a> {
    /// The declaration.
    pub declaration: &'a Declaration,
    /// Its cascade key.
    pub priority: CascadePriority,
    /// The pseudo-element it styles, or `None` for the element itself.
    pub pseudo_element: Option<PseudoElementType>,
}

impl<'a> MatchedDeclaration<'a> {
    /// A declaration matched through a style sheet rule.
    #[must_use]
    pub const fn new(
        declaration: &'a Declaration,
        priority: CascadePriority,
        pseudo_element: Option<PseudoElementType>,
    ) -> Self {
        Self {
            declaration,
            priority,
            pseudo_element,
        }
    }
}

/// "The cascade takes an unordered list of declared values for a given
/// property on a given element, sorts them by their declaration's
/// precedence". Ascending: the winner of each property is pushed last.
pub fn sort_declarations(declarations: &mut [MatchedDeclaration<'_>]) {
    declarations.sort_by_key(|matched| matched.priority);
}
