//! CSS Cascading and Style Computation
//!
//! This module implements the cascade per
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/):
//! media filtering, candidate lookup, selector matching, cascade sorting and
//! the pre-order tree walk that produces a [`StyleMap`](crate::style::StyleMap).

mod analyzer;
mod index;
mod order;

pub use analyzer::{Analyzer, style_attributes};
pub use index::{IndexedSelector, RuleIndex};
pub use order::{CascadeLevel, CascadePriority, MatchedDeclaration, SourceOrder, sort_declarations};
