//! Selector matching, media queries and the CSS cascade for the Tartan engine.
//!
//! # Scope
//!
//! Given parsed style sheets and any document tree, this crate works out
//! which declarations apply to which elements, in what order, and what the
//! resulting property values are:
//!
//! - **Selectors** ([Selectors Level 3](https://www.w3.org/TR/selectors-3/))
//!   - Type, universal, class, ID and attribute selectors
//!   - All four combinators
//!   - Structural, negation, language, UI-state and dynamic pseudo-classes
//!   - Pseudo-elements, specificity, and a selector text builder
//!
//! - **Media Queries** ([Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/))
//!   - Media types, `not` / `only`, and every level 3 feature with `min-`/`max-`
//!
//! - **Cascade** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/))
//!   - Origin and importance, specificity, order of appearance
//!   - Inline `style` declarations
//!   - Inheritance and the `inherit` / `initial` / `unset` keywords
//!   - Box shorthand expansion (margin, padding, border)
//!
//! # Not Implemented
//!
//! - Tokenizing CSS text into rules (style sheets arrive as values or JSON)
//! - Computed values that need layout (percentages, `em` chains)
//!
//! # Example
//!
//! ```
//! use tartan_css::{Analyzer, Declaration, MediaSpec, Origin, StyleConfig, StyleSheet};
//! use tartan_dom::DomTree;
//!
//! let mut tree = DomTree::new();
//! let body = tree.append_element(tree.root(), "body", &[]);
//! let p = tree.append_element(body, "p", &[("class", "note")]);
//!
//! let sheet = StyleSheet::new(Origin::Author)
//!     .with_rule_text("body", vec![Declaration::parse("color", "#010203").unwrap()])
//!     .unwrap();
//! let config = StyleConfig::html();
//! let sheets = [sheet];
//! let styles = Analyzer::new(&config, &sheets)
//!     .evaluate(&tree, &MediaSpec::default())
//!     .unwrap();
//!
//! let p_style = styles.node_data(p, None).unwrap();
//! assert_eq!(p_style.as_string("color", true).as_deref(), Some("rgb(1, 2, 3)"));
//! ```

/// Cascade ordering and the document evaluator per [CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/).
pub mod cascade;
/// Evaluation context: matcher, match condition, catalog, inheritance.
pub mod config;
/// Error types.
pub mod error;
/// Media queries per [Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/).
pub mod media;
/// Property catalog, property values and shorthand expansion.
pub mod properties;
/// Selector model, parsing and matching per [Selectors Level 3](https://www.w3.org/TR/selectors-3/).
pub mod selector;
/// Per-element resolved styles.
pub mod style;
/// Declarations, rules and style sheets.
pub mod stylesheet;
/// The document tree contract.
pub mod tree;
/// Typed value terms per [CSS Values Level 4](https://www.w3.org/TR/css-values-4/).
pub mod values;

pub use cascade::{Analyzer, CascadeLevel, CascadePriority, MatchedDeclaration, SourceOrder};
pub use config::{StyleConfig, StyleConfigBuilder};
pub use error::{ConfigError, SelectorError, ValueError};
pub use media::{MediaExpression, MediaFeature, MediaQuery, MediaSpec};
pub use properties::{PropertyCatalog, PropertyInfo, PropertyValue, ValueType};
pub use selector::{
    CombinedSelector, Combinator, ElementMatcher, MatchCondition, PseudoClassType,
    PseudoElementType, Selector, SelectorPart, Specificity, StandardElementMatcher,
    parse_selector, parse_selector_list,
};
pub use style::{ElementStyle, NodeData, StyleMap};
pub use stylesheet::{Declaration, Origin, RuleBlock, RuleMedia, RuleSet, StyleSheet};
pub use tree::{DocumentTree, ElementView};
pub use values::{Rgba, Term, TermValue};
