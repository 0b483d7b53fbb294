//! Error types for the cascade engine.
//!
//! Matching never fails: a selector that does not apply is simply `false`.
//! The errors here cover the three places where input can be rejected:
//! building an evaluation context, building selectors, and interpreting
//! declaration values.

use thiserror::Error;

/// An evaluation context could not be built, or a document cannot be styled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No [`ElementMatcher`](crate::selector::ElementMatcher) was supplied.
    #[error("no element matcher configured")]
    MissingElementMatcher,
    /// No [`PropertyCatalog`](crate::properties::PropertyCatalog) was supplied.
    #[error("no property catalog configured")]
    MissingPropertyCatalog,
    /// The document has no root element to start the traversal from.
    #[error("document has no root element")]
    MissingDocumentElement,
}

/// A selector was structurally ill-formed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// The selector text or selector list was empty.
    #[error("empty selector")]
    Empty,
    /// A combined selector had no compound selectors.
    #[error("combined selector has no selectors")]
    EmptyCombinedSelector,
    /// The first selector of a combined selector carried a combinator.
    #[error("first selector cannot have a combinator")]
    LeadingCombinator,
    /// A selector after the first had no combinator.
    #[error("selector {index} has no combinator")]
    MissingCombinator {
        /// Position of the selector within the combined selector.
        index: usize,
    },
    /// A compound selector had no parts.
    #[error("selector {index} has no parts")]
    EmptySelector {
        /// Position of the selector within the combined selector.
        index: usize,
    },
    /// A combinator was not followed by a selector.
    #[error("dangling combinator at end of selector")]
    TrailingCombinator,
    /// An unexpected character was found in selector text.
    #[error("unexpected character {ch:?} at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Character offset in the selector text.
        position: usize,
    },
    /// Selector text ended in the middle of a construct.
    #[error("unexpected end of selector")]
    UnexpectedEnd,
    /// An attribute selector was malformed.
    #[error("invalid attribute selector: {0}")]
    InvalidAttribute(String),
    /// The pseudo-class name is not supported.
    #[error("unknown pseudo-class :{0}")]
    UnknownPseudoClass(String),
    /// The pseudo-element name is not supported.
    #[error("unknown pseudo-element ::{0}")]
    UnknownPseudoElement(String),
    /// A functional pseudo-class argument could not be interpreted.
    #[error("invalid argument {argument:?} for :{pseudo}")]
    InvalidArgument {
        /// Pseudo-class name.
        pseudo: String,
        /// The argument as written.
        argument: String,
    },
    /// A functional pseudo-class was used without its argument, or a
    /// non-functional one was given an argument.
    #[error("pseudo-class :{0} used with the wrong arity")]
    ArgumentMismatch(String),
    /// A pseudo-element appeared before the last selector of a chain.
    #[error("pseudo-element must be in the last selector")]
    MisplacedPseudoElement,
}

/// A declaration value could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// A keyword-only property was given a keyword it does not accept.
    #[error("unknown keyword {keyword:?} for property {property}")]
    UnknownKeyword {
        /// Property name.
        property: String,
        /// The rejected keyword.
        keyword: String,
    },
    /// A declaration had no value terms.
    #[error("property {property} has an empty value")]
    Empty {
        /// Property name.
        property: String,
    },
    /// Value text could not be split into terms.
    #[error("invalid value {text:?} at position {position}")]
    Syntax {
        /// The value text.
        text: String,
        /// Character offset of the failure.
        position: usize,
    },
    /// A dimension carried a unit this engine does not know.
    #[error("unknown unit {0:?}")]
    UnknownUnit(String),
}
