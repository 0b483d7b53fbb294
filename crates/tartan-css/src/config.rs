//! Evaluation context.
//!
//! A [`StyleConfig`] bundles the strategies one evaluation runs with: how
//! elements are read and compared, which dynamic states hold, which
//! properties exist, and whether values are inherited. It is built once and
//! shared by reference; everything in it is immutable and `Send + Sync`.

use std::sync::Arc;

use crate::error::ConfigError;
use crate::properties::PropertyCatalog;
use crate::selector::{
    DefaultMatchCondition, ElementMatcher, MatchCondition, StandardElementMatcher,
};

/// An immutable evaluation context.
#[derive(Debug, Clone)]
pub struct StyleConfig {
    element_matcher: Arc<dyn ElementMatcher>,
    match_condition: Arc<dyn MatchCondition>,
    catalog: Arc<PropertyCatalog>,
    inherit: bool,
}

impl StyleConfig {
    /// Start building a context.
    #[must_use]
    pub fn builder() -> StyleConfigBuilder {
        StyleConfigBuilder::default()
    }

    fn standard(matcher: StandardElementMatcher) -> Self {
        Self {
            element_matcher: Arc::new(matcher),
            match_condition: Arc::new(DefaultMatchCondition),
            catalog: Arc::new(PropertyCatalog::builtin()),
            inherit: true,
        }
    }

    /// HTML matching, the default match condition, the built-in catalog and
    /// inheritance.
    #[must_use]
    pub fn html() -> Self {
        Self::standard(StandardElementMatcher::html())
    }

    /// As [`StyleConfig::html`], with quirks-mode class and ID matching.
    #[must_use]
    pub fn quirks() -> Self {
        Self::standard(StandardElementMatcher::quirks())
    }

    /// As [`StyleConfig::html`], with fully case-sensitive XML matching.
    #[must_use]
    pub fn xml() -> Self {
        Self::standard(StandardElementMatcher::xml())
    }

    /// How element names, classes, IDs and attributes are matched.
    #[must_use]
    pub fn element_matcher(&self) -> &dyn ElementMatcher {
        self.element_matcher.as_ref()
    }

    /// Host-supplied pseudo-class states.
    #[must_use]
    pub fn match_condition(&self) -> &dyn MatchCondition {
        self.match_condition.as_ref()
    }

    /// The property catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<PropertyCatalog> {
        &self.catalog
    }

    /// Whether elements inherit from their parents. Pseudo-elements inherit
    /// from their originating element either way.
    #[must_use]
    pub const fn inherit(&self) -> bool {
        self.inherit
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::html()
    }
}

/// Builder for [`StyleConfig`]. The element matcher and the catalog are
/// required; the match condition defaults to [`DefaultMatchCondition`] and
/// inheritance is on.
#[derive(Debug)]
pub struct StyleConfigBuilder {
    element_matcher: Option<Arc<dyn ElementMatcher>>,
    match_condition: Option<Arc<dyn MatchCondition>>,
    catalog: Option<Arc<PropertyCatalog>>,
    inherit: bool,
}

impl Default for StyleConfigBuilder {
    fn default() -> Self {
        Self {
            element_matcher: None,
            match_condition: None,
            catalog: None,
            inherit: true,
        }
    }
}

impl StyleConfigBuilder {
    /// Set the element matcher.
    #[must_use]
    pub fn element_matcher(mut self, matcher: impl ElementMatcher + 'static) -> Self {
        self.element_matcher = Some(Arc::new(matcher));
        self
    }

    /// Set the match condition.
    #[must_use]
    pub fn match_condition(mut self, condition: impl MatchCondition + 'static) -> Self {
        self.match_condition = Some(Arc::new(condition));
        self
    }

    /// Set the property catalog.
    #[must_use]
    pub fn catalog(mut self, catalog: impl Into<Arc<PropertyCatalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Turn inheritance on or off.
    #[must_use]
    pub const fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }

    /// Finish the context.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingElementMatcher`] or
    /// [`ConfigError::MissingPropertyCatalog`] when a required part is absent.
    pub fn build(self) -> Result<StyleConfig, ConfigError> {
        let element_matcher = self
            .element_matcher
            .ok_or(ConfigError::MissingElementMatcher)?;
        let catalog = self.catalog.ok_or(ConfigError::MissingPropertyCatalog)?;
        Ok(StyleConfig {
            element_matcher,
            match_condition: self
                .match_condition
                .unwrap_or_else(|| Arc::new(DefaultMatchCondition)),
            catalog,
            inherit: self.inherit,
        })
    }
}
