//! Per-element property accumulation.
//!
//! [§ 7 Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting)
//!
//! A [`NodeData`] receives the element's matched declarations in ascending
//! cascade order, takes inheritable values from its parent, and finally
//! resolves the `inherit` / `initial` / `unset` keywords.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tartan_common::warning::warn_once;

use crate::cascade::{CascadePriority, MatchedDeclaration};
use crate::properties::{PropertyCatalog, PropertyValue, shorthand};
use crate::stylesheet::Declaration;
use crate::values::{FromTerms, Term};

#[derive(Debug, Clone, PartialEq)]
struct CascadedValue {
    values: Vec<PropertyValue>,
    source: Declaration,
    priority: CascadePriority,
}

#[derive(Debug, Clone, PartialEq)]
struct InheritedValue {
    values: Vec<PropertyValue>,
    source: Option<Declaration>,
}

/// The style of one element (or one pseudo-element).
///
/// Read accessors resolve a property from the element's own cascaded value,
/// then its inherited value, then the catalog's initial value.
#[derive(Debug, Clone)]
pub struct NodeData {
    catalog: Arc<PropertyCatalog>,
    cascaded: BTreeMap<String, CascadedValue>,
    inherited: BTreeMap<String, InheritedValue>,
    /// Parent values remembered for own `inherit` / `unset` placeholders.
    parent_values: HashMap<String, Vec<PropertyValue>>,
}

impl PartialEq for NodeData {
    fn eq(&self, other: &Self) -> bool {
        self.cascaded == other.cascaded && self.inherited == other.inherited
    }
}

impl NodeData {
    /// An empty style backed by `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<PropertyCatalog>) -> Self {
        Self {
            catalog,
            cascaded: BTreeMap::new(),
            inherited: BTreeMap::new(),
            parent_values: HashMap::new(),
        }
    }

    /// The catalog this style reads defaults from.
    #[must_use]
    pub fn catalog(&self) -> &PropertyCatalog {
        &self.catalog
    }

    /// Fold in one matched declaration.
    ///
    /// Shorthands are expanded first. Each longhand replaces the stored value
    /// unless the stored one has a higher cascade priority. List properties
    /// are replaced as a whole. A value a keyword-only property rejects is
    /// dropped with a warning; properties outside the catalog are kept
    /// verbatim.
    pub fn push(&mut self, matched: &MatchedDeclaration<'_>) {
        match shorthand::expand(matched.declaration) {
            Some(longhands) => {
                for longhand in &longhands {
                    self.push_longhand(longhand, matched.priority);
                }
            }
            None => self.push_longhand(matched.declaration, matched.priority),
        }
    }

    fn push_longhand(&mut self, declaration: &Declaration, priority: CascadePriority) {
        let name = declaration.property.as_str();
        if self
            .cascaded
            .get(name)
            .is_some_and(|existing| priority < existing.priority)
        {
            return;
        }
        let values = match self.catalog.get(name) {
            Some(info) => match info.parse_values(&declaration.terms) {
                Ok(values) => values,
                Err(error) => {
                    let _ = warn_once("Cascade", &format!("dropping '{declaration}': {error}"));
                    return;
                }
            },
            None => {
                let _ = warn_once("Cascade", &format!("unknown property '{name}'"));
                vec![PropertyValue::from_terms(&declaration.terms)]
            }
        };
        let _ = self.cascaded.insert(
            name.to_string(),
            CascadedValue {
                values,
                source: declaration.clone(),
                priority,
            },
        );
    }

    /// [§ 7.2 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
    ///
    /// "Inherited properties which are not set on the element take the
    /// parent's computed value." Own `inherit` (and `unset` on inherited
    /// properties) remember the parent's value for [`NodeData::concretize`].
    pub fn inherit_from(&mut self, parent: &Self) {
        for info in self.catalog.iter().filter(|info| info.inherited) {
            if self.cascaded.contains_key(&info.name) {
                continue;
            }
            if let Some((values, source)) = parent.resolved(&info.name) {
                let _ = self.inherited.insert(
                    info.name.clone(),
                    InheritedValue {
                        values: values.to_vec(),
                        source: source.cloned(),
                    },
                );
            }
        }

        for (name, own) in &self.cascaded {
            let wants_parent = match own.values.as_slice() {
                [PropertyValue::Inherit] => true,
                [PropertyValue::Unset] => self.catalog.is_inherited(name),
                _ => false,
            };
            if !wants_parent {
                continue;
            }
            let remembered = parent
                .resolved(name)
                .map(|(values, _)| values.to_vec())
                .filter(|values| !values.iter().any(PropertyValue::is_placeholder))
                .or_else(|| self.catalog.default_value(name).map(|v| vec![v.clone()]));
            if let Some(values) = remembered {
                let _ = self.parent_values.insert(name.clone(), values);
            }
        }
    }

    /// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
    ///
    /// Replace every placeholder: `inherit` by the remembered parent value or
    /// the initial value, `initial` by the initial value, `unset` by `inherit`
    /// for inherited properties and `initial` otherwise. A property with no
    /// resolvable value is removed. Calling this twice changes nothing.
    pub fn concretize(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let initial = |name: &str| catalog.default_value(name).map(|value| vec![value.clone()]);

        let mut removed = Vec::new();
        for (name, own) in &mut self.cascaded {
            let [placeholder] = own.values.as_slice() else {
                continue;
            };
            let inherit = match placeholder {
                PropertyValue::Inherit => true,
                PropertyValue::Unset => catalog.is_inherited(name),
                PropertyValue::Initial => false,
                PropertyValue::Keyword(_) | PropertyValue::Typed(_) => continue,
            };
            let resolved = if inherit {
                self.parent_values.get(name).cloned().or_else(|| initial(name))
            } else {
                initial(name)
            };
            match resolved {
                Some(values) => own.values = values,
                None => removed.push(name.clone()),
            }
        }
        for name in removed {
            let _ = self.cascaded.remove(&name);
        }

        // Only reachable when the parent itself was never concretized.
        self.inherited.retain(|name, inherited| {
            if inherited.values.iter().any(PropertyValue::is_placeholder) {
                match initial(name) {
                    Some(values) => inherited.values = values,
                    None => return false,
                }
            }
            true
        });
    }

    /// Own value, else inherited value, with the declaration that set it.
    fn resolved(&self, name: &str) -> Option<(&[PropertyValue], Option<&Declaration>)> {
        if let Some(own) = self.cascaded.get(name) {
            return Some((&own.values, Some(&own.source)));
        }
        self.inherited
            .get(name)
            .map(|inherited| (inherited.values.as_slice(), inherited.source.as_ref()))
    }

    /// With `include_inherited`, the own value, else the inherited value, else
    /// the initial value. Without it, only the own cascaded value.
    fn values(&self, name: &str, include_inherited: bool) -> Option<&[PropertyValue]> {
        if !include_inherited {
            return self.cascaded.get(name).map(|own| own.values.as_slice());
        }
        self.resolved(name)
            .map(|(values, _)| values)
            .or_else(|| self.catalog.default_value(name).map(std::slice::from_ref))
    }

    /// The first (or only) value of a property.
    ///
    /// Every reader taking `include_inherited` falls back to the inherited and
    /// then the initial value when it is `true`, and reads only the element's
    /// own declarations when it is `false`.
    #[must_use]
    pub fn property(&self, name: &str, include_inherited: bool) -> Option<&PropertyValue> {
        self.property_at(name, 0, include_inherited)
    }

    /// The value in list slot `index`.
    #[must_use]
    pub fn property_at(
        &self,
        name: &str,
        index: usize,
        include_inherited: bool,
    ) -> Option<&PropertyValue> {
        self.values(name, include_inherited)?.get(index)
    }

    /// The first value as terms. Keywords become identifier terms.
    #[must_use]
    pub fn value(&self, name: &str, include_inherited: bool) -> Option<Vec<Term>> {
        self.value_at(name, 0, include_inherited)
    }

    /// The value in list slot `index` as terms.
    #[must_use]
    pub fn value_at(&self, name: &str, index: usize, include_inherited: bool) -> Option<Vec<Term>> {
        self.property_at(name, index, include_inherited)
            .map(PropertyValue::to_terms)
    }

    /// The first resolved value converted to `T`.
    #[must_use]
    pub fn typed_value<T: FromTerms>(&self, name: &str) -> Option<T> {
        self.value(name, true).and_then(|terms| T::from_terms(&terms))
    }

    /// The first resolved value if it is a keyword.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&str> {
        match self.property(name, true)? {
            PropertyValue::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    /// The element's own cascaded value, ignoring inheritance and defaults.
    #[must_use]
    pub fn specified_value(&self, name: &str) -> Option<&PropertyValue> {
        self.property(name, false)
    }

    /// The whole value as CSS text; list slots are joined with `, `.
    #[must_use]
    pub fn as_string(&self, name: &str, include_inherited: bool) -> Option<String> {
        let values = self.values(name, include_inherited)?;
        Some(
            values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        )
    }

    /// Number of list slots; 0 when there is no value to read.
    #[must_use]
    pub fn list_size(&self, name: &str, include_inherited: bool) -> usize {
        self.values(name, include_inherited)
            .map_or(0, <[PropertyValue]>::len)
    }

    /// The declaration that produced the value. Initial values have none.
    #[must_use]
    pub fn source_declaration(&self, name: &str, include_inherited: bool) -> Option<&Declaration> {
        if include_inherited {
            self.resolved(name).and_then(|(_, source)| source)
        } else {
            self.cascaded.get(name).map(|own| &own.source)
        }
    }

    /// Cascade priority of the element's own value.
    #[must_use]
    pub fn priority(&self, name: &str) -> Option<CascadePriority> {
        self.cascaded.get(name).map(|own| own.priority)
    }

    /// Whether the value came from the parent rather than the element's own
    /// declarations.
    #[must_use]
    pub fn is_inherited(&self, name: &str) -> bool {
        !self.cascaded.contains_key(name) && self.inherited.contains_key(name)
    }

    /// Names of all own and inherited properties, sorted.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.cascaded
            .keys()
            .chain(self.inherited.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    /// Whether nothing was cascaded or inherited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cascaded.is_empty() && self.inherited.is_empty()
    }
}
