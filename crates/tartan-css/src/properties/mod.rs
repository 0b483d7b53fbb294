//! Property catalog and generic property values.
//!
//! [CSS Cascading and Inheritance Level 4](https://www.w3.org/TR/css-cascade-4/)
//!
//! Every property the cascade knows about is a [`PropertyInfo`] record in a
//! [`PropertyCatalog`]: whether it is inherited, whether it holds one value or
//! a comma-separated list, its initial value, and the keywords it accepts.
//! Values are carried as one generic [`PropertyValue`] type rather than one
//! Rust type per property.

pub mod shorthand;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::values::{Operator, Term, parse_terms, terms_to_string};

/// Whether a property holds one value or a comma-separated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// One value.
    #[default]
    Simple,
    /// Comma-separated layers (`font-family`, `background-image`, ...).
    List,
}

/// A property value before or after defaulting.
///
/// [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords):
/// `Inherit`, `Initial` and `Unset` are placeholders until
/// [`NodeData::concretize`](crate::style::NodeData::concretize) replaces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    /// A keyword from the property's keyword set, lowercase.
    Keyword(String),
    /// Any other value, as terms.
    Typed(Vec<Term>),
    /// [§ 7.3.2 Inheriting](https://www.w3.org/TR/css-cascade-4/#inherit)
    Inherit,
    /// [§ 7.3.1 Resetting](https://www.w3.org/TR/css-cascade-4/#initial)
    Initial,
    /// [§ 7.3.3 Erasing](https://www.w3.org/TR/css-cascade-4/#inherit-initial)
    Unset,
}

impl PropertyValue {
    /// The CSS-wide keyword placeholder for `keyword`, if it is one.
    #[must_use]
    pub fn css_wide(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "inherit" => Some(Self::Inherit),
            "initial" => Some(Self::Initial),
            "unset" => Some(Self::Unset),
            _ => None,
        }
    }

    /// A value for a property outside the catalog: placeholders are still
    /// recognised, everything else is kept verbatim.
    #[must_use]
    pub fn from_terms(terms: &[Term]) -> Self {
        match terms {
            [only] => only
                .as_ident()
                .and_then(Self::css_wide)
                .unwrap_or_else(|| Self::Typed(terms.to_vec())),
            _ => Self::Typed(terms.to_vec()),
        }
    }

    /// Whether this is `inherit`, `initial` or `unset`.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Inherit | Self::Initial | Self::Unset)
    }

    /// The value as terms; keywords and placeholders become identifiers.
    #[must_use]
    pub fn to_terms(&self) -> Vec<Term> {
        match self {
            Self::Keyword(keyword) => vec![Term::ident(keyword)],
            Self::Typed(terms) => terms.clone(),
            Self::Inherit => vec![Term::ident("inherit")],
            Self::Initial => vec![Term::ident("initial")],
            Self::Unset => vec![Term::ident("unset")],
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(keyword) => f.write_str(keyword),
            Self::Typed(terms) => f.write_str(&terms_to_string(terms)),
            Self::Inherit => f.write_str("inherit"),
            Self::Initial => f.write_str("initial"),
            Self::Unset => f.write_str("unset"),
        }
    }
}

/// Everything the cascade needs to know about one property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    /// Property name, lowercase.
    pub name: String,
    /// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
    pub inherited: bool,
    /// One value or a list.
    pub value_type: ValueType,
    /// [§ 7.1 Initial Values](https://www.w3.org/TR/css-cascade-4/#initial-values)
    pub default: PropertyValue,
    /// Keywords the property accepts, lowercase.
    pub keywords: Vec<String>,
    /// Whether anything but a keyword is rejected.
    pub keyword_only: bool,
}

impl PropertyInfo {
    /// A property whose initial value is given as CSS text. A default that is
    /// one of `keywords` becomes a [`PropertyValue::Keyword`].
    #[must_use]
    pub fn new(name: &str, inherited: bool, default: &str, keywords: &[&str]) -> Self {
        let keywords: Vec<String> = keywords.iter().map(|k| k.to_ascii_lowercase()).collect();
        let default_value = if keywords.iter().any(|k| k.eq_ignore_ascii_case(default)) {
            PropertyValue::Keyword(default.to_ascii_lowercase())
        } else {
            // Catalog defaults are plain CSS; keep unparseable text as an identifier.
            PropertyValue::Typed(
                parse_terms(default)
                    .ok()
                    .filter(|terms| !terms.is_empty())
                    .unwrap_or_else(|| vec![Term::ident(default)]),
            )
        };
        Self {
            name: name.to_ascii_lowercase(),
            inherited,
            value_type: ValueType::Simple,
            default: default_value,
            keywords,
            keyword_only: false,
        }
    }

    /// Accept only keywords.
    #[must_use]
    pub const fn keyword_only(mut self) -> Self {
        self.keyword_only = true;
        self
    }

    /// Hold a comma-separated list.
    #[must_use]
    pub const fn list(mut self) -> Self {
        self.value_type = ValueType::List;
        self
    }

    /// Whether `keyword` is in the keyword set.
    #[must_use]
    pub fn accepts_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }

    /// Interpret one value (one list segment for list properties).
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::UnknownKeyword`] when a keyword-only property
    /// receives anything but one of its keywords, and [`ValueError::Empty`]
    /// for no terms.
    pub fn parse(&self, terms: &[Term]) -> Result<PropertyValue, ValueError> {
        let ident = match terms {
            [] => {
                return Err(ValueError::Empty {
                    property: self.name.clone(),
                });
            }
            [only] => only.as_ident(),
            _ => None,
        };
        if let Some(ident) = ident {
            if let Some(placeholder) = PropertyValue::css_wide(ident) {
                return Ok(placeholder);
            }
            if self.accepts_keyword(ident) {
                return Ok(PropertyValue::Keyword(ident.to_ascii_lowercase()));
            }
        }
        if self.keyword_only {
            return Err(ValueError::UnknownKeyword {
                property: self.name.clone(),
                keyword: terms_to_string(terms),
            });
        }
        Ok(PropertyValue::Typed(terms.to_vec()))
    }

    /// Interpret a whole declaration value: one slot for simple properties,
    /// one slot per comma-separated segment for list properties. A CSS-wide
    /// keyword must stand alone.
    ///
    /// # Errors
    ///
    /// As [`PropertyInfo::parse`], per segment.
    pub fn parse_values(&self, terms: &[Term]) -> Result<Vec<PropertyValue>, ValueError> {
        if self.value_type == ValueType::Simple {
            return Ok(vec![self.parse(terms)?]);
        }
        let segments = split_list(terms);
        if segments.len() == 1 {
            return Ok(vec![self.parse(&segments[0])?]);
        }
        segments
            .iter()
            .map(|segment| match self.parse(segment)? {
                placeholder if placeholder.is_placeholder() => Err(ValueError::UnknownKeyword {
                    property: self.name.clone(),
                    keyword: placeholder.to_string(),
                }),
                value => Ok(value),
            })
            .collect()
    }
}

/// Split terms at comma operators. The first term of each segment loses its
/// operator.
#[must_use]
pub fn split_list(terms: &[Term]) -> Vec<Vec<Term>> {
    let mut segments: Vec<Vec<Term>> = vec![Vec::new()];
    for term in terms {
        if term.operator == Some(Operator::Comma) {
            segments.push(Vec::new());
        }
        if let Some(segment) = segments.last_mut() {
            let mut term = term.clone();
            if segment.is_empty() {
                term.operator = None;
            }
            segment.push(term);
        }
    }
    segments
}

/// The registry of known properties.
#[derive(Debug, Clone, Default)]
pub struct PropertyCatalog {
    properties: HashMap<String, PropertyInfo>,
}

impl PropertyCatalog {
    /// No properties.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in CSS 2.1 / CSS 3 properties.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for entry in BUILTIN {
            let mut info =
                PropertyInfo::new(entry.name, entry.inherited, entry.default, entry.keywords);
            if entry.keyword_only {
                info = info.keyword_only();
            }
            if entry.list {
                info = info.list();
            }
            catalog.register(info);
        }
        catalog
    }

    /// Add or replace a property.
    pub fn register(&mut self, info: PropertyInfo) {
        let _ = self.properties.insert(info.name.clone(), info);
    }

    /// Look up a property. `None` is a catalog miss.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }

    /// The initial value of a property.
    #[must_use]
    pub fn default_value(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name).map(|info| &info.default)
    }

    /// Whether a known property inherits. Unknown properties do not.
    #[must_use]
    pub fn is_inherited(&self, name: &str) -> bool {
        self.get(name).is_some_and(|info| info.inherited)
    }

    /// All properties, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyInfo> {
        self.properties.values()
    }

    /// Number of registered properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

struct Entry {
    name: &'static str,
    inherited: bool,
    default: &'static str,
    keywords: &'static [&'static str],
    keyword_only: bool,
    list: bool,
}

/// Keyword-only property.
const fn kw(
    name: &'static str,
    inherited: bool,
    default: &'static str,
    keywords: &'static [&'static str],
) -> Entry {
    Entry {
        name,
        inherited,
        default,
        keywords,
        keyword_only: true,
        list: false,
    }
}

/// Property taking keywords or other values.
const fn val(
    name: &'static str,
    inherited: bool,
    default: &'static str,
    keywords: &'static [&'static str],
) -> Entry {
    Entry {
        name,
        inherited,
        default,
        keywords,
        keyword_only: false,
        list: false,
    }
}

/// List-valued property.
const fn list(
    name: &'static str,
    inherited: bool,
    default: &'static str,
    keywords: &'static [&'static str],
) -> Entry {
    Entry {
        name,
        inherited,
        default,
        keywords,
        keyword_only: false,
        list: true,
    }
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
pub const BORDER_STYLES: &[&str] = &[
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
pub const BORDER_WIDTHS: &[&str] = &["thin", "medium", "thick"];

const AUTO: &[&str] = &["auto"];
const NONE: &[&str] = &["none"];
const NORMAL: &[&str] = &["normal"];
const COLOR: &[&str] = &["currentcolor", "transparent"];
const BREAK: &[&str] = &["auto", "always", "avoid", "left", "right"];
const ALIGN: &[&str] = &[
    "flex-start", "flex-end", "center", "baseline", "stretch", "start", "end", "normal",
];

#[rustfmt::skip]
const BUILTIN: &[Entry] = &[
    // Colour and background
    val("color", true, "black", COLOR),
    val("background-color", false, "transparent", COLOR),
    list("background-image", false, "none", NONE),
    list("background-position", false, "0% 0%", &["left", "right", "top", "bottom", "center"]),
    list("background-size", false, "auto", &["auto", "cover", "contain"]),
    Entry {
        keyword_only: true,
        ..list("background-repeat", false, "repeat", &[
            "repeat", "repeat-x", "repeat-y", "no-repeat", "space", "round",
        ])
    },
    Entry {
        keyword_only: true,
        ..list("background-attachment", false, "scroll", &["scroll", "fixed", "local"])
    },
    Entry {
        keyword_only: true,
        ..list("background-clip", false, "border-box", &[
            "border-box", "padding-box", "content-box",
        ])
    },
    Entry {
        keyword_only: true,
        ..list("background-origin", false, "padding-box", &[
            "border-box", "padding-box", "content-box",
        ])
    },
    val("opacity", false, "1", &[]),
    // Fonts and text
    list("font-family", true, "serif", &[
        "serif", "sans-serif", "monospace", "cursive", "fantasy", "system-ui",
    ]),
    val("font-size", true, "medium", &[
        "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "larger",
        "smaller",
    ]),
    kw("font-style", true, "normal", &["normal", "italic", "oblique"]),
    kw("font-variant", true, "normal", &["normal", "small-caps"]),
    val("font-weight", true, "normal", &["normal", "bold", "bolder", "lighter"]),
    val("line-height", true, "normal", NORMAL),
    val("letter-spacing", true, "normal", NORMAL),
    val("word-spacing", true, "normal", NORMAL),
    val("text-indent", true, "0", &[]),
    kw("text-align", true, "start", &["start", "end", "left", "right", "center", "justify"]),
    kw("text-transform", true, "none", &["none", "capitalize", "uppercase", "lowercase"]),
    val("text-decoration", false, "none", &[
        "none", "underline", "overline", "line-through", "blink",
    ]),
    list("text-shadow", true, "none", NONE),
    kw("white-space", true, "normal", &[
        "normal", "pre", "nowrap", "pre-wrap", "pre-line", "break-spaces",
    ]),
    kw("word-break", true, "normal", &["normal", "break-all", "keep-all", "break-word"]),
    kw("direction", true, "ltr", &["ltr", "rtl"]),
    kw("unicode-bidi", false, "normal", &[
        "normal", "embed", "isolate", "bidi-override", "isolate-override", "plaintext",
    ]),
    val("vertical-align", false, "baseline", &[
        "baseline", "sub", "super", "top", "text-top", "middle", "bottom", "text-bottom",
    ]),
    val("quotes", true, "auto", &["auto", "none"]),
    // Visual formatting
    kw("display", false, "inline", &[
        "inline", "block", "list-item", "inline-block", "table", "inline-table", "table-row-group",
        "table-header-group", "table-footer-group", "table-row", "table-column-group",
        "table-column",
        "table-cell", "table-caption", "flex", "inline-flex", "grid", "inline-grid", "contents",
        "none",
    ]),
    kw("position", false, "static", &["static", "relative", "absolute", "fixed", "sticky"]),
    kw("float", false, "none", &["none", "left", "right"]),
    kw("clear", false, "none", &["none", "left", "right", "both"]),
    kw("visibility", true, "visible", &["visible", "hidden", "collapse"]),
    kw("overflow", false, "visible", &["visible", "hidden", "scroll", "auto", "clip"]),
    kw("overflow-x", false, "visible", &["visible", "hidden", "scroll", "auto", "clip"]),
    kw("overflow-y", false, "visible", &["visible", "hidden", "scroll", "auto", "clip"]),
    val("top", false, "auto", AUTO),
    val("right", false, "auto", AUTO),
    val("bottom", false, "auto", AUTO),
    val("left", false, "auto", AUTO),
    val("z-index", false, "auto", AUTO),
    val("clip", false, "auto", AUTO),
    kw("box-sizing", false, "content-box", &["content-box", "border-box"]),
    // Box model
    val("width", false, "auto", AUTO),
    val("height", false, "auto", AUTO),
    val("min-width", false, "0", AUTO),
    val("min-height", false, "0", AUTO),
    val("max-width", false, "none", NONE),
    val("max-height", false, "none", NONE),
    val("margin-top", false, "0", AUTO),
    val("margin-right", false, "0", AUTO),
    val("margin-bottom", false, "0", AUTO),
    val("margin-left", false, "0", AUTO),
    val("padding-top", false, "0", &[]),
    val("padding-right", false, "0", &[]),
    val("padding-bottom", false, "0", &[]),
    val("padding-left", false, "0", &[]),
    val("border-top-width", false, "medium", BORDER_WIDTHS),
    val("border-right-width", false, "medium", BORDER_WIDTHS),
    val("border-bottom-width", false, "medium", BORDER_WIDTHS),
    val("border-left-width", false, "medium", BORDER_WIDTHS),
    kw("border-top-style", false, "none", BORDER_STYLES),
    kw("border-right-style", false, "none", BORDER_STYLES),
    kw("border-bottom-style", false, "none", BORDER_STYLES),
    kw("border-left-style", false, "none", BORDER_STYLES),
    val("border-top-color", false, "currentcolor", COLOR),
    val("border-right-color", false, "currentcolor", COLOR),
    val("border-bottom-color", false, "currentcolor", COLOR),
    val("border-left-color", false, "currentcolor", COLOR),
    val("outline-width", false, "medium", BORDER_WIDTHS),
    kw("outline-style", false, "none", BORDER_STYLES),
    val("outline-color", false, "currentcolor", &["currentcolor", "invert"]),
    list("box-shadow", false, "none", NONE),
    // Tables
    kw("border-collapse", true, "separate", &["separate", "collapse"]),
    val("border-spacing", true, "0", &[]),
    kw("caption-side", true, "top", &["top", "bottom"]),
    kw("empty-cells", true, "show", &["show", "hide"]),
    kw("table-layout", false, "auto", &["auto", "fixed"]),
    // Lists and generated content
    kw("list-style-type", true, "disc", &[
        "disc", "circle", "square", "decimal", "decimal-leading-zero", "lower-roman", "upper-roman",
        "lower-greek", "lower-latin", "upper-latin", "armenian", "georgian", "lower-alpha",
        "upper-alpha", "none",
    ]),
    kw("list-style-position", true, "outside", &["inside", "outside"]),
    val("list-style-image", true, "none", NONE),
    val("content", false, "normal", &[
        "normal", "none", "open-quote", "close-quote", "no-open-quote", "no-close-quote",
    ]),
    val("counter-reset", false, "none", NONE),
    val("counter-increment", false, "none", NONE),
    // Paged media
    kw("page-break-before", false, "auto", BREAK),
    kw("page-break-after", false, "auto", BREAK),
    kw("page-break-inside", false, "auto", &["auto", "avoid"]),
    val("orphans", true, "2", &[]),
    val("widows", true, "2", &[]),
    // Flexbox
    kw("flex-direction", false, "row", &["row", "row-reverse", "column", "column-reverse"]),
    kw("flex-wrap", false, "nowrap", &["nowrap", "wrap", "wrap-reverse"]),
    val("flex-grow", false, "0", &[]),
    val("flex-shrink", false, "1", &[]),
    val("flex-basis", false, "auto", &["auto", "content"]),
    val("order", false, "0", &[]),
    kw("justify-content", false, "flex-start", &[
        "flex-start", "flex-end", "center", "space-between", "space-around", "space-evenly",
        "start", "end", "normal",
    ]),
    kw("align-items", false, "stretch", ALIGN),
    kw("align-self", false, "auto", &[
        "auto", "flex-start", "flex-end", "center", "baseline", "stretch", "start", "end", "normal",
    ]),
    kw("align-content", false, "stretch", &[
        "flex-start", "flex-end", "center", "space-between", "space-around", "space-evenly",
        "stretch", "normal",
    ]),
    val("row-gap", false, "normal", NORMAL),
    val("column-gap", false, "normal", NORMAL),
    // Interaction and effects
    list("cursor", true, "auto", &[
        "auto", "default", "none", "pointer", "text", "wait", "move", "help", "crosshair",
        "progress",
        "not-allowed",
    ]),
    kw("pointer-events", true, "auto", &["auto", "none"]),
    kw("resize", false, "none", &["none", "both", "horizontal", "vertical"]),
    val("transform", false, "none", NONE),
    list("transition-property", false, "all", &["all", "none"]),
    list("transition-duration", false, "0s", &[]),
    list("transition-timing-function", false, "ease", &[
        "ease", "linear", "ease-in", "ease-out", "ease-in-out",
    ]),
    list("animation-name", false, "none", NONE),
    list("animation-duration", false, "0s", &[]),
];
