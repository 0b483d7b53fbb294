//! Media queries and the runtime media profile.
//!
//! [Media Queries Level 3](https://www.w3.org/TR/mediaqueries-3/)
//!
//! A [`MediaSpec`] describes the output device; it decides whether a
//! [`MediaQuery`] (and therefore an `@media` block) applies. Evaluation fails
//! closed: a query with an unknown feature or an unusable value is false,
//! even when negated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use tartan_common::warning::warn_once;

use crate::error::ValueError;
use crate::values::{
    DEFAULT_FONT_SIZE_PX, FromTerms, Length, Operator, Term, TermValue, parse_terms,
    terms_to_string,
};

/// [§ 4 Media features](https://www.w3.org/TR/mediaqueries-3/#media1)
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum MediaFeature {
    /// Viewport width.
    Width,
    /// Viewport height.
    Height,
    /// Output device width.
    DeviceWidth,
    /// Output device height.
    DeviceHeight,
    /// `width / height`.
    AspectRatio,
    /// `device-width / device-height`.
    DeviceAspectRatio,
    /// Bits per colour component.
    Color,
    /// Entries in the colour lookup table.
    ColorIndex,
    /// Bits per pixel in a monochrome frame buffer.
    Monochrome,
    /// Pixel density.
    Resolution,
    /// `portrait` or `landscape`.
    Orientation,
    /// `progressive` or `interlace`.
    Scan,
    /// Grid (1) or bitmap (0) device.
    Grid,
}

impl MediaFeature {
    /// "Most media features accept optional 'min-' or 'max-' prefixes"; the
    /// discrete features do not.
    #[must_use]
    pub const fn allows_prefix(self) -> bool {
        !matches!(self, Self::Orientation | Self::Scan | Self::Grid)
    }
}

/// [§ 4.10 scan](https://www.w3.org/TR/mediaqueries-3/#scan)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scan {
    /// Progressive scanning.
    #[default]
    Progressive,
    /// Interlaced scanning.
    Interlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Exact,
    Min,
    Max,
}

/// One `(feature: value)` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaExpression {
    /// Feature name, possibly `min-`/`max-` prefixed.
    pub feature: String,
    /// Value terms; empty for the boolean form `(color)`.
    #[serde(default)]
    pub terms: Vec<Term>,
}

impl MediaExpression {
    /// An expression from a feature name and value terms.
    #[must_use]
    pub fn new(feature: &str, terms: Vec<Term>) -> Self {
        Self {
            feature: feature.to_ascii_lowercase(),
            terms,
        }
    }
}

/// [§ 2 Media Queries](https://www.w3.org/TR/mediaqueries-3/#media0)
///
/// "A media query consists of a media type and zero or more expressions that
/// check for the conditions of particular media features."
///
/// Serialized as query text; deserialized from text or from the structured
/// form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "MediaQueryInput", into = "String")]
pub struct MediaQuery {
    /// `not`
    pub negative: bool,
    /// Media type; `None` behaves like `all`.
    pub media_type: Option<String>,
    /// Conjunction of feature expressions.
    pub expressions: Vec<MediaExpression>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaQueryInput {
    Text(String),
    Parts {
        #[serde(default)]
        negative: bool,
        #[serde(default)]
        media_type: Option<String>,
        #[serde(default)]
        expressions: Vec<MediaExpression>,
    },
}

impl TryFrom<MediaQueryInput> for MediaQuery {
    type Error = ValueError;

    fn try_from(input: MediaQueryInput) -> Result<Self, Self::Error> {
        match input {
            MediaQueryInput::Text(text) => Self::parse(&text),
            MediaQueryInput::Parts {
                negative,
                media_type,
                expressions,
            } => Ok(Self {
                negative,
                media_type,
                expressions,
            }),
        }
    }
}

impl From<MediaQuery> for String {
    fn from(query: MediaQuery) -> Self {
        query.to_string()
    }
}

impl MediaQuery {
    /// A query for a media type with no expressions.
    #[must_use]
    pub fn for_type(media_type: &str) -> Self {
        Self {
            negative: false,
            media_type: Some(media_type.to_string()),
            expressions: Vec::new(),
        }
    }

    /// Add an expression.
    #[must_use]
    pub fn and(mut self, expression: MediaExpression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Negate the query.
    #[must_use]
    pub const fn negated(mut self) -> Self {
        self.negative = !self.negative;
        self
    }

    /// [§ 3 Syntax](https://www.w3.org/TR/mediaqueries-3/#syntax)
    ///
    /// Parse `[only | not]? <type> [and (<feature>[: <value>])]*` or
    /// `(<expr>) [and (<expr>)]*`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::Syntax`] for malformed text and value errors for
    /// unparseable feature values.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let syntax = |rest: &str| ValueError::Syntax {
            text: text.to_string(),
            position: text.len() - rest.len(),
        };
        let mut query = Self::default();
        let mut rest = text.trim();
        if rest.is_empty() {
            return Err(syntax(rest));
        }

        if let Some(after) = strip_keyword(rest, "not") {
            query.negative = true;
            rest = after;
        } else if let Some(after) = strip_keyword(rest, "only") {
            rest = after;
        }

        if !rest.starts_with('(') {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let media_type = &rest[..end];
            let valid = media_type
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-');
            if media_type.is_empty() || !valid {
                return Err(syntax(rest));
            }
            query.media_type = Some(media_type.to_ascii_lowercase());
            rest = rest[end..].trim_start();
        } else if query.negative {
            // "not" must be followed by a media type.
            return Err(syntax(rest));
        }

        let mut first = query.media_type.is_none();
        while !rest.is_empty() {
            if !first {
                rest = strip_keyword(rest, "and").ok_or_else(|| syntax(rest))?;
            }
            first = false;
            let inner = rest.strip_prefix('(').ok_or_else(|| syntax(rest))?;
            let close = inner.find(')').ok_or_else(|| syntax(rest))?;
            let body = &inner[..close];
            let (feature, value) = match body.split_once(':') {
                Some((feature, value)) => (feature.trim(), Some(value.trim())),
                None => (body.trim(), None),
            };
            if feature.is_empty() {
                return Err(syntax(rest));
            }
            let terms = match value {
                Some(value) if value.is_empty() => return Err(syntax(rest)),
                Some(value) => parse_terms(value)?,
                None => Vec::new(),
            };
            query.expressions.push(MediaExpression::new(feature, terms));
            rest = inner[close + 1..].trim_start();
        }
        Ok(query)
    }

    /// Parse a comma-separated media query list. Empty text is the empty list.
    ///
    /// # Errors
    ///
    /// Fails when any member fails to parse.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ValueError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        text.split(',').map(Self::parse).collect()
    }
}

/// Strip a leading keyword followed by whitespace or `(`.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let after = &text[keyword.len()..];
    if after.starts_with(char::is_whitespace) || after.starts_with('(') {
        Some(after.trim_start())
    } else {
        None
    }
}

impl fmt::Display for MediaExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            write!(f, "({})", self.feature)
        } else {
            write!(f, "({}: {})", self.feature, terms_to_string(&self.terms))
        }
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pieces: Vec<String> = Vec::new();
        match (&self.media_type, self.negative) {
            (Some(media_type), true) => pieces.push(format!("not {media_type}")),
            (Some(media_type), false) => pieces.push(media_type.clone()),
            (None, true) => pieces.push("not all".to_string()),
            (None, false) if self.expressions.is_empty() => pieces.push("all".to_string()),
            (None, false) => {}
        }
        pieces.extend(self.expressions.iter().map(ToString::to_string));
        f.write_str(&pieces.join(" and "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Profile,
    AcceptAll,
    RejectAll,
}

/// The runtime media profile queries are evaluated against.
///
/// Defaults describe a desktop screen: a 1100x850 viewport on a 1920x1200
/// device, 8 bits per colour at 96dpi, progressive scan, 16px font size.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSpec {
    filter: Filter,
    /// Media type, lowercase (`screen`, `print`, ...).
    pub media_type: String,
    /// Viewport width in px.
    pub width: f32,
    /// Viewport height in px.
    pub height: f32,
    /// Device width in px.
    pub device_width: f32,
    /// Device height in px.
    pub device_height: f32,
    /// Bits per colour component; 0 for non-colour devices.
    pub color: i64,
    /// Colour lookup table entries; 0 without a table.
    pub color_index: i64,
    /// Bits per pixel of a monochrome device; 0 otherwise.
    pub monochrome: i64,
    /// Resolution in dpi.
    pub resolution: f32,
    /// Scanning process.
    pub scan: Scan,
    /// Grid device.
    pub grid: bool,
    /// Font size in px used for `em`-based lengths.
    pub font_size: f32,
}

impl Default for MediaSpec {
    fn default() -> Self {
        Self::new("screen")
    }
}

impl MediaSpec {
    /// A default desktop profile for `media_type`.
    #[must_use]
    pub fn new(media_type: &str) -> Self {
        Self {
            filter: Filter::Profile,
            media_type: media_type.to_ascii_lowercase(),
            width: 1100.0,
            height: 850.0,
            device_width: 1920.0,
            device_height: 1200.0,
            color: 8,
            color_index: 0,
            monochrome: 0,
            resolution: 96.0,
            scan: Scan::Progressive,
            grid: false,
            font_size: DEFAULT_FONT_SIZE_PX,
        }
    }

    /// Matches every query, and the empty list.
    #[must_use]
    pub fn all() -> Self {
        Self {
            filter: Filter::AcceptAll,
            ..Self::new("all")
        }
    }

    /// Matches nothing, not even the empty list.
    #[must_use]
    pub fn none() -> Self {
        Self {
            filter: Filter::RejectAll,
            ..Self::new("none")
        }
    }

    /// Set the media type.
    #[must_use]
    pub fn with_type(mut self, media_type: &str) -> Self {
        self.media_type = media_type.to_ascii_lowercase();
        self
    }

    /// Set the viewport size in px.
    #[must_use]
    pub const fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the device size in px.
    #[must_use]
    pub const fn with_device_dimensions(mut self, width: f32, height: f32) -> Self {
        self.device_width = width;
        self.device_height = height;
        self
    }

    /// Set bits per colour component.
    #[must_use]
    pub const fn with_color(mut self, bits: i64) -> Self {
        self.color = bits;
        self
    }

    /// Set the colour lookup table size.
    #[must_use]
    pub const fn with_color_index(mut self, entries: i64) -> Self {
        self.color_index = entries;
        self
    }

    /// Set monochrome bits per pixel.
    #[must_use]
    pub const fn with_monochrome(mut self, bits: i64) -> Self {
        self.monochrome = bits;
        self
    }

    /// Set the resolution in dpi.
    #[must_use]
    pub const fn with_resolution(mut self, dpi: f32) -> Self {
        self.resolution = dpi;
        self
    }

    /// Set the scan mode.
    #[must_use]
    pub const fn with_scan(mut self, scan: Scan) -> Self {
        self.scan = scan;
        self
    }

    /// Set the grid flag.
    #[must_use]
    pub const fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Set the font size used for relative lengths.
    #[must_use]
    pub const fn with_font_size(mut self, px: f32) -> Self {
        self.font_size = px;
        self
    }

    /// [§ 2 Media Queries](https://www.w3.org/TR/mediaqueries-3/#media0)
    ///
    /// "The result of the query is true if the media type of the media query
    /// matches the media type of the device where the user agent is running
    /// [...] and all expressions in the media query are true."
    #[must_use]
    pub fn matches(&self, query: &MediaQuery) -> bool {
        match self.filter {
            Filter::AcceptAll => return true,
            Filter::RejectAll => return false,
            Filter::Profile => {}
        }
        let mut result = query.media_type.as_deref().is_none_or(|media_type| {
            media_type.eq_ignore_ascii_case("all")
                || media_type.eq_ignore_ascii_case(&self.media_type)
        });
        // Every expression is checked so that an invalid one fails the query
        // regardless of negation.
        for expression in &query.expressions {
            match self.evaluate(expression) {
                None => return false,
                Some(false) => result = false,
                Some(true) => {}
            }
        }
        result != query.negative
    }

    /// "If one or more of the media queries in the comma-separated list are
    /// true, the whole list is true". The empty list is [`Self::matches_empty`].
    #[must_use]
    pub fn matches_one_of(&self, queries: &[MediaQuery]) -> bool {
        if queries.is_empty() {
            return self.matches_empty();
        }
        queries.iter().any(|query| self.matches(query))
    }

    /// Whether an empty query list (an unconditional rule) applies.
    #[must_use]
    pub fn matches_empty(&self) -> bool {
        self.filter != Filter::RejectAll
    }

    /// Whether a single expression holds. Invalid expressions are false.
    #[must_use]
    pub fn matches_expression(&self, expression: &MediaExpression) -> bool {
        match self.filter {
            Filter::AcceptAll => true,
            Filter::RejectAll => false,
            Filter::Profile => self.evaluate(expression) == Some(true),
        }
    }

    /// `Some(result)` for a valid expression, `None` for an invalid one.
    fn evaluate(&self, expression: &MediaExpression) -> Option<bool> {
        let name = expression.feature.to_ascii_lowercase();
        let (prefix, base) = if let Some(base) = name.strip_prefix("min-") {
            (Prefix::Min, base)
        } else if let Some(base) = name.strip_prefix("max-") {
            (Prefix::Max, base)
        } else {
            (Prefix::Exact, name.as_str())
        };
        let Ok(feature) = MediaFeature::from_str(base) else {
            let _ = warn_once("Media", &format!("unknown media feature '{name}'"));
            return None;
        };
        if prefix != Prefix::Exact && !feature.allows_prefix() {
            return None;
        }

        let terms = &expression.terms;
        if terms.is_empty() {
            // "evaluated in a boolean context": true when the value would be
            // non-zero. A prefix requires a value.
            return (prefix == Prefix::Exact).then(|| self.is_nonzero(feature));
        }

        match feature {
            MediaFeature::Width => self.compare_length(prefix, terms, self.width),
            MediaFeature::Height => self.compare_length(prefix, terms, self.height),
            MediaFeature::DeviceWidth => self.compare_length(prefix, terms, self.device_width),
            MediaFeature::DeviceHeight => self.compare_length(prefix, terms, self.device_height),
            MediaFeature::AspectRatio => compare_ratio(prefix, terms, self.width, self.height),
            MediaFeature::DeviceAspectRatio => {
                compare_ratio(prefix, terms, self.device_width, self.device_height)
            }
            MediaFeature::Color => compare_integer(prefix, terms, self.color),
            MediaFeature::ColorIndex => compare_integer(prefix, terms, self.color_index),
            MediaFeature::Monochrome => compare_integer(prefix, terms, self.monochrome),
            MediaFeature::Resolution => match terms.as_slice() {
                [Term {
                    value: TermValue::Resolution(resolution),
                    ..
                }] => Some(compare(prefix, self.resolution, resolution.to_dpi())),
                _ => None,
            },
            MediaFeature::Orientation => {
                let portrait = self.height >= self.width;
                match single_ident(terms)?.to_ascii_lowercase().as_str() {
                    "portrait" => Some(portrait),
                    "landscape" => Some(!portrait),
                    _ => None,
                }
            }
            MediaFeature::Scan => Scan::from_str(single_ident(terms)?)
                .ok()
                .map(|scan| scan == self.scan),
            MediaFeature::Grid => match i64::from_terms(terms)? {
                0 => Some(!self.grid),
                1 => Some(self.grid),
                _ => None,
            },
        }
    }

    fn is_nonzero(&self, feature: MediaFeature) -> bool {
        match feature {
            MediaFeature::Width => self.width > 0.0,
            MediaFeature::Height => self.height > 0.0,
            MediaFeature::DeviceWidth => self.device_width > 0.0,
            MediaFeature::DeviceHeight => self.device_height > 0.0,
            MediaFeature::AspectRatio => self.width > 0.0 && self.height > 0.0,
            MediaFeature::DeviceAspectRatio => self.device_width > 0.0 && self.device_height > 0.0,
            MediaFeature::Color => self.color != 0,
            MediaFeature::ColorIndex => self.color_index != 0,
            MediaFeature::Monochrome => self.monochrome != 0,
            MediaFeature::Resolution => self.resolution > 0.0,
            MediaFeature::Orientation | MediaFeature::Scan => true,
            MediaFeature::Grid => self.grid,
        }
    }

    fn compare_length(&self, prefix: Prefix, terms: &[Term], actual: f32) -> Option<bool> {
        let expected = Length::from_terms(terms)?.to_px(self.font_size)?;
        Some(compare(prefix, actual, expected))
    }
}

fn compare(prefix: Prefix, actual: f32, expected: f32) -> bool {
    match prefix {
        Prefix::Min => actual >= expected,
        Prefix::Max => actual <= expected,
        Prefix::Exact => (actual - expected).abs() < 1e-3,
    }
}

fn compare_integer(prefix: Prefix, terms: &[Term], actual: i64) -> Option<bool> {
    let expected = i64::from_terms(terms)?;
    Some(match prefix {
        Prefix::Min => actual >= expected,
        Prefix::Max => actual <= expected,
        Prefix::Exact => actual == expected,
    })
}

/// [§ 4.6 aspect-ratio](https://www.w3.org/TR/mediaqueries-3/#aspect-ratio):
/// "a positive <integer> followed by optional whitespace, followed by a
/// solidus ('/'), followed by optional whitespace, followed by a positive
/// <integer>".
#[allow(clippy::cast_precision_loss)]
fn compare_ratio(prefix: Prefix, terms: &[Term], width: f32, height: f32) -> Option<bool> {
    let [
        Term {
            value: TermValue::Integer(numerator),
            ..
        },
        Term {
            operator: Some(Operator::Slash),
            value: TermValue::Integer(denominator),
        },
    ] = terms
    else {
        return None;
    };
    if *numerator <= 0 || *denominator <= 0 || height <= 0.0 {
        return None;
    }
    let expected = *numerator as f32 / *denominator as f32;
    Some(compare(prefix, width / height, expected))
}

fn single_ident(terms: &[Term]) -> Option<&str> {
    match terms {
        [only] => only.as_ident(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str) -> MediaQuery {
        MediaQuery::parse(text).expect("valid media query")
    }

    #[test]
    fn test_parse_query_forms() {
        let q = query("not screen and (min-width: 1000px) and (color)");
        assert!(q.negative);
        assert_eq!(q.media_type.as_deref(), Some("screen"));
        assert_eq!(q.expressions.len(), 2);
        assert_eq!(q.expressions[0].feature, "min-width");
        assert!(q.expressions[1].terms.is_empty());
        assert_eq!(q.to_string(), "not screen and (min-width: 1000px) and (color)");

        let bare = query("(max-width: 500px)");
        assert_eq!(bare.media_type, None);
        assert_eq!(query("only print").media_type.as_deref(), Some("print"));
    }

    #[test]
    fn test_parse_query_errors() {
        assert!(MediaQuery::parse("").is_err());
        assert!(MediaQuery::parse("screen (color)").is_err());
        assert!(MediaQuery::parse("screen and (width:)").is_err());
        assert!(MediaQuery::parse("not (color)").is_err());
        assert!(MediaQuery::parse("screen and (width: 10px").is_err());
    }

    #[test]
    fn test_type_matching() {
        let spec = MediaSpec::new("screen");
        assert!(spec.matches(&query("screen")));
        assert!(spec.matches(&query("SCREEN")));
        assert!(spec.matches(&query("all")));
        assert!(!spec.matches(&query("print")));
        assert!(spec.matches(&query("not print")));
        assert!(!spec.matches(&query("not screen")));
    }

    #[test]
    fn test_width_queries() {
        let spec = MediaSpec::default().with_dimensions(1100.0, 850.0);
        assert!(spec.matches(&query("screen and (min-width: 1000px)")));
        assert!(!spec.matches(&query("screen and (min-width: 1200px)")));
        assert!(spec.matches(&query("(max-width: 70em)")));
        assert!(spec.matches(&query("(width: 1100px)")));
        assert!(spec.matches(&query("(orientation: landscape)")));
        assert!(spec.matches(&query("(aspect-ratio: 22/17)")));
        assert!(spec.matches(&query("(min-resolution: 2dppx)")) == false);
        assert!(spec.matches(&query("(min-color: 4)")));
        assert!(spec.matches(&query("(grid: 0)")));
        assert!(spec.matches(&query("(scan: progressive)")));
    }

    #[test]
    fn test_invalid_expressions_fail_closed() {
        let spec = MediaSpec::default();
        assert!(!spec.matches(&query("(bogus-feature: 1)")));
        assert!(!spec.matches(&query("not screen and (bogus-feature: 1)")));
        assert!(!spec.matches(&query("not print and (min-orientation: portrait)")));
        assert!(!spec.matches(&query("(min-width)")));
        assert!(!spec.matches(&query("(width: red)")));
        assert!(!spec.matches(&query("(aspect-ratio: 16)")));
        assert!(!spec.matches(&query("(width: 10vw)")));
    }

    #[test]
    fn test_sentinels() {
        let print_only = query("print and (max-width: 1px)");
        assert!(MediaSpec::all().matches(&print_only));
        assert!(MediaSpec::all().matches_one_of(&[]));
        assert!(!MediaSpec::none().matches(&query("all")));
        assert!(!MediaSpec::none().matches_one_of(&[]));
        assert!(MediaSpec::default().matches_one_of(&[]));
    }

    #[test]
    fn test_matches_expression() {
        let spec = MediaSpec::default();
        assert!(spec.matches_expression(&MediaExpression::new("color", vec![])));
        assert!(!spec.matches_expression(&MediaExpression::new("monochrome", vec![])));
        assert!(!spec.matches_expression(&MediaExpression::new("max-color", vec![])));
    }

    #[test]
    fn test_query_serde_accepts_text() {
        let parsed: MediaQuery =
            serde_json::from_str(r#""screen and (min-width: 600px)""#).expect("valid json");
        assert_eq!(parsed, query("screen and (min-width: 600px)"));
        let json = serde_json::to_string(&parsed).expect("serializable");
        assert_eq!(json, r#""screen and (min-width: 600px)""#);
    }
}
