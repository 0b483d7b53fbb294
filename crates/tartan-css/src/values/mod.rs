//! Typed CSS value terms.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//!
//! A declaration value is an ordered list of [`Term`]s. Each term after the
//! first records the [`Operator`] that joined it to its predecessor, so
//! `1px 2px, 3px` is three terms with operators `None`, `Space`, `Comma`.

mod color;
mod parse;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

pub use color::Rgba;
pub use parse::parse_terms;
pub(crate) use parse::split_top_level;

/// User agent default font size, used to resolve font-relative lengths when
/// no other size is known.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// The separator joining a term to the previous one.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operator {
    /// Juxtaposition (`1px 2px`).
    Space,
    /// `,`
    Comma,
    /// `/`
    Slash,
}

/// [§ 6 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LengthUnit {
    /// "1px = 1/96th of 1in"
    Px,
    /// "Equal to the computed value of the font-size property of the element"
    Em,
    /// "Equal to the computed value of font-size on the root element"
    Rem,
    /// x-height, approximated as half an em.
    Ex,
    /// "0" advance measure, approximated as half an em.
    Ch,
    /// 1% of the viewport width.
    Vw,
    /// 1% of the viewport height.
    Vh,
    /// 1% of the smaller viewport dimension.
    Vmin,
    /// 1% of the larger viewport dimension.
    Vmax,
    /// "1cm = 96px/2.54"
    Cm,
    /// "1mm = 1/10th of 1cm"
    Mm,
    /// "1in = 2.54cm = 96px"
    In,
    /// "1pt = 1/72th of 1in"
    Pt,
    /// "1pc = 1/6th of 1in"
    Pc,
}

/// [§ 7.4 Resolution Units](https://www.w3.org/TR/css-values-4/#resolution)
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResolutionUnit {
    /// Dots per inch.
    Dpi,
    /// Dots per centimetre.
    Dpcm,
    /// Dots per CSS pixel.
    Dppx,
}

/// [§ 7.2 Duration Units](https://www.w3.org/TR/css-values-4/#time)
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimeUnit {
    /// Seconds.
    S,
    /// Milliseconds.
    Ms,
}

/// [§ 7.1 Angle Units](https://www.w3.org/TR/css-values-4/#angles)
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AngleUnit {
    /// Degrees.
    Deg,
    /// Radians.
    Rad,
    /// Gradians.
    Grad,
    /// Turns.
    Turn,
}

/// A number with a unit of type `U`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension<U> {
    /// Numeric part.
    pub value: f32,
    /// Unit part.
    pub unit: U,
}

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
pub type Length = Dimension<LengthUnit>;
/// [§ 7.4 Resolution](https://www.w3.org/TR/css-values-4/#resolution)
pub type Resolution = Dimension<ResolutionUnit>;
/// [§ 7.2 Duration](https://www.w3.org/TR/css-values-4/#time)
pub type Time = Dimension<TimeUnit>;
/// [§ 7.1 Angles](https://www.w3.org/TR/css-values-4/#angles)
pub type Angle = Dimension<AngleUnit>;

impl Length {
    /// A length in CSS pixels.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    ///
    /// Convert to pixels. Font-relative units resolve against `font_size`;
    /// viewport units have no fixed size here and yield `None`.
    #[must_use]
    pub fn to_px(&self, font_size: f32) -> Option<f32> {
        let v = self.value;
        Some(match self.unit {
            LengthUnit::Px => v,
            LengthUnit::Em | LengthUnit::Rem => v * font_size,
            LengthUnit::Ex | LengthUnit::Ch => v * font_size / 2.0,
            LengthUnit::In => v * 96.0,
            LengthUnit::Cm => v * 96.0 / 2.54,
            LengthUnit::Mm => v * 96.0 / 25.4,
            LengthUnit::Pt => v * 96.0 / 72.0,
            LengthUnit::Pc => v * 16.0,
            LengthUnit::Vw | LengthUnit::Vh | LengthUnit::Vmin | LengthUnit::Vmax => return None,
        })
    }
}

impl Resolution {
    /// Convert to dots per inch.
    #[must_use]
    pub fn to_dpi(&self) -> f32 {
        match self.unit {
            ResolutionUnit::Dpi => self.value,
            ResolutionUnit::Dpcm => self.value * 2.54,
            ResolutionUnit::Dppx => self.value * 96.0,
        }
    }
}

impl Time {
    /// Convert to milliseconds.
    #[must_use]
    pub fn to_millis(&self) -> f32 {
        match self.unit {
            TimeUnit::S => self.value * 1000.0,
            TimeUnit::Ms => self.value,
        }
    }
}

impl Angle {
    /// Convert to degrees.
    #[must_use]
    pub fn to_degrees(&self) -> f32 {
        match self.unit {
            AngleUnit::Deg => self.value,
            AngleUnit::Rad => self.value.to_degrees(),
            AngleUnit::Grad => self.value * 0.9,
            AngleUnit::Turn => self.value * 360.0,
        }
    }
}

impl<U: fmt::Display> fmt::Display for Dimension<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// The typed payload of a [`Term`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TermValue {
    /// An identifier such as `red` or `inherit`.
    Ident(String),
    /// A quoted string.
    String(String),
    /// An integer.
    Integer(i64),
    /// A real number.
    Number(f32),
    /// A percentage (`50%` is stored as `50.0`).
    Percentage(f32),
    /// A length.
    Length(Length),
    /// A resolution.
    Resolution(Resolution),
    /// A duration.
    Time(Time),
    /// An angle.
    Angle(Angle),
    /// A colour literal.
    Color(Rgba),
    /// A `url(...)` reference.
    Uri(String),
    /// A function call with its argument terms.
    Function {
        /// Function name.
        name: String,
        /// Argument terms.
        args: Vec<Term>,
    },
}

/// One value in a declaration, with the operator that precedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Separator from the previous term; `None` for the first term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    /// The typed value.
    pub value: TermValue,
}

impl Term {
    /// A term with no operator.
    #[must_use]
    pub const fn new(value: TermValue) -> Self {
        Self {
            operator: None,
            value,
        }
    }

    /// An identifier term.
    #[must_use]
    pub fn ident(name: &str) -> Self {
        Self::new(TermValue::Ident(name.to_string()))
    }

    /// A string term.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::new(TermValue::String(text.to_string()))
    }

    /// An integer term.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::new(TermValue::Integer(value))
    }

    /// A number term.
    #[must_use]
    pub const fn number(value: f32) -> Self {
        Self::new(TermValue::Number(value))
    }

    /// A percentage term.
    #[must_use]
    pub const fn percentage(value: f32) -> Self {
        Self::new(TermValue::Percentage(value))
    }

    /// A length term.
    #[must_use]
    pub const fn length(value: f32, unit: LengthUnit) -> Self {
        Self::new(TermValue::Length(Dimension { value, unit }))
    }

    /// A pixel length term.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::length(value, LengthUnit::Px)
    }

    /// A colour term.
    #[must_use]
    pub const fn color(color: Rgba) -> Self {
        Self::new(TermValue::Color(color))
    }

    /// A `url()` term.
    #[must_use]
    pub fn uri(url: &str) -> Self {
        Self::new(TermValue::Uri(url.to_string()))
    }

    /// A function term.
    #[must_use]
    pub fn function(name: &str, args: Vec<Self>) -> Self {
        Self::new(TermValue::Function {
            name: name.to_string(),
            args,
        })
    }

    /// Set the operator joining this term to the previous one.
    #[must_use]
    pub const fn with_operator(mut self, operator: Operator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Shorthand for `with_operator(Operator::Space)`.
    #[must_use]
    pub const fn space(self) -> Self {
        self.with_operator(Operator::Space)
    }

    /// Shorthand for `with_operator(Operator::Comma)`.
    #[must_use]
    pub const fn comma(self) -> Self {
        self.with_operator(Operator::Comma)
    }

    /// Shorthand for `with_operator(Operator::Slash)`.
    #[must_use]
    pub const fn slash(self) -> Self {
        self.with_operator(Operator::Slash)
    }

    /// The identifier text, if this is an identifier term.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match &self.value {
            TermValue::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is the identifier `keyword` (ASCII case-insensitive).
    #[must_use]
    pub fn is_ident(&self, keyword: &str) -> bool {
        self.as_ident().is_some_and(|name| name.eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for TermValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => f.write_str(name),
            Self::String(text) => write!(f, "\"{}\"", text.replace('"', "\\\"")),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Percentage(v) => write!(f, "{v}%"),
            Self::Length(d) => write!(f, "{d}"),
            Self::Resolution(d) => write!(f, "{d}"),
            Self::Time(d) => write!(f, "{d}"),
            Self::Angle(d) => write!(f, "{d}"),
            Self::Color(color) => write!(f, "{color}"),
            Self::Uri(url) => write!(f, "url({url})"),
            Self::Function { name, args } => write!(f, "{name}({})", terms_to_string(args)),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Render a term list back to CSS text, honouring operators.
#[must_use]
pub fn terms_to_string(terms: &[Term]) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            out.push_str(match term.operator {
                Some(Operator::Comma) => ", ",
                Some(Operator::Slash) => " / ",
                Some(Operator::Space) | None => " ",
            });
        }
        out.push_str(&term.value.to_string());
    }
    out
}

/// Conversion from a declaration's terms into a concrete Rust value.
///
/// Used by [`NodeData::typed_value`](crate::style::NodeData::typed_value).
pub trait FromTerms: Sized {
    /// Convert, or `None` when the terms do not represent a `Self`.
    fn from_terms(terms: &[Term]) -> Option<Self>;
}

fn single(terms: &[Term]) -> Option<&TermValue> {
    match terms {
        [only] => Some(&only.value),
        _ => None,
    }
}

impl FromTerms for Length {
    fn from_terms(terms: &[Term]) -> Option<Self> {
        match single(terms)? {
            TermValue::Length(length) => Some(*length),
            // "unitless zero" is a valid length
            TermValue::Integer(0) => Some(Self::px(0.0)),
            TermValue::Number(v) if v.abs() < f32::EPSILON => Some(Self::px(0.0)),
            _ => None,
        }
    }
}

impl FromTerms for Rgba {
    fn from_terms(terms: &[Term]) -> Option<Self> {
        match terms {
            [only] => Self::from_term(only),
            _ => None,
        }
    }
}

impl FromTerms for f32 {
    #[allow(clippy::cast_precision_loss)]
    fn from_terms(terms: &[Term]) -> Option<Self> {
        match single(terms)? {
            TermValue::Number(v) => Some(*v),
            TermValue::Integer(v) => Some(*v as Self),
            _ => None,
        }
    }
}

impl FromTerms for i64 {
    fn from_terms(terms: &[Term]) -> Option<Self> {
        match single(terms)? {
            TermValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromTerms for String {
    fn from_terms(terms: &[Term]) -> Option<Self> {
        match single(terms) {
            Some(TermValue::Ident(text) | TermValue::String(text)) => Some(text.clone()),
            _ if terms.is_empty() => None,
            _ => Some(terms_to_string(terms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_conversions() {
        assert!((Length::px(12.0).to_px(16.0).unwrap_or_default() - 12.0).abs() < f32::EPSILON);
        let em = Dimension {
            value: 2.0,
            unit: LengthUnit::Em,
        };
        assert!((em.to_px(10.0).unwrap_or_default() - 20.0).abs() < f32::EPSILON);
        let inch = Dimension {
            value: 1.0,
            unit: LengthUnit::In,
        };
        assert!((inch.to_px(16.0).unwrap_or_default() - 96.0).abs() < 1e-3);
        let vw = Dimension {
            value: 10.0,
            unit: LengthUnit::Vw,
        };
        assert_eq!(vw.to_px(16.0), None);
    }

    #[test]
    fn test_resolution_to_dpi() {
        let dppx = Dimension {
            value: 2.0,
            unit: ResolutionUnit::Dppx,
        };
        assert!((dppx.to_dpi() - 192.0).abs() < 1e-3);
    }

    #[test]
    fn test_terms_render_with_operators() {
        let terms = vec![
            Term::px(1.0),
            Term::px(2.0).space(),
            Term::ident("solid").comma(),
            Term::percentage(50.0).slash(),
        ];
        assert_eq!(terms_to_string(&terms), "1px 2px, solid / 50%");
    }

    #[test]
    fn test_from_terms() {
        assert_eq!(Length::from_terms(&[Term::integer(0)]), Some(Length::px(0.0)));
        assert_eq!(Length::from_terms(&[Term::integer(3)]), None);
        assert_eq!(
            Rgba::from_terms(&[Term::ident("red")]),
            Some(Rgba::rgb(255, 0, 0))
        );
        assert_eq!(i64::from_terms(&[Term::integer(7)]), Some(7));
        assert_eq!(
            String::from_terms(&[Term::ident("a"), Term::ident("b").space()]),
            Some("a b".to_string())
        );
    }
}
