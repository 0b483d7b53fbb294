//! CSS colour values
//!
//! [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Term, TermValue};

/// [§ 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
/// sRGB color represented as RGBA components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// "the red color channel" (0-255)
    pub r: u8,
    /// "the green color channel" (0-255)
    pub g: u8,
    /// "the blue color channel" (0-255)
    pub b: u8,
    /// "the alpha channel" (0-255, 255 = fully opaque)
    pub a: u8,
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
///
/// The CSS 2.1 basic keywords plus the extended names most style sheets use.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aqua", [0, 255, 255]),
    ("black", [0, 0, 0]),
    ("blue", [0, 0, 255]),
    ("brown", [165, 42, 42]),
    ("coral", [255, 127, 80]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkred", [139, 0, 0]),
    ("fuchsia", [255, 0, 255]),
    ("gold", [255, 215, 0]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("grey", [128, 128, 128]),
    ("indigo", [75, 0, 130]),
    ("lightblue", [173, 216, 230]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lime", [0, 255, 0]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("orange", [255, 165, 0]),
    ("pink", [255, 192, 203]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("salmon", [250, 128, 114]),
    ("silver", [192, 192, 192]),
    ("teal", [0, 128, 128]),
    ("tomato", [255, 99, 71]),
    ("violet", [238, 130, 238]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
];

impl Rgba {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// [§ 6.2 The transparent keyword](https://www.w3.org/TR/css-color-4/#transparent-color)
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque colour from its channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    /// "The syntax of a <hex-color> is a <hash-token> token whose value consists of
    /// 3, 4, 6, or 8 hexadecimal digits."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // "The three-digit RGB notation (#RGB) is converted into six-digit form
        // (#RRGGBB) by replicating digits, not by adding zeros."
        let short = |i: usize| u8::from_str_radix(&hex[i..=i].repeat(2), 16).ok();
        let long = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors)
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name == "transparent" {
            return Some(Self::TRANSPARENT);
        }
        NAMED_COLORS
            .binary_search_by(|(candidate, _)| (*candidate).cmp(name.as_str()))
            .ok()
            .map(|i| {
                let [r, g, b] = NAMED_COLORS[i].1;
                Self::rgb(r, g, b)
            })
    }

    /// Interpret a single term as a colour: a colour literal, a named colour,
    /// or an `rgb()`/`rgba()` function.
    #[must_use]
    pub fn from_term(term: &Term) -> Option<Self> {
        match &term.value {
            TermValue::Color(color) => Some(*color),
            TermValue::Ident(name) => Self::from_named(name),
            TermValue::Function { name, args } => {
                let name = name.to_ascii_lowercase();
                if name == "rgb" || name == "rgba" {
                    Self::from_rgb_args(args)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// [§ 5.1 The RGB functions](https://www.w3.org/TR/css-color-4/#rgb-functions)
    ///
    /// Channels are integers (0-255) or percentages; the optional fourth
    /// argument is an alpha number (0-1) or percentage.
    fn from_rgb_args(args: &[Term]) -> Option<Self> {
        if args.len() != 3 && args.len() != 4 {
            return None;
        }
        let r = channel(&args[0].value)?;
        let g = channel(&args[1].value)?;
        let b = channel(&args[2].value)?;
        let a = match args.get(3) {
            Some(term) => alpha(&term.value)?,
            None => 255,
        };
        Some(Self { r, g, b, a })
    }

    /// Convert to hex string notation (#RRGGBB or #RRGGBBAA if alpha != 255)
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn unit_to_u8(fraction: f32) -> u8 {
    (fraction.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn channel(value: &TermValue) -> Option<u8> {
    match value {
        TermValue::Integer(v) => u8::try_from((*v).clamp(0, 255)).ok(),
        TermValue::Number(v) => Some(unit_to_u8(*v / 255.0)),
        TermValue::Percentage(p) => Some(unit_to_u8(*p / 100.0)),
        _ => None,
    }
}

fn alpha(value: &TermValue) -> Option<u8> {
    match value {
        TermValue::Number(v) => Some(unit_to_u8(*v)),
        TermValue::Integer(v) => Some(if *v >= 1 { 255 } else { 0 }),
        TermValue::Percentage(p) => Some(unit_to_u8(*p / 100.0)),
        _ => None,
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            let alpha = (f32::from(self.a) / 255.0 * 100.0).round() / 100.0;
            write!(f, "rgba({}, {}, {}, {alpha})", self.r, self.g, self.b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_forms() {
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::from_hex("#010203"), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(Rgba::from_hex("#00000000"), Some(Rgba::TRANSPARENT));
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#ggg"), None);
    }

    #[test]
    fn test_named_table_is_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(Rgba::from_named("Green"), Some(Rgba::rgb(0, 128, 0)));
        assert_eq!(Rgba::from_named("nosuchcolor"), None);
    }

    #[test]
    fn test_rgb_function() {
        let term = Term::function(
            "rgb",
            vec![Term::integer(1), Term::integer(2).comma(), Term::integer(3).comma()],
        );
        assert_eq!(Rgba::from_term(&term), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(Rgba::rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }
}
