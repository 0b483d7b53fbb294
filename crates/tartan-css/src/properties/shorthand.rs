//! Box shorthand expansion.
//!
//! [§ 8 Box model](https://www.w3.org/TR/CSS2/box.html)
//!
//! A shorthand declaration is rewritten into its longhands before it reaches
//! the accumulator, keeping the shorthand's importance and source location.

use tartan_common::warning::warn_once;

use super::{BORDER_STYLES, BORDER_WIDTHS, PropertyValue};
use crate::stylesheet::Declaration;
use crate::values::{FromTerms, Length, Operator, Rgba, Term, TermValue};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Whether `property` is a shorthand this module expands.
#[must_use]
pub fn is_shorthand(property: &str) -> bool {
    matches!(
        property,
        "margin"
            | "padding"
            | "border-width"
            | "border-style"
            | "border-color"
            | "border"
            | "outline"
    ) || border_side(property).is_some()
}

fn border_side(property: &str) -> Option<&'static str> {
    let side = property.strip_prefix("border-")?;
    SIDES.iter().copied().find(|candidate| *candidate == side)
}

/// Expand a shorthand into longhand declarations.
///
/// Returns `None` when `declaration` is not a shorthand. An unusable value
/// expands to no declarations and is reported once.
#[must_use]
pub fn expand(declaration: &Declaration) -> Option<Vec<Declaration>> {
    let property = declaration.property.as_str();
    if !is_shorthand(property) {
        return None;
    }
    let longhands = match property {
        "margin" => four_sides(&declaration.terms, |side| format!("margin-{side}")),
        "padding" => four_sides(&declaration.terms, |side| format!("padding-{side}")),
        "border-width" => four_sides(&declaration.terms, |side| format!("border-{side}-width")),
        "border-style" => four_sides(&declaration.terms, |side| format!("border-{side}-style")),
        "border-color" => four_sides(&declaration.terms, |side| format!("border-{side}-color")),
        "outline" => line_triplet(&declaration.terms, "outline"),
        "border" => line_triplet(&declaration.terms, "border").map(|triplet| {
            SIDES
                .iter()
                .flat_map(|side| {
                    triplet.iter().map(move |(name, terms)| {
                        let aspect = name.trim_start_matches("border-");
                        (format!("border-{side}-{aspect}"), terms.clone())
                    })
                })
                .collect()
        }),
        _ => border_side(property)
            .and_then(|side| line_triplet(&declaration.terms, &format!("border-{side}"))),
    };

    let Some(longhands) = longhands else {
        let _ = warn_once(
            "Cascade",
            &format!("dropping shorthand with unusable value '{declaration}'"),
        );
        return Some(Vec::new());
    };
    Some(
        longhands
            .into_iter()
            .map(|(name, terms)| Declaration {
                property: name,
                terms,
                important: declaration.important,
                location: declaration.location.clone(),
            })
            .collect(),
    )
}

fn css_wide(terms: &[Term]) -> bool {
    PropertyValue::from_terms(terms).is_placeholder()
}

/// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties):
/// "If there is only one component value, it applies to all sides. If there
/// are two values, the top and bottom margins are set to the first value and
/// the right and left margins are set to the second. If there are three
/// values, the top is set to the first value, the left and right are set to
/// the second, and the bottom is set to the third."
fn four_sides(terms: &[Term], name: impl Fn(&str) -> String) -> Option<Vec<(String, Vec<Term>)>> {
    if css_wide(terms) {
        return Some(SIDES.iter().map(|side| (name(side), terms.to_vec())).collect());
    }
    if terms
        .iter()
        .any(|term| term.operator.is_some_and(|op| op != Operator::Space))
    {
        return None;
    }
    let values: Vec<Term> = terms
        .iter()
        .map(|term| Term::new(term.value.clone()))
        .collect();
    let [top, right, bottom, left] = match values.as_slice() {
        [all] => [all, all, all, all],
        [vertical, horizontal] => [vertical, horizontal, vertical, horizontal],
        [top, horizontal, bottom] => [top, horizontal, bottom, horizontal],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some(
        SIDES
            .iter()
            .zip([top, right, bottom, left])
            .map(|(side, value)| (name(side), vec![value.clone()]))
            .collect(),
    )
}

/// [§ 8.5.4 Border shorthand properties](https://www.w3.org/TR/CSS2/box.html#border-shorthand-properties):
/// width, style and colour in any order, each at most once. Omitted
/// components are reset to their initial value.
fn line_triplet(terms: &[Term], prefix: &str) -> Option<Vec<(String, Vec<Term>)>> {
    let names = [
        format!("{prefix}-width"),
        format!("{prefix}-style"),
        format!("{prefix}-color"),
    ];
    if css_wide(terms) {
        return Some(names.into_iter().map(|name| (name, terms.to_vec())).collect());
    }
    if terms.is_empty() {
        return None;
    }

    let mut slots: [Option<Term>; 3] = [None, None, None];
    for term in terms {
        if term.operator.is_some_and(|op| op != Operator::Space) {
            return None;
        }
        let term = Term::new(term.value.clone());
        let slot = if is_line_style(&term) {
            1
        } else if is_line_width(&term) {
            0
        } else if is_color(&term) {
            2
        } else {
            return None;
        };
        if slots[slot].replace(term).is_some() {
            return None;
        }
    }
    Some(
        names
            .into_iter()
            .zip(slots)
            .map(|(name, slot)| (name, vec![slot.unwrap_or_else(|| Term::ident("initial"))]))
            .collect(),
    )
}

fn is_line_style(term: &Term) -> bool {
    term.as_ident()
        .is_some_and(|ident| BORDER_STYLES.iter().any(|s| s.eq_ignore_ascii_case(ident)))
}

fn is_line_width(term: &Term) -> bool {
    if let Some(ident) = term.as_ident() {
        return BORDER_WIDTHS.iter().any(|w| w.eq_ignore_ascii_case(ident));
    }
    Length::from_terms(std::slice::from_ref(term)).is_some()
}

fn is_color(term: &Term) -> bool {
    let keyword = matches!(
        &term.value,
        TermValue::Ident(ident)
            if ident.eq_ignore_ascii_case("currentcolor") || ident.eq_ignore_ascii_case("invert")
    );
    keyword || Rgba::from_term(term).is_some()
}
