//! Integration tests for media query parsing and evaluation.

use tartan_css::media::Scan;
use tartan_css::{MediaExpression, MediaQuery, MediaSpec, Term};

fn query(text: &str) -> MediaQuery {
    MediaQuery::parse(text).expect("valid media query")
}

#[test]
fn test_width_queries_against_default_viewport() {
    let media = MediaSpec::default();
    assert!(media.matches(&query("(min-width: 1100px)")));
    assert!(media.matches(&query("(max-width: 1100px)")));
    assert!(media.matches(&query("(width: 1100px)")));
    assert!(!media.matches(&query("(min-width: 1101px)")));
    assert!(!media.matches(&query("(max-width: 500px)")));
    assert!(media.matches(&query("screen and (min-width: 600px) and (max-width: 1200px)")));
}

#[test]
fn test_media_types_and_negation() {
    let screen = MediaSpec::default();
    let print = MediaSpec::new("print");
    assert!(screen.matches(&query("screen")));
    assert!(screen.matches(&query("all")));
    assert!(screen.matches(&query("only screen")));
    assert!(!print.matches(&query("screen")));
    assert!(print.matches(&query("not screen")));
    assert!(!screen.matches(&query("not screen")));
    assert!(screen.matches(&query("not print and (min-width: 1px)")));
    assert!(screen.matches(&query("SCREEN")));
}

#[test]
fn test_invalid_expressions_fail_even_when_negated() {
    let media = MediaSpec::default();
    assert!(!media.matches(&query("(min-orientation: landscape)")));
    assert!(!media.matches(&query("not screen and (frobnicate: 3)")));
    assert!(!media.matches(&query("not print and (width: red)")));
    assert!(!media.matches_expression(&MediaExpression::new("bogus", Vec::new())));
}

#[test]
fn test_discrete_and_ratio_features() {
    let media = MediaSpec::default()
        .with_dimensions(1600.0, 900.0)
        .with_resolution(192.0)
        .with_scan(Scan::Interlace);
    assert!(media.matches(&query("(orientation: landscape)")));
    assert!(!media.matches(&query("(orientation: portrait)")));
    assert!(media.matches(&query("(aspect-ratio: 16/9)")));
    assert!(media.matches(&query("(min-aspect-ratio: 4/3)")));
    assert!(media.matches(&query("(min-resolution: 2dppx)")));
    assert!(media.matches(&query("(max-resolution: 200dpi)")));
    assert!(media.matches(&query("(scan: interlace)")));
    assert!(media.matches(&query("(color)")));
    assert!(!media.matches(&query("(monochrome)")));
    assert!(!media.matches(&query("(grid)")));
    assert!(media.matches(&query("(min-color: 4)")));
}

#[test]
fn test_em_lengths_use_profile_font_size() {
    let media = MediaSpec::default().with_font_size(20.0);
    assert!(media.matches(&query("(min-width: 55em)")));
    assert!(!media.matches(&query("(min-width: 56em)")));
}

#[test]
fn test_query_lists() {
    let media = MediaSpec::default();
    let list = MediaQuery::parse_list("print, (max-width: 500px)").expect("valid");
    assert_eq!(list.len(), 2);
    assert!(!media.matches_one_of(&list));

    let list = MediaQuery::parse_list("print, screen").expect("valid");
    assert!(media.matches_one_of(&list));

    assert!(MediaQuery::parse_list("  ").expect("empty").is_empty());
    assert!(media.matches_one_of(&[]));
}

#[test]
fn test_sentinel_profiles() {
    let q = query("print and (max-width: 1px)");
    assert!(MediaSpec::all().matches(&q));
    assert!(MediaSpec::all().matches_empty());
    assert!(!MediaSpec::none().matches(&query("all")));
    assert!(!MediaSpec::none().matches_one_of(&[]));
}

#[test]
fn test_built_queries_display() {
    let built = MediaQuery::for_type("screen")
        .and(MediaExpression::new("min-width", vec![Term::px(500.0)]))
        .negated();
    assert_eq!(built.to_string(), "not screen and (min-width: 500px)");
    assert!(!MediaSpec::default().matches(&built));
    assert_eq!(query("(color)").to_string(), "(color)");
}
