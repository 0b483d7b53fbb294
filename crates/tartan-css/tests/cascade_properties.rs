//! Property tests for cascade ordering, value resolution, media evaluation
//! and selector matching.

use std::sync::Arc;

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use tartan_css::selector::NthExpression;
use tartan_css::{
    Analyzer, CascadePriority, CombinedSelector, Declaration, MatchedDeclaration, MediaQuery,
    MediaSpec, NodeData, Origin, PropertyCatalog, SourceOrder, Specificity, StyleConfig,
    StyleSheet, parse_selector,
};
use tartan_dom::DomTree;

const CLASSES: [&str; 4] = ["c0", "c1", "c2", "c3"];

fn origin(code: u8) -> Origin {
    match code % 3 {
        0 => Origin::Agent,
        1 => Origin::User,
        _ => Origin::Author,
    }
}

/// Each entry becomes its own sheet holding `p.c0...` with a distinct
/// `margin-top`. The winner must be the entry with the greatest priority.
#[quickcheck]
fn prop_highest_priority_declaration_wins(entries: Vec<(u8, bool, u8)>) -> TestResult {
    if entries.is_empty() || entries.len() > 12 {
        return TestResult::discard();
    }
    let mut tree = DomTree::new();
    let class_attr = CLASSES.join(" ");
    let p = tree.append_element(tree.root(), "p", &[("class", class_attr.as_str())]);

    let mut sheets = Vec::new();
    let mut expected: Option<(CascadePriority, usize)> = None;
    for (position, &(origin_code, important, classes)) in entries.iter().enumerate() {
        let classes = classes % 5;
        let selector = format!(
            "p{}",
            CLASSES[..usize::from(classes)]
                .iter()
                .map(|class| format!(".{class}"))
                .collect::<String>()
        );
        let mut declaration = Declaration::parse("margin-top", &format!("{position}px"))
            .expect("valid declaration");
        declaration.important = important;
        let sheet = StyleSheet::new(origin(origin_code))
            .with_rule_text(&selector, vec![declaration])
            .expect("valid selector");
        sheets.push(sheet);

        let priority = CascadePriority::new(
            origin(origin_code),
            important,
            Specificity::new(0, 0, u32::from(classes), 1),
            SourceOrder::new(position, 0, 0, 0),
        );
        if expected.is_none_or(|(best, _)| priority > best) {
            expected = Some((priority, position));
        }
    }

    let config = StyleConfig::html();
    let Ok(styles) = Analyzer::new(&config, &sheets).evaluate(&tree, &MediaSpec::default()) else {
        return TestResult::failed();
    };
    let actual = styles
        .node_data(p, None)
        .and_then(|style| style.as_string("margin-top", true));
    let expected = expected.map(|(_, position)| format!("{position}px"));
    TestResult::from_bool(actual == expected)
}

/// `:nth-child(an+b)` agrees with a brute-force search for `n`.
#[quickcheck]
fn prop_nth_expression_matches_brute_force(a: i8, b: i8, position: u8) -> bool {
    let expression = NthExpression {
        a: i32::from(a),
        b: i32::from(b),
    };
    let position = i32::from(position) + 1;
    let brute = (0..=600).any(|n| i32::from(a) * n + i32::from(b) == position);
    expression.matches(position) == brute
}

/// `an+b` over the full `i32` range agrees with solving for `n` in `i128`.
#[quickcheck]
fn prop_nth_expression_matches_wide_reference(a: i32, b: i32, position: i32) -> bool {
    let (wide_a, wide_b, wide_position) = (i128::from(a), i128::from(b), i128::from(position));
    let expected = if wide_a == 0 {
        wide_position == wide_b
    } else {
        let n = (wide_position - wide_b) / wide_a;
        n >= 0 && wide_a * n + wide_b == wide_position
    };
    NthExpression { a, b }.matches(position) == expected
}

/// Specificity compares like its `(a, b, c, d)` tuple.
#[quickcheck]
fn prop_specificity_is_lexicographic(x: (u8, u8, u8, u8), y: (u8, u8, u8, u8)) -> bool {
    let to_spec = |(a, b, c, d): (u8, u8, u8, u8)| {
        Specificity::new(u32::from(a), u32::from(b), u32::from(c), u32::from(d))
    };
    to_spec(x).cmp(&to_spec(y)) == x.cmp(&y)
}

/// An inline declaration outranks any selector of the same level.
#[quickcheck]
fn prop_inline_beats_selectors(ids: u8, classes: u8, important: bool) -> bool {
    let selector = CascadePriority::new(
        Origin::Author,
        important,
        Specificity::new(0, u32::from(ids), u32::from(classes), 0),
        SourceOrder::new(usize::from(ids), 0, 0, 0),
    );
    CascadePriority::inline(important, 0) > selector
}

const DECLARATIONS: [(&str, &str); 8] = [
    ("color", "inherit"),
    ("color", "#102030"),
    ("display", "initial"),
    ("display", "block"),
    ("font-style", "unset"),
    ("margin", "1px 2px"),
    ("width", "unset"),
    ("font-family", "a, b"),
];

/// Resolving placeholders a second time changes nothing.
#[quickcheck]
fn prop_concretize_is_idempotent(picks: Vec<u8>, with_parent: bool) -> bool {
    let catalog = Arc::new(PropertyCatalog::builtin());
    let declarations: Vec<Declaration> = picks
        .iter()
        .take(16)
        .filter_map(|&pick| {
            let (property, value) = DECLARATIONS[usize::from(pick) % DECLARATIONS.len()];
            Declaration::parse(property, value).ok()
        })
        .collect();

    let mut parent = NodeData::new(Arc::clone(&catalog));
    let parent_color = Declaration::parse("color", "red").expect("valid declaration");
    parent.push(&MatchedDeclaration::new(
        &parent_color,
        CascadePriority::new(
            Origin::Author,
            false,
            Specificity::ZERO,
            SourceOrder::new(0, 0, 0, 0),
        ),
        None,
    ));
    parent.concretize();

    let mut data = NodeData::new(catalog);
    for (position, declaration) in declarations.iter().enumerate() {
        data.push(&MatchedDeclaration::new(
            declaration,
            CascadePriority::new(
                Origin::Author,
                false,
                Specificity::ZERO,
                SourceOrder::new(0, position, 0, 0),
            ),
            None,
        ));
    }
    if with_parent {
        data.inherit_from(&parent);
    }
    data.concretize();
    let once = data.clone();
    data.concretize();
    once == data
}

/// `min-width` and `max-width` agree with plain numeric comparison.
#[quickcheck]
fn prop_min_max_width_consistent(width: u16, threshold: u16) -> bool {
    let media = MediaSpec::default().with_dimensions(f32::from(width), 850.0);
    let min = MediaQuery::parse(&format!("(min-width: {threshold}px)"));
    let max = MediaQuery::parse(&format!("(max-width: {threshold}px)"));
    match (min, max) {
        (Ok(min), Ok(max)) => {
            media.matches(&min) == (width >= threshold)
                && media.matches(&max) == (width <= threshold)
        }
        _ => false,
    }
}

const SELECTORS: [&str; 8] = [
    "li",
    "ul > li",
    "ul li:nth-child(2n+1)",
    "li + li",
    "li ~ .last",
    ":not(.last)",
    "ul :first-child",
    "*:last-of-type",
];

/// Matching has no side effects: repeating it, or re-parsing the selector's
/// text, gives the same answer.
#[quickcheck]
fn prop_matching_is_deterministic(items: u8, pick: u8) -> TestResult {
    let items = usize::from(items % 8) + 1;
    let mut tree = DomTree::new();
    let list = tree.append_element(tree.root(), "ul", &[]);
    let nodes: Vec<_> = (0..items)
        .map(|i| {
            let class = if i + 1 == items { "last" } else { "item" };
            tree.append_element(list, "li", &[("class", class)])
        })
        .collect();

    let Ok(selector) = parse_selector(SELECTORS[usize::from(pick) % SELECTORS.len()]) else {
        return TestResult::failed();
    };
    let Ok(reparsed) = parse_selector(&selector.to_string()) else {
        return TestResult::failed();
    };
    let config = StyleConfig::html();
    let run = |selector: &CombinedSelector| -> Vec<bool> {
        nodes
            .iter()
            .map(|&node| {
                selector.matches(&tree, node, config.element_matcher(), config.match_condition())
            })
            .collect()
    };
    let first = run(&selector);
    TestResult::from_bool(first == run(&selector) && first == run(&reparsed))
}
