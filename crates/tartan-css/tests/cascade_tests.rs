//! Integration tests for the cascade: priority, inheritance, defaulting and
//! whole-document evaluation.

use tartan_css::cascade::style_attributes;
use tartan_css::selector::ElementStateCondition;
use tartan_css::{
    Analyzer, CascadeLevel, ConfigError, Declaration, MediaQuery, MediaSpec, NodeData, Origin,
    PropertyCatalog, PropertyValue, PseudoClassType, PseudoElementType, Rgba, RuleMedia, RuleSet,
    StandardElementMatcher, StyleConfig, StyleMap, StyleSheet,
};
use tartan_dom::{DomTree, NodeId};

fn decl(property: &str, value: &str) -> Declaration {
    Declaration::parse(property, value).expect("valid declaration")
}

fn sheet(origin: Origin, rules: Vec<(&str, Vec<Declaration>)>) -> StyleSheet {
    rules
        .into_iter()
        .fold(StyleSheet::new(origin), |sheet, (selector, declarations)| {
            sheet
                .with_rule_text(selector, declarations)
                .expect("valid selector")
        })
}

fn evaluate(tree: &DomTree, sheets: &[StyleSheet]) -> StyleMap<NodeId> {
    let config = StyleConfig::html();
    Analyzer::new(&config, sheets)
        .evaluate(tree, &MediaSpec::default())
        .expect("tree has a root element")
}

fn base(styles: &StyleMap<NodeId>, node: NodeId) -> &NodeData {
    styles.node_data(node, None).expect("element was styled")
}

/// `<html><body><div id="y" class="x"><p>..</p></div></body></html>`
fn small_tree() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let html = tree.append_element(tree.root(), "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let div = tree.append_element(body, "div", &[("id", "y"), ("class", "x")]);
    let p = tree.append_element(div, "p", &[]);
    let _ = tree.append_text(p, "hello");
    (tree, body, div, p)
}

#[test]
fn test_id_beats_many_classes() {
    let mut tree = DomTree::new();
    let el = tree.append_element(tree.root(), "div", &[("id", "a"), ("class", "b c d e f g h")]);
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("#a", vec![decl("color", "red")]),
            (".b.c.d.e.f.g.h", vec![decl("color", "blue")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    assert_eq!(base(&styles, el).as_string("color", true).as_deref(), Some("red"));
}

#[test]
fn test_important_beats_specificity() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[("id", "y"), ("class", "x")]);
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("p", vec![decl("color", "red")]),
            (".x", vec![decl("color", "blue !important")]),
            ("#y", vec![decl("color", "green")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, p);
    assert_eq!(style.as_string("color", true).as_deref(), Some("blue"));
    let priority = style.priority("color").expect("own value");
    assert_eq!(priority.level, CascadeLevel::AuthorImportant);
}

#[test]
fn test_origin_levels() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[("id", "y")]);
    let agent = sheet(
        Origin::Agent,
        vec![("p", vec![decl("display", "block"), decl("color", "gray !important")])],
    );
    let user = sheet(
        Origin::User,
        vec![("p", vec![decl("color", "purple !important"), decl("margin-top", "1px")])],
    );
    let author = sheet(
        Origin::Author,
        vec![("#y", vec![decl("color", "green !important"), decl("margin-top", "2px")])],
    );
    let styles = evaluate(&tree, &[agent, user, author]);
    let style = base(&styles, p);
    // User !important beats author !important, which beats agent !important.
    assert_eq!(style.as_string("color", true).as_deref(), Some("purple"));
    // Author normal beats user normal.
    assert_eq!(style.as_string("margin-top", true).as_deref(), Some("2px"));
    assert_eq!(style.keyword("display"), Some("block"));
}

#[test]
fn test_order_of_appearance_breaks_ties() {
    let mut tree = DomTree::new();
    let p = tree.append_element(tree.root(), "p", &[("class", "a b")]);
    let first = sheet(Origin::Author, vec![(".a", vec![decl("color", "red")])]);
    let second = sheet(
        Origin::Author,
        vec![
            (".b", vec![decl("color", "blue")]),
            (".a", vec![decl("margin-left", "1px"), decl("margin-left", "3px")]),
        ],
    );
    let styles = evaluate(&tree, &[first, second]);
    let style = base(&styles, p);
    assert_eq!(style.as_string("color", true).as_deref(), Some("blue"));
    assert_eq!(style.as_string("margin-left", true).as_deref(), Some("3px"));
}

#[test]
fn test_child_inherits_parent_color() {
    let (tree, body, _, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![("body", vec![decl("color", "rgb(1, 2, 3)"), decl("margin-top", "4px")])],
    )];
    let styles = evaluate(&tree, &sheets);

    let child = base(&styles, p);
    assert_eq!(child.as_string("color", true).as_deref(), Some("rgb(1, 2, 3)"));
    assert_eq!(child.typed_value::<Rgba>("color"), Some(Rgba::rgb(1, 2, 3)));
    assert!(child.is_inherited("color"));
    assert_eq!(
        child.source_declaration("color", true).map(|d| d.property.as_str()),
        Some("color")
    );
    // margin-top is not inherited.
    assert_eq!(child.as_string("margin-top", true).as_deref(), Some("0"));
    assert!(!base(&styles, body).is_inherited("color"));
}

#[test]
fn test_own_only_reads_skip_inherited_values() {
    let (tree, body, _, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("body", vec![decl("color", "rgb(1, 2, 3)"), decl("font-family", "a, b")]),
            ("p", vec![decl("margin-top", "4px")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);

    let child = base(&styles, p);
    assert_eq!(child.as_string("color", true).as_deref(), Some("rgb(1, 2, 3)"));
    assert_eq!(child.as_string("color", false), None);
    assert_eq!(child.property("color", false), None);
    assert_eq!(child.value("color", false), None);
    assert!(child.source_declaration("color", true).is_some());
    assert!(child.source_declaration("color", false).is_none());

    assert_eq!(child.list_size("font-family", true), 2);
    assert_eq!(child.list_size("font-family", false), 0);
    assert_eq!(child.property_at("font-family", 1, false), None);
    assert!(child.value_at("font-family", 1, true).is_some());

    // Own values read the same either way; defaults only with inheritance.
    assert_eq!(child.as_string("margin-top", false).as_deref(), Some("4px"));
    assert_eq!(
        child.source_declaration("margin-top", false).map(|d| d.property.as_str()),
        Some("margin-top")
    );
    assert_eq!(child.as_string("display", true).as_deref(), Some("inline"));
    assert_eq!(child.as_string("display", false), None);

    let parent = base(&styles, body);
    assert_eq!(parent.list_size("font-family", false), 2);
}

#[test]
fn test_deeply_nested_document_inherits_to_the_bottom() {
    let mut tree = DomTree::new();
    let html = tree.append_element(tree.root(), "html", &[]);
    let mut deepest = html;
    for _ in 0..10_000 {
        deepest = tree.append_element(deepest, "div", &[]);
    }
    let sheets = [sheet(Origin::Author, vec![("html", vec![decl("color", "rgb(9, 8, 7)")])])];
    let styles = evaluate(&tree, &sheets);

    assert_eq!(styles.len(), 10_001);
    assert_eq!(styles.iter().next().map(|(node, _)| node), Some(html));
    assert_eq!(styles.iter().last().map(|(node, _)| node), Some(deepest));
    let bottom = base(&styles, deepest);
    assert_eq!(bottom.as_string("color", true).as_deref(), Some("rgb(9, 8, 7)"));
    assert!(bottom.is_inherited("color"));
}

#[test]
fn test_explicit_defaulting_keywords() {
    let (tree, _, div, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("color", "red"), decl("margin-top", "5px"), decl("display", "flex")]),
            (
                "p",
                vec![
                    decl("margin-top", "inherit"),
                    decl("color", "initial"),
                    decl("display", "unset"),
                ],
            ),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, p);
    assert_eq!(style.as_string("margin-top", true).as_deref(), Some("5px"));
    assert_eq!(style.as_string("color", true).as_deref(), Some("black"));
    // display is not inherited, so unset means initial.
    assert_eq!(style.keyword("display"), Some("inline"));
    assert_eq!(base(&styles, div).keyword("display"), Some("flex"));
}

#[test]
fn test_unset_on_inherited_property_takes_parent_value() {
    let (tree, _, _, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("visibility", "hidden")]),
            ("p", vec![decl("visibility", "unset")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    assert_eq!(base(&styles, p).keyword("visibility"), Some("hidden"));
}

#[test]
fn test_concretize_is_idempotent() {
    let (tree, _, _, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("color", "red")]),
            ("p", vec![decl("color", "inherit"), decl("width", "initial")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, p);
    let mut again = style.clone();
    again.concretize();
    assert_eq!(&again, style);
    assert_eq!(again.as_string("color", true).as_deref(), Some("red"));
    assert_eq!(again.keyword("width"), Some("auto"));
}

#[test]
fn test_media_block_that_does_not_match_contributes_nothing() {
    let (tree, body, _, _) = small_tree();
    let narrow = MediaQuery::parse("(max-width: 500px)").expect("valid");
    let wide = MediaQuery::parse("screen and (min-width: 1000px)").expect("valid");
    let sheets = [StyleSheet::new(Origin::Author)
        .with_rule(RuleSet::parse("body", vec![decl("color", "red")]).expect("valid"))
        .with_rule(RuleMedia::new(
            vec![narrow],
            vec![
                RuleSet::parse("body", vec![decl("color", "blue"), decl("width", "10px")])
                    .expect("valid"),
            ],
        ))
        .with_rule(RuleMedia::new(
            vec![wide],
            vec![RuleSet::parse("body", vec![decl("margin-top", "7px")]).expect("valid")],
        ))];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, body);
    assert_eq!(style.as_string("color", true).as_deref(), Some("red"));
    assert_eq!(style.specified_value("width"), None);
    assert_eq!(style.as_string("margin-top", true).as_deref(), Some("7px"));

    let config = StyleConfig::html();
    let phone = MediaSpec::default().with_dimensions(400.0, 800.0);
    let styles = Analyzer::new(&config, &sheets)
        .evaluate(&tree, &phone)
        .expect("root");
    assert_eq!(base(&styles, body).as_string("color", true).as_deref(), Some("blue"));
}

#[test]
fn test_missing_root_is_an_error() {
    let tree = DomTree::new();
    let config = StyleConfig::html();
    let sheets = [sheet(Origin::Author, vec![("p", vec![decl("color", "red")])])];
    let analyzer = Analyzer::new(&config, &sheets);
    assert_eq!(
        analyzer.evaluate(&tree, &MediaSpec::default()).map(|s| s.len()),
        Err(ConfigError::MissingDocumentElement)
    );
    assert_eq!(
        analyzer
            .element_style(&tree, tree.root(), &MediaSpec::default(), None)
            .map(|s| s.is_some()),
        Err(ConfigError::MissingDocumentElement)
    );
}

#[test]
fn test_inline_style_attribute() {
    let mut tree = DomTree::new();
    let html = tree.append_element(tree.root(), "html", &[]);
    let p = tree.append_element(
        html,
        "p",
        &[("id", "y"), ("style", "color: orange; margin: 1px 2px; bogus")],
    );
    let sheets = [
        sheet(
            Origin::Author,
            vec![("#y", vec![decl("color", "green"), decl("margin-left", "9px !important")])],
        ),
        sheet(Origin::User, vec![("p", vec![decl("margin-top", "8px !important")])]),
    ];
    let config = StyleConfig::html();
    let styles = Analyzer::new(&config, &sheets)
        .evaluate_with_inline(&tree, &MediaSpec::default(), style_attributes(&tree))
        .expect("root");
    let style = base(&styles, p);
    assert_eq!(style.as_string("color", true).as_deref(), Some("orange"));
    assert_eq!(style.as_string("margin-right", true).as_deref(), Some("2px"));
    // Author !important beats a normal inline declaration.
    assert_eq!(style.as_string("margin-left", true).as_deref(), Some("9px"));
    // User !important beats everything from the author.
    assert_eq!(style.as_string("margin-top", true).as_deref(), Some("8px"));
    assert!(!base(&styles, html).property_names().any(|name| name == "color"));
}

#[test]
fn test_shorthand_expansion_and_later_longhand() {
    let (tree, _, div, _) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![(
            "div",
            vec![
                decl("margin", "1px 2px 3px"),
                decl("margin-bottom", "10px"),
                decl("border", "2px solid red"),
                decl("padding", "1px 2px 3px 4px 5px"),
            ],
        )],
    )];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, div);
    assert_eq!(style.as_string("margin-top", true).as_deref(), Some("1px"));
    assert_eq!(style.as_string("margin-left", true).as_deref(), Some("2px"));
    assert_eq!(style.as_string("margin-bottom", true).as_deref(), Some("10px"));
    assert_eq!(style.keyword("border-left-style"), Some("solid"));
    assert_eq!(style.as_string("border-top-width", true).as_deref(), Some("2px"));
    assert_eq!(style.as_string("border-bottom-color", true).as_deref(), Some("red"));
    // Five values are not a valid padding.
    assert_eq!(style.specified_value("padding-top"), None);
}

#[test]
fn test_rejected_keyword_keeps_earlier_value() {
    let (tree, _, div, _) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("display", "block")]),
            ("#y", vec![decl("display", "purple")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    assert_eq!(base(&styles, div).keyword("display"), Some("block"));
}

#[test]
fn test_list_properties() {
    let (tree, _, div, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("font-family", "Arial, \"Helvetica Neue\", sans-serif")]),
            ("div", vec![decl("background-image", "url(a.png), none")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);
    let style = base(&styles, div);
    assert_eq!(style.list_size("font-family", true), 3);
    assert_eq!(
        style.property_at("font-family", 2, true),
        Some(&PropertyValue::Keyword("sans-serif".to_string()))
    );
    assert_eq!(style.list_size("background-image", true), 2);
    assert_eq!(
        style.as_string("font-family", true).as_deref(),
        Some("Arial, \"Helvetica Neue\", sans-serif")
    );
    // The whole list is inherited.
    assert_eq!(base(&styles, p).list_size("font-family", true), 3);
}

#[test]
fn test_pseudo_elements_get_their_own_style() {
    let (tree, _, div, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("p", vec![decl("color", "red")]),
            ("p::before", vec![decl("content", "\"> \"")]),
            ("div:first-line", vec![decl("font-weight", "bold")]),
        ],
    )];
    let styles = evaluate(&tree, &sheets);

    let before = styles
        .node_data(p, Some(PseudoElementType::Before))
        .expect("::before has declarations");
    assert_eq!(before.as_string("content", true).as_deref(), Some("\"> \""));
    assert_eq!(before.as_string("color", true).as_deref(), Some("red"));
    assert!(base(&styles, p).specified_value("content").is_none());
    assert!(styles.node_data(p, Some(PseudoElementType::After)).is_none());
    assert!(styles.node_data(div, Some(PseudoElementType::FirstLine)).is_some());
}

#[test]
fn test_inheritance_can_be_disabled() {
    let (tree, _, _, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("div", vec![decl("color", "red")]),
            ("p::after", vec![decl("content", "\"!\"")]),
            ("p", vec![decl("font-style", "italic")]),
        ],
    )];
    let config = StyleConfig::builder()
        .element_matcher(StandardElementMatcher::html())
        .catalog(PropertyCatalog::builtin())
        .inherit(false)
        .build()
        .expect("complete config");
    let styles = Analyzer::new(&config, &sheets)
        .evaluate(&tree, &MediaSpec::default())
        .expect("root");
    assert_eq!(base(&styles, p).as_string("color", true).as_deref(), Some("black"));
    let after = styles
        .node_data(p, Some(PseudoElementType::After))
        .expect("::after");
    // Pseudo-elements still take the element's own values.
    assert_eq!(after.keyword("font-style"), Some("italic"));
}

#[test]
fn test_match_condition_drives_dynamic_rules() {
    let (tree, _, div, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![("#y:hover", vec![decl("color", "red")]), ("p:focus", vec![decl("color", "blue")])],
    )];
    let config = StyleConfig::builder()
        .element_matcher(StandardElementMatcher::html())
        .match_condition(ElementStateCondition::new().with_id("y", PseudoClassType::Hover))
        .catalog(PropertyCatalog::builtin())
        .build()
        .expect("complete config");
    let styles = Analyzer::new(&config, &sheets)
        .evaluate(&tree, &MediaSpec::default())
        .expect("root");
    assert_eq!(base(&styles, div).as_string("color", true).as_deref(), Some("red"));
    assert_eq!(base(&styles, p).as_string("color", true).as_deref(), Some("red"));
    assert!(base(&styles, p).is_inherited("color"));
}

#[test]
fn test_element_style_agrees_with_evaluate() {
    let (tree, body, div, p) = small_tree();
    let sheets = [sheet(
        Origin::Author,
        vec![
            ("body", vec![decl("color", "#102030"), decl("font-size", "20px")]),
            ("div > p", vec![decl("font-weight", "bold")]),
            ("p::before", vec![decl("content", "\"x\"")]),
        ],
    )];
    let config = StyleConfig::html();
    let analyzer = Analyzer::new(&config, &sheets);
    let media = MediaSpec::default();
    let styles = analyzer.evaluate(&tree, &media).expect("root");

    for node in [body, div, p] {
        let single = analyzer
            .element_style(&tree, node, &media, None)
            .expect("root")
            .expect("element");
        assert_eq!(&single, base(&styles, node));
    }
    let before = analyzer
        .element_style(&tree, p, &media, Some(PseudoElementType::Before))
        .expect("root");
    assert_eq!(before.as_ref(), styles.node_data(p, Some(PseudoElementType::Before)));

    let text = tree.children(p)[0];
    assert_eq!(analyzer.element_style(&tree, text, &media, None), Ok(None));
}

#[test]
fn test_style_map_covers_elements_in_document_order() {
    let (tree, body, div, p) = small_tree();
    let html = tree.document_element().expect("root");
    let styles = evaluate(&tree, &[]);
    let order: Vec<NodeId> = styles.iter().map(|(node, _)| node).collect();
    assert_eq!(order, vec![html, body, div, p]);
    assert!(!styles.contains(tree.children(p)[0]));
    assert_eq!(base(&styles, p).keyword("display"), Some("inline"));
}

#[test]
fn test_style_sheets_from_json() {
    let (tree, _, div, p) = small_tree();
    let json = r#"{
        "origin": "author",
        "url": "site.css",
        "rules": [
            { "kind": "set", "selectors": "div, .nope",
              "declarations": [ { "property": "color", "value": "teal" } ] },
            { "kind": "media", "queries": "print",
              "rules": [ { "selectors": "p", "declarations": [
                  { "property": "color", "value": "black" } ] } ] },
            { "kind": "font_face", "declarations": [
                  { "property": "font-family", "value": "Fancy" } ] },
            { "kind": "set", "selectors": ["div > p"],
              "declarations": [ { "property": "margin", "value": "0 auto", "important": true } ] }
        ]
    }"#;
    let sheet: StyleSheet = serde_json::from_str(json).expect("valid sheet");
    assert_eq!(sheet.rules.len(), 4);
    let styles = evaluate(&tree, &[sheet]);
    assert_eq!(base(&styles, div).as_string("color", true).as_deref(), Some("teal"));
    let p_style = base(&styles, p);
    assert_eq!(p_style.as_string("color", true).as_deref(), Some("teal"));
    assert_eq!(p_style.keyword("margin-left"), Some("auto"));
    assert!(p_style.source_declaration("margin-left", true).is_some_and(|d| d.important));
}
