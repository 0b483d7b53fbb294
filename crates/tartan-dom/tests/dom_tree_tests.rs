//! Tests for DOM tree construction, navigation, and the JSON document format.

use tartan_dom::{DomTree, NodeId, NodeSpec, NodeType};

/// Helper: `<html><body><p/>text<div/><span/></body></html>`.
fn sample_tree() -> (DomTree, NodeId, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let html = tree.append_element(NodeId::ROOT, "html", &[]);
    let body = tree.append_element(html, "body", &[]);
    let p = tree.append_element(body, "p", &[("class", "note  wide")]);
    let text = tree.append_text(body, "hello");
    let div = tree.append_element(body, "div", &[("id", "main")]);
    let span = tree.append_element(body, "span", &[]);
    (tree, body, vec![p, text, div, span])
}

// ========== construction ==========

#[test]
fn test_append_links_siblings() {
    let (tree, body, nodes) = sample_tree();
    assert_eq!(tree.children(body), nodes.as_slice());
    assert_eq!(tree.prev_sibling(nodes[0]), None);
    assert_eq!(tree.next_sibling(nodes[0]), Some(nodes[1]));
    assert_eq!(tree.prev_sibling(nodes[3]), Some(nodes[2]));
    assert_eq!(tree.next_sibling(nodes[3]), None);
    assert_eq!(tree.parent(nodes[2]), Some(body));
}

#[test]
fn test_element_children_skip_text() {
    let (tree, body, nodes) = sample_tree();
    let elements: Vec<_> = tree.element_children(body).collect();
    assert_eq!(elements, vec![nodes[0], nodes[2], nodes[3]]);
}

#[test]
fn test_document_element() {
    let (tree, _, _) = sample_tree();
    let html = tree.document_element().expect("html element");
    assert_eq!(tree.as_element(html).map(|e| e.tag_name.as_str()), Some("html"));
    assert!(DomTree::new().document_element().is_none());
}

// ========== navigation ==========

#[test]
fn test_ancestors_parent_first() {
    let (tree, body, nodes) = sample_tree();
    let ancestors: Vec<_> = tree.ancestors(nodes[0]).collect();
    assert_eq!(ancestors.len(), 3);
    assert_eq!(ancestors[0], body);
    assert_eq!(ancestors[2], NodeId::ROOT);
}

// ========== element data ==========

#[test]
fn test_classes_split_on_whitespace() {
    let (tree, _, nodes) = sample_tree();
    let p = tree.as_element(nodes[0]).expect("p");
    let classes = p.classes();
    assert_eq!(classes.len(), 2);
    assert!(classes.contains("note"));
    assert!(classes.contains("wide"));
    assert_eq!(p.id(), None);
}

#[test]
fn test_label_and_path() {
    let (tree, _, nodes) = sample_tree();
    assert_eq!(tree.label(nodes[0]), "p.note.wide");
    assert_eq!(tree.label(nodes[2]), "div#main");
    assert_eq!(tree.label(nodes[1]), "#text");
    assert_eq!(tree.path(nodes[2]), "html > body > div#main");
}

// ========== JSON documents ==========

#[test]
fn test_from_json_spec() {
    let json = r#"{
        "tag": "html",
        "attrs": { "lang": "en" },
        "children": [
            { "tag": "body", "children": [
                { "text": "hi" },
                { "comment": "note" },
                { "tag": "p", "attrs": { "id": "y", "class": "x" } }
            ] }
        ]
    }"#;
    let spec: NodeSpec = serde_json::from_str(json).expect("valid document");
    let tree = DomTree::from_spec(&spec);

    let html = tree.document_element().expect("html");
    assert_eq!(tree.as_element(html).and_then(|e| e.attr("lang")), Some("en"));

    let body = tree.element_children(html).next().expect("body");
    let kids = tree.children(body);
    assert_eq!(kids.len(), 3);
    assert_eq!(tree.as_text(kids[0]), Some("hi"));
    assert!(matches!(
        tree.get(kids[1]).map(|n| &n.node_type),
        Some(NodeType::Comment(c)) if c == "note"
    ));
    assert_eq!(tree.label(kids[2]), "p#y.x");
}
