//! Tests for combinators, scoping, ordering and namespaces.

mod common;

use common::{by_id, element, engine, labels, sample_document, select_labels, select_labels_from};
use thicket_common::warning::was_warned;
use thicket_dom::{DomTree, ElementData, NodeId, NodeType};
use thicket_select::{Engine, EngineConfig, SelectError, parse};

// ========== simple selectors ==========

#[test]
fn test_type_class_and_id() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "li.done"), vec!["li2", "li4"]);
    assert_eq!(select_labels(&tree, "#p2"), vec!["p2"]);
    assert_eq!(select_labels(&tree, "div.container#main"), vec!["main"]);
    assert_eq!(select_labels(&tree, "p.intro.missing"), Vec::<String>::new());
}

#[test]
fn test_tag_names_compare_case_insensitively() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "LI#li1"), vec!["li1"]);
}

#[test]
fn test_universal_selector() {
    let tree = sample_document();
    assert_eq!(
        select_labels(&tree, "#form > *"),
        vec!["name", "agree", "go", "local", "remote"]
    );
}

#[test]
fn test_attribute_operators() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "[href^=https]"), vec!["remote"]);
    assert_eq!(select_labels(&tree, "[href$='.html']"), vec!["local"]);
    assert_eq!(select_labels(&tree, "[href*=example]"), vec!["remote"]);
    assert_eq!(select_labels(&tree, "[type=checkbox]"), vec!["agree"]);
    assert_eq!(select_labels(&tree, "[lang|=en]"), vec!["body"]);
    assert_eq!(select_labels(&tree, "[class~=done]"), vec!["li2", "li4"]);
    assert_eq!(select_labels(&tree, "[checked]"), vec!["agree"]);
    assert_eq!(select_labels(&tree, "[type=CHECKBOX]"), Vec::<String>::new());
}

// ========== combinators ==========

#[test]
fn test_descendant_combinator() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "div p"), vec!["p1", "p2"]);
    assert_eq!(select_labels(&tree, "body li"), vec!["li1", "li2", "li3", "li4", "li5"]);
}

#[test]
fn test_child_combinator() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "body > p"), vec!["fr"]);
    assert_eq!(select_labels(&tree, "#main > li"), Vec::<String>::new());
}

#[test]
fn test_sibling_combinators() {
    let tree = sample_document();
    assert_eq!(select_labels(&tree, "h1 + p"), vec!["p1"]);
    assert_eq!(select_labels(&tree, "li + li"), vec!["li2", "li3", "li4", "li5"]);
    assert_eq!(select_labels(&tree, "h1 ~ p"), vec!["p1", "p2"]);
    assert_eq!(select_labels(&tree, "#li3 ~ li"), vec!["li4", "li5"]);
    assert_eq!(select_labels(&tree, "#li3 + .done"), vec!["li4"]);
}

#[test]
fn test_sibling_combinators_skip_text_nodes() {
    let mut tree = DomTree::new();
    let div = element(&mut tree, NodeId::ROOT, "div", &[]);
    let _ = element(&mut tree, div, "h2", &[]);
    let _ = common::text(&mut tree, div, "between");
    let _ = element(&mut tree, div, "p", &[("id", "after")]);
    assert_eq!(select_labels(&tree, "h2 + p"), vec!["after"]);
}

#[test]
fn test_backtracking_over_ambiguous_ancestors() {
    // a > b#outer > b#inner > c: only the outer b has an `a` parent.
    let mut tree = DomTree::new();
    let a = element(&mut tree, NodeId::ROOT, "a", &[]);
    let outer = element(&mut tree, a, "b", &[("id", "outer")]);
    let inner = element(&mut tree, outer, "b", &[("id", "inner")]);
    let c = element(&mut tree, inner, "c", &[("id", "c")]);

    assert_eq!(select_labels(&tree, "a > b c"), vec!["c"]);
    let selector = parse("a > b c").unwrap();
    assert!(engine().matches(&tree, &selector, c, NodeId::ROOT).unwrap());
}

#[test]
fn test_long_descendant_chains_over_deep_trees() {
    // 200 nested divs with a p at the bottom and no section anywhere.
    let mut tree = DomTree::new();
    let mut parent = NodeId::ROOT;
    for _ in 0..200 {
        parent = element(&mut tree, parent, "div", &[]);
    }
    let leaf = element(&mut tree, parent, "p", &[("id", "leaf")]);

    let divs = vec!["div"; 24].join(" ");
    let failing = parse(&format!("section {divs} p")).unwrap();
    let passing = parse(&format!("{divs} p")).unwrap();
    let engine = engine();

    assert!(!engine.matches(&tree, &failing, leaf, NodeId::ROOT).unwrap());
    assert!(engine.matches(&tree, &passing, leaf, NodeId::ROOT).unwrap());
    assert_eq!(select_labels(&tree, &format!("section {divs} p")), Vec::<String>::new());
    assert_eq!(select_labels(&tree, &format!("{divs} p")), vec!["leaf"]);
    assert_eq!(select_labels(&tree, &format!("p:not(section {divs} p)")), vec!["leaf"]);
}

// ========== ordering and deduplication ==========

#[test]
fn test_union_is_deduplicated_and_in_document_order() {
    let tree = sample_document();
    assert_eq!(
        select_labels(&tree, "li, li.done, #li1"),
        vec!["li1", "li2", "li3", "li4", "li5"]
    );
    assert_eq!(select_labels(&tree, "#li5, #li1"), vec!["li1", "li5"]);
    assert_eq!(select_labels(&tree, "#fr, h1"), vec!["title", "fr"]);
}

#[test]
fn test_overlapping_scopes_are_deduplicated() {
    let tree = sample_document();
    let main = by_id(&tree, "main");
    let list = by_id(&tree, "list");
    let found = engine()
        .select(&tree, "li", &[list, main, list])
        .unwrap();
    assert_eq!(labels(&tree, &found), vec!["li1", "li2", "li3", "li4", "li5"]);
}

#[test]
fn test_document_order_is_tree_order_not_allocation_order() {
    let mut tree = DomTree::new();
    let late = tree.alloc(NodeType::Element(ElementData::new("p").with_attr("id", "late")));
    let early = tree.alloc(NodeType::Element(ElementData::new("p").with_attr("id", "early")));
    tree.append_child(NodeId::ROOT, early);
    tree.append_child(NodeId::ROOT, late);
    assert_eq!(select_labels(&tree, "p"), vec!["early", "late"]);
}

// ========== scope ==========

#[test]
fn test_scope_node_is_not_its_own_match() {
    let tree = sample_document();
    let list = by_id(&tree, "list");
    assert_eq!(select_labels_from(&tree, "ul", list), Vec::<String>::new());
    assert_eq!(select_labels_from(&tree, "li", by_id(&tree, "li1")), Vec::<String>::new());
    assert_eq!(select_labels_from(&tree, "li", list).len(), 5);
}

#[test]
fn test_relative_selectors_start_at_scope() {
    let tree = sample_document();
    let main = by_id(&tree, "main");
    let li2 = by_id(&tree, "li2");

    assert_eq!(select_labels_from(&tree, "> p", main), vec!["p1", "p2"]);
    assert_eq!(select_labels_from(&tree, "> li", main), Vec::<String>::new());
    assert_eq!(select_labels_from(&tree, "+ li", li2), vec!["li3"]);
    assert_eq!(select_labels_from(&tree, "~ .done", li2), vec!["li4"]);
    assert_eq!(select_labels_from(&tree, "~ li > *", li2), Vec::<String>::new());
}

#[test]
fn test_empty_scope_finds_nothing() {
    let tree = sample_document();
    let selector = parse("li").unwrap();
    assert_eq!(engine().find(&tree, &selector, &[]), Ok(Vec::new()));
}

#[test]
fn test_unknown_scope_node() {
    let tree = sample_document();
    let selector = parse("li").unwrap();
    let bogus = NodeId(tree.len() + 7);
    assert_eq!(
        engine().find(&tree, &selector, &[NodeId::ROOT, bogus]),
        Err(SelectError::UnknownNode(bogus))
    );
    assert_eq!(
        engine().matches(&tree, &selector, bogus, NodeId::ROOT),
        Err(SelectError::UnknownNode(bogus))
    );
}

// ========== subject test ==========

#[test]
fn test_matches_reports_whether_node_is_a_subject() {
    let tree = sample_document();
    let li1 = by_id(&tree, "li1");
    let list = by_id(&tree, "list");
    let engine = engine();
    let check = |selector: &str, node: NodeId, scope: NodeId| {
        engine
            .matches(&tree, &parse(selector).unwrap(), node, scope)
            .unwrap()
    };

    assert!(check("ul > li", li1, NodeId::ROOT));
    assert!(check("div li, form li", li1, NodeId::ROOT));
    assert!(!check("form li", li1, NodeId::ROOT));
    assert!(check("> li", li1, list));
    assert!(!check("> li", li1, NodeId::ROOT));
    assert!(!check("li", list, NodeId::ROOT));
    assert!(!check("*", NodeId::ROOT, NodeId::ROOT));
}

// ========== namespaces ==========

const SVG: &str = "http://www.w3.org/2000/svg";
const XLINK: &str = "http://www.w3.org/1999/xlink";

/// html[xmlns:xlink] > svg:svg > svg:rect[xlink:href]
fn svg_document() -> DomTree {
    let mut tree = DomTree::new();
    let html = tree.alloc(NodeType::Element(
        ElementData::new("html").with_attr("xmlns:xlink", XLINK),
    ));
    let svg = tree.alloc(NodeType::Element(
        ElementData::new("svg").with_namespace(Some("svg"), SVG),
    ));
    let rect = tree.alloc(NodeType::Element(
        ElementData::new("rect")
            .with_namespace(Some("svg"), SVG)
            .with_attr("id", "rect")
            .with_attr("xlink:href", "#target"),
    ));
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, svg);
    tree.append_child(svg, rect);
    tree
}

#[test]
fn test_namespaced_type_selectors() {
    let tree = svg_document();
    assert_eq!(select_labels(&tree, "svg|rect"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "*|rect"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "rect"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "|rect"), Vec::<String>::new());
    assert_eq!(select_labels(&tree, "|*"), vec!["html"]);
    assert_eq!(select_labels(&tree, "svg|*"), vec!["svg", "rect"]);
}

#[test]
fn test_configured_namespace_prefix() {
    let tree = svg_document();
    let engine = Engine::with_config(EngineConfig::default().with_namespace("s", SVG));
    let found = engine.select(&tree, "s|rect", &[NodeId::ROOT]).unwrap();
    assert_eq!(labels(&tree, &found), vec!["rect"]);
}

#[test]
fn test_namespaced_attribute_selectors() {
    let tree = svg_document();
    assert_eq!(select_labels(&tree, "[xlink|href]"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "[xlink|href='#target']"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "[*|href]"), vec!["rect"]);
    assert_eq!(select_labels(&tree, "[href]"), Vec::<String>::new());
    assert_eq!(select_labels(&tree, "[|href]"), Vec::<String>::new());
}

#[test]
fn test_undeclared_prefix_matches_nothing_and_warns() {
    let tree = svg_document();
    assert_eq!(select_labels(&tree, "bogus|rect"), Vec::<String>::new());
    assert!(was_warned(
        "Selector",
        "namespace prefix 'bogus' is not declared; 'bogus|' matches nothing"
    ));
}
