//! Tree-building helpers shared by the integration tests.

#![allow(dead_code)]

use thicket_dom::{DomTree, ElementData, NodeId, NodeType};
use thicket_select::{Engine, FixedRandom};

/// Append an element with `attrs` under `parent`.
pub fn element(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let data = attrs
        .iter()
        .fold(ElementData::new(tag), |data, (name, value)| data.with_attr(name, value));
    let id = tree.alloc(NodeType::Element(data));
    tree.append_child(parent, id);
    id
}

/// Append a text node under `parent`.
pub fn text(tree: &mut DomTree, parent: NodeId, content: &str) -> NodeId {
    let id = tree.alloc(NodeType::Text(content.to_string()));
    tree.append_child(parent, id);
    id
}

/// Append a comment under `parent`.
pub fn comment(tree: &mut DomTree, parent: NodeId, content: &str) -> NodeId {
    let id = tree.alloc(NodeType::Comment(content.to_string()));
    tree.append_child(parent, id);
    id
}

/// A small page covering every pseudo-class family:
///
/// ```text
/// html
///   head > title "Sample"
///   body#body[lang=en-US]
///     div#main.container
///       h1#title "Heading"
///       p#p1.intro "First" <!--note-->
///       p#p2 "Second"
///       ul#list > li#li1 "one", li#li2.done "two", li#li3 "three",
///                 li#li4.done "four", li#li5 "five"
///     form#form
///       input#name[type=text]
///       input#agree[type=checkbox][checked]
///       input#go[type=submit][disabled]
///       a#local[href=page.html] "here"
///       a#remote[href=https://example.com/x] "there"
///     div#empty <!--only a comment-->
///     div#space " "
///     p#fr[lang=fr] "Bonjour"
/// ```
pub fn sample_document() -> DomTree {
    let mut tree = DomTree::new();
    let html = element(&mut tree, NodeId::ROOT, "html", &[]);
    let head = element(&mut tree, html, "head", &[]);
    let title = element(&mut tree, head, "title", &[]);
    let _ = text(&mut tree, title, "Sample");

    let body = element(&mut tree, html, "body", &[("id", "body"), ("lang", "en-US")]);
    let main = element(&mut tree, body, "div", &[("id", "main"), ("class", "container")]);
    let h1 = element(&mut tree, main, "h1", &[("id", "title")]);
    let _ = text(&mut tree, h1, "Heading");
    let p1 = element(&mut tree, main, "p", &[("id", "p1"), ("class", "intro")]);
    let _ = text(&mut tree, p1, "First");
    let _ = comment(&mut tree, p1, "note");
    let p2 = element(&mut tree, main, "p", &[("id", "p2")]);
    let _ = text(&mut tree, p2, "Second");
    let list = element(&mut tree, main, "ul", &[("id", "list")]);
    for (i, word) in ["one", "two", "three", "four", "five"].iter().enumerate() {
        let id = format!("li{}", i + 1);
        let li = if i % 2 == 1 {
            element(&mut tree, list, "li", &[("id", id.as_str()), ("class", "done")])
        } else {
            element(&mut tree, list, "li", &[("id", id.as_str())])
        };
        let _ = text(&mut tree, li, word);
    }

    let form = element(&mut tree, body, "form", &[("id", "form")]);
    let _ = element(&mut tree, form, "input", &[("id", "name"), ("type", "text")]);
    let _ = element(
        &mut tree,
        form,
        "input",
        &[("id", "agree"), ("type", "checkbox"), ("checked", "")],
    );
    let _ = element(
        &mut tree,
        form,
        "input",
        &[("id", "go"), ("type", "submit"), ("disabled", "")],
    );
    let local = element(&mut tree, form, "a", &[("id", "local"), ("href", "page.html")]);
    let _ = text(&mut tree, local, "here");
    let remote = element(
        &mut tree,
        form,
        "a",
        &[("id", "remote"), ("href", "https://example.com/x")],
    );
    let _ = text(&mut tree, remote, "there");

    let empty = element(&mut tree, body, "div", &[("id", "empty")]);
    let _ = comment(&mut tree, empty, "only a comment");
    let space = element(&mut tree, body, "div", &[("id", "space")]);
    let _ = text(&mut tree, space, " ");
    let fr = element(&mut tree, body, "p", &[("id", "fr"), ("lang", "fr")]);
    let _ = text(&mut tree, fr, "Bonjour");

    tree
}

/// The node carrying `id="..."`.
///
/// # Panics
///
/// Panics if no element has that id.
pub fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.descendants(NodeId::ROOT)
        .find(|&n| tree.as_element(n).and_then(|e| e.id()) == Some(id))
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

/// Readable labels for `nodes`: the id attribute, else the tag name.
pub fn labels(tree: &DomTree, nodes: &[NodeId]) -> Vec<String> {
    nodes
        .iter()
        .filter_map(|&n| tree.as_element(n))
        .map(|e| e.id().unwrap_or(&e.tag_name).to_string())
        .collect()
}

/// An engine whose `:indeterminate` always answers `false`.
pub fn engine() -> Engine {
    Engine::new().with_random_source(FixedRandom(false))
}

/// Run `selector` from the document node and label the results.
///
/// # Panics
///
/// Panics if the selector fails to parse.
pub fn select_labels(tree: &DomTree, selector: &str) -> Vec<String> {
    let found = engine()
        .select(tree, selector, &[NodeId::ROOT])
        .unwrap_or_else(|e| panic!("{selector}: {e}"));
    labels(tree, &found)
}

/// Run `selector` from `scope` and label the results.
///
/// # Panics
///
/// Panics if the selector fails to parse.
pub fn select_labels_from(tree: &DomTree, selector: &str, scope: NodeId) -> Vec<String> {
    let found = engine()
        .select(tree, selector, &[scope])
        .unwrap_or_else(|e| panic!("{selector}: {e}"));
    labels(tree, &found)
}

/// A parent with `count` element children, all `<li>`.
pub fn list_of(count: usize) -> (DomTree, NodeId, Vec<NodeId>) {
    let mut tree = DomTree::new();
    let ul = element(&mut tree, NodeId::ROOT, "ul", &[]);
    let items = (1..=count)
        .map(|i| {
            let id = format!("i{i}");
            element(&mut tree, ul, "li", &[("id", id.as_str())])
        })
        .collect();
    (tree, ul, items)
}
