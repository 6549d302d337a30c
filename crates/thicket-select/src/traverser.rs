//! Evaluating a parsed [`Selector`] against a [`DomTree`].
//!
//! Two modes share the per-node tests:
//!
//! - **find** walks forward from each scope node, applying one
//!   (combinator, compound) step at a time to the whole candidate set, and
//!   returns the union over all groups in document order.
//! - **subject** asks whether one given node is matched, walking the
//!   combinator chain right to left from that node with backtracking. This
//!   is what `Engine::matches` uses.
//!
//! Nested selectors (`:has`, `:matches`, `:not`) run a forward search from
//! the node under test.

use std::collections::{HashMap, HashSet};

use thicket_common::warning::warn_once;
use thicket_dom::{DomTree, ElementData, NodeId};

use crate::config::{EngineConfig, RandomSource};
use crate::error::{Result, SelectError};
use crate::pseudo;
use crate::selector::{
    AttributeTest, Combinator, NamespaceConstraint, Selector, SelectorGroup,
    SimpleSelectorSequence, TypeSelector,
};
use crate::util::{matches_attribute, matches_attribute_ns, matches_attribute_value};

/// Everything a predicate may consult while testing one node.
///
/// `scope` is the caller-supplied context node. It is threaded unchanged
/// through every step and every nested selector, so `:scope` always means
/// the node the query started from.
#[derive(Clone, Copy)]
pub(crate) struct MatchContext<'a> {
    pub(crate) tree: &'a DomTree,
    pub(crate) scope: NodeId,
    pub(crate) config: &'a EngineConfig,
    pub(crate) random: &'a dyn RandomSource,
}

/// [§ 4.3 querySelectorAll](https://dom.spec.whatwg.org/#scope-match-a-selectors-string)
///
/// Every element matched by `selector` starting from any node of `scope`,
/// deduplicated and sorted in document order.
pub(crate) fn find(
    tree: &DomTree,
    config: &EngineConfig,
    random: &dyn RandomSource,
    selector: &Selector,
    scope: &[NodeId],
) -> Result<Vec<NodeId>> {
    if let Some(&unknown) = scope.iter().find(|&&id| !tree.contains(id)) {
        return Err(SelectError::UnknownNode(unknown));
    }

    let mut found = HashSet::new();
    for &scope_node in scope {
        let ctx = MatchContext {
            tree,
            scope: scope_node,
            config,
            random,
        };
        for group in &selector.groups {
            find_group_from(&ctx, group, scope_node, &mut found);
        }
    }

    let positions = tree.document_positions();
    let mut nodes: Vec<NodeId> = found.into_iter().collect();
    nodes.sort_by_key(|id| positions.get(id.0).copied().unwrap_or(usize::MAX));
    Ok(nodes)
}

/// `:has()`: whether a forward search from `node` finds anything.
pub(crate) fn has_match_from(ctx: &MatchContext<'_>, selector: &Selector, node: NodeId) -> bool {
    let mut found = HashSet::new();
    selector.groups.iter().any(|group| {
        find_group_from(ctx, group, node, &mut found);
        !found.is_empty()
    })
}

/// Whether `node` itself is matched by some group of `selector`.
pub(crate) fn is_subject(ctx: &MatchContext<'_>, selector: &Selector, node: NodeId) -> bool {
    ctx.tree.is_element(node)
        && selector
            .groups
            .iter()
            .any(|group| matches_steps(ctx, &group.steps, node))
}

/// Apply each step of `group` to the candidate set, starting from `{start}`.
///
/// STEP 1: The first combinator relates the chain to `start` itself: its
///         descendants, its children, or its following siblings.
/// STEP 2: Every later combinator relates to the nodes the previous step kept.
/// STEP 3: A node reached twice in one step is tested once.
fn find_group_from(
    ctx: &MatchContext<'_>,
    group: &SelectorGroup,
    start: NodeId,
    found: &mut HashSet<NodeId>,
) {
    let mut current = vec![start];
    for (combinator, sequence) in &group.steps {
        let mut seen = HashSet::new();
        let mut next = Vec::new();
        for &node in &current {
            for candidate in related(ctx.tree, node, *combinator) {
                if seen.insert(candidate) && matches_sequence(ctx, sequence, candidate) {
                    next.push(candidate);
                }
            }
        }
        if next.is_empty() {
            return;
        }
        current = next;
    }
    found.extend(current);
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// The elements standing in `combinator`'s relation to `node`, with `node`
/// on the left-hand side.
fn related(tree: &DomTree, node: NodeId, combinator: Combinator) -> Vec<NodeId> {
    match combinator {
        Combinator::Descendant => tree
            .descendants(node)
            .filter(|&d| tree.is_element(d))
            .collect(),
        Combinator::Child => tree.element_children(node).collect(),
        Combinator::AdjacentSibling => tree
            .following_siblings(node)
            .find(|&s| tree.is_element(s))
            .into_iter()
            .collect(),
        Combinator::GeneralSibling => tree
            .following_siblings(node)
            .filter(|&s| tree.is_element(s))
            .collect(),
    }
}

/// Match a combinator chain right to left, with `node` as the subject of
/// its last compound.
///
/// Unlike a greedy walk this backtracks: for `a b > c` every matching `b`
/// ancestor is tried, not only the nearest one.
fn matches_steps(
    ctx: &MatchContext<'_>,
    steps: &[(Combinator, SimpleSelectorSequence)],
    node: NodeId,
) -> bool {
    matches_chain(ctx, steps, node, &mut HashMap::new())
}

/// [`matches_steps`] with its answers cached per (chain prefix, node), so a
/// chain of descendant combinators over a deep tree visits each pair once.
fn matches_chain(
    ctx: &MatchContext<'_>,
    steps: &[(Combinator, SimpleSelectorSequence)],
    node: NodeId,
    memo: &mut HashMap<(usize, NodeId), bool>,
) -> bool {
    let key = (steps.len(), node);
    if let Some(&known) = memo.get(&key) {
        return known;
    }
    let result = match_chain_uncached(ctx, steps, node, memo);
    let _ = memo.insert(key, result);
    result
}

fn match_chain_uncached(
    ctx: &MatchContext<'_>,
    steps: &[(Combinator, SimpleSelectorSequence)],
    node: NodeId,
    memo: &mut HashMap<(usize, NodeId), bool>,
) -> bool {
    let Some(((combinator, sequence), rest)) = steps.split_last() else {
        return true;
    };
    if !matches_sequence(ctx, sequence, node) {
        return false;
    }
    let tree = ctx.tree;

    // The leftmost compound relates to the scope. An implicit leading
    // descendant combinator places no constraint.
    if rest.is_empty() {
        return match combinator {
            Combinator::Descendant => true,
            Combinator::Child => tree.parent(node) == Some(ctx.scope),
            Combinator::AdjacentSibling => previous_element_sibling(tree, node) == Some(ctx.scope),
            Combinator::GeneralSibling => tree.preceding_siblings(node).any(|s| s == ctx.scope),
        };
    }

    match combinator {
        // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
        // "A selector of the form 'A B' represents an element B that is an
        // arbitrary descendant of some ancestor element A."
        Combinator::Descendant => tree
            .ancestors(node)
            .filter(|&a| tree.is_element(a))
            .any(|a| matches_chain(ctx, rest, a, memo)),

        // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
        Combinator::Child => tree
            .parent(node)
            .filter(|&p| tree.is_element(p))
            .is_some_and(|p| matches_chain(ctx, rest, p, memo)),

        // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
        Combinator::AdjacentSibling => previous_element_sibling(tree, node)
            .is_some_and(|s| matches_chain(ctx, rest, s, memo)),

        // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
        Combinator::GeneralSibling => tree
            .preceding_siblings(node)
            .filter(|&s| tree.is_element(s))
            .any(|s| matches_chain(ctx, rest, s, memo)),
    }
}

fn previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node).find(|&s| tree.is_element(s))
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// Every simple selector of `sequence` must hold for `node`.
pub(crate) fn matches_sequence(
    ctx: &MatchContext<'_>,
    sequence: &SimpleSelectorSequence,
    node: NodeId,
) -> bool {
    let Some(element) = ctx.tree.as_element(node) else {
        return false;
    };

    if let Some(type_selector) = &sequence.type_selector {
        if !matches_type(ctx, type_selector, node, element) {
            return false;
        }
    }

    // [§ 6.7 ID selectors](https://www.w3.org/TR/selectors-4/#id-selectors)
    if let Some(id) = &sequence.id {
        if element.id() != Some(id.as_str()) {
            return false;
        }
    }

    // [§ 6.6 Class selectors](https://www.w3.org/TR/selectors-4/#class-html)
    if !sequence.classes.is_empty() {
        let classes = element.classes();
        if !sequence.classes.iter().all(|c| classes.contains(c.as_str())) {
            return false;
        }
    }

    sequence
        .attributes
        .iter()
        .all(|test| matches_attribute_test(ctx, test, node))
        && sequence
            .pseudo_classes
            .iter()
            .all(|pc| pseudo::matches(ctx, pc, node))
        && sequence
            .pseudo_elements
            .iter()
            .all(|&pe| pseudo::matches_pseudo_element(ctx, pe, node))
}

/// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
///
/// Tag names compare ASCII case-insensitively.
fn matches_type(
    ctx: &MatchContext<'_>,
    type_selector: &TypeSelector,
    node: NodeId,
    element: &ElementData,
) -> bool {
    let name_matches = type_selector
        .name
        .as_ref()
        .is_none_or(|name| element.tag_name.eq_ignore_ascii_case(name));
    if !name_matches {
        return false;
    }
    match &type_selector.namespace {
        None | Some(NamespaceConstraint::Any) => true,
        Some(NamespaceConstraint::NoNamespace) => element.namespace.is_none(),
        Some(NamespaceConstraint::Prefix(prefix)) => resolve_prefix(ctx, prefix, node)
            .is_some_and(|uri| element.namespace.as_deref() == Some(uri.as_str())),
    }
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// Without a namespace component only attributes without a prefix are
/// considered, as with `[|name]`.
fn matches_attribute_test(ctx: &MatchContext<'_>, test: &AttributeTest, node: NodeId) -> bool {
    let value = test.value.as_deref();
    match &test.namespace {
        None | Some(NamespaceConstraint::NoNamespace) => {
            matches_attribute(ctx.tree, node, &test.name, value, test.operator)
        }
        Some(NamespaceConstraint::Any) => ctx.tree.as_element(node).is_some_and(|element| {
            element.attrs.iter().any(|(qualified, actual)| {
                let local = qualified
                    .split_once(':')
                    .map_or(qualified.as_str(), |(_, local)| local);
                local == test.name
                    && value.is_none_or(|needle| matches_attribute_value(needle, actual, test.operator))
            })
        }),
        Some(NamespaceConstraint::Prefix(prefix)) => resolve_prefix(ctx, prefix, node)
            .is_some_and(|uri| {
                matches_attribute_ns(ctx.tree, node, &test.name, &uri, value, test.operator)
            }),
    }
}

/// The URI bound to `prefix`: the engine's configured bindings first, then
/// the document's declarations in scope at `node`.
fn resolve_prefix(ctx: &MatchContext<'_>, prefix: &str, node: NodeId) -> Option<String> {
    let uri = ctx
        .config
        .namespaces
        .get(prefix)
        .cloned()
        .or_else(|| ctx.tree.lookup_namespace_uri(node, prefix));
    if uri.is_none() {
        warn_once(
            "Selector",
            &format!("namespace prefix '{prefix}' is not declared; '{prefix}|' matches nothing"),
        );
    }
    uri
}
