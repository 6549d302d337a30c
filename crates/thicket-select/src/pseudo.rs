//! Pseudo-class registry and evaluator.
//!
//! [§ 3.6 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
//!
//! Names form a closed enum so that the parser can reject unknown names and
//! missing values up front; evaluation is an exhaustive `match` and cannot fail.

use core::fmt;

use serde::Serialize;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use thicket_common::warning::warn_once;
use thicket_dom::{NodeId, NodeType};

use crate::selector::{AnB, AttributeOperator, Selector};
use crate::traverser::{self, MatchContext};
use crate::util::{matches_attribute_value, remove_quotes, url_scheme};

/// Every pseudo-class name the engine knows.
///
/// Lookup is ASCII case-insensitive: `PseudoClassName::from_str("First-Child")`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoClassName {
    // User-agent state; never matches.
    /// `:hover`
    Hover,
    /// `:active`
    Active,
    /// `:focus`
    Focus,
    /// `:focus-within`
    FocusWithin,
    /// `:focus-visible`
    FocusVisible,
    /// `:visited`
    Visited,
    /// `:animated` (jQuery)
    Animated,
    /// `:visible` (jQuery)
    Visible,
    /// `:hidden` (jQuery)
    Hidden,
    /// `:target`
    Target,
    /// `:current`
    Current,
    /// `:past`
    Past,
    /// `:future`
    Future,
    /// `:default`
    Default,
    /// `:valid`
    Valid,
    /// `:invalid`
    Invalid,
    /// `:in-range`
    InRange,
    /// `:out-of-range`
    OutOfRange,
    /// `:required`
    Required,
    /// `:optional`
    Optional,
    /// `:read-only`
    ReadOnly,
    /// `:read-write`
    ReadWrite,
    /// `:placeholder-shown`
    PlaceholderShown,
    /// `:dir(ltr)`
    Dir,
    /// `:nth-column(An+B)`
    NthColumn,
    /// `:nth-last-column(An+B)`
    NthLastColumn,

    /// `:indeterminate`: an unspecified boolean.
    Indeterminate,
    /// `:lang(en)`
    Lang,
    /// `:any-link`
    AnyLink,
    /// `:link`
    Link,
    /// `:local-link`
    LocalLink,

    // Tree structure
    /// `:root`
    Root,
    /// `:scope`
    Scope,
    /// `:x-root`, legacy alias of `:scope`
    XRoot,
    /// `:x-reset`, legacy alias of `:scope`
    XReset,
    /// `:even`, short for `:nth-child(even)`
    Even,
    /// `:odd`, short for `:nth-child(odd)`
    Odd,
    /// `:nth-child(An+B)`
    NthChild,
    /// `:nth-last-child(An+B)`
    NthLastChild,
    /// `:nth-of-type(An+B)`
    NthOfType,
    /// `:nth-last-of-type(An+B)`
    NthLastOfType,
    /// `:first-of-type`
    FirstOfType,
    /// `:last-of-type`
    LastOfType,
    /// `:only-of-type`
    OnlyOfType,
    /// `:lt(3)`
    Lt,
    /// `:gt(3)`
    Gt,
    /// `:nth(3)`
    Nth,
    /// `:eq(3)`
    Eq,
    /// `:first`
    First,
    /// `:first-child`
    FirstChild,
    /// `:last`
    Last,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:empty`
    Empty,
    /// `:parent`, the negation of `:empty`
    Parent,

    // Forms
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:checked`
    Checked,
    /// `:text`
    Text,
    /// `:radio`
    Radio,
    /// `:checkbox`
    Checkbox,
    /// `:file`
    File,
    /// `:password`
    Password,
    /// `:submit`
    Submit,
    /// `:image`
    Image,
    /// `:reset`
    Reset,
    /// `:button`
    Button,
    /// `:header`: `h1` through `h9`
    Header,

    // Selector arguments
    /// `:has(sel)`
    Has,
    /// `:matches(sel)`
    Matches,
    /// `:is(sel)`
    Is,
    /// `:any(sel)`
    Any,
    /// `:not(sel)`
    Not,

    // Text
    /// `:contains(text)`
    Contains,
    /// `:contains-exactly(text)`
    ContainsExactly,
}

/// What a pseudo-class accepts between its parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// No parentheses allowed.
    None,
    /// Parentheses optional and their content ignored.
    Ignored,
    /// Required free text.
    Text,
    /// Required `An+B` rule.
    Nth,
    /// Required integer.
    Index,
    /// Required selector list.
    Selector,
}

impl PseudoClassName {
    /// The pseudo-class name as written in a selector.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// What this pseudo-class takes as an argument.
    #[must_use]
    pub const fn argument_kind(self) -> ArgumentKind {
        match self {
            Self::Dir | Self::NthColumn | Self::NthLastColumn => ArgumentKind::Ignored,
            Self::Lang | Self::Contains | Self::ContainsExactly => ArgumentKind::Text,
            Self::NthChild
            | Self::NthLastChild
            | Self::NthOfType
            | Self::NthLastOfType
            | Self::Nth
            | Self::Eq => ArgumentKind::Nth,
            Self::Lt | Self::Gt => ArgumentKind::Index,
            Self::Has | Self::Matches | Self::Is | Self::Any | Self::Not => ArgumentKind::Selector,
            _ => ArgumentKind::None,
        }
    }

    /// Pseudo-classes that depend on user-agent state and never match here.
    #[must_use]
    pub const fn is_user_agent_state(self) -> bool {
        matches!(
            self,
            Self::Hover
                | Self::Active
                | Self::Focus
                | Self::FocusWithin
                | Self::FocusVisible
                | Self::Visited
                | Self::Animated
                | Self::Visible
                | Self::Hidden
                | Self::Target
                | Self::Current
                | Self::Past
                | Self::Future
                | Self::Default
                | Self::Valid
                | Self::Invalid
                | Self::InRange
                | Self::OutOfRange
                | Self::Required
                | Self::Optional
                | Self::ReadOnly
                | Self::ReadWrite
                | Self::PlaceholderShown
                | Self::Dir
                | Self::NthColumn
                | Self::NthLastColumn
        )
    }
}

/// The parsed argument of a pseudo-class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PseudoArgument {
    /// No argument.
    None,
    /// Free text, trimmed, as written.
    Text(String),
    /// An `An+B` rule.
    Nth(AnB),
    /// An integer.
    Index(i64),
    /// A nested selector.
    Selector(Box<Selector>),
}

impl PseudoArgument {
    fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            _ => "",
        }
    }

    fn an_b(&self) -> AnB {
        match self {
            Self::Nth(rule) => *rule,
            _ => AnB::default(),
        }
    }

    fn index(&self) -> i64 {
        match self {
            Self::Index(index) => *index,
            _ => 0,
        }
    }
}

/// A pseudo-class test: `:name` or `:name(argument)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PseudoClass {
    /// Which pseudo-class.
    pub name: PseudoClassName,
    /// Its argument, shaped by [`PseudoClassName::argument_kind`].
    pub argument: PseudoArgument,
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.name.as_str())?;
        match &self.argument {
            PseudoArgument::None => Ok(()),
            PseudoArgument::Text(text) => write!(f, "({text})"),
            PseudoArgument::Nth(rule) => write!(f, "({rule})"),
            PseudoArgument::Index(index) => write!(f, "({index})"),
            PseudoArgument::Selector(selector) => write!(f, "({selector})"),
        }
    }
}

/// [§ 11 Pseudo-elements](https://www.w3.org/TR/selectors-4/#pseudo-elements)
///
/// Without rendering, a pseudo-element only exists when its element has text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum PseudoElement {
    /// `::first-line`
    FirstLine,
    /// `::first-letter`
    FirstLetter,
    /// `::before`
    Before,
    /// `::after`
    After,
}

impl fmt::Display for PseudoElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str((*self).into())
    }
}

/// Evaluate `pseudo` against `node`.
pub(crate) fn matches(ctx: &MatchContext<'_>, pseudo: &PseudoClass, node: NodeId) -> bool {
    let tree = ctx.tree;
    let argument = &pseudo.argument;
    match pseudo.name {
        name if name.is_user_agent_state() => {
            warn_once(
                "Selector",
                &format!(
                    "':{}' has no user-agent context and never matches",
                    name.as_str()
                ),
            );
            false
        }
        PseudoClassName::Indeterminate => {
            warn_once("Selector", "':indeterminate' answers with a random boolean");
            ctx.random.next_bool()
        }
        PseudoClassName::Lang => matches_lang(ctx, node, argument.text()),
        PseudoClassName::AnyLink => ["href", "src", "link"]
            .iter()
            .any(|name| has_attr(ctx, node, name)),
        PseudoClassName::Link => has_attr(ctx, node, "href"),
        PseudoClassName::LocalLink => attr(ctx, node, "href")
            .is_some_and(|href| url_scheme(href).is_none_or(|scheme| scheme.eq_ignore_ascii_case("file"))),

        // [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
        // "The :root pseudo-class represents an element that is the root of the document."
        PseudoClassName::Root => tree.is_document_element(node),

        // [§ 14.2 :scope](https://www.w3.org/TR/selectors-4/#the-scope-pseudo)
        PseudoClassName::Scope | PseudoClassName::XRoot | PseudoClassName::XReset => {
            node == ctx.scope
        }

        PseudoClassName::Even => matches_nth(ctx, node, AnB::new(2, 0), false, false),
        PseudoClassName::Odd => matches_nth(ctx, node, AnB::new(2, 1), false, false),
        PseudoClassName::NthChild | PseudoClassName::Nth | PseudoClassName::Eq => {
            matches_nth(ctx, node, argument.an_b(), false, false)
        }
        PseudoClassName::NthLastChild => matches_nth(ctx, node, argument.an_b(), true, false),
        PseudoClassName::NthOfType => matches_nth(ctx, node, argument.an_b(), false, true),
        PseudoClassName::NthLastOfType => matches_nth(ctx, node, argument.an_b(), true, true),
        PseudoClassName::FirstOfType => !has_sibling(ctx, node, false, true),
        PseudoClassName::LastOfType => !has_sibling(ctx, node, true, true),
        PseudoClassName::OnlyOfType => {
            !has_sibling(ctx, node, false, true) && !has_sibling(ctx, node, true, true)
        }
        PseudoClassName::Lt => matches_nth(ctx, node, AnB::new(-1, argument.index()), false, false),
        PseudoClassName::Gt => {
            tree.parent(node).is_some()
                && i64::try_from(sibling_position(ctx, node, false, false))
                    .is_ok_and(|position| position > argument.index())
        }
        PseudoClassName::First | PseudoClassName::FirstChild => {
            matches_nth(ctx, node, AnB::new(0, 1), false, false)
        }
        PseudoClassName::Last | PseudoClassName::LastChild => {
            matches_nth(ctx, node, AnB::new(0, 1), true, false)
        }
        PseudoClassName::OnlyChild => {
            matches_nth(ctx, node, AnB::new(0, 1), false, false)
                && matches_nth(ctx, node, AnB::new(0, 1), true, false)
        }
        PseudoClassName::Empty => is_empty(ctx, node),
        PseudoClassName::Parent => !is_empty(ctx, node),

        PseudoClassName::Enabled | PseudoClassName::Disabled | PseudoClassName::Checked => {
            has_attr(ctx, node, pseudo.name.as_str())
        }
        PseudoClassName::Text
        | PseudoClassName::Radio
        | PseudoClassName::Checkbox
        | PseudoClassName::File
        | PseudoClassName::Password
        | PseudoClassName::Submit
        | PseudoClassName::Image
        | PseudoClassName::Reset
        | PseudoClassName::Button => {
            attr(ctx, node, "type").is_some_and(|kind| kind == pseudo.name.as_str())
        }
        PseudoClassName::Header => tree.as_element(node).is_some_and(|e| {
            let tag = e.tag_name.as_bytes();
            tag.len() == 2 && tag[0].eq_ignore_ascii_case(&b'h') && (b'1'..=b'9').contains(&tag[1])
        }),

        // All four run the same nested search scoped to `node`; `:not` is its
        // exact negation.
        PseudoClassName::Has
        | PseudoClassName::Matches
        | PseudoClassName::Is
        | PseudoClassName::Any => has_nested_match(ctx, argument, node),
        PseudoClassName::Not => !has_nested_match(ctx, argument, node),

        PseudoClassName::Contains => {
            let needle = remove_quotes(argument.text()).to_lowercase();
            tree.text_content(node).to_lowercase().contains(&needle)
        }
        PseudoClassName::ContainsExactly => {
            tree.text_content(node) == remove_quotes(argument.text())
        }

        // Covered by the user-agent guard above.
        PseudoClassName::Hover
        | PseudoClassName::Active
        | PseudoClassName::Focus
        | PseudoClassName::FocusWithin
        | PseudoClassName::FocusVisible
        | PseudoClassName::Visited
        | PseudoClassName::Animated
        | PseudoClassName::Visible
        | PseudoClassName::Hidden
        | PseudoClassName::Target
        | PseudoClassName::Current
        | PseudoClassName::Past
        | PseudoClassName::Future
        | PseudoClassName::Default
        | PseudoClassName::Valid
        | PseudoClassName::Invalid
        | PseudoClassName::InRange
        | PseudoClassName::OutOfRange
        | PseudoClassName::Required
        | PseudoClassName::Optional
        | PseudoClassName::ReadOnly
        | PseudoClassName::ReadWrite
        | PseudoClassName::PlaceholderShown
        | PseudoClassName::Dir
        | PseudoClassName::NthColumn
        | PseudoClassName::NthLastColumn => false,
    }
}

/// Evaluate a pseudo-element against `node`.
pub(crate) fn matches_pseudo_element(ctx: &MatchContext<'_>, _: PseudoElement, node: NodeId) -> bool {
    !ctx.tree.text_content(node).is_empty()
}

fn nested(argument: &PseudoArgument) -> Option<&Selector> {
    match argument {
        PseudoArgument::Selector(selector) => Some(selector),
        _ => None,
    }
}

/// Whether a forward search for the nested selector, starting from `node`
/// alone, finds anything.
fn has_nested_match(ctx: &MatchContext<'_>, argument: &PseudoArgument, node: NodeId) -> bool {
    nested(argument).is_some_and(|selector| traverser::has_match_from(ctx, selector, node))
}

fn attr<'a>(ctx: &MatchContext<'a>, node: NodeId, name: &str) -> Option<&'a str> {
    ctx.tree.as_element(node).and_then(|e| e.attr(name))
}

fn has_attr(ctx: &MatchContext<'_>, node: NodeId, name: &str) -> bool {
    attr(ctx, node, name).is_some()
}

/// [§ 7.2 :lang()](https://www.w3.org/TR/selectors-4/#the-lang-pseudo)
///
/// The language is the nearest `lang` (or `xml:lang`) on the element or an
/// ancestor. A hyphenated value must match exactly; a bare value matches any
/// hyphen-separated part (`en` matches `en-US`).
fn matches_lang(ctx: &MatchContext<'_>, node: NodeId, value: &str) -> bool {
    let language = std::iter::once(node)
        .chain(ctx.tree.ancestors(node))
        .filter_map(|n| ctx.tree.as_element(n))
        .find_map(|e| e.attr("lang").or_else(|| e.attr("xml:lang")));
    let Some(language) = language else {
        return false;
    };
    let operator = if value.contains('-') {
        AttributeOperator::Exactly
    } else {
        AttributeOperator::ContainsWithHyphen
    };
    matches_attribute_value(value, language, operator)
}

/// [§ 14.4 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
///
/// No element children and no text, not even whitespace. Comments and
/// processing instructions do not count.
fn is_empty(ctx: &MatchContext<'_>, node: NodeId) -> bool {
    ctx.tree
        .children(node)
        .iter()
        .all(|&c| match ctx.tree.get(c).map(|n| &n.node_type) {
            Some(NodeType::Text(text)) => text.is_empty(),
            Some(NodeType::Comment(_) | NodeType::ProcessingInstruction { .. }) => true,
            _ => false,
        })
}

/// [§ 15 Child-indexed pseudo-classes](https://www.w3.org/TR/selectors-4/#child-index)
///
/// Position-based matching shared by every `nth-*` variant.
///
/// STEP 1: An element without a parent never matches.
/// STEP 2: `0n+0` is an invalid rule and `an+b` with `b > a > 0` is treated
///         as unreachable; neither matches.
/// STEP 3: With `a == 0` the position must equal `b`.
/// STEP 4: Otherwise `b` is shifted by `a` when negative and the element
///         matches iff `(position - b) / a` is a non-negative integer.
///
/// The arithmetic runs in `i128`, where no pair of `i64` coefficients can
/// overflow.
fn matches_nth(ctx: &MatchContext<'_>, node: NodeId, rule: AnB, reverse: bool, by_type: bool) -> bool {
    if ctx.tree.parent(node).is_none() {
        return false;
    }
    let AnB { a, b } = rule;
    if (a == 0 && b == 0) || (a > 0 && b > a) {
        return false;
    }
    let Ok(position) = i128::try_from(sibling_position(ctx, node, reverse, by_type)) else {
        return false;
    };
    let (a, b) = (i128::from(a), i128::from(b));
    if a == 0 {
        return position == b;
    }
    let b = if b < 0 { a + b } else { b };
    let offset = position - b;
    offset.checked_rem(a) == Some(0) && offset.checked_div(a).is_some_and(|n| n >= 0)
}

/// 1-based position of `node` among its element siblings, counted from the
/// end when `reverse`, and among same-named siblings only when `by_type`.
fn sibling_position(ctx: &MatchContext<'_>, node: NodeId, reverse: bool, by_type: bool) -> usize {
    let tree = ctx.tree;
    let siblings = if reverse {
        tree.following_siblings(node)
    } else {
        tree.preceding_siblings(node)
    };
    1 + siblings
        .filter(|&sibling| is_counted_sibling(ctx, node, sibling, by_type))
        .count()
}

fn has_sibling(ctx: &MatchContext<'_>, node: NodeId, after: bool, by_type: bool) -> bool {
    if ctx.tree.parent(node).is_none() {
        return true;
    }
    let mut siblings = if after {
        ctx.tree.following_siblings(node)
    } else {
        ctx.tree.preceding_siblings(node)
    };
    siblings.any(|sibling| is_counted_sibling(ctx, node, sibling, by_type))
}

fn is_counted_sibling(ctx: &MatchContext<'_>, node: NodeId, sibling: NodeId, by_type: bool) -> bool {
    let Some(other) = ctx.tree.as_element(sibling) else {
        return false;
    };
    !by_type
        || ctx
            .tree
            .as_element(node)
            .is_some_and(|e| e.tag_name.eq_ignore_ascii_case(&other.tag_name))
}
