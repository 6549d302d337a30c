//! CSS selector query engine for the Thicket document tree.
//!
//! # Scope
//!
//! This crate implements:
//! - **Selector tokenizer** ([CSS Syntax § 4](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Escapes, quoted strings, whitespace-as-combinator
//!   - Raw capture of pseudo-class arguments
//!
//! - **Selector parser** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Selector lists, compound and complex selectors, relative selectors
//!   - Namespaced type and attribute selectors
//!   - Pseudo-class names resolved against a closed registry
//!
//! - **Traverser**
//!   - Forward search from a scope set, deduplicated and in document order
//!   - Subject test for a single node (`Engine::matches`)
//!
//! - **Pseudo-classes**
//!   - Tree-structural and `An+B` classes, jQuery-style positional classes
//!   - Form-type shorthands, `:lang`, links, `:contains`
//!   - `:has`, `:matches`, `:is`, `:any`, `:not` with bounded nesting
//!
//! # Not Implemented
//!
//! - User-agent state (`:hover`, `:focus`, `:visited`, validity): these parse
//!   and never match
//! - Specificity and cascade
//!
//! # Example
//!
//! ```
//! use thicket_dom::{DomTree, ElementData, NodeId, NodeType};
//!
//! let mut tree = DomTree::new();
//! let ul = tree.alloc(NodeType::Element(ElementData::new("ul")));
//! let li = tree.alloc(NodeType::Element(ElementData::new("li").with_attr("class", "done")));
//! tree.append_child(NodeId::ROOT, ul);
//! tree.append_child(ul, li);
//!
//! let found = thicket_select::select(&tree, "ul > li.done:first-child", &[NodeId::ROOT]).unwrap();
//! assert_eq!(found, vec![li]);
//! ```

use core::fmt;
use core::str::FromStr;

use thicket_dom::{DomTree, NodeId};

/// Engine configuration and the `:indeterminate` random source.
pub mod config;
/// The error type shared by parsing and matching.
pub mod error;
/// Recursive-descent parser from tokens to a [`Selector`].
pub mod parser;
/// Pseudo-class registry, pseudo-elements, and their evaluation.
pub mod pseudo;
/// The parsed selector structure.
pub mod selector;
/// Selector tokenizer.
pub mod tokenizer;
/// Attribute/value matching, quote stripping and `An+B` parsing.
pub mod util;

mod traverser;

pub use config::{DEFAULT_MAX_NESTING_DEPTH, EngineConfig, FixedRandom, RandomSource, ThreadRandom};
pub use error::{Result, SelectError};
pub use parser::SelectorParser;
pub use pseudo::{ArgumentKind, PseudoArgument, PseudoClass, PseudoClassName, PseudoElement};
pub use selector::{
    AnB, AttributeOperator, AttributeTest, Combinator, NamespaceConstraint, Selector,
    SelectorGroup, SimpleSelectorSequence, TypeSelector,
};
pub use tokenizer::{SelectorToken, SelectorTokenizer, SpannedToken, tokenize};
pub use util::{matches_attribute, matches_attribute_ns, matches_attribute_value, parse_an_b, remove_quotes};

use traverser::MatchContext;

/// A configured selector engine.
///
/// Holds no per-query state; one engine can serve any number of trees.
pub struct Engine {
    config: EngineConfig,
    random: Box<dyn RandomSource>,
}

impl Engine {
    /// An engine with the default configuration and a thread-local random
    /// source.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// An engine with `config` and a thread-local random source.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            random: Box::new(ThreadRandom),
        }
    }

    /// Replace the source `:indeterminate` draws from.
    #[must_use]
    pub fn with_random_source(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse `selector` under this engine's nesting limit.
    ///
    /// # Errors
    ///
    /// See [`SelectorParser::parse_selector`].
    pub fn parse(&self, selector: &str) -> Result<Selector> {
        let tokens = tokenize(selector)?;
        SelectorParser::new(selector, tokens)
            .with_max_nesting_depth(self.config.max_nesting_depth)
            .parse_selector()
    }

    /// Every element matched by `selector` from any node of `scope`,
    /// without duplicates, in document order. A scope node is never part of
    /// its own result unless another scope node reaches it.
    ///
    /// # Errors
    ///
    /// [`SelectError::UnknownNode`] if a scope id is not in `tree`.
    pub fn find(&self, tree: &DomTree, selector: &Selector, scope: &[NodeId]) -> Result<Vec<NodeId>> {
        traverser::find(tree, &self.config, self.random.as_ref(), selector, scope)
    }

    /// [`Engine::parse`] then [`Engine::find`].
    ///
    /// # Errors
    ///
    /// Any error of either step.
    pub fn select(&self, tree: &DomTree, selector: &str, scope: &[NodeId]) -> Result<Vec<NodeId>> {
        let selector = self.parse(selector)?;
        self.find(tree, &selector, scope)
    }

    /// Whether `node` itself is matched by `selector`, with `scope` as the
    /// context node for `:scope` and leading combinators.
    ///
    /// # Errors
    ///
    /// [`SelectError::UnknownNode`] if `node` or `scope` is not in `tree`.
    pub fn matches(
        &self,
        tree: &DomTree,
        selector: &Selector,
        node: NodeId,
        scope: NodeId,
    ) -> Result<bool> {
        for id in [node, scope] {
            if !tree.contains(id) {
                return Err(SelectError::UnknownNode(id));
            }
        }
        let ctx = MatchContext {
            tree,
            scope,
            config: &self.config,
            random: self.random.as_ref(),
        };
        Ok(traverser::is_subject(&ctx, selector, node))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FromStr for Selector {
    type Err = SelectError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// Parse `selector` with the default configuration.
///
/// # Errors
///
/// See [`SelectorParser::parse_selector`].
pub fn parse(selector: &str) -> Result<Selector> {
    Engine::new().parse(selector)
}

/// Find the matches of `selector` with the default configuration.
///
/// # Errors
///
/// See [`Engine::find`].
pub fn find(tree: &DomTree, selector: &Selector, scope: &[NodeId]) -> Result<Vec<NodeId>> {
    Engine::new().find(tree, selector, scope)
}

/// Parse and find in one call with the default configuration.
///
/// # Errors
///
/// See [`Engine::select`].
pub fn select(tree: &DomTree, selector: &str, scope: &[NodeId]) -> Result<Vec<NodeId>> {
    Engine::new().select(tree, selector, scope)
}
