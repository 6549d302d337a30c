//! Errors raised while parsing or evaluating a selector.

use thicket_dom::NodeId;
use thiserror::Error;

/// Every way a `parse` or `find` call can fail.
///
/// All of these abort the call; there is never a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Illegal token, unterminated construct, empty required argument or
    /// malformed attribute selector.
    #[error("syntax error at position {position} in '{selector}': {message}")]
    Syntax {
        /// The full selector text being parsed.
        selector: String,
        /// Character offset of the offending input.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// A `:name` that is not in the pseudo-class registry.
    #[error("unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    /// A `::name` that is not a supported pseudo-element.
    #[error("unknown pseudo-element '::{0}'")]
    UnknownPseudoElement(String),

    /// A pseudo-class that requires a value (`:lang()`) was given none.
    #[error("pseudo-class ':{0}' requires a value")]
    MissingValue(String),

    /// `:has(:has(...))` chains nested deeper than the configured limit.
    #[error("selector nesting exceeds the limit of {limit}")]
    NestingTooDeep {
        /// The configured `max_nesting_depth`.
        limit: usize,
    },

    /// A scope or subject node id that does not belong to the queried tree.
    #[error("node {0:?} is not part of the tree")]
    UnknownNode(NodeId),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SelectError>;

impl SelectError {
    pub(crate) fn syntax(selector: &str, position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            selector: selector.to_string(),
            position,
            message: message.into(),
        }
    }
}
