//! Selector parser module.

/// Recursive-descent parser from tokens to a [`crate::Selector`].
pub mod parser;

pub use parser::SelectorParser;
