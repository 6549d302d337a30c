//! Selector tokenizer module.

/// Selector token types.
pub mod token;
/// Selector tokenizer implementation.
pub mod tokenizer;

pub use token::{SelectorToken, SpannedToken};
pub use tokenizer::{SelectorTokenizer, tokenize};
