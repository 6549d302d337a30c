//! Selector tokens.
//!
//! The selector grammar is a small subset of CSS syntax, so the token set is
//! shaped for the parser rather than following
//! [CSS Syntax § 4](https://www.w3.org/TR/css-syntax-3/#tokenization) one to one:
//! `.class` and `#id` arrive as single tokens, whitespace has already been
//! reduced to [`Combinator::Descendant`] where it is significant, and a
//! pseudo-class argument is captured raw.

use core::fmt;

use crate::selector::{AttributeOperator, Combinator};

/// A lexical token of a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// A name: tag name, namespace prefix, attribute name, or unquoted
    /// attribute value. Escapes are already resolved.
    Ident(String),
    /// `#name`
    Hash(String),
    /// `.name`
    Class(String),
    /// `*`
    Star,
    /// `|`, the namespace separator.
    Pipe,
    /// `:name`
    PseudoClass(String),
    /// `::name`
    PseudoElement(String),
    /// The raw text between the parentheses that follow a pseudo-class.
    Arguments(String),
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `=`, `~=`, `|=`, `*=`, `^=`, `$=`
    Operator(AttributeOperator),
    /// A quoted string with quotes removed and escapes resolved.
    String(String),
    /// `>`, `+`, `~`, or significant whitespace.
    Combinator(Combinator),
    /// `,`
    Comma,
    /// End of input.
    EOF,
}

impl SelectorToken {
    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EOF)
    }

    /// Whether a compound selector can end with this token, so that
    /// whitespace after it separates two compounds.
    #[must_use]
    pub const fn ends_compound(&self) -> bool {
        matches!(
            self,
            Self::Ident(_)
                | Self::Hash(_)
                | Self::Class(_)
                | Self::Star
                | Self::RightBracket
                | Self::PseudoClass(_)
                | Self::PseudoElement(_)
                | Self::Arguments(_)
        )
    }
}

impl fmt::Display for SelectorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Hash(name) => write!(f, "'#{name}'"),
            Self::Class(name) => write!(f, "'.{name}'"),
            Self::Star => f.write_str("'*'"),
            Self::Pipe => f.write_str("'|'"),
            Self::PseudoClass(name) => write!(f, "':{name}'"),
            Self::PseudoElement(name) => write!(f, "'::{name}'"),
            Self::Arguments(raw) => write!(f, "'({raw})'"),
            Self::LeftBracket => f.write_str("'['"),
            Self::RightBracket => f.write_str("']'"),
            Self::Operator(op) => write!(f, "'{}'", op.as_str()),
            Self::String(value) => write!(f, "string \"{value}\""),
            Self::Combinator(Combinator::Descendant) => f.write_str("whitespace"),
            Self::Combinator(combinator) => write!(f, "'{}'", combinator.as_str()),
            Self::Comma => f.write_str("','"),
            Self::EOF => f.write_str("end of input"),
        }
    }
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    /// The token.
    pub token: SelectorToken,
    /// Character (not byte) offset into the selector.
    pub position: usize,
}
