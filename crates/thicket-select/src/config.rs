//! Engine configuration and the injectable random source behind `:indeterminate`.

use std::collections::HashMap;

/// Default bound on `:has(:not(:matches(...)))` nesting.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

/// Tunables for parsing and matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How deeply selector arguments (`:has`, `:not`, `:matches`) may nest.
    pub max_nesting_depth: usize,
    /// Namespace prefix → URI bindings consulted before the document's own
    /// `xmlns:` declarations.
    pub namespaces: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            namespaces: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Set the nesting limit.
    #[must_use]
    pub const fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Bind a namespace prefix for `prefix|name` selectors.
    #[must_use]
    pub fn with_namespace(mut self, prefix: &str, uri: &str) -> Self {
        let _ = self.namespaces.insert(prefix.to_string(), uri.to_string());
        self
    }
}

/// Source of the coin flips `:indeterminate` returns.
///
/// There is no user agent to ask whether a checkbox is indeterminate, so the
/// pseudo-class answers with an unspecified boolean. Tests pin it with
/// [`FixedRandom`].
pub trait RandomSource: Send + Sync {
    /// The next boolean.
    fn next_bool(&self) -> bool;
}

/// Thread-local generator from `fastrand`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_bool(&self) -> bool {
        fastrand::bool()
    }
}

/// Always answers the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub bool);

impl RandomSource for FixedRandom {
    fn next_bool(&self) -> bool {
        self.0
    }
}
