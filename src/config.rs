//! Parser Configuration
//!
//! Security limits applied to entity expansion. The defaults suit untrusted
//! input; trusted documents with heavy entity use may raise them.

use crate::core::entities::{DEFAULT_EXPANSION_LIMIT, DEFAULT_EXPANSION_TEXT_LIMIT};

/// Configuration for a [`PullParser`](crate::PullParser)
///
/// ```rust
/// use rustypull::ParserConfig;
///
/// let config = ParserConfig::default()
///     .with_entity_expansion_limit(500)
///     .with_entity_expansion_text_limit(64 * 1024);
/// assert_eq!(config.entity_expansion_limit, 500);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum number of entity substitutions over the parser's lifetime.
    ///
    /// Default: 10,000
    pub entity_expansion_limit: usize,

    /// Maximum size in bytes of one expanded text or attribute value.
    ///
    /// Default: 10,240 bytes
    pub entity_expansion_text_limit: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            entity_expansion_limit: DEFAULT_EXPANSION_LIMIT,
            entity_expansion_text_limit: DEFAULT_EXPANSION_TEXT_LIMIT,
        }
    }
}

impl ParserConfig {
    pub fn with_entity_expansion_limit(mut self, limit: usize) -> Self {
        self.entity_expansion_limit = limit;
        self
    }

    pub fn with_entity_expansion_text_limit(mut self, limit: usize) -> Self {
        self.entity_expansion_text_limit = limit;
        self
    }
}
