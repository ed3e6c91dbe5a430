// crates/folio-core/src/core/identifiers.rs
// ============================================================================
// Module: Folio Identifiers
// Description: Opaque content identifiers with stable string forms.
// Purpose: Provide a strongly typed, serializable content id.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Content identifiers are opaque strings chosen by authors (slugs such as
//! `post-1`). The storage layer derives one file name per id; ids built only
//! from [`ContentId::is_shard_safe`] characters map to distinct files.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Identifier of one content entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Creates a new content identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when every character is ASCII alphanumeric, `-` or `_`.
    #[must_use]
    pub fn is_shard_safe(&self) -> bool {
        !self.0.is_empty() && self.0.chars().all(is_shard_safe_char)
    }
}

/// Returns true for characters kept verbatim in shard file names.
#[must_use]
pub const fn is_shard_safe_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ContentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ContentId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
