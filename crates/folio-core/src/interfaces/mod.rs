// crates/folio-core/src/interfaces/mod.rs
// ============================================================================
// Module: Folio Interfaces
// Description: Backend-agnostic repository contract and scan results.
// Purpose: Let callers depend on content storage without knowing its layout.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! [`ContentRepository`] is the stable surface content endpoints program
//! against. The current backend reconstructs listings by scanning one file
//! per entity; a consolidated database with a manifest table can implement
//! the same trait without changing callers.
//!
//! Store-wide scans return [`ScanOutcome`] so callers decide whether a
//! partial listing (some shards unreadable) is acceptable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::core::ContentAggregate;
use crate::core::ContentId;
use crate::core::ContentSummary;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Content store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store I/O error.
    #[error("content store io error: {0}")]
    Io(String),
    /// Storage engine error.
    #[error("content store error: {0}")]
    Store(String),
    /// Stored data is unreadable.
    #[error("content store corruption: {0}")]
    Corrupt(String),
    /// Stored schema is newer than this build supports.
    #[error("content store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid input or stored data.
    #[error("content store invalid data: {0}")]
    Invalid(String),
    /// Requested entity does not exist.
    #[error("content not found: {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Scan Outcome
// ============================================================================

/// A shard left out of a store-wide scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedShard {
    /// File that could not be read.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a store-wide scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome<T> {
    /// Every shard was read.
    Complete(Vec<T>),
    /// Some shards were skipped; `items` holds the readable subset.
    Partial {
        /// Items from readable shards.
        items: Vec<T>,
        /// Shards that could not be read.
        skipped: Vec<SkippedShard>,
    },
    /// The scan could not run at all.
    Failed {
        /// Why the scan failed.
        reason: String,
    },
}

impl<T> ScanOutcome<T> {
    /// Builds `Complete` or `Partial` depending on whether anything was skipped.
    #[must_use]
    pub fn from_parts(items: Vec<T>, skipped: Vec<SkippedShard>) -> Self {
        if skipped.is_empty() {
            Self::Complete(items)
        } else {
            Self::Partial { items, skipped }
        }
    }

    /// Returns the items that were read.
    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Complete(items) | Self::Partial { items, .. } => items,
            Self::Failed { .. } => &[],
        }
    }

    /// Returns the shards that were skipped.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedShard] {
        match self {
            Self::Partial { skipped, .. } => skipped,
            Self::Complete(_) | Self::Failed { .. } => &[],
        }
    }

    /// Returns true when every shard was read.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Sorts the readable items in place.
    pub fn sort_by(&mut self, compare: impl FnMut(&T, &T) -> std::cmp::Ordering) {
        match self {
            Self::Complete(items) | Self::Partial { items, .. } => items.sort_by(compare),
            Self::Failed { .. } => {}
        }
    }

    /// Returns the readable items, accepting skipped shards and failures.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Complete(items) | Self::Partial { items, .. } => items,
            Self::Failed { .. } => Vec::new(),
        }
    }

    /// Returns the items only if the scan was complete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when shards were skipped and
    /// [`StoreError::Io`] when the scan failed.
    pub fn into_complete(self) -> Result<Vec<T>, StoreError> {
        match self {
            Self::Complete(items) => Ok(items),
            Self::Partial { skipped, .. } => {
                let paths = skipped
                    .iter()
                    .map(|shard| shard.path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(StoreError::Corrupt(format!("unreadable shards: {paths}")))
            }
            Self::Failed { reason } => Err(StoreError::Io(reason)),
        }
    }
}

// ============================================================================
// SECTION: Content Repository
// ============================================================================

/// Storage contract for content entities.
pub trait ContentRepository {
    /// Lists every stored entity, most recently created first.
    fn list_all(&self) -> ScanOutcome<ContentSummary>;

    /// Loads the full aggregate for one entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entity exists but cannot be read.
    fn get_by_id(&self, id: &ContentId) -> Result<Option<ContentAggregate>, StoreError>;

    /// Creates or replaces an entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entity cannot be written.
    fn put(&self, aggregate: &ContentAggregate) -> Result<(), StoreError>;

    /// Deletes an entity, returning false when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when existing files cannot be removed.
    fn delete(&self, id: &ContentId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Tests
// ============================================================================
