// crates/folio-store-sqlite/src/error.rs
// ============================================================================
// Module: Shard Store Errors
// Description: Error taxonomy for shard access and the tag catalog.
// Purpose: Keep engine errors as strings and map them to core store errors.
// Dependencies: folio-core, thiserror
// ============================================================================

//! ## Overview
//! [`ShardError`] covers opening, reading and writing shards.
//! [`CatalogError`] covers the global tag catalog document. Both convert
//! into [`StoreError`] for callers that only see the repository contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::StoreError;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Shard store errors.
///
/// # Invariants
/// - Error messages carry paths and engine messages, never content bodies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardError {
    /// Filesystem error.
    #[error("shard io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("shard db error: {0}")]
    Db(String),
    /// Shard schema is newer than this build understands.
    #[error("shard version mismatch: {0}")]
    VersionMismatch(String),
    /// Stored or supplied data is invalid.
    #[error("shard invalid data: {0}")]
    Invalid(String),
    /// No shard exists for the requested id.
    #[error("shard not found: {0}")]
    NotFound(String),
}

impl From<ShardError> for StoreError {
    fn from(error: ShardError) -> Self {
        match error {
            ShardError::Io(message) => Self::Io(message),
            ShardError::Db(message) => Self::Store(message),
            ShardError::VersionMismatch(message) => Self::VersionMismatch(message),
            ShardError::Invalid(message) => Self::Invalid(message),
            ShardError::NotFound(message) => Self::NotFound(message),
        }
    }
}

/// Tag catalog errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Filesystem error.
    #[error("tag catalog io error: {0}")]
    Io(String),
    /// Catalog document could not be parsed.
    #[error("tag catalog corruption: {0}")]
    Corrupt(String),
    /// Invalid tag name or metadata.
    #[error("tag catalog invalid input: {0}")]
    Invalid(String),
}

impl From<CatalogError> for StoreError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::Io(message) => Self::Io(message),
            CatalogError::Corrupt(message) => Self::Corrupt(message),
            CatalogError::Invalid(message) => Self::Invalid(message),
        }
    }
}
