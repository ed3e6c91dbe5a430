// crates/folio-store-sqlite/src/lifecycle.rs
// ============================================================================
// Module: Shard Lifecycle
// Description: Rename (copy then delete) and delete of whole shards.
// Purpose: Make id changes explicit file operations with typed outcomes.
// Dependencies: folio-core, tracing
// ============================================================================

//! ## Overview
//! Renaming a content id is a copy into a new shard followed by deletion of
//! the old one. The destination is fully written and read back before the
//! source files are touched, so a failed copy leaves the source intact.
//! Precondition failures are reported as [`CopyOutcome`] variants rather
//! than errors.
//!
//! There is no write-ahead log spanning both shards: if the process stops
//! between validating the destination and removing the source, both shards
//! remain under their respective ids.

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::ContentAggregate;
use folio_core::ContentId;
use folio_core::ManualDateEntry;
use tracing::info;
use tracing::warn;

use crate::error::ShardError;
use crate::manual_dates::read_manual_date;
use crate::manual_dates::write_manual_date;
use crate::mapper::read_full_content;
use crate::mapper::save_full_content;
use crate::shard::ShardStore;
use crate::shard::remove_shard_files;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of a shard copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// The destination was written and validated and the source removed.
    Copied,
    /// No shard exists for the source id.
    SourceMissing,
    /// The source shard holds no content row for its id.
    SourceEmpty,
    /// A shard already exists for the destination id.
    DestinationExists,
    /// The copy failed; the source is untouched and no destination remains.
    Failed {
        /// Failure description.
        reason: String,
    },
    /// The destination is valid but the source files could not be removed.
    SourceNotRemoved {
        /// Failure description.
        reason: String,
    },
}

impl CopyOutcome {
    /// Returns true when the destination shard now holds the content.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Copied | Self::SourceNotRemoved { .. })
    }
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Copy and delete operations on whole shards.
#[derive(Debug, Clone, Copy)]
pub struct ShardLifecycle<'a> {
    /// Underlying shard store.
    store: &'a ShardStore,
}

impl<'a> ShardLifecycle<'a> {
    /// Creates a lifecycle manager over `store`.
    #[must_use]
    pub const fn new(store: &'a ShardStore) -> Self {
        Self {
            store,
        }
    }

    /// Moves the content stored under `old_id` to `new_id`.
    ///
    /// The full aggregate and any manual date override are carried over.
    #[must_use]
    pub fn copy(&self, old_id: &ContentId, new_id: &ContentId) -> CopyOutcome {
        if new_id.as_str().is_empty() {
            return CopyOutcome::Failed {
                reason: "destination id must not be empty".to_string(),
            };
        }
        let (aggregate, manual_date) = match self.read_source(old_id) {
            Ok(Some(source)) => source,
            Ok(None) => return CopyOutcome::SourceMissing,
            Err(outcome) => return outcome,
        };
        // Ids that sanitize to the same file name share a shard.
        let new_path = self.store.shard_path(new_id);
        if new_path.exists() || new_path == self.store.shard_path(old_id) {
            return CopyOutcome::DestinationExists;
        }

        let expected = aggregate.with_id(new_id);
        if let Err(err) = self.write_destination(&expected, manual_date.as_ref()) {
            warn!(old_id = %old_id, new_id = %new_id, error = %err, "shard copy failed");
            if let Err(cleanup) = remove_shard_files(&new_path) {
                warn!(path = %new_path.display(), error = %cleanup, "failed to remove partial copy");
            }
            return CopyOutcome::Failed {
                reason: err.to_string(),
            };
        }

        let old_path = self.store.shard_path(old_id);
        match remove_shard_files(&old_path) {
            Ok(_) => {
                info!(old_id = %old_id, new_id = %new_id, "renamed shard");
                CopyOutcome::Copied
            }
            Err(err) => {
                warn!(path = %old_path.display(), error = %err, "copied shard but kept source");
                CopyOutcome::SourceNotRemoved {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Deletes the shard for `id` and its companions.
    ///
    /// Returns false when nothing existed.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::Io`] when an existing file cannot be removed.
    pub fn delete(&self, id: &ContentId) -> Result<bool, ShardError> {
        let removed = remove_shard_files(&self.store.shard_path(id))?;
        if removed {
            info!(id = %id, "deleted shard");
        }
        Ok(removed)
    }

    /// Reads the source aggregate and manual date; the handle is closed on
    /// return.
    fn read_source(
        &self,
        id: &ContentId,
    ) -> Result<Option<(ContentAggregate, Option<ManualDateEntry>)>, CopyOutcome> {
        let handle = match self.store.open_existing(id) {
            Ok(Some(handle)) => handle,
            Ok(None) => return Ok(None),
            Err(err) => {
                return Err(CopyOutcome::Failed {
                    reason: err.to_string(),
                });
            }
        };
        let connection = handle.connection();
        let aggregate = match read_full_content(connection, id) {
            Ok(Some(aggregate)) => aggregate,
            Ok(None) => return Err(CopyOutcome::SourceEmpty),
            Err(err) => {
                return Err(CopyOutcome::Failed {
                    reason: err.to_string(),
                });
            }
        };
        let manual_date = read_manual_date(connection, id).map_err(|err| CopyOutcome::Failed {
            reason: err.to_string(),
        })?;
        Ok(Some((aggregate, manual_date)))
    }

    /// Creates the destination shard, writes it, and reads it back.
    fn write_destination(
        &self,
        expected: &ContentAggregate,
        manual_date: Option<&ManualDateEntry>,
    ) -> Result<(), ShardError> {
        let mut handle = self.store.open(expected.id())?;
        save_full_content(handle.connection_mut(), expected)?;
        if let Some(entry) = manual_date {
            let moved = ManualDateEntry {
                content_id: expected.id().clone(),
                ..entry.clone()
            };
            write_manual_date(handle.connection(), &moved)?;
        }
        let written = read_full_content(handle.connection(), expected.id())?;
        if written.as_ref() != Some(expected) {
            return Err(ShardError::Invalid(
                "destination shard does not match source after copy".to_string(),
            ));
        }
        handle.close()
    }
}
