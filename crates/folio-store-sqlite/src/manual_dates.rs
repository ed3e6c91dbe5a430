// crates/folio-store-sqlite/src/manual_dates.rs
// ============================================================================
// Module: Manual Date Overrides
// Description: Per-shard human-curated display dates.
// Purpose: Let editors backdate content without touching computed timestamps.
// Dependencies: folio-core, rusqlite, time
// ============================================================================

//! ## Overview
//! Each shard's `manual_dates` table holds at most one display date per
//! content id, stored as `YYYY-MM-DD`. Point operations touch one shard;
//! listing scans every shard with the same skip-and-report policy as the
//! aggregate index.

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::ContentId;
use folio_core::ManualDateEntry;
use folio_core::ScanOutcome;
use folio_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::ShardError;
use crate::mapper::collect_rows;
use crate::scan::scan_shards;
use crate::shard::ShardStore;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Stored display date format.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Manual Date Store
// ============================================================================

/// Display-date overrides across the shards of a store.
#[derive(Debug, Clone, Copy)]
pub struct ManualDateStore<'a> {
    /// Underlying shard store.
    store: &'a ShardStore,
}

impl<'a> ManualDateStore<'a> {
    /// Creates a manual date store over `store`.
    #[must_use]
    pub const fn new(store: &'a ShardStore) -> Self {
        Self {
            store,
        }
    }

    /// Returns the override for `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the shard exists but cannot be read.
    pub fn get(&self, id: &ContentId) -> Result<Option<ManualDateEntry>, ShardError> {
        let Some(handle) = self.store.open_existing(id)? else {
            return Ok(None);
        };
        read_manual_date(handle.connection(), id)
    }

    /// Sets (or replaces) the override for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::NotFound`] when no shard exists for `id`, or
    /// another [`ShardError`] when the write fails.
    pub fn set(&self, id: &ContentId, date: Date) -> Result<ManualDateEntry, ShardError> {
        let Some(handle) = self.store.open_existing(id)? else {
            return Err(ShardError::NotFound(id.to_string()));
        };
        let entry = ManualDateEntry {
            content_id: id.clone(),
            date,
            updated_at: Timestamp::now(),
        };
        write_manual_date(handle.connection(), &entry)?;
        Ok(entry)
    }

    /// Removes the override for `id`, returning whether one existed.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the shard exists but cannot be written.
    pub fn remove(&self, id: &ContentId) -> Result<bool, ShardError> {
        let Some(handle) = self.store.open_existing(id)? else {
            return Ok(false);
        };
        let removed = handle
            .connection()
            .execute("DELETE FROM manual_dates WHERE content_id = ?1", params![id.as_str()])
            .map_err(|err| ShardError::Db(err.to_string()))?;
        Ok(removed > 0)
    }

    /// Lists every override in the store, ordered by content id.
    #[must_use]
    pub fn list_all(&self) -> ScanOutcome<ManualDateEntry> {
        let mut outcome: ScanOutcome<ManualDateEntry> =
            scan_shards(self.store, |handle| read_all_manual_dates(handle.connection()));
        outcome.sort_by(|left, right| left.content_id.as_str().cmp(right.content_id.as_str()));
        outcome
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Reads the override row for `id` from an open shard.
pub(crate) fn read_manual_date(
    connection: &Connection,
    id: &ContentId,
) -> Result<Option<ManualDateEntry>, ShardError> {
    let row = connection
        .query_row(
            "SELECT content_id, display_date, updated_at FROM manual_dates WHERE content_id = ?1",
            params![id.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
        )
        .optional()
        .map_err(|err| ShardError::Db(err.to_string()))?;
    row.map(entry_from_columns).transpose()
}

/// Upserts an override row in an open shard.
pub(crate) fn write_manual_date(
    connection: &Connection,
    entry: &ManualDateEntry,
) -> Result<(), ShardError> {
    let date = entry.date.format(DATE_FORMAT).map_err(|err| ShardError::Invalid(err.to_string()))?;
    connection
        .execute(
            "INSERT INTO manual_dates (content_id, display_date, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(content_id) DO UPDATE SET
                 display_date = excluded.display_date,
                 updated_at = excluded.updated_at",
            params![entry.content_id.as_str(), date, entry.updated_at.as_unix_millis()],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    Ok(())
}

/// Reads every override row in an open shard.
fn read_all_manual_dates(connection: &Connection) -> Result<Vec<ManualDateEntry>, ShardError> {
    let mut stmt = connection
        .prepare("SELECT content_id, display_date, updated_at FROM manual_dates ORDER BY content_id")
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
        })
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)?.into_iter().map(entry_from_columns).collect()
}

/// Builds an entry from raw column values.
fn entry_from_columns(
    (content_id, date, updated_at): (String, String, i64),
) -> Result<ManualDateEntry, ShardError> {
    let date = Date::parse(&date, DATE_FORMAT)
        .map_err(|err| ShardError::Invalid(format!("manual_dates.display_date: {err}")))?;
    Ok(ManualDateEntry {
        content_id: ContentId::new(content_id),
        date,
        updated_at: Timestamp::from_unix_millis(updated_at),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
