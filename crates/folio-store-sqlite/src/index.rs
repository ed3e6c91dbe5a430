// crates/folio-store-sqlite/src/index.rs
// ============================================================================
// Module: Aggregate Index
// Description: Store-wide listings, point lookups and search over shards.
// Purpose: Provide reads that span content without a central manifest.
// Dependencies: folio-core, rusqlite, tracing
// ============================================================================

//! ## Overview
//! Listings and search are derived by scanning every shard; point lookups
//! resolve the shard path directly and touch only that file. Listings are
//! ordered by stored creation time, newest first, with the id as tiebreak so
//! output is stable across scans.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use folio_core::ContentAggregate;
use folio_core::ContentId;
use folio_core::ContentSummary;
use folio_core::ScanOutcome;
use rusqlite::Connection;
use rusqlite::params;
use tracing::debug;

use crate::error::ShardError;
use crate::mapper::read_full_content;
use crate::mapper::read_summary;
use crate::scan::scan_shards;
use crate::shard::ShardStore;

// ============================================================================
// SECTION: Aggregate Index
// ============================================================================

/// Read-only view across every shard in a store.
#[derive(Debug, Clone, Copy)]
pub struct AggregateIndex<'a> {
    /// Underlying shard store.
    store: &'a ShardStore,
}

impl<'a> AggregateIndex<'a> {
    /// Creates an index over `store`.
    #[must_use]
    pub const fn new(store: &'a ShardStore) -> Self {
        Self {
            store,
        }
    }

    /// Lists every readable shard's primary content, newest first.
    ///
    /// Unreadable shards are skipped and reported in the outcome.
    #[must_use]
    pub fn list_all(&self) -> ScanOutcome<ContentSummary> {
        let mut outcome: ScanOutcome<ContentSummary> = scan_shards(self.store, |handle| {
            Ok(read_summary(handle.connection(), None)?.into_iter().collect())
        });
        outcome.sort_by(newest_first);
        outcome
    }

    /// Reads one summary by id without scanning.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the shard exists but cannot be read.
    pub fn get_one(&self, id: &ContentId) -> Result<Option<ContentSummary>, ShardError> {
        let Some(handle) = self.store.open_existing(id)? else {
            return Ok(None);
        };
        read_summary(handle.connection(), Some(id))
    }

    /// Reads one full aggregate by id without scanning.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the shard exists but cannot be read.
    pub fn get_full(&self, id: &ContentId) -> Result<Option<ContentAggregate>, ShardError> {
        let Some(handle) = self.store.open_existing(id)? else {
            return Ok(None);
        };
        read_full_content(handle.connection(), id)
    }

    /// Lists content whose text or markdown pages match every query term.
    ///
    /// Terms are matched as quoted phrases, so FTS operators in the input are
    /// treated as plain text. A blank query matches nothing.
    #[must_use]
    pub fn search(&self, query: &str) -> ScanOutcome<ContentSummary> {
        let Some(expression) = fts_expression(query) else {
            return ScanOutcome::Complete(Vec::new());
        };
        debug!(expression = %expression, "searching shards");
        let mut outcome: ScanOutcome<ContentSummary> = scan_shards(self.store, |handle| {
            let connection = handle.connection();
            if !shard_matches(connection, &expression)? {
                return Ok(Vec::new());
            }
            Ok(read_summary(connection, None)?.into_iter().collect())
        });
        outcome.sort_by(newest_first);
        outcome
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Orders summaries by creation time descending, then id ascending.
fn newest_first(left: &ContentSummary, right: &ContentSummary) -> Ordering {
    right
        .created_at
        .cmp(&left.created_at)
        .then_with(|| left.id.as_str().cmp(right.id.as_str()))
}

/// Builds an FTS5 expression of quoted terms (implicit AND).
fn fts_expression(query: &str) -> Option<String> {
    let terms = query
        .split_whitespace()
        .map(|term| format!("\"{}\"", term.replace('"', "\"\"")))
        .collect::<Vec<_>>();
    if terms.is_empty() { None } else { Some(terms.join(" ")) }
}

/// Returns true when either FTS table in the shard matches.
fn shard_matches(connection: &Connection, expression: &str) -> Result<bool, ShardError> {
    connection
        .query_row(
            "SELECT EXISTS (SELECT 1 FROM content_fts WHERE content_fts MATCH ?1)
                 OR EXISTS (SELECT 1 FROM markdown_fts WHERE markdown_fts MATCH ?1)",
            params![expression],
            |row| row.get::<_, bool>(0),
        )
        .map_err(|err| ShardError::Db(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::fts_expression;

    #[test]
    fn fts_expression_quotes_each_term() {
        assert_eq!(fts_expression("rust  sqlite"), Some("\"rust\" \"sqlite\"".to_string()));
    }

    #[test]
    fn fts_expression_escapes_quotes_and_operators() {
        assert_eq!(fts_expression("a\"b OR"), Some("\"a\"\"b\" \"OR\"".to_string()));
    }

    #[test]
    fn blank_query_has_no_expression() {
        assert_eq!(fts_expression("   "), None);
    }
}
