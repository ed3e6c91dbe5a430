// crates/folio-store-sqlite/src/scan.rs
// ============================================================================
// Module: Shard Scan
// Description: Visits every shard file under the store root, one at a time.
// Purpose: Shared partial-failure policy for store-wide reads.
// Dependencies: folio-core, tracing
// ============================================================================

//! ## Overview
//! There is no manifest, so store-wide reads open every shard file in turn.
//! A shard that fails to open or read is logged and recorded as skipped; the
//! scan still returns what it could read. Each handle is dropped before the
//! next shard is opened.

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::ScanOutcome;
use folio_core::SkippedShard;
use tracing::warn;

use crate::error::ShardError;
use crate::shard::ShardHandle;
use crate::shard::ShardStore;

// ============================================================================
// SECTION: Scan
// ============================================================================

/// Runs `visit` against every shard and gathers its items.
pub(crate) fn scan_shards<T, F>(store: &ShardStore, mut visit: F) -> ScanOutcome<T>
where
    F: FnMut(&ShardHandle) -> Result<Vec<T>, ShardError>,
{
    let files = match store.shard_files() {
        Ok(files) => files,
        Err(err) => {
            warn!(dir = %store.contents_dir().display(), error = %err, "shard scan failed");
            return ScanOutcome::Failed {
                reason: err.to_string(),
            };
        }
    };
    let mut items = Vec::new();
    let mut skipped = Vec::new();
    for path in files {
        let result = store.open_path(&path).and_then(|handle| visit(&handle));
        match result {
            Ok(found) => items.extend(found),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable shard");
                skipped.push(SkippedShard {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }
    ScanOutcome::from_parts(items, skipped)
}
