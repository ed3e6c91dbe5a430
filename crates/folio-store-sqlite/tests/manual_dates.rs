// crates/folio-store-sqlite/tests/manual_dates.rs
// ============================================================================
// Module: Manual Date Override Tests
// Description: Per-shard display date get/set/remove and store-wide listing.
// Purpose: Ensure overrides stay scoped to their shard and scans tolerate damage.
// Dependencies: folio-store-sqlite, folio-core, time
// ============================================================================

//! ## Overview
//! Sets, replaces and removes display dates on individual shards and lists
//! them across a store that also contains an unreadable shard.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::ContentId;
use folio_store_sqlite::ManualDateStore;
use folio_store_sqlite::ShardError;
use folio_store_sqlite::save_full_content;
use time::macros::date;

use crate::common::StoreFixture;
use crate::common::minimal_aggregate;
use crate::common::store_fixture;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn seed(fixture: &StoreFixture, id: &str) {
    let mut handle = fixture.store.open(&ContentId::new(id)).expect("open");
    save_full_content(handle.connection_mut(), &minimal_aggregate(id, id, 1)).expect("save");
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn set_get_replace_and_remove() {
    let fixture = store_fixture();
    seed(&fixture, "post-1");
    let id = ContentId::new("post-1");
    let dates = ManualDateStore::new(&fixture.store);

    assert!(dates.get(&id).expect("get").is_none());
    dates.set(&id, date!(2012 - 11 - 05)).expect("set");
    assert_eq!(dates.get(&id).expect("get").expect("present").date, date!(2012 - 11 - 05));

    dates.set(&id, date!(2013 - 01 - 20)).expect("replace");
    assert_eq!(dates.get(&id).expect("get").expect("present").date, date!(2013 - 01 - 20));

    assert!(dates.remove(&id).expect("remove"));
    assert!(!dates.remove(&id).expect("remove again"));
    assert!(dates.get(&id).expect("get").is_none());
}

#[test]
fn set_on_missing_shard_is_not_found_and_creates_nothing() {
    let fixture = store_fixture();
    let id = ContentId::new("ghost");
    let err = ManualDateStore::new(&fixture.store)
        .set(&id, date!(2020 - 02 - 29))
        .expect_err("missing shard");
    assert!(matches!(err, ShardError::NotFound(_)));
    assert!(!fixture.store.exists(&id));
}

#[test]
fn date_is_stored_as_iso_text() {
    let fixture = store_fixture();
    seed(&fixture, "post-1");
    let id = ContentId::new("post-1");
    ManualDateStore::new(&fixture.store).set(&id, date!(2009 - 07 - 04)).expect("set");
    let handle = fixture.store.open(&id).expect("open");
    let stored: String = handle
        .connection()
        .query_row("SELECT display_date FROM manual_dates", [], |row| row.get(0))
        .expect("row");
    assert_eq!(stored, "2009-07-04");
}

#[test]
fn list_all_spans_shards_and_skips_unreadable_ones() {
    let fixture = store_fixture();
    seed(&fixture, "b");
    seed(&fixture, "a");
    seed(&fixture, "c");
    let dates = ManualDateStore::new(&fixture.store);
    dates.set(&ContentId::new("b"), date!(2001 - 01 - 01)).expect("set b");
    dates.set(&ContentId::new("a"), date!(2002 - 02 - 02)).expect("set a");
    std::fs::write(fixture.store.shard_path(&ContentId::new("zz")), b"garbage").expect("garbage");

    let outcome = dates.list_all();
    let listed = outcome
        .items()
        .iter()
        .map(|entry| (entry.content_id.as_str(), entry.date))
        .collect::<Vec<_>>();
    assert_eq!(listed, vec![("a", date!(2002 - 02 - 02)), ("b", date!(2001 - 01 - 01))]);
    assert_eq!(outcome.skipped().len(), 1);
}
