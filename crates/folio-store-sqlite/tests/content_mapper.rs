// crates/folio-store-sqlite/tests/content_mapper.rs
// ============================================================================
// Module: Content Mapper Tests
// Description: Full aggregate persistence and safe-parse JSON columns.
// Purpose: Ensure a shard returns exactly the aggregate written to it.
// Dependencies: folio-store-sqlite, folio-core, rusqlite
// ============================================================================

//! ## Overview
//! Writes fully populated aggregates and reads them back field for field,
//! rewrites them to confirm associated rows are replaced rather than
//! appended, rejects relations that do not touch the content id, and
//! corrupts JSON columns to confirm they read as absent.

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
use folio_core::Relation;
use folio_store_sqlite::ShardError;
use folio_store_sqlite::mapper::read_content;
use folio_store_sqlite::mapper::read_summary;
use folio_store_sqlite::read_full_content;
use folio_store_sqlite::save_full_content;

use crate::common::full_aggregate;
use crate::common::minimal_aggregate;
use crate::common::store_fixture;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn full_aggregate_round_trips_field_for_field() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let aggregate = full_aggregate("post-1");
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &aggregate).expect("save");

    let read = read_full_content(handle.connection(), &id).expect("read").expect("present");
    assert_eq!(read.content, aggregate.content);
    assert_eq!(read.tags, aggregate.tags);
    assert_eq!(read.relations, aggregate.relations);
    assert_eq!(read.assets, aggregate.assets);
    assert_eq!(read.links, aggregate.links);
    assert_eq!(read.pages, aggregate.pages);
}

#[test]
fn saving_again_replaces_associated_rows() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &full_aggregate("post-1")).expect("first save");

    let mut revised = full_aggregate("post-1");
    revised.tags = vec!["rust".to_string()];
    revised.relations.truncate(1);
    revised.assets.clear();
    revised.links[0].label = Some("SQLite FTS5".to_string());
    revised.pages[1].version = 8;
    save_full_content(handle.connection_mut(), &revised).expect("second save");

    let read = read_full_content(handle.connection(), &id).expect("read").expect("present");
    assert_eq!(read, revised);
    let rows: i64 = handle
        .connection()
        .query_row("SELECT count(*) FROM contents", [], |row| row.get(0))
        .expect("count");
    assert_eq!(rows, 1);
}

#[test]
fn tags_are_trimmed_deduplicated_and_sorted() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let mut aggregate = minimal_aggregate("post-1", "Tags", 1);
    aggregate.tags =
        vec![" rust ".to_string(), "React".to_string(), "rust".to_string(), "  ".to_string()];
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &aggregate).expect("save");

    let summary = read_summary(handle.connection(), Some(&id)).expect("read").expect("present");
    assert_eq!(summary.tags, vec!["React".to_string(), "rust".to_string()]);
}

#[test]
fn relations_must_involve_the_content_id() {
    let fixture = store_fixture();
    let id = ContentId::new("c");
    let mut handle = fixture.store.open(&id).expect("open");
    let mut stray = minimal_aggregate("c", "Stray", 1);
    stray.relations.push(Relation {
        source_id: ContentId::new("a"),
        target_id: ContentId::new("b"),
        kind: "related".to_string(),
        bidirectional: false,
        weight: 1.0,
        metadata: None,
    });

    let err = save_full_content(handle.connection_mut(), &stray).expect_err("stray relation");
    assert!(matches!(err, ShardError::Invalid(_)), "unexpected error: {err}");
    let rows: i64 = handle
        .connection()
        .query_row("SELECT count(*) FROM relations", [], |row| row.get(0))
        .expect("count relations");
    assert_eq!(rows, 0);
    assert!(read_full_content(handle.connection(), &id).expect("read").is_none());

    let mut valid = minimal_aggregate("c", "Valid", 1);
    valid.relations.push(Relation {
        source_id: ContentId::new("c"),
        target_id: ContentId::new("b"),
        kind: "related".to_string(),
        bidirectional: false,
        weight: 1.0,
        metadata: None,
    });
    save_full_content(handle.connection_mut(), &valid).expect("first save");
    save_full_content(handle.connection_mut(), &valid).expect("second save");
    let read = read_full_content(handle.connection(), &id).expect("read").expect("present");
    assert_eq!(read.relations, valid.relations);
}

#[test]
fn malformed_json_columns_read_as_absent() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &full_aggregate("post-1")).expect("save");
    handle
        .connection()
        .execute(
            "UPDATE contents SET seo = '{not json', ext = '[1,2', readers = 'oops',
                 ancestor_ids = '{}'",
            [],
        )
        .expect("corrupt");

    let content = read_content(handle.connection(), Some(&id)).expect("read").expect("present");
    assert_eq!(content.seo, None);
    assert_eq!(content.ext, None);
    assert!(content.permissions.readers.is_empty());
    assert!(content.hierarchy.ancestor_ids.is_empty());
    assert!(content.thumbnails.is_some());
}

#[test]
fn unknown_enum_value_is_invalid() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &minimal_aggregate("post-1", "t", 1))
        .expect("save");
    handle
        .connection()
        .execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             UPDATE contents SET status = 'scheduled';
             PRAGMA ignore_check_constraints = OFF;",
        )
        .expect("force invalid status");

    let err = read_content(handle.connection(), Some(&id)).expect_err("invalid status");
    assert!(matches!(err, ShardError::Invalid(_)), "unexpected error: {err}");
}

#[test]
fn primary_row_is_the_earliest_created() {
    let fixture = store_fixture();
    let id = ContentId::new("post-1");
    let mut handle = fixture.store.open(&id).expect("open");
    save_full_content(handle.connection_mut(), &minimal_aggregate("post-1", "Primary", 5))
        .expect("save primary");
    save_full_content(handle.connection_mut(), &minimal_aggregate("post-1-draft", "Later", 9))
        .expect("save second row");

    let summary = read_summary(handle.connection(), None).expect("read").expect("present");
    assert_eq!(summary.title, "Primary");
}
