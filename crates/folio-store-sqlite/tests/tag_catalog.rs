// crates/folio-store-sqlite/tests/tag_catalog.rs
// ============================================================================
// Module: Tag Catalog Tests
// Description: Upsert, remove and corruption handling for the tag catalog.
// Purpose: Ensure the global tag registry keeps first-use times and fails closed.
// Dependencies: folio-store-sqlite, folio-core, time
// ============================================================================

//! ## Overview
//! Exercises the whole-document read-modify-write cycle: creation times are
//! preserved across upserts, removal reports whether anything was removed,
//! and malformed documents are surfaced instead of overwritten.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    reason = "Test-only panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::thread;

use folio_core::Metadata;
use folio_store_sqlite::CatalogError;
use folio_store_sqlite::TAG_CATALOG_FILE;
use folio_store_sqlite::TagCatalog;
use tempfile::TempDir;
use time::macros::datetime;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn upsert_twice_updates_last_used_and_keeps_created_at() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    let first = datetime!(2024-01-01 00:00:00 UTC);
    let second = datetime!(2024-06-01 12:30:00 UTC);

    catalog.upsert_at("react", None, first).expect("first upsert");
    let entry = catalog.upsert_at("react", None, second).expect("second upsert");
    assert_eq!(entry.created_at, first);
    assert_eq!(entry.last_used, second);

    let stored = catalog.get("react").expect("get").expect("present");
    assert_eq!(stored.created_at, first);
    assert_eq!(stored.last_used, second);
    assert_eq!(catalog.list().expect("list").len(), 1);
}

#[test]
fn remove_reports_true_then_false() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    catalog.upsert("react", None).expect("upsert");
    assert!(catalog.remove("react").expect("first remove"));
    assert!(!catalog.remove("react").expect("second remove"));
    assert!(catalog.list().expect("list").is_empty());
}

#[test]
fn names_are_trimmed_and_case_sensitive() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    catalog.upsert("  rust ", None).expect("upsert");
    catalog.upsert("Rust", None).expect("upsert");
    let names = catalog.list().expect("list").into_iter().map(|e| e.name).collect::<Vec<_>>();
    assert_eq!(names, vec!["rust".to_string(), "Rust".to_string()]);
    assert!(catalog.get(" rust").expect("get").is_some());
    assert!(matches!(catalog.upsert("   ", None), Err(CatalogError::Invalid(_))));
}

#[test]
fn metadata_is_replaced_only_when_supplied() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    let mut metadata = Metadata::new();
    metadata.insert("color", "teal");
    catalog.upsert("design", Some(metadata.clone())).expect("with metadata");
    let entry = catalog.upsert("design", None).expect("without metadata");
    assert_eq!(entry.metadata, Some(metadata));
}

#[test]
fn missing_or_empty_document_is_an_empty_catalog() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    assert!(catalog.list().expect("missing").is_empty());
    std::fs::write(dir.path().join(TAG_CATALOG_FILE), b"  \n").expect("write");
    assert!(catalog.list().expect("empty").is_empty());
}

#[test]
fn malformed_document_is_reported_and_left_untouched() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(TAG_CATALOG_FILE);
    std::fs::write(&path, b"[{\"name\": ").expect("write");
    let catalog = TagCatalog::new(&path);

    assert!(matches!(catalog.list(), Err(CatalogError::Corrupt(_))));
    assert!(matches!(catalog.upsert("rust", None), Err(CatalogError::Corrupt(_))));
    assert_eq!(std::fs::read(&path).expect("read"), b"[{\"name\": ");
}

#[test]
fn document_is_a_camel_case_json_array() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = TagCatalog::in_root(dir.path());
    catalog.upsert_at("rust", None, datetime!(2024-01-02 03:04:05 UTC)).expect("upsert");
    let raw = std::fs::read_to_string(catalog.path()).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value[0]["name"], "rust");
    assert_eq!(value[0]["createdAt"], "2024-01-02T03:04:05Z");
    assert_eq!(value[0]["lastUsed"], "2024-01-02T03:04:05Z");
}

#[test]
fn concurrent_upserts_in_one_process_are_not_lost() {
    let dir = TempDir::new().expect("tempdir");
    let catalog = Arc::new(TagCatalog::in_root(dir.path()));
    let workers = (0 .. 8)
        .map(|worker| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for round in 0 .. 5 {
                    catalog.upsert(&format!("tag-{worker}-{round}"), None).expect("upsert");
                }
            })
        })
        .collect::<Vec<_>>();
    for worker in workers {
        worker.join().expect("join");
    }
    assert_eq!(catalog.list().expect("list").len(), 40);
}
