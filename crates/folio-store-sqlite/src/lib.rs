// crates/folio-store-sqlite/src/lib.rs
// ============================================================================
// Module: Folio SQLite Shard Store
// Description: One SQLite database per content entity, plus a tag catalog.
// Purpose: Persist Folio content with per-entity isolation and FTS5 search.
// Dependencies: folio-core, rusqlite, tempfile, time, tracing
// ============================================================================

//! ## Overview
//! Every content entity lives in its own shard file under
//! `<root>/contents/`, carrying the full relational schema and two
//! trigger-maintained FTS5 tables. There is no manifest: listings, search
//! and manual date listings are rebuilt by scanning shard files, tolerating
//! unreadable shards and reporting them through [`folio_core::ScanOutcome`].
//! Tag usage is tracked in a single `tag-catalog.json` document beside the
//! shards.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod manual_dates;
pub mod mapper;
pub mod repository;
mod scan;
pub mod schema;
pub mod shard;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::TAG_CATALOG_FILE;
pub use catalog::TagCatalog;
pub use error::CatalogError;
pub use error::ShardError;
pub use index::AggregateIndex;
pub use lifecycle::CopyOutcome;
pub use lifecycle::ShardLifecycle;
pub use manual_dates::ManualDateStore;
pub use mapper::read_full_content;
pub use mapper::save_full_content;
pub use repository::ShardedContentRepository;
pub use schema::SCHEMA_VERSION;
pub use shard::JournalMode;
pub use shard::ShardHandle;
pub use shard::ShardStore;
pub use shard::ShardStoreConfig;
pub use shard::SyncMode;
