// crates/folio-store-sqlite/src/repository.rs
// ============================================================================
// Module: Sharded Content Repository
// Description: ContentRepository backed by one SQLite shard per entity.
// Purpose: Bundle the shard store, index, lifecycle and catalog for callers.
// Dependencies: folio-core, tracing
// ============================================================================

//! ## Overview
//! [`ShardedContentRepository`] implements [`ContentRepository`] over a
//! [`ShardStore`] and owns the store's [`TagCatalog`]. Writes record each
//! tag in the catalog after the shard commits; catalog failures are logged
//! and do not fail the write, since the catalog is usage metadata only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use folio_core::ContentAggregate;
use folio_core::ContentId;
use folio_core::ContentRepository;
use folio_core::ContentSummary;
use folio_core::ScanOutcome;
use folio_core::StoreError;
use tracing::warn;

use crate::catalog::TagCatalog;
use crate::error::ShardError;
use crate::index::AggregateIndex;
use crate::lifecycle::CopyOutcome;
use crate::lifecycle::ShardLifecycle;
use crate::manual_dates::ManualDateStore;
use crate::mapper::save_full_content;
use crate::shard::ShardStore;
use crate::shard::ShardStoreConfig;

// ============================================================================
// SECTION: Repository
// ============================================================================

/// Content repository over per-entity shards.
#[derive(Debug)]
pub struct ShardedContentRepository {
    /// Shard store.
    store: ShardStore,
    /// Global tag catalog under the same root.
    catalog: TagCatalog,
}

impl ShardedContentRepository {
    /// Opens a repository rooted at `config.root`.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::Invalid`] when the root path is unusable.
    pub fn open(config: ShardStoreConfig) -> Result<Self, ShardError> {
        let store = ShardStore::new(config)?;
        let catalog = TagCatalog::in_root(store.root());
        Ok(Self {
            store,
            catalog,
        })
    }

    /// Returns the shard store.
    #[must_use]
    pub const fn store(&self) -> &ShardStore {
        &self.store
    }

    /// Returns the aggregate index.
    #[must_use]
    pub const fn index(&self) -> AggregateIndex<'_> {
        AggregateIndex::new(&self.store)
    }

    /// Returns the lifecycle manager.
    #[must_use]
    pub const fn lifecycle(&self) -> ShardLifecycle<'_> {
        ShardLifecycle::new(&self.store)
    }

    /// Returns the manual date store.
    #[must_use]
    pub const fn manual_dates(&self) -> ManualDateStore<'_> {
        ManualDateStore::new(&self.store)
    }

    /// Returns the tag catalog.
    #[must_use]
    pub const fn tag_catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Renames `old_id` to `new_id` by copying its shard and deleting the old one.
    #[must_use]
    pub fn rename(&self, old_id: &ContentId, new_id: &ContentId) -> CopyOutcome {
        self.lifecycle().copy(old_id, new_id)
    }

    /// Searches content text and markdown pages across every shard.
    #[must_use]
    pub fn search(&self, query: &str) -> ScanOutcome<ContentSummary> {
        self.index().search(query)
    }
}

impl ContentRepository for ShardedContentRepository {
    fn list_all(&self) -> ScanOutcome<ContentSummary> {
        self.index().list_all()
    }

    fn get_by_id(&self, id: &ContentId) -> Result<Option<ContentAggregate>, StoreError> {
        Ok(self.index().get_full(id)?)
    }

    fn put(&self, aggregate: &ContentAggregate) -> Result<(), StoreError> {
        let mut handle = self.store.open(aggregate.id())?;
        save_full_content(handle.connection_mut(), aggregate)?;
        handle.close()?;
        for tag in &aggregate.tags {
            if tag.trim().is_empty() {
                continue;
            }
            if let Err(err) = self.catalog.upsert(tag, None) {
                warn!(tag = %tag, error = %err, "failed to record tag use");
            }
        }
        Ok(())
    }

    fn delete(&self, id: &ContentId) -> Result<bool, StoreError> {
        Ok(self.lifecycle().delete(id)?)
    }
}
