// crates/folio-store-sqlite/tests/common/mod.rs
// =============================================================================
// Module: Shard Store Test Helpers
// Description: Temp-dir stores and sample content aggregates.
// Purpose: Reduce duplication across folio-store-sqlite integration tests.
// =============================================================================

#![allow(
    dead_code,
    clippy::expect_used,
    reason = "Test helpers are selectively used across suites."
)]

use folio_core::Asset;
use folio_core::CacheHints;
use folio_core::Content;
use folio_core::ContentAggregate;
use folio_core::ContentId;
use folio_core::ContentStatus;
use folio_core::Link;
use folio_core::MarkdownPage;
use folio_core::Metadata;
use folio_core::Relation;
use folio_core::SeoMeta;
use folio_core::Thumbnail;
use folio_core::Thumbnails;
use folio_core::Timestamp;
use folio_core::Visibility;
use folio_store_sqlite::ShardStore;
use folio_store_sqlite::ShardStoreConfig;
use folio_store_sqlite::ShardedContentRepository;
use tempfile::TempDir;

/// A shard store rooted in a temp directory that lives as long as the fixture.
pub struct StoreFixture {
    pub dir: TempDir,
    pub store: ShardStore,
}

/// Creates an empty store.
pub fn store_fixture() -> StoreFixture {
    let dir = TempDir::new().expect("tempdir");
    let store = ShardStore::new(ShardStoreConfig::new(dir.path())).expect("store");
    StoreFixture {
        dir,
        store,
    }
}

/// A repository rooted in a temp directory.
pub struct RepositoryFixture {
    pub dir: TempDir,
    pub repository: ShardedContentRepository,
}

/// Creates an empty repository.
pub fn repository_fixture() -> RepositoryFixture {
    let dir = TempDir::new().expect("tempdir");
    let repository =
        ShardedContentRepository::open(ShardStoreConfig::new(dir.path())).expect("repository");
    RepositoryFixture {
        dir,
        repository,
    }
}

/// Minimal aggregate: content row only.
pub fn minimal_aggregate(id: &str, title: &str, created_at: i64) -> ContentAggregate {
    ContentAggregate::new(Content::new(
        ContentId::new(id),
        title,
        Timestamp::from_unix_millis(created_at),
    ))
}

/// Aggregate with every table and blob populated.
pub fn full_aggregate(id: &str) -> ContentAggregate {
    let content_id = ContentId::new(id);
    let mut content = Content::new(
        content_id.clone(),
        "Sharded storage notes",
        Timestamp::from_unix_millis(1_700_000_000_000),
    );
    content.public_url = Some(format!("/notes/{id}"));
    content.summary = Some("Why every post gets its own database".to_string());
    content.lang = Some("en".to_string());
    content.hierarchy.parent_id = Some(ContentId::new("notes"));
    content.hierarchy.ancestor_ids = vec![ContentId::new("root"), ContentId::new("notes")];
    content.hierarchy.path = Some("/root/notes".to_string());
    content.hierarchy.depth = 2;
    content.hierarchy.order = -3;
    content.hierarchy.child_count = 1;
    content.visibility = Visibility::Public;
    content.status = ContentStatus::Published;
    content.published_at = Some(Timestamp::from_unix_millis(1_700_000_100_000));
    content.updated_at = Timestamp::from_unix_millis(1_700_000_200_000);
    content.last_accessed_at = Some(Timestamp::from_unix_millis(1_700_000_300_000));
    content.search.full_text = Some("sqlite shards with trigger maintained indexes".to_string());
    content.search.tokens = vec!["sqlite".to_string(), "fts5".to_string()];
    content.version.version = 4;
    content.version.latest_id = Some(format!("{id}@4"));
    content.version.previous_id = Some(format!("{id}@3"));
    content.version.history_ref = Some("history/42".to_string());
    content.permissions.readers = vec!["everyone".to_string()];
    content.permissions.editors = vec!["owner".to_string(), "editor".to_string()];
    content.permissions.owner = Some("owner".to_string());
    content.thumbnails = Some(Thumbnails {
        primary: Some(Thumbnail {
            url: "/img/cover.png".to_string(),
            width: Some(640),
            height: Some(360),
        }),
        variants: vec![Thumbnail {
            url: "/img/cover-small.png".to_string(),
            width: Some(160),
            height: None,
        }],
    });
    content.seo = Some(SeoMeta {
        title: Some("Sharded storage".to_string()),
        description: Some("Per-entity SQLite files".to_string()),
        keywords: vec!["sqlite".to_string()],
        canonical_url: None,
        og_image: Some("/img/og.png".to_string()),
        no_index: false,
    });
    content.cache = Some(CacheHints {
        etag: Some("\"abc\"".to_string()),
        max_age_secs: Some(600),
        rendered_at: Some(Timestamp::from_unix_millis(1_700_000_400_000)),
    });
    let mut private_data = Metadata::new();
    private_data.insert("draftNotes", "check links");
    content.private_data = Some(private_data);
    let mut ext = Metadata::new();
    ext.insert("series", "storage");
    ext.insert("part", 2);
    content.ext = Some(ext);

    let mut relation_metadata = Metadata::new();
    relation_metadata.insert("note", "follow-up");

    ContentAggregate {
        content,
        tags: vec!["databases".to_string(), "rust".to_string()],
        relations: vec![
            Relation {
                source_id: content_id.clone(),
                target_id: ContentId::new("intro"),
                kind: "series".to_string(),
                bidirectional: true,
                weight: 0.75,
                metadata: Some(relation_metadata),
            },
            Relation {
                source_id: ContentId::new("faq"),
                target_id: content_id,
                kind: "related".to_string(),
                bidirectional: false,
                weight: 1.0,
                metadata: None,
            },
        ],
        assets: vec![
            Asset {
                position: 0,
                url: "/img/diagram.svg".to_string(),
                kind: "image".to_string(),
                width: Some(800),
                height: Some(600),
                alt: Some("Shard layout".to_string()),
                caption: None,
            },
            Asset {
                position: 1,
                url: "/video/demo.mp4".to_string(),
                kind: "video".to_string(),
                width: None,
                height: None,
                alt: None,
                caption: Some("Demo".to_string()),
            },
        ],
        links: vec![Link {
            position: 0,
            url: "https://sqlite.org/fts5.html".to_string(),
            label: Some("FTS5".to_string()),
            rel: Some("external".to_string()),
        }],
        pages: vec![
            MarkdownPage {
                slug: format!("{id}-appendix"),
                title: Some("Appendix".to_string()),
                body: "Companion files end in -wal and -shm.".to_string(),
                rendered_html: None,
                rendered_at: None,
                version: 1,
                created_at: Timestamp::from_unix_millis(1_700_000_000_000),
                updated_at: Timestamp::from_unix_millis(1_700_000_000_000),
            },
            MarkdownPage {
                slug: format!("{id}-body"),
                title: None,
                body: "# Storage\n\nEach shard carries its own full-text index.".to_string(),
                rendered_html: Some("<h1>Storage</h1>".to_string()),
                rendered_at: Some(Timestamp::from_unix_millis(1_700_000_500_000)),
                version: 7,
                created_at: Timestamp::from_unix_millis(1_700_000_000_000),
                updated_at: Timestamp::from_unix_millis(1_700_000_600_000),
            },
        ],
    }
}
