// crates/folio-store-sqlite/src/mapper.rs
// ============================================================================
// Module: Content Mapper
// Description: Translation between shard rows and the content aggregate.
// Purpose: Read and write full content aggregates and listing summaries.
// Dependencies: folio-core, rusqlite, serde, serde_json, tracing
// ============================================================================

//! ## Overview
//! The mapper is the only place JSON touches the storage layer. Typed blob
//! fields and id lists are written as JSON text and parsed back with
//! safe-parse semantics: a malformed document reads as absent (or empty for
//! lists) instead of failing the whole row.
//!
//! Writes happen in a single transaction. The content row is upserted with
//! `ON CONFLICT DO UPDATE` so the FTS update trigger fires; associated rows
//! are replaced wholesale.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use folio_core::Asset;
use folio_core::Content;
use folio_core::ContentAggregate;
use folio_core::ContentId;
use folio_core::ContentStatus;
use folio_core::ContentSummary;
use folio_core::Hierarchy;
use folio_core::Link;
use folio_core::MarkdownPage;
use folio_core::Permissions;
use folio_core::Relation;
use folio_core::SearchFields;
use folio_core::Timestamp;
use folio_core::VersionInfo;
use folio_core::Visibility;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ShardError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Content row columns, in bind and select order.
const CONTENT_COLUMNS: [&str; 32] = [
    "id",
    "title",
    "public_url",
    "summary",
    "lang",
    "parent_id",
    "ancestor_ids",
    "path",
    "depth",
    "sort_order",
    "child_count",
    "visibility",
    "status",
    "published_at",
    "unpublished_at",
    "created_at",
    "updated_at",
    "last_accessed_at",
    "search_full_text",
    "search_tokens",
    "version",
    "version_latest_id",
    "version_previous_id",
    "version_history_ref",
    "readers",
    "editors",
    "owner",
    "thumbnails",
    "seo",
    "cache",
    "private_data",
    "ext",
];

// ============================================================================
// SECTION: Reads
// ============================================================================

/// Reads the content row and tags as a listing summary.
///
/// With `id = None` the shard's primary (earliest created) row is read.
///
/// # Errors
///
/// Returns [`ShardError`] when the query fails or enum columns are invalid.
pub fn read_summary(
    connection: &Connection,
    id: Option<&ContentId>,
) -> Result<Option<ContentSummary>, ShardError> {
    let Some(content) = read_content(connection, id)? else {
        return Ok(None);
    };
    let tags = read_tags(connection, &content.id)?;
    Ok(Some(ContentSummary::from_content(&content, tags)))
}

/// Reads the content row.
///
/// With `id = None` the shard's primary (earliest created) row is read.
///
/// # Errors
///
/// Returns [`ShardError`] when the query fails or enum columns are invalid.
pub fn read_content(
    connection: &Connection,
    id: Option<&ContentId>,
) -> Result<Option<Content>, ShardError> {
    let columns = CONTENT_COLUMNS.join(", ");
    let raw = match id {
        Some(id) => connection
            .query_row(
                &format!("SELECT {columns} FROM contents WHERE id = ?1"),
                params![id.as_str()],
                raw_content_from_row,
            )
            .optional(),
        None => connection
            .query_row(
                &format!("SELECT {columns} FROM contents ORDER BY created_at ASC, id ASC LIMIT 1"),
                [],
                raw_content_from_row,
            )
            .optional(),
    }
    .map_err(|err| ShardError::Db(err.to_string()))?;
    raw.map(RawContent::into_content).transpose()
}

/// Reads the full aggregate for `id`.
///
/// # Errors
///
/// Returns [`ShardError`] when any query fails.
pub fn read_full_content(
    connection: &Connection,
    id: &ContentId,
) -> Result<Option<ContentAggregate>, ShardError> {
    let Some(content) = read_content(connection, Some(id))? else {
        return Ok(None);
    };
    Ok(Some(ContentAggregate {
        tags: read_tags(connection, id)?,
        relations: read_relations(connection, id)?,
        assets: read_assets(connection, id)?,
        links: read_links(connection, id)?,
        pages: read_pages(connection, id)?,
        content,
    }))
}

/// Reads tag names for `id`, sorted.
fn read_tags(connection: &Connection, id: &ContentId) -> Result<Vec<String>, ShardError> {
    let mut stmt = connection
        .prepare("SELECT tag FROM content_tags WHERE content_id = ?1 ORDER BY tag")
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| row.get::<_, String>(0))
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)
}

/// Reads relations touching `id`, in insertion order.
fn read_relations(connection: &Connection, id: &ContentId) -> Result<Vec<Relation>, ShardError> {
    let mut stmt = connection
        .prepare(
            "SELECT source_id, target_id, kind, bidirectional, weight, metadata
             FROM relations WHERE source_id = ?1 OR target_id = ?1 ORDER BY id",
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| {
            let metadata: Option<String> = row.get(5)?;
            Ok(Relation {
                source_id: ContentId::new(row.get::<_, String>(0)?),
                target_id: ContentId::new(row.get::<_, String>(1)?),
                kind: row.get(2)?,
                bidirectional: row.get(3)?,
                weight: row.get(4)?,
                metadata: parse_json_opt("relations.metadata", metadata),
            })
        })
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)
}

/// Reads assets for `id`, ordered by position.
fn read_assets(connection: &Connection, id: &ContentId) -> Result<Vec<Asset>, ShardError> {
    let mut stmt = connection
        .prepare(
            "SELECT position, url, kind, width, height, alt, caption
             FROM assets WHERE content_id = ?1 ORDER BY position",
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| {
            Ok(Asset {
                position: row.get(0)?,
                url: row.get(1)?,
                kind: row.get(2)?,
                width: row.get(3)?,
                height: row.get(4)?,
                alt: row.get(5)?,
                caption: row.get(6)?,
            })
        })
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)
}

/// Reads links for `id`, ordered by position.
fn read_links(connection: &Connection, id: &ContentId) -> Result<Vec<Link>, ShardError> {
    let mut stmt = connection
        .prepare(
            "SELECT position, url, label, rel FROM links WHERE content_id = ?1 ORDER BY position",
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| {
            Ok(Link {
                position: row.get(0)?,
                url: row.get(1)?,
                label: row.get(2)?,
                rel: row.get(3)?,
            })
        })
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)
}

/// Reads markdown pages for `id`, ordered by slug.
fn read_pages(connection: &Connection, id: &ContentId) -> Result<Vec<MarkdownPage>, ShardError> {
    let mut stmt = connection
        .prepare(
            "SELECT slug, title, body, rendered_html, rendered_at, version, created_at, updated_at
             FROM markdown_pages WHERE content_id = ?1 ORDER BY slug",
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map(params![id.as_str()], |row| {
            Ok(MarkdownPage {
                slug: row.get(0)?,
                title: row.get(1)?,
                body: row.get(2)?,
                rendered_html: row.get(3)?,
                rendered_at: row.get::<_, Option<i64>>(4)?.map(Timestamp::from_unix_millis),
                version: row.get(5)?,
                created_at: Timestamp::from_unix_millis(row.get(6)?),
                updated_at: Timestamp::from_unix_millis(row.get(7)?),
            })
        })
        .map_err(|err| ShardError::Db(err.to_string()))?;
    collect_rows(rows)
}

// ============================================================================
// SECTION: Writes
// ============================================================================

/// Writes a full aggregate, replacing whatever the shard held for its id.
///
/// # Errors
///
/// Returns [`ShardError::Invalid`] when a relation involves neither endpoint
/// being the aggregate's id, and [`ShardError`] when serialization or any
/// statement fails; the transaction is rolled back and the shard is unchanged.
pub fn save_full_content(
    connection: &mut Connection,
    aggregate: &ContentAggregate,
) -> Result<(), ShardError> {
    validate_relations(aggregate)?;
    let tx = connection.transaction().map_err(|err| ShardError::Db(err.to_string()))?;
    upsert_content(&tx, &aggregate.content)?;
    let id = aggregate.content.id.as_str();

    tx.execute("DELETE FROM content_tags WHERE content_id = ?1", params![id])
        .map_err(|err| ShardError::Db(err.to_string()))?;
    for tag in &aggregate.tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        tx.execute(
            "INSERT OR IGNORE INTO content_tags (content_id, tag) VALUES (?1, ?2)",
            params![id, tag],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    }

    tx.execute("DELETE FROM relations WHERE source_id = ?1 OR target_id = ?1", params![id])
        .map_err(|err| ShardError::Db(err.to_string()))?;
    for relation in &aggregate.relations {
        tx.execute(
            "INSERT INTO relations (source_id, target_id, kind, bidirectional, weight, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                relation.source_id.as_str(),
                relation.target_id.as_str(),
                relation.kind,
                relation.bidirectional,
                relation.weight,
                to_json_opt(relation.metadata.as_ref())?,
            ],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    }

    tx.execute("DELETE FROM assets WHERE content_id = ?1", params![id])
        .map_err(|err| ShardError::Db(err.to_string()))?;
    for asset in &aggregate.assets {
        tx.execute(
            "INSERT INTO assets (content_id, position, url, kind, width, height, alt, caption)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                asset.position,
                asset.url,
                asset.kind,
                asset.width,
                asset.height,
                asset.alt,
                asset.caption
            ],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    }

    tx.execute("DELETE FROM links WHERE content_id = ?1", params![id])
        .map_err(|err| ShardError::Db(err.to_string()))?;
    for link in &aggregate.links {
        tx.execute(
            "INSERT INTO links (content_id, position, url, label, rel)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, link.position, link.url, link.label, link.rel],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    }

    replace_pages(&tx, id, &aggregate.pages)?;
    tx.commit().map_err(|err| ShardError::Db(err.to_string()))?;
    Ok(())
}

/// Rejects relations that do not touch the aggregate's id.
///
/// Relation rows are replaced and read back by endpoint, so a row touching
/// neither endpoint would never be read and never be deleted.
fn validate_relations(aggregate: &ContentAggregate) -> Result<(), ShardError> {
    let id = &aggregate.content.id;
    match aggregate
        .relations
        .iter()
        .find(|relation| &relation.source_id != id && &relation.target_id != id)
    {
        Some(relation) => Err(ShardError::Invalid(format!(
            "relation {} -> {} ({}) does not involve content {id}",
            relation.source_id, relation.target_id, relation.kind
        ))),
        None => Ok(()),
    }
}

/// Inserts or updates the content row in place.
fn upsert_content(tx: &Transaction<'_>, content: &Content) -> Result<(), ShardError> {
    let columns = CONTENT_COLUMNS.join(", ");
    let placeholders =
        (1 ..= CONTENT_COLUMNS.len()).map(|index| format!("?{index}")).collect::<Vec<_>>();
    let updates = CONTENT_COLUMNS
        .iter()
        .skip(1)
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>();
    let sql = format!(
        "INSERT INTO contents ({columns}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        placeholders.join(", "),
        updates.join(", ")
    );
    let hierarchy = &content.hierarchy;
    let ancestor_ids =
        to_json(&hierarchy.ancestor_ids.iter().map(ContentId::as_str).collect::<Vec<_>>())?;
    tx.execute(
        &sql,
        params![
            content.id.as_str(),
            content.title,
            content.public_url,
            content.summary,
            content.lang,
            hierarchy.parent_id.as_ref().map(ContentId::as_str),
            ancestor_ids,
            hierarchy.path,
            hierarchy.depth,
            hierarchy.order,
            hierarchy.child_count,
            content.visibility.as_str(),
            content.status.as_str(),
            content.published_at.map(Timestamp::as_unix_millis),
            content.unpublished_at.map(Timestamp::as_unix_millis),
            content.created_at.as_unix_millis(),
            content.updated_at.as_unix_millis(),
            content.last_accessed_at.map(Timestamp::as_unix_millis),
            content.search.full_text,
            to_json(&content.search.tokens)?,
            content.version.version,
            content.version.latest_id,
            content.version.previous_id,
            content.version.history_ref,
            to_json(&content.permissions.readers)?,
            to_json(&content.permissions.editors)?,
            content.permissions.owner,
            to_json_opt(content.thumbnails.as_ref())?,
            to_json_opt(content.seo.as_ref())?,
            to_json_opt(content.cache.as_ref())?,
            to_json_opt(content.private_data.as_ref())?,
            to_json_opt(content.ext.as_ref())?,
        ],
    )
    .map_err(|err| ShardError::Db(err.to_string()))?;
    Ok(())
}

/// Upserts pages by slug and deletes pages no longer present.
fn replace_pages(tx: &Transaction<'_>, id: &str, pages: &[MarkdownPage]) -> Result<(), ShardError> {
    let keep = pages.iter().map(|page| page.slug.as_str()).collect::<BTreeSet<_>>();
    let existing = {
        let mut stmt = tx
            .prepare("SELECT slug FROM markdown_pages WHERE content_id = ?1")
            .map_err(|err| ShardError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))
            .map_err(|err| ShardError::Db(err.to_string()))?;
        collect_rows(rows)?
    };
    for slug in existing.iter().filter(|slug| !keep.contains(slug.as_str())) {
        tx.execute("DELETE FROM markdown_pages WHERE slug = ?1", params![slug])
            .map_err(|err| ShardError::Db(err.to_string()))?;
    }
    for page in pages {
        tx.execute(
            "INSERT INTO markdown_pages
                 (content_id, slug, title, body, rendered_html, rendered_at, version, created_at,
                  updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(slug) DO UPDATE SET
                 content_id = excluded.content_id,
                 title = excluded.title,
                 body = excluded.body,
                 rendered_html = excluded.rendered_html,
                 rendered_at = excluded.rendered_at,
                 version = excluded.version,
                 created_at = excluded.created_at,
                 updated_at = excluded.updated_at",
            params![
                id,
                page.slug,
                page.title,
                page.body,
                page.rendered_html,
                page.rendered_at.map(Timestamp::as_unix_millis),
                page.version,
                page.created_at.as_unix_millis(),
                page.updated_at.as_unix_millis(),
            ],
        )
        .map_err(|err| ShardError::Db(err.to_string()))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Content row as stored, before enum and JSON decoding.
struct RawContent {
    /// `id`.
    id: String,
    /// `title`.
    title: String,
    /// `public_url`.
    public_url: Option<String>,
    /// `summary`.
    summary: Option<String>,
    /// `lang`.
    lang: Option<String>,
    /// `parent_id`.
    parent_id: Option<String>,
    /// `ancestor_ids` JSON.
    ancestor_ids: Option<String>,
    /// `path`.
    path: Option<String>,
    /// `depth`.
    depth: u32,
    /// `sort_order`.
    order: i64,
    /// `child_count`.
    child_count: u32,
    /// `visibility`.
    visibility: String,
    /// `status`.
    status: String,
    /// `published_at`.
    published_at: Option<i64>,
    /// `unpublished_at`.
    unpublished_at: Option<i64>,
    /// `created_at`.
    created_at: i64,
    /// `updated_at`.
    updated_at: i64,
    /// `last_accessed_at`.
    last_accessed_at: Option<i64>,
    /// `search_full_text`.
    search_full_text: Option<String>,
    /// `search_tokens` JSON.
    search_tokens: Option<String>,
    /// `version`.
    version: i64,
    /// `version_latest_id`.
    version_latest_id: Option<String>,
    /// `version_previous_id`.
    version_previous_id: Option<String>,
    /// `version_history_ref`.
    version_history_ref: Option<String>,
    /// `readers` JSON.
    readers: Option<String>,
    /// `editors` JSON.
    editors: Option<String>,
    /// `owner`.
    owner: Option<String>,
    /// `thumbnails` JSON.
    thumbnails: Option<String>,
    /// `seo` JSON.
    seo: Option<String>,
    /// `cache` JSON.
    cache: Option<String>,
    /// `private_data` JSON.
    private_data: Option<String>,
    /// `ext` JSON.
    ext: Option<String>,
}

impl RawContent {
    /// Decodes enum and JSON columns.
    fn into_content(self) -> Result<Content, ShardError> {
        let visibility = self
            .visibility
            .parse::<Visibility>()
            .map_err(|err| ShardError::Invalid(format!("contents.visibility: {err}")))?;
        let status = self
            .status
            .parse::<ContentStatus>()
            .map_err(|err| ShardError::Invalid(format!("contents.status: {err}")))?;
        let ancestor_ids: Vec<String> =
            parse_json_opt("contents.ancestor_ids", self.ancestor_ids).unwrap_or_default();
        Ok(Content {
            id: ContentId::new(self.id),
            title: self.title,
            public_url: self.public_url,
            summary: self.summary,
            lang: self.lang,
            hierarchy: Hierarchy {
                parent_id: self.parent_id.map(ContentId::new),
                ancestor_ids: ancestor_ids.into_iter().map(ContentId::new).collect(),
                path: self.path,
                depth: self.depth,
                order: self.order,
                child_count: self.child_count,
            },
            visibility,
            status,
            published_at: self.published_at.map(Timestamp::from_unix_millis),
            unpublished_at: self.unpublished_at.map(Timestamp::from_unix_millis),
            created_at: Timestamp::from_unix_millis(self.created_at),
            updated_at: Timestamp::from_unix_millis(self.updated_at),
            last_accessed_at: self.last_accessed_at.map(Timestamp::from_unix_millis),
            search: SearchFields {
                full_text: self.search_full_text,
                tokens: parse_json_opt("contents.search_tokens", self.search_tokens)
                    .unwrap_or_default(),
            },
            version: VersionInfo {
                version: self.version,
                latest_id: self.version_latest_id,
                previous_id: self.version_previous_id,
                history_ref: self.version_history_ref,
            },
            permissions: Permissions {
                readers: parse_json_opt("contents.readers", self.readers).unwrap_or_default(),
                editors: parse_json_opt("contents.editors", self.editors).unwrap_or_default(),
                owner: self.owner,
            },
            thumbnails: parse_json_opt("contents.thumbnails", self.thumbnails),
            seo: parse_json_opt("contents.seo", self.seo),
            cache: parse_json_opt("contents.cache", self.cache),
            private_data: parse_json_opt("contents.private_data", self.private_data),
            ext: parse_json_opt("contents.ext", self.ext),
        })
    }
}

/// Maps a row selected with [`CONTENT_COLUMNS`].
fn raw_content_from_row(row: &Row<'_>) -> rusqlite::Result<RawContent> {
    Ok(RawContent {
        id: row.get(0)?,
        title: row.get(1)?,
        public_url: row.get(2)?,
        summary: row.get(3)?,
        lang: row.get(4)?,
        parent_id: row.get(5)?,
        ancestor_ids: row.get(6)?,
        path: row.get(7)?,
        depth: row.get(8)?,
        order: row.get(9)?,
        child_count: row.get(10)?,
        visibility: row.get(11)?,
        status: row.get(12)?,
        published_at: row.get(13)?,
        unpublished_at: row.get(14)?,
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
        last_accessed_at: row.get(17)?,
        search_full_text: row.get(18)?,
        search_tokens: row.get(19)?,
        version: row.get(20)?,
        version_latest_id: row.get(21)?,
        version_previous_id: row.get(22)?,
        version_history_ref: row.get(23)?,
        readers: row.get(24)?,
        editors: row.get(25)?,
        owner: row.get(26)?,
        thumbnails: row.get(27)?,
        seo: row.get(28)?,
        cache: row.get(29)?,
        private_data: row.get(30)?,
        ext: row.get(31)?,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Collects mapped rows, converting engine errors.
pub(crate) fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, ShardError> {
    rows.map(|row| row.map_err(|err| ShardError::Db(err.to_string()))).collect()
}

/// Parses a JSON column; malformed documents read as absent.
fn parse_json_opt<T: DeserializeOwned>(column: &'static str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(column, error = %err, "ignoring malformed json column");
            None
        }
    }
}

/// Serializes a value for a JSON column.
fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ShardError> {
    serde_json::to_string(value).map_err(|err| ShardError::Invalid(err.to_string()))
}

/// Serializes an optional value for a nullable JSON column.
fn to_json_opt<T: Serialize>(value: Option<&T>) -> Result<Option<String>, ShardError> {
    value.map(to_json).transpose()
}
