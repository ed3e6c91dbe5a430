// crates/folio-store-sqlite/src/schema.rs
// ============================================================================
// Module: Shard Schema
// Description: Canonical per-shard relational schema and additive upgrades.
// Purpose: Create new shards and evolve older ones without altering data.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Every shard carries the same schema: the content row, tag associations,
//! relations, assets, links, markdown pages, and two FTS5 virtual tables
//! (content text fields and markdown bodies) kept in lockstep with their base
//! tables by insert/update/delete triggers.
//!
//! The schema version lives in `PRAGMA user_version`. Upgrades only ever run
//! `CREATE ... IF NOT EXISTS` statements; existing tables, columns and rows
//! are never rewritten.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;

use crate::error::ShardError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current shard schema version.
pub const SCHEMA_VERSION: i64 = 2;

/// Base tables created for every new shard.
pub const CORE_TABLES: [&str; 6] =
    ["contents", "content_tags", "relations", "assets", "links", "markdown_pages"];

/// Full-text virtual tables created for every new shard.
pub const FTS_TABLES: [&str; 2] = ["content_fts", "markdown_fts"];

/// Table added by schema version 2.
pub const MANUAL_DATES_TABLE: &str = "manual_dates";

/// Version 1: content row, associations, and FTS indexes.
const CORE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS contents (
    id TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    public_url TEXT,
    summary TEXT,
    lang TEXT,
    parent_id TEXT,
    ancestor_ids TEXT NOT NULL DEFAULT '[]',
    path TEXT,
    depth INTEGER NOT NULL DEFAULT 0,
    sort_order INTEGER NOT NULL DEFAULT 0,
    child_count INTEGER NOT NULL DEFAULT 0,
    visibility TEXT NOT NULL DEFAULT 'draft'
        CHECK (visibility IN ('public', 'unlisted', 'private', 'draft')),
    status TEXT NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'published', 'archived')),
    published_at INTEGER,
    unpublished_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    last_accessed_at INTEGER,
    search_full_text TEXT,
    search_tokens TEXT NOT NULL DEFAULT '[]',
    version INTEGER NOT NULL DEFAULT 1,
    version_latest_id TEXT,
    version_previous_id TEXT,
    version_history_ref TEXT,
    readers TEXT NOT NULL DEFAULT '[]',
    editors TEXT NOT NULL DEFAULT '[]',
    owner TEXT,
    thumbnails TEXT,
    seo TEXT,
    cache TEXT,
    private_data TEXT,
    ext TEXT
);
CREATE INDEX IF NOT EXISTS idx_contents_created_at ON contents (created_at);

CREATE TABLE IF NOT EXISTS content_tags (
    content_id TEXT NOT NULL
        REFERENCES contents(id) ON DELETE CASCADE ON UPDATE CASCADE,
    tag TEXT NOT NULL,
    UNIQUE (content_id, tag)
);
CREATE INDEX IF NOT EXISTS idx_content_tags_tag ON content_tags (tag);

CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY,
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    bidirectional INTEGER NOT NULL DEFAULT 0 CHECK (bidirectional IN (0, 1)),
    weight REAL NOT NULL DEFAULT 1.0,
    metadata TEXT,
    UNIQUE (source_id, target_id, kind)
);
CREATE INDEX IF NOT EXISTS idx_relations_target ON relations (target_id);

CREATE TABLE IF NOT EXISTS assets (
    content_id TEXT NOT NULL
        REFERENCES contents(id) ON DELETE CASCADE ON UPDATE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'image',
    width INTEGER,
    height INTEGER,
    alt TEXT,
    caption TEXT,
    PRIMARY KEY (content_id, position)
);

CREATE TABLE IF NOT EXISTS links (
    content_id TEXT NOT NULL
        REFERENCES contents(id) ON DELETE CASCADE ON UPDATE CASCADE,
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    label TEXT,
    rel TEXT,
    PRIMARY KEY (content_id, position)
);

CREATE TABLE IF NOT EXISTS markdown_pages (
    id INTEGER PRIMARY KEY,
    content_id TEXT NOT NULL
        REFERENCES contents(id) ON DELETE CASCADE ON UPDATE CASCADE,
    slug TEXT NOT NULL UNIQUE,
    title TEXT,
    body TEXT NOT NULL DEFAULT '',
    rendered_html TEXT,
    rendered_at INTEGER,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_markdown_pages_content ON markdown_pages (content_id);

CREATE VIRTUAL TABLE IF NOT EXISTS content_fts USING fts5(
    title,
    summary,
    search_full_text,
    search_tokens,
    content='contents',
    content_rowid='rowid',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS contents_fts_ai AFTER INSERT ON contents BEGIN
    INSERT INTO content_fts(rowid, title, summary, search_full_text, search_tokens)
    VALUES (new.rowid, new.title, new.summary, new.search_full_text, new.search_tokens);
END;

CREATE TRIGGER IF NOT EXISTS contents_fts_ad AFTER DELETE ON contents BEGIN
    INSERT INTO content_fts(content_fts, rowid, title, summary, search_full_text, search_tokens)
    VALUES ('delete', old.rowid, old.title, old.summary, old.search_full_text, old.search_tokens);
END;

CREATE TRIGGER IF NOT EXISTS contents_fts_au AFTER UPDATE ON contents BEGIN
    INSERT INTO content_fts(content_fts, rowid, title, summary, search_full_text, search_tokens)
    VALUES ('delete', old.rowid, old.title, old.summary, old.search_full_text, old.search_tokens);
    INSERT INTO content_fts(rowid, title, summary, search_full_text, search_tokens)
    VALUES (new.rowid, new.title, new.summary, new.search_full_text, new.search_tokens);
END;

CREATE VIRTUAL TABLE IF NOT EXISTS markdown_fts USING fts5(
    slug,
    title,
    body,
    content='markdown_pages',
    content_rowid='id',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS markdown_pages_fts_ai AFTER INSERT ON markdown_pages BEGIN
    INSERT INTO markdown_fts(rowid, slug, title, body)
    VALUES (new.id, new.slug, new.title, new.body);
END;

CREATE TRIGGER IF NOT EXISTS markdown_pages_fts_ad AFTER DELETE ON markdown_pages BEGIN
    INSERT INTO markdown_fts(markdown_fts, rowid, slug, title, body)
    VALUES ('delete', old.id, old.slug, old.title, old.body);
END;

CREATE TRIGGER IF NOT EXISTS markdown_pages_fts_au AFTER UPDATE ON markdown_pages BEGIN
    INSERT INTO markdown_fts(markdown_fts, rowid, slug, title, body)
    VALUES ('delete', old.id, old.slug, old.title, old.body);
    INSERT INTO markdown_fts(rowid, slug, title, body)
    VALUES (new.id, new.slug, new.title, new.body);
END;
";

/// Version 2: human-curated display dates.
const MANUAL_DATES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS manual_dates (
    content_id TEXT PRIMARY KEY NOT NULL,
    display_date TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
";

// ============================================================================
// SECTION: Schema Management
// ============================================================================

/// Creates the full schema in a brand-new shard.
///
/// # Errors
///
/// Returns [`ShardError::Db`] when any statement fails; the transaction is
/// rolled back.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), ShardError> {
    let tx = connection.transaction().map_err(|err| ShardError::Db(err.to_string()))?;
    tx.execute_batch(CORE_SCHEMA).map_err(|err| ShardError::Db(err.to_string()))?;
    apply_upgrades(&tx, 1)?;
    set_schema_version(&tx)?;
    tx.commit().map_err(|err| ShardError::Db(err.to_string()))?;
    Ok(())
}

/// Adds tables introduced after the shard was created.
///
/// # Errors
///
/// Returns [`ShardError::VersionMismatch`] for shards written by a newer
/// schema and [`ShardError::Db`] when the shard is unreadable or an upgrade
/// statement fails.
pub fn ensure_upgrades(connection: &mut Connection) -> Result<(), ShardError> {
    let version = schema_version(connection)?;
    if version == SCHEMA_VERSION {
        return Ok(());
    }
    if version > SCHEMA_VERSION {
        return Err(ShardError::VersionMismatch(format!(
            "unsupported shard schema version: {version}"
        )));
    }
    let tx = connection.transaction().map_err(|err| ShardError::Db(err.to_string()))?;
    if version < 1 {
        // Unversioned shard: fill in whatever core objects are missing.
        tx.execute_batch(CORE_SCHEMA).map_err(|err| ShardError::Db(err.to_string()))?;
    }
    apply_upgrades(&tx, version.max(1))?;
    set_schema_version(&tx)?;
    tx.commit().map_err(|err| ShardError::Db(err.to_string()))?;
    Ok(())
}

/// Returns the shard's recorded schema version.
///
/// # Errors
///
/// Returns [`ShardError::Db`] when the file is not a readable database.
pub fn schema_version(connection: &Connection) -> Result<i64, ShardError> {
    connection
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| ShardError::Db(err.to_string()))
}

/// Lists table names (including virtual tables) present in the shard.
///
/// # Errors
///
/// Returns [`ShardError::Db`] when the schema cannot be queried.
pub fn table_names(connection: &Connection) -> Result<Vec<String>, ShardError> {
    let mut stmt = connection
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|err| ShardError::Db(err.to_string()))?;
    let mut names = Vec::new();
    for row in rows {
        names.push(row.map_err(|err| ShardError::Db(err.to_string()))?);
    }
    Ok(names)
}

/// Records [`SCHEMA_VERSION`] in the shard header.
fn set_schema_version(tx: &rusqlite::Transaction<'_>) -> Result<(), ShardError> {
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))
        .map_err(|err| ShardError::Db(err.to_string()))
}

/// Applies every additive step newer than `from_version`.
fn apply_upgrades(tx: &rusqlite::Transaction<'_>, from_version: i64) -> Result<(), ShardError> {
    if from_version < 2 {
        tx.execute_batch(MANUAL_DATES_SCHEMA).map_err(|err| ShardError::Db(err.to_string()))?;
    }
    Ok(())
}
