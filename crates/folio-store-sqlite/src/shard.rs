// crates/folio-store-sqlite/src/shard.rs
// ============================================================================
// Module: Shard Store
// Description: Maps content ids to per-entity SQLite files and opens them.
// Purpose: Create shards lazily and upgrade existing ones on every open.
// Dependencies: folio-core, rusqlite, serde, tracing
// ============================================================================

//! ## Overview
//! Each content id owns exactly one database file at
//! `<root>/contents/content-<sanitized-id>.db`. Opening an id that has no
//! file creates it and initializes the schema; opening an existing file runs
//! the additive upgrades. Connections are configured for WAL journaling so
//! readers are not blocked by a writer on the same shard.
//!
//! Pragma failures are logged and ignored. Schema failures fail the open.
//! A [`ShardHandle`] closes its connection when dropped, so scans that open
//! many shards in sequence release each one on every exit path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use folio_core::ContentId;
use folio_core::identifiers::is_shard_safe_char;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use serde::Deserialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::ShardError;
use crate::schema::ensure_upgrades;
use crate::schema::initialize_schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Directory under the root that holds shard files.
pub const CONTENTS_DIR: &str = "contents";
/// Shard file name prefix.
pub const SHARD_PREFIX: &str = "content-";
/// Shard file name extension.
pub const SHARD_EXTENSION: &str = ".db";
/// Suffixes of journal and shared-memory companion files.
pub const COMPANION_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode applied to every shard connection.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl JournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode applied to every shard connection.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the shard store.
///
/// # Invariants
/// - `root` is a directory path (it may not exist yet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardStoreConfig {
    /// Storage root; shards live in `root/contents`.
    pub root: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
    /// Journal mode.
    pub journal_mode: JournalMode,
    /// Sync mode.
    pub sync_mode: SyncMode,
}

impl ShardStoreConfig {
    /// Creates a configuration with default pragmas for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: JournalMode::default(),
            sync_mode: SyncMode::default(),
        }
    }
}

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
#[must_use]
pub fn sanitize_id(id: &str) -> String {
    id.chars().map(|ch| if is_shard_safe_char(ch) { ch } else { '_' }).collect()
}

/// Returns the shard file name for a content id.
#[must_use]
pub fn shard_file_name(id: &ContentId) -> String {
    format!("{SHARD_PREFIX}{}{SHARD_EXTENSION}", sanitize_id(id.as_str()))
}

/// Returns true when `name` looks like a main shard file (not a companion).
#[must_use]
pub fn is_shard_file_name(name: &str) -> bool {
    name.len() > SHARD_PREFIX.len() + SHARD_EXTENSION.len()
        && name.starts_with(SHARD_PREFIX)
        && name.ends_with(SHARD_EXTENSION)
}

/// Returns the journal and shared-memory companion paths for a shard file.
#[must_use]
pub fn companion_paths(path: &Path) -> Vec<PathBuf> {
    COMPANION_SUFFIXES
        .iter()
        .map(|suffix| {
            let mut name = path.as_os_str().to_os_string();
            name.push(suffix);
            PathBuf::from(name)
        })
        .collect()
}

/// Removes a shard file and its companions.
///
/// Returns true when at least one file was removed.
///
/// # Errors
///
/// Returns [`ShardError::Io`] when an existing file cannot be removed.
pub fn remove_shard_files(path: &Path) -> Result<bool, ShardError> {
    let mut removed = false;
    for target in std::iter::once(path.to_path_buf()).chain(companion_paths(path)) {
        match fs::remove_file(&target) {
            Ok(()) => {
                debug!(path = %target.display(), "removed shard file");
                removed = true;
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(ShardError::Io(format!("{}: {err}", target.display())));
            }
        }
    }
    Ok(removed)
}

// ============================================================================
// SECTION: Shard Handle
// ============================================================================

/// An open shard connection.
///
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct ShardHandle {
    /// Shard file path.
    path: PathBuf,
    /// Open connection.
    connection: Connection,
}

impl ShardHandle {
    /// Returns the shard file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Returns the connection mutably (needed for transactions).
    pub const fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    /// Closes the connection, reporting close errors.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::Db`] when `SQLite` refuses to close.
    pub fn close(self) -> Result<(), ShardError> {
        self.connection.close().map_err(|(_, err)| ShardError::Db(err.to_string()))
    }
}

// ============================================================================
// SECTION: Shard Store
// ============================================================================

/// Opens and creates per-entity shards under a storage root.
#[derive(Debug, Clone)]
pub struct ShardStore {
    /// Store configuration.
    config: ShardStoreConfig,
    /// `root/contents`.
    contents_dir: PathBuf,
}

impl ShardStore {
    /// Creates a shard store. Directories are created lazily on first write.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::Invalid`] when the root path is unusable.
    pub fn new(config: ShardStoreConfig) -> Result<Self, ShardError> {
        validate_root(&config.root)?;
        let contents_dir = config.root.join(CONTENTS_DIR);
        Ok(Self {
            config,
            contents_dir,
        })
    }

    /// Returns the storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Returns the directory holding shard files.
    #[must_use]
    pub fn contents_dir(&self) -> &Path {
        &self.contents_dir
    }

    /// Returns the shard path for a content id. Pure and deterministic.
    #[must_use]
    pub fn shard_path(&self, id: &ContentId) -> PathBuf {
        self.contents_dir.join(shard_file_name(id))
    }

    /// Returns true when a shard file exists for `id`.
    #[must_use]
    pub fn exists(&self, id: &ContentId) -> bool {
        self.shard_path(id).is_file()
    }

    /// Opens the shard for `id`, creating and initializing it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the id is empty, the file cannot be
    /// created or opened, or schema initialization/upgrade fails.
    pub fn open(&self, id: &ContentId) -> Result<ShardHandle, ShardError> {
        if id.as_str().is_empty() {
            return Err(ShardError::Invalid("content id must not be empty".to_string()));
        }
        let path = self.shard_path(id);
        if path.is_file() {
            return self.open_path(&path);
        }
        self.create(&path)
    }

    /// Opens the shard for `id` only if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when an existing shard cannot be opened.
    pub fn open_existing(&self, id: &ContentId) -> Result<Option<ShardHandle>, ShardError> {
        let path = self.shard_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        self.open_path(&path).map(Some)
    }

    /// Opens an existing shard file and applies pending upgrades.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError`] when the file is missing, is not a database, or
    /// carries an unsupported schema version.
    pub fn open_path(&self, path: &Path) -> Result<ShardHandle, ShardError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let mut connection = Connection::open_with_flags(path, flags)
            .map_err(|err| ShardError::Db(format!("{}: {err}", path.display())))?;
        apply_pragmas(&connection, &self.config, path);
        ensure_upgrades(&mut connection).map_err(|err| annotate(err, path))?;
        Ok(ShardHandle {
            path: path.to_path_buf(),
            connection,
        })
    }

    /// Lists main shard files in the contents directory, sorted by name.
    ///
    /// A missing contents directory is an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`ShardError::Io`] when the directory exists but cannot be read.
    pub fn shard_files(&self) -> Result<Vec<PathBuf>, ShardError> {
        let entries = match fs::read_dir(&self.contents_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(ShardError::Io(format!("{}: {err}", self.contents_dir.display())));
            }
        };
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ShardError::Io(err.to_string()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if is_shard_file_name(name) && entry.path().is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Creates a new shard file with the full schema.
    fn create(&self, path: &Path) -> Result<ShardHandle, ShardError> {
        fs::create_dir_all(&self.contents_dir)
            .map_err(|err| ShardError::Io(format!("{}: {err}", self.contents_dir.display())))?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let mut connection = Connection::open_with_flags(path, flags)
            .map_err(|err| ShardError::Db(format!("{}: {err}", path.display())))?;
        apply_pragmas(&connection, &self.config, path);
        if let Err(err) = initialize_schema(&mut connection) {
            drop(connection);
            if let Err(cleanup) = remove_shard_files(path) {
                warn!(path = %path.display(), error = %cleanup, "failed to remove half-created shard");
            }
            return Err(annotate(err, path));
        }
        info!(path = %path.display(), "created shard");
        Ok(ShardHandle {
            path: path.to_path_buf(),
            connection,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the storage root against path limits.
fn validate_root(path: &Path) -> Result<(), ShardError> {
    if path.as_os_str().is_empty() {
        return Err(ShardError::Invalid("storage root must not be empty".to_string()));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ShardError::Invalid("storage root exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ShardError::Invalid(
                "storage root contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_file() {
        return Err(ShardError::Invalid("storage root must be a directory, not a file".to_string()));
    }
    Ok(())
}

/// Applies connection pragmas. Failures are logged and ignored.
fn apply_pragmas(connection: &Connection, config: &ShardStoreConfig, path: &Path) {
    if let Err(err) = connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)) {
        warn!(path = %path.display(), error = %err, "ignoring busy_timeout failure");
    }
    if let Err(err) = connection.execute_batch("PRAGMA foreign_keys = ON;") {
        warn!(path = %path.display(), error = %err, "ignoring foreign_keys pragma failure");
    }
    let journal = format!("PRAGMA journal_mode = {}", config.journal_mode.pragma_value());
    if let Err(err) = connection.query_row(&journal, [], |row| row.get::<_, String>(0)) {
        warn!(path = %path.display(), error = %err, "ignoring journal_mode pragma failure");
    }
    let sync = format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value());
    if let Err(err) = connection.execute_batch(&sync) {
        warn!(path = %path.display(), error = %err, "ignoring synchronous pragma failure");
    }
}

/// Prefixes database errors with the shard path.
fn annotate(error: ShardError, path: &Path) -> ShardError {
    match error {
        ShardError::Db(message) => ShardError::Db(format!("{}: {message}", path.display())),
        other => other,
    }
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

    use std::path::Path;
    use std::path::PathBuf;

    use folio_core::ContentId;

    use super::companion_paths;
    use super::is_shard_file_name;
    use super::sanitize_id;
    use super::shard_file_name;

    #[test]
    fn sanitize_replaces_disallowed_characters() {
        assert_eq!(sanitize_id("posts/2024 hello.md"), "posts_2024_hello_md");
        assert_eq!(sanitize_id("post-1_a"), "post-1_a");
    }

    #[test]
    fn shard_file_name_uses_prefix_and_extension() {
        assert_eq!(shard_file_name(&ContentId::new("post-1")), "content-post-1.db");
    }

    #[test]
    fn companions_are_not_shard_files() {
        assert!(is_shard_file_name("content-post-1.db"));
        assert!(!is_shard_file_name("content-post-1.db-wal"));
        assert!(!is_shard_file_name("content-post-1.db-shm"));
        assert!(!is_shard_file_name("tag-catalog.json"));
        assert!(!is_shard_file_name("content-.db"));
    }

    #[test]
    fn companion_paths_append_suffixes() {
        let companions = companion_paths(Path::new("/data/contents/content-a.db"));
        assert_eq!(
            companions,
            vec![
                PathBuf::from("/data/contents/content-a.db-wal"),
                PathBuf::from("/data/contents/content-a.db-shm"),
                PathBuf::from("/data/contents/content-a.db-journal"),
            ]
        );
    }
}
