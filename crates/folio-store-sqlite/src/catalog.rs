// crates/folio-store-sqlite/src/catalog.rs
// ============================================================================
// Module: Tag Catalog
// Description: Global tag usage registry stored as one JSON document.
// Purpose: Track tag names independently of which shards reference them.
// Dependencies: folio-core, serde_json, tempfile, time, tracing
// ============================================================================

//! ## Overview
//! The catalog is a single JSON array at `<root>/tag-catalog.json`. Every
//! mutation is a read-modify-write of the whole document, serialized by an
//! in-process writer lock and persisted by renaming a fully written temp file
//! over the original, so readers never observe a torn document.
//!
//! Tag names are trimmed but not case-folded.
//!
//! Security posture: the document is local operator data; a malformed file is
//! reported as [`CatalogError::Corrupt`] and never silently replaced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use folio_core::Metadata;
use folio_core::TagCatalogEntry;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::CatalogError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Catalog file name under the storage root.
pub const TAG_CATALOG_FILE: &str = "tag-catalog.json";

// ============================================================================
// SECTION: Tag Catalog
// ============================================================================

/// File-backed tag catalog.
#[derive(Debug)]
pub struct TagCatalog {
    /// Catalog document path.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    writer: Mutex<()>,
}

impl TagCatalog {
    /// Creates a catalog backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    /// Creates a catalog at the conventional location under `root`.
    #[must_use]
    pub fn in_root(root: &Path) -> Self {
        Self::new(root.join(TAG_CATALOG_FILE))
    }

    /// Returns the catalog document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every entry in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document cannot be read or parsed.
    pub fn list(&self) -> Result<Vec<TagCatalogEntry>, CatalogError> {
        read_document(&self.path)
    }

    /// Returns the entry for `name` (trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document cannot be read or parsed.
    pub fn get(&self, name: &str) -> Result<Option<TagCatalogEntry>, CatalogError> {
        let name = name.trim();
        Ok(self.list()?.into_iter().find(|entry| entry.name == name))
    }

    /// Records a use of `name` now.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the name is blank or the document cannot
    /// be read, parsed or written.
    pub fn upsert(
        &self,
        name: &str,
        metadata: Option<Metadata>,
    ) -> Result<TagCatalogEntry, CatalogError> {
        self.upsert_at(name, metadata, OffsetDateTime::now_utc())
    }

    /// Records a use of `name` at `now`.
    ///
    /// Existing entries keep `created_at`; `last_used` is set to `now` and
    /// metadata is replaced only when supplied.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the name is blank or the document cannot
    /// be read, parsed or written.
    pub fn upsert_at(
        &self,
        name: &str,
        metadata: Option<Metadata>,
        now: OffsetDateTime,
    ) -> Result<TagCatalogEntry, CatalogError> {
        let name = normalize_name(name)?;
        let _guard = self.lock()?;
        let mut entries = read_document(&self.path)?;
        let entry = if let Some(existing) = entries.iter_mut().find(|entry| entry.name == name) {
            existing.last_used = now;
            if metadata.is_some() {
                existing.metadata = metadata;
            }
            existing.clone()
        } else {
            let entry = TagCatalogEntry {
                name: name.to_string(),
                created_at: now,
                last_used: now,
                metadata,
            };
            entries.push(entry.clone());
            entry
        };
        write_document(&self.path, &entries)?;
        debug!(tag = %entry.name, "recorded tag use");
        Ok(entry)
    }

    /// Removes `name`, returning whether an entry existed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the document cannot be read, parsed or
    /// written.
    pub fn remove(&self, name: &str) -> Result<bool, CatalogError> {
        let name = name.trim();
        let _guard = self.lock()?;
        let mut entries = read_document(&self.path)?;
        let before = entries.len();
        entries.retain(|entry| entry.name != name);
        if entries.len() == before {
            return Ok(false);
        }
        write_document(&self.path, &entries)?;
        debug!(tag = %name, "removed tag");
        Ok(true)
    }

    /// Acquires the writer lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, CatalogError> {
        self.writer.lock().map_err(|_| CatalogError::Io("tag catalog lock poisoned".to_string()))
    }
}

// ============================================================================
// SECTION: Document I/O
// ============================================================================

/// Trims a tag name and rejects blanks.
fn normalize_name(name: &str) -> Result<&str, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::Invalid("tag name must not be empty".to_string()));
    }
    Ok(name)
}

/// Reads the document; a missing or empty file is an empty catalog.
fn read_document(path: &Path) -> Result<Vec<TagCatalogEntry>, CatalogError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(CatalogError::Io(format!("{}: {err}", path.display()))),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&bytes)
        .map_err(|err| CatalogError::Corrupt(format!("{}: {err}", path.display())))
}

/// Writes the document atomically via a sibling temp file.
fn write_document(path: &Path, entries: &[TagCatalogEntry]) -> Result<(), CatalogError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|err| CatalogError::Io(format!("{}: {err}", parent.display())))?;
    let bytes =
        serde_json::to_vec_pretty(entries).map_err(|err| CatalogError::Invalid(err.to_string()))?;
    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|err| CatalogError::Io(format!("{}: {err}", parent.display())))?;
    temp.write_all(&bytes).map_err(|err| CatalogError::Io(err.to_string()))?;
    temp.as_file().sync_all().map_err(|err| CatalogError::Io(err.to_string()))?;
    temp.persist(path)
        .map_err(|err| CatalogError::Io(format!("{}: {}", path.display(), err.error)))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
