// crates/folio-core/src/core/mod.rs
// ============================================================================
// Module: Folio Core Types
// Description: Content model, identifiers, and time values.
// Purpose: Group the serializable domain types shared by every Folio crate.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Core types are plain data. Blob columns that the storage layer persists
//! as JSON documents are modelled here as explicit structs so callers never
//! handle untyped documents.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod content;
pub mod identifiers;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::ManualDateEntry;
pub use catalog::TagCatalogEntry;
pub use content::Asset;
pub use content::CacheHints;
pub use content::Content;
pub use content::ContentAggregate;
pub use content::ContentStatus;
pub use content::ContentSummary;
pub use content::Hierarchy;
pub use content::Link;
pub use content::MarkdownPage;
pub use content::Metadata;
pub use content::Permissions;
pub use content::Relation;
pub use content::SearchFields;
pub use content::SeoMeta;
pub use content::Thumbnail;
pub use content::Thumbnails;
pub use content::VersionInfo;
pub use content::Visibility;
pub use identifiers::ContentId;
pub use time::Timestamp;
