// crates/folio-core/src/core/content.rs
// ============================================================================
// Module: Folio Content Model
// Description: Content rows, associated entities, and the full aggregate.
// Purpose: Describe one content entity exactly as a shard persists it.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ContentAggregate`] is everything one shard holds: the [`Content`] row,
//! its tag set, outbound [`Relation`]s, ordered [`Asset`]s and [`Link`]s, and
//! the [`MarkdownPage`] bodies. [`ContentSummary`] is the listing projection
//! (content row plus tags).
//!
//! Blob columns (thumbnails, seo, cache, private data, extensions) are typed
//! here; only the store's mapper turns them into JSON text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::ContentId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: State Enumerations
// ============================================================================

/// Who may see a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Listed and readable by everyone.
    Public,
    /// Readable by link, not listed.
    Unlisted,
    /// Readable by permitted readers only.
    Private,
    /// Not readable outside the editor.
    #[default]
    Draft,
}

impl Visibility {
    /// Returns the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Draft => "draft",
        }
    }
}

impl FromStr for Visibility {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            "draft" => Ok(Self::Draft),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Publication state of a content entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Work in progress.
    #[default]
    Draft,
    /// Live.
    Published,
    /// Retired but retained.
    Archived,
}

impl ContentStatus {
    /// Returns the stored column value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Error returned when a stored enumeration value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// ============================================================================
// SECTION: Typed Blobs
// ============================================================================

/// Free-form key/value document attached to an entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Map<String, Value>);

impl Metadata {
    /// Creates an empty metadata document.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Inserts a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One rendered thumbnail image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thumbnail {
    /// Image URL.
    pub url: String,
    /// Pixel width.
    pub width: Option<u32>,
    /// Pixel height.
    pub height: Option<u32>,
}

/// Thumbnail set for a content entity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Thumbnails {
    /// Preferred thumbnail.
    pub primary: Option<Thumbnail>,
    /// Alternate sizes.
    pub variants: Vec<Thumbnail>,
}

/// Search-engine presentation overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoMeta {
    /// Document title override.
    pub title: Option<String>,
    /// Meta description.
    pub description: Option<String>,
    /// Meta keywords.
    pub keywords: Vec<String>,
    /// Canonical URL.
    pub canonical_url: Option<String>,
    /// Open Graph image URL.
    pub og_image: Option<String>,
    /// Emit `noindex`.
    pub no_index: bool,
}

/// Rendering cache hints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheHints {
    /// Entity tag of the last render.
    pub etag: Option<String>,
    /// Suggested max-age in seconds.
    pub max_age_secs: Option<u32>,
    /// When the cached render was produced.
    pub rendered_at: Option<Timestamp>,
}

// ============================================================================
// SECTION: Content Row
// ============================================================================

/// Position of a content entity in the site tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    /// Direct parent.
    pub parent_id: Option<ContentId>,
    /// Ancestors from the root down to the parent.
    pub ancestor_ids: Vec<ContentId>,
    /// Materialised path.
    pub path: Option<String>,
    /// Depth below the root.
    pub depth: u32,
    /// Sort position among siblings.
    pub order: i64,
    /// Number of direct children.
    pub child_count: u32,
}

/// Precomputed search inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFields {
    /// Plain-text rendering used for full-text search.
    pub full_text: Option<String>,
    /// Extra search tokens.
    pub tokens: Vec<String>,
}

/// Version chain pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    /// Monotonic version number.
    pub version: i64,
    /// Id of the latest version.
    pub latest_id: Option<String>,
    /// Id of the previous version.
    pub previous_id: Option<String>,
    /// Reference into an external history store.
    pub history_ref: Option<String>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: 1,
            latest_id: None,
            previous_id: None,
            history_ref: None,
        }
    }
}

/// Reader and editor grants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    /// Principals allowed to read.
    pub readers: Vec<String>,
    /// Principals allowed to edit.
    pub editors: Vec<String>,
    /// Owning principal.
    pub owner: Option<String>,
}

/// The primary content row of a shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Content identifier.
    pub id: ContentId,
    /// Display title.
    pub title: String,
    /// Public URL.
    pub public_url: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Language tag.
    pub lang: Option<String>,
    /// Tree position.
    pub hierarchy: Hierarchy,
    /// Visibility.
    pub visibility: Visibility,
    /// Publication status.
    pub status: ContentStatus,
    /// When the entity went live.
    pub published_at: Option<Timestamp>,
    /// When the entity was taken down.
    pub unpublished_at: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
    /// Last read time.
    pub last_accessed_at: Option<Timestamp>,
    /// Search inputs.
    pub search: SearchFields,
    /// Version chain.
    pub version: VersionInfo,
    /// Access grants.
    pub permissions: Permissions,
    /// Thumbnails.
    pub thumbnails: Option<Thumbnails>,
    /// SEO overrides.
    pub seo: Option<SeoMeta>,
    /// Render cache hints.
    pub cache: Option<CacheHints>,
    /// Editor-only data.
    pub private_data: Option<Metadata>,
    /// Extension fields.
    pub ext: Option<Metadata>,
}

impl Content {
    /// Creates a draft content row with default fields.
    #[must_use]
    pub fn new(id: ContentId, title: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id,
            title: title.into(),
            public_url: None,
            summary: None,
            lang: None,
            hierarchy: Hierarchy::default(),
            visibility: Visibility::default(),
            status: ContentStatus::default(),
            published_at: None,
            unpublished_at: None,
            created_at,
            updated_at: created_at,
            last_accessed_at: None,
            search: SearchFields::default(),
            version: VersionInfo::default(),
            permissions: Permissions::default(),
            thumbnails: None,
            seo: None,
            cache: None,
            private_data: None,
            ext: None,
        }
    }
}

// ============================================================================
// SECTION: Associated Entities
// ============================================================================

/// Directed, typed edge between two content entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Edge origin.
    pub source_id: ContentId,
    /// Edge target.
    pub target_id: ContentId,
    /// Relation type (for example `related` or `series`).
    pub kind: String,
    /// Whether the edge should be read in both directions.
    pub bidirectional: bool,
    /// Edge weight.
    pub weight: f64,
    /// Opaque edge metadata.
    pub metadata: Option<Metadata>,
}

/// Ordered media reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Position within the entity.
    pub position: u32,
    /// Media URL.
    pub url: String,
    /// Media kind (`image`, `video`, ...).
    pub kind: String,
    /// Pixel width.
    pub width: Option<u32>,
    /// Pixel height.
    pub height: Option<u32>,
    /// Alternative text.
    pub alt: Option<String>,
    /// Caption.
    pub caption: Option<String>,
}

/// Ordered outbound link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    /// Position within the entity.
    pub position: u32,
    /// Target URL.
    pub url: String,
    /// Display label.
    pub label: Option<String>,
    /// Link relation (`rel` attribute).
    pub rel: Option<String>,
}

/// Markdown body stored alongside its parent content.
///
/// # Invariants
/// - `slug` is unique within the shard.
/// - `version` advances independently of the parent content version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkdownPage {
    /// Page slug.
    pub slug: String,
    /// Page title.
    pub title: Option<String>,
    /// Markdown source.
    pub body: String,
    /// Cached rendered HTML.
    pub rendered_html: Option<String>,
    /// When the cached HTML was produced.
    pub rendered_at: Option<Timestamp>,
    /// Page version.
    pub version: i64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

// ============================================================================
// SECTION: Aggregates
// ============================================================================

/// Everything one shard stores for a content entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAggregate {
    /// Content row.
    pub content: Content,
    /// Tag names, sorted.
    pub tags: Vec<String>,
    /// Relations touching this content; every one has this content's id as
    /// its source or target.
    pub relations: Vec<Relation>,
    /// Assets ordered by position.
    pub assets: Vec<Asset>,
    /// Links ordered by position.
    pub links: Vec<Link>,
    /// Markdown pages ordered by slug.
    pub pages: Vec<MarkdownPage>,
}

impl ContentAggregate {
    /// Creates an aggregate holding only a content row.
    #[must_use]
    pub const fn new(content: Content) -> Self {
        Self {
            content,
            tags: Vec::new(),
            relations: Vec::new(),
            assets: Vec::new(),
            links: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Returns the aggregate's content id.
    #[must_use]
    pub const fn id(&self) -> &ContentId {
        &self.content.id
    }

    /// Returns a copy re-keyed to `new_id`, including relation endpoints that
    /// referenced the old id.
    #[must_use]
    pub fn with_id(mut self, new_id: &ContentId) -> Self {
        let old_id = std::mem::replace(&mut self.content.id, new_id.clone());
        for relation in &mut self.relations {
            if relation.source_id == old_id {
                relation.source_id = new_id.clone();
            }
            if relation.target_id == old_id {
                relation.target_id = new_id.clone();
            }
        }
        self
    }

    /// Projects the aggregate onto its listing summary.
    #[must_use]
    pub fn summary(&self) -> ContentSummary {
        ContentSummary::from_content(&self.content, self.tags.clone())
    }
}

/// Listing projection: the content row's display fields plus its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    /// Content identifier.
    pub id: ContentId,
    /// Display title.
    pub title: String,
    /// Public URL.
    pub public_url: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Language tag.
    pub lang: Option<String>,
    /// Visibility.
    pub visibility: Visibility,
    /// Publication status.
    pub status: ContentStatus,
    /// Direct parent.
    pub parent_id: Option<ContentId>,
    /// Materialised path.
    pub path: Option<String>,
    /// Depth below the root.
    pub depth: u32,
    /// Sort position among siblings.
    pub order: i64,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
    /// Publication time.
    pub published_at: Option<Timestamp>,
    /// Tag names, sorted.
    pub tags: Vec<String>,
    /// Thumbnails.
    pub thumbnails: Option<Thumbnails>,
    /// SEO overrides.
    pub seo: Option<SeoMeta>,
}

impl ContentSummary {
    /// Builds a summary from a content row and its tags.
    #[must_use]
    pub fn from_content(content: &Content, tags: Vec<String>) -> Self {
        Self {
            id: content.id.clone(),
            title: content.title.clone(),
            public_url: content.public_url.clone(),
            summary: content.summary.clone(),
            lang: content.lang.clone(),
            visibility: content.visibility,
            status: content.status,
            parent_id: content.hierarchy.parent_id.clone(),
            path: content.hierarchy.path.clone(),
            depth: content.hierarchy.depth,
            order: content.hierarchy.order,
            created_at: content.created_at,
            updated_at: content.updated_at,
            published_at: content.published_at,
            tags,
            thumbnails: content.thumbnails.clone(),
            seo: content.seo.clone(),
        }
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

    use super::Content;
    use super::ContentAggregate;
    use super::ContentStatus;
    use super::Relation;
    use super::Visibility;
    use crate::core::identifiers::ContentId;
    use crate::core::time::Timestamp;

    #[test]
    fn enum_column_values_parse_back() {
        for visibility in
            [Visibility::Public, Visibility::Unlisted, Visibility::Private, Visibility::Draft]
        {
            assert_eq!(visibility.as_str().parse::<Visibility>(), Ok(visibility));
        }
        for status in [ContentStatus::Draft, ContentStatus::Published, ContentStatus::Archived] {
            assert_eq!(status.as_str().parse::<ContentStatus>(), Ok(status));
        }
        assert!("hidden".parse::<Visibility>().is_err());
    }

    #[test]
    fn with_id_rewrites_self_references_only() {
        let old = ContentId::new("old");
        let mut aggregate =
            ContentAggregate::new(Content::new(old.clone(), "t", Timestamp::from_unix_millis(1)));
        aggregate.relations.push(Relation {
            source_id: old.clone(),
            target_id: ContentId::new("other"),
            kind: "related".to_string(),
            bidirectional: false,
            weight: 1.0,
            metadata: None,
        });
        aggregate.relations.push(Relation {
            source_id: old,
            target_id: ContentId::new("old"),
            kind: "self".to_string(),
            bidirectional: false,
            weight: 0.5,
            metadata: None,
        });

        let renamed = aggregate.with_id(&ContentId::new("new"));
        assert_eq!(renamed.content.id.as_str(), "new");
        assert_eq!(renamed.relations[0].source_id.as_str(), "new");
        assert_eq!(renamed.relations[0].target_id.as_str(), "other");
        assert_eq!(renamed.relations[1].target_id.as_str(), "new");
    }
}
