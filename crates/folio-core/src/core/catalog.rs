// crates/folio-core/src/core/catalog.rs
// ============================================================================
// Module: Folio Catalog Records
// Description: Shard-independent tag usage and manual display date records.
// Purpose: Define the records kept outside (or alongside) content rows.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! [`TagCatalogEntry`] lives in the global tag catalog document and is
//! independent of which shards currently reference the tag.
//! [`ManualDateEntry`] is a human-curated display date stored inside one
//! shard.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::OffsetDateTime;

use crate::core::content::Metadata;
use crate::core::identifiers::ContentId;
use crate::core::time::Timestamp;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

// ============================================================================
// SECTION: Tag Catalog
// ============================================================================

/// Usage record for one tag name.
///
/// # Invariants
/// - `name` is trimmed and non-empty.
/// - `created_at` never changes after the entry is first written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCatalogEntry {
    /// Tag name.
    pub name: String,
    /// When the tag was first recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the tag was last assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub last_used: OffsetDateTime,
    /// Opaque tag metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

// ============================================================================
// SECTION: Manual Dates
// ============================================================================

/// Display date overriding the computed created/updated timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualDateEntry {
    /// Content the override applies to.
    pub content_id: ContentId,
    /// Display date.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// When the override was last written.
    pub updated_at: Timestamp,
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

    use time::macros::date;
    use time::macros::datetime;

    use super::ManualDateEntry;
    use super::TagCatalogEntry;
    use crate::core::identifiers::ContentId;
    use crate::core::time::Timestamp;

    #[test]
    fn tag_entry_serializes_camel_case_rfc3339() {
        let entry = TagCatalogEntry {
            name: "rust".to_string(),
            created_at: datetime!(2024-01-02 03:04:05 UTC),
            last_used: datetime!(2024-02-03 04:05:06 UTC),
            metadata: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["createdAt"], "2024-01-02T03:04:05Z");
        assert_eq!(json["lastUsed"], "2024-02-03T04:05:06Z");
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn manual_date_serializes_iso_date() {
        let entry = ManualDateEntry {
            content_id: ContentId::new("post-1"),
            date: date!(2019 - 06 - 30),
            updated_at: Timestamp::from_unix_millis(5),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2019-06-30");
        let back: ManualDateEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
