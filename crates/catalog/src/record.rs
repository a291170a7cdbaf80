use serde::{Deserialize, Serialize};

/// One published entry.
///
/// Serializes with the attribute names used by the production table, so a
/// record printed as JSON reads the same as the stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Primary key. Generated once when the entry is first seen.
    pub id: String,
    pub file_name: String,
    pub media: String,
    pub category: String,
    pub tag: Vec<String>,
    pub title: String,
    /// `YYYY-MM-DD HH:MM:SS`, set on creation only.
    pub created_at: String,
    /// `YYYY-MM-DD HH:MM:SS`, refreshed on every write.
    pub updated_at: String,
    /// Accent colour name picked on creation.
    #[serde(rename = "eyeCatchURL")]
    pub eye_catch_url: String,
}
