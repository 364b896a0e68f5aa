use serde::{Deserialize, Serialize};

/// Metadata persisted as `data.json` inside each movie folder.
///
/// Every field is optional so a partially crawled record still parses;
/// fields never written are left out of the file entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_translated: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres_translated: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_path: Option<String>,
}
