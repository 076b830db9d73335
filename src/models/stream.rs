use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Screen orientation of the streams. Always portrait for this provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
}

/// Book-level metadata of a normalized stream response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_cover: Option<String>,
    /// Upstream-defined, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_count: Option<Value>,
    /// Upstream-defined, passed through untouched
    #[serde(default)]
    pub corner: Value,
    pub chapter_count: i64,
    pub description: String,
    pub tags: Vec<String>,
    pub orientation: Orientation,
}

/// A playable video source of an episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub url: String,
    pub quality: i64,
    pub cdn: String,
    pub is_default: bool,
    pub is_vip: bool,
}

/// A normalized episode with its ranked sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub index: i64,
    pub name: String,
    pub thumbnail: Option<String>,
    pub is_charge: bool,
    pub sources: Vec<Source>,
}

impl Episode {
    /// Best ranked source, if any
    pub fn top_source(&self) -> Option<&Source> {
        self.sources.first()
    }

    /// One-based episode number for display
    pub fn number(&self) -> i64 {
        self.index.saturating_add(1)
    }
}

/// Canonical result of normalizing an upstream stream payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamData {
    pub meta: StreamMeta,
    pub episodes: Vec<Episode>,
}
