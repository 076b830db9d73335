//! Untrusted upstream payload shapes
//!
//! Every leaf is kept as an untyped [`Value`] and every nested list is parsed
//! element by element, so deserialization of these types never fails on a
//! mistyped field. Interpretation of the leaves happens in
//! [`crate::services::normalizer::coerce`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize any value, keeping it only if it fits `T`.
///
/// A present `null` is kept as `Some(Value::Null)` when `T` is [`Value`].
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a nested object, dropping anything that is not one.
fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list of objects, skipping elements that are not objects or
/// do not fit `T`. Anything other than an array yields `None`.
fn object_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Top-level response from the stream endpoint of the scraping backend
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUpstreamPayload {
    #[serde(default, deserialize_with = "object")]
    pub data: Option<RawBookData>,
}

impl RawUpstreamPayload {
    /// Read a payload out of arbitrary JSON. Never fails: anything that is not
    /// an object becomes the empty payload.
    pub fn from_value(raw: Option<&Value>) -> Self {
        raw.filter(|value| value.is_object())
            .and_then(|value| Self::deserialize(value).ok())
            .unwrap_or_default()
    }
}

/// Book-level fields under `data`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBookData {
    #[serde(default, deserialize_with = "lenient")]
    pub book_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub book_name: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub book_cover: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub play_count: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub corner: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub chapter_count: Option<Value>,
    #[serde(default, deserialize_with = "object_list")]
    pub chapter_list: Option<Vec<RawChapter>>,
    #[serde(default, deserialize_with = "lenient")]
    pub introduction: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Vec<Value>>,
}

/// One chapter (episode) entry of `chapterList`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChapter {
    #[serde(default, deserialize_with = "lenient")]
    pub chapter_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub chapter_index: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub chapter_name: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub chapter_img: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_charge: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub charge_chapter: Option<Value>,
    #[serde(default, deserialize_with = "object_list")]
    pub cdn_list: Option<Vec<RawCdnGroup>>,
}

/// A CDN origin serving one or more encodings of a chapter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCdnGroup {
    #[serde(default, deserialize_with = "lenient")]
    pub cdn_domain: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_default: Option<Value>,
    #[serde(default, deserialize_with = "object_list")]
    pub video_path_list: Option<Vec<RawVariant>>,
}

/// A single encoding on a CDN
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    #[serde(default, deserialize_with = "lenient")]
    pub video_path: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub quality: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_default: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_vip_equity: Option<Value>,
}
