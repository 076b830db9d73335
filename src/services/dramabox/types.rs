//! Dramabox API Types
//!
//! Response wrapper and list-record mapping for the scraping backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::normalizer::coerce;

/// Outcome of an upstream call: the HTTP status and whatever JSON came back.
///
/// Transport failures are folded into this shape too (502/504 with an
/// `{"error": ...}` body), so callers only ever deal with one type.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub data: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Summary of a drama as shown in the latest/search lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookItem {
    pub book_id: String,
    pub book_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_count: Option<Value>,
    #[serde(default)]
    pub chapter_count: i64,
}

impl BookItem {
    /// Map a raw list record. Records without a usable book id are dropped.
    pub fn from_record(record: &Value) -> Option<Self> {
        let field = |names: &[&str]| names.iter().find_map(|name| record.get(*name));

        let book_id = coerce::to_id(field(&["bookId", "book_id", "id"]))?;
        if book_id.is_empty() {
            return None;
        }

        let tags = field(&["tags", "tagNames"])
            .and_then(Value::as_array)
            .map(|list| coerce::to_str_list(Some(list.as_slice())))
            .unwrap_or_default();

        Some(Self {
            book_id,
            book_name: coerce::to_str(field(&["bookName", "name"])).unwrap_or_default(),
            cover: coerce::to_str(field(&["coverWap", "cover", "bookCover"])),
            introduction: coerce::to_str(field(&["introduction"])).unwrap_or_default(),
            tags,
            play_count: record.get("playCount").cloned(),
            chapter_count: coerce::to_int(field(&["chapterCount"])).unwrap_or(0),
        })
    }
}

fn records_at(payload: &Value, pointer: &str) -> Vec<BookItem> {
    payload
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|records| records.iter().filter_map(BookItem::from_record).collect())
        .unwrap_or_default()
}

/// Records of the latest-releases listing (`data.newTheaterList.records`)
pub fn latest_records(payload: &Value) -> Vec<BookItem> {
    records_at(payload, "/data/newTheaterList/records")
}

/// Records of the search suggestion listing (`data.suggestList`)
pub fn suggest_records(payload: &Value) -> Vec<BookItem> {
    records_at(payload, "/data/suggestList")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record() {
        let record = json!({
            "bookId": "41000102558",
            "bookName": "Hidden Heir",
            "coverWap": "https://img/1.jpg",
            "introduction": "He was never just a driver.",
            "tags": ["Revenge", "Hidden Identity"],
            "playCount": "3.1M",
            "chapterCount": 80
        });

        let item = BookItem::from_record(&record).unwrap();
        assert_eq!(item.book_id, "41000102558");
        assert_eq!(item.book_name, "Hidden Heir");
        assert_eq!(item.cover.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(item.tags, vec!["Revenge", "Hidden Identity"]);
        assert_eq!(item.play_count, Some(json!("3.1M")));
        assert_eq!(item.chapter_count, 80);
    }

    #[test]
    fn test_from_record_fallback_fields() {
        let record = json!({"id": 42, "name": "Alt Name", "tagNames": ["Drama"], "chapterCount": "12"});
        let item = BookItem::from_record(&record).unwrap();
        assert_eq!(item.book_id, "42");
        assert_eq!(item.book_name, "Alt Name");
        assert_eq!(item.tags, vec!["Drama"]);
        assert_eq!(item.chapter_count, 12);
        assert!(item.cover.is_none());
    }

    #[test]
    fn test_from_record_without_id() {
        assert!(BookItem::from_record(&json!({"bookName": "No id"})).is_none());
        assert!(BookItem::from_record(&json!({"bookId": ""})).is_none());
        assert!(BookItem::from_record(&json!("not an object")).is_none());
    }

    #[test]
    fn test_record_lists() {
        let latest = json!({"data": {"newTheaterList": {"records": [
            {"bookId": "1", "bookName": "A"},
            {"bookName": "missing id"},
            {"bookId": "2", "bookName": "B"}
        ]}}});
        let ids: Vec<String> = latest_records(&latest).into_iter().map(|i| i.book_id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        let suggest = json!({"data": {"suggestList": [{"bookId": "9", "bookName": "Z"}]}});
        assert_eq!(suggest_records(&suggest).len(), 1);

        assert!(latest_records(&json!(null)).is_empty());
        assert!(suggest_records(&json!({"data": {"suggestList": "nope"}})).is_empty());
    }

    #[test]
    fn test_response_status_helpers() {
        let ok = UpstreamResponse { status: 200, data: Value::Null };
        assert!(ok.is_success());
        assert!(!ok.is_error());

        let missing = UpstreamResponse { status: 404, data: Value::Null };
        assert!(!missing.is_success());
        assert!(missing.is_error());
    }
}
