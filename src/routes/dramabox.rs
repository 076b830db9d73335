//! Dramabox API Routes
//!
//! Fetch from the scraping backend, normalize, and pass the upstream status
//! code through to the caller.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::StreamData;
use crate::services::dramabox::{latest_records, suggest_records, BookItem};
use crate::services::metrics;
use crate::services::normalizer::normalize_stream_response;
use crate::AppState;

const DEFAULT_INDEX: i64 = 1;
const DEFAULT_PAGE: i64 = 1;

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize, Default)]
pub struct ChaptersQuery {
    pub index: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LatestQuery {
    #[serde(rename = "pageNo")]
    pub page_no: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: Option<String>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<BookItem>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Numeric query parameter, `default` when absent or not a number
fn parse_number(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Map the upstream status onto our response; unusable codes become 502
fn upstream_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /api/dramabox/chapters/:book_id?index=N
pub async fn get_chapters(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<String>,
    Query(query): Query<ChaptersQuery>,
) -> (StatusCode, Json<StreamData>) {
    let index = parse_number(query.index.as_deref(), DEFAULT_INDEX);

    let upstream = state.dramabox.fetch_stream(&book_id, index).await;
    let stream = normalize_stream_response(Some(&upstream.data));

    metrics::record_episodes(stream.episodes.len());
    tracing::info!(
        "Chapters for {} (index {}): status {}, {} episodes",
        book_id,
        index,
        upstream.status,
        stream.episodes.len()
    );

    (upstream_status(upstream.status), Json(stream))
}

/// GET /api/dramabox/latest?pageNo=N
pub async fn get_latest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LatestQuery>,
) -> (StatusCode, Json<RecordsResponse>) {
    let page_no = parse_number(query.page_no.as_deref(), DEFAULT_PAGE);

    let upstream = state.dramabox.fetch_latest(page_no).await;
    let records = latest_records(&upstream.data);

    (upstream_status(upstream.status), Json(RecordsResponse { records }))
}

/// POST /api/dramabox/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let keyword = payload.keyword.as_deref().map(str::trim).unwrap_or_default();
    if keyword.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "keyword is required" })),
        ));
    }

    let upstream = state.dramabox.fetch_suggest(keyword).await;
    let records = suggest_records(&upstream.data);

    Ok((upstream_status(upstream.status), Json(RecordsResponse { records })))
}
