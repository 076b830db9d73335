use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::services::telegram::Update;
use crate::AppState;

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// The secret header must match exactly when a secret is configured
fn secret_matches(expected: Option<&str>, headers: &HeaderMap) -> bool {
    match expected {
        None => true,
        Some(secret) => headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == secret),
    }
}

/// POST /api/telegram - Bot API webhook
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(bot) = state.telegram.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "TELEGRAM_BOT_TOKEN is missing" })),
        );
    };

    if !secret_matches(state.config.telegram_webhook_secret.as_deref(), &headers) {
        tracing::warn!("Rejected Telegram webhook call with invalid secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid secret" })),
        );
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::error!("Failed to parse Telegram update: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed" })),
            );
        }
    };

    match bot.handle_update(&update).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            tracing::error!("Failed to process Telegram update {}: {}", update.update_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "failed" })),
            )
        }
    }
}
