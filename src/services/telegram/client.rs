//! Telegram Bot API Client

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::types::{ApiResponse, InlineKeyboardMarkup, Update};
use crate::config::Config;

/// Extra time granted on top of the long-poll timeout before the request is
/// abandoned
const POLL_GRACE_SECS: u64 = 10;

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    bot_url: String,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: &Config, token: &str) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(TelegramError::Network)?;

        Ok(Self {
            http,
            bot_url: format!("{}/bot{}", config.telegram_api_url.trim_end_matches('/'), token),
            request_timeout: Duration::from_millis(config.fetch_timeout_ms),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    async fn call<P, T>(
        &self,
        method: &str,
        payload: &P,
        timeout: Duration,
    ) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Telegram API request: {}", method);

        let response = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TelegramError::Api {
                method: method.to_string(),
                status: status.as_u16(),
                detail: body,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;
        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method: method.to_string(),
                status: status.as_u16(),
                detail: description.unwrap_or(body),
            }),
        }
    }

    /// Send a plain-text message; link previews are always disabled
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<(), TelegramError> {
        let payload = send_message_payload(chat_id, text, reply_markup);
        self.call::<_, Value>("sendMessage", &payload, self.request_timeout)
            .await?;
        Ok(())
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), TelegramError> {
        let mut payload = json!({ "callback_query_id": callback_query_id });
        if let Some(text) = text {
            payload["text"] = json!(text);
        }
        self.call::<_, Value>("answerCallbackQuery", &payload, self.request_timeout)
            .await?;
        Ok(())
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }
        let timeout = Duration::from_secs(timeout_secs + POLL_GRACE_SECS);
        self.call("getUpdates", &payload, timeout).await
    }

    /// Polling and webhooks are mutually exclusive on the Bot API side
    pub async fn delete_webhook(&self) -> Result<(), TelegramError> {
        self.call::<_, Value>("deleteWebhook", &json!({}), self.request_timeout)
            .await?;
        Ok(())
    }
}

fn send_message_payload(
    chat_id: i64,
    text: &str,
    reply_markup: Option<&InlineKeyboardMarkup>,
) -> Value {
    let mut payload = json!({
        "chat_id": chat_id,
        "text": text,
        "disable_web_page_preview": true,
    });
    if let Some(markup) = reply_markup {
        payload["reply_markup"] = json!(markup);
    }
    payload
}

/// Telegram client error types
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Bot API answered with a non-2xx status or `ok: false`
    #[error("Telegram API {method} failed: {status} {detail}")]
    Api {
        method: String,
        status: u16,
        detail: String,
    },
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::telegram::types::InlineKeyboardButton;

    fn client() -> TelegramClient {
        let config = Config::from_lookup(|key| match key {
            "TELEGRAM_API_URL" => Some("https://api.telegram.org/".to_string()),
            _ => None,
        });
        TelegramClient::new(&config, "123:abc").unwrap()
    }

    #[test]
    fn test_method_url() {
        assert_eq!(
            client().method_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_send_message_payload() {
        let payload = send_message_payload(42, "halo", None);
        assert_eq!(
            payload,
            json!({"chat_id": 42, "text": "halo", "disable_web_page_preview": true})
        );

        let markup = InlineKeyboardMarkup {
            inline_keyboard: vec![vec![InlineKeyboardButton::callback("Lihat episode", "detail:9")]],
        };
        let payload = send_message_payload(42, "halo", Some(&markup));
        assert_eq!(
            payload["reply_markup"]["inline_keyboard"][0][0]["callback_data"],
            "detail:9"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = TelegramError::Api {
            method: "sendMessage".to_string(),
            status: 400,
            detail: "Bad Request: chat not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Telegram API sendMessage failed: 400 Bad Request: chat not found"
        );
    }
}
