//! Dramabox API Client
//!
//! HTTP client for the scraping backend that fronts the drama provider.

use reqwest::{header, Client, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};
use url::Url;

use super::types::UpstreamResponse;
use crate::config::Config;
use crate::services::metrics;

/// Upper bound for a single retry pause
const MAX_BACKOFF_MS: u64 = 10_000;

/// Dramabox API Client
///
/// Every public fetch resolves to an [`UpstreamResponse`]; transport failures
/// are reported through its status code instead of an error.
#[derive(Clone)]
pub struct DramaboxClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
    max_retries: u32,
}

impl DramaboxClient {
    /// Create a client from the application config
    pub fn new(config: &Config) -> Result<Self, DramaboxError> {
        let base_url = Url::parse(&format!("{}/", config.dramabox_api_url.trim_end_matches('/')))?;

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .gzip(true)
            .build()
            .map_err(DramaboxError::Client)?;

        Ok(Self {
            http,
            base_url,
            token: config.dramabox_api_token.clone(),
            max_retries: config.max_retries,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build `{base}/{path}?k=v...` with properly encoded query pairs
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, DramaboxError> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Chapters and stream sources of a book, starting at `index`
    pub async fn fetch_stream(&self, book_id: &str, index: i64) -> UpstreamResponse {
        let index = index.to_string();
        self.get("stream", &[("bookId", book_id), ("index", index.as_str())])
            .await
    }

    /// Latest releases listing
    pub async fn fetch_latest(&self, page_no: i64) -> UpstreamResponse {
        let page_no = page_no.to_string();
        self.get("latest", &[("pageNo", page_no.as_str())]).await
    }

    /// Search suggestions for a keyword
    pub async fn fetch_suggest(&self, keyword: &str) -> UpstreamResponse {
        self.get("suggest", &[("keyword", keyword)]).await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn get(&self, endpoint: &'static str, params: &[(&str, &str)]) -> UpstreamResponse {
        let result = match self.endpoint(endpoint, params) {
            Ok(url) => self.fetch_json(&url).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(response) => {
                let outcome = if response.is_success() { "ok" } else { "http_error" };
                metrics::record_upstream(endpoint, outcome);
                if !response.is_success() {
                    warn!("Upstream {} returned HTTP {}", endpoint, response.status);
                }
                response
            }
            Err(e) => {
                metrics::record_upstream(endpoint, e.kind());
                warn!("Upstream {} failed: {}", endpoint, e);
                UpstreamResponse {
                    status: e.status(),
                    data: serde_json::json!({ "error": e.to_string() }),
                }
            }
        }
    }

    async fn fetch_json(&self, url: &Url) -> Result<UpstreamResponse, DramaboxError> {
        let response = self.send_with_retry(url).await?;
        let status = response.status().as_u16();

        let text = response.text().await.map_err(DramaboxError::from_reqwest)?;

        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or_else(|e| {
                let preview: String = text.chars().take(200).collect();
                debug!("Upstream body is not JSON ({}): {}", e, preview);
                Value::Null
            })
        };

        Ok(UpstreamResponse { status, data })
    }

    async fn send_with_retry(&self, url: &Url) -> Result<Response, DramaboxError> {
        let mut attempt = 0;

        loop {
            let mut request = self
                .http
                .get(url.clone())
                .header(header::ACCEPT, "application/json");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            match request.send().await {
                Ok(resp) => {
                    if resp.status() == StatusCode::TOO_MANY_REQUESTS && attempt < self.max_retries {
                        let backoff_ms = backoff_ms(attempt);
                        warn!("fetch_retry" = attempt + 1, "reason" = "429", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < self.max_retries {
                        let backoff_ms = backoff_ms(attempt);
                        warn!("fetch_retry" = attempt + 1, "reason" = "network", "backoff_ms" = backoff_ms);
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(DramaboxError::from_reqwest(err));
                }
            }
        }
    }
}

/// Exponential backoff: 500ms, 1s, 2s, ... capped at 10s
fn backoff_ms(attempt: u32) -> u64 {
    1u64.checked_shl(attempt)
        .unwrap_or(u64::MAX)
        .saturating_mul(500)
        .min(MAX_BACKOFF_MS)
}

/// Dramabox client error types
#[derive(Debug, Error)]
pub enum DramaboxError {
    /// Base URL or endpoint could not be built
    #[error("Invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// Request did not complete in time
    #[error("Upstream timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl DramaboxError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DramaboxError::Timeout(err)
        } else {
            DramaboxError::Network(err)
        }
    }

    /// HTTP status reported to callers for this failure
    pub fn status(&self) -> u16 {
        match self {
            DramaboxError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT.as_u16(),
            _ => StatusCode::BAD_GATEWAY.as_u16(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            DramaboxError::InvalidUrl(_) | DramaboxError::Client(_) => "invalid_request",
            DramaboxError::Timeout(_) => "timeout",
            DramaboxError::Network(_) => "network",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> DramaboxClient {
        let base = base.to_string();
        let config = Config::from_lookup(|key| match key {
            "DRAMABOX_API_URL" => Some(base.clone()),
            _ => None,
        });
        DramaboxClient::new(&config).expect("client should build")
    }

    #[test]
    fn test_endpoint_construction() {
        let client = client_for("https://scraper.example.com/api");
        let url = client
            .endpoint("stream", &[("bookId", "41000102558"), ("index", "3")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://scraper.example.com/api/stream?bookId=41000102558&index=3"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let client = client_for("https://scraper.example.com/api/");
        let url = client.endpoint("latest", &[("pageNo", "1")]).unwrap();
        assert_eq!(url.as_str(), "https://scraper.example.com/api/latest?pageNo=1");
    }

    #[test]
    fn test_endpoint_encodes_keyword() {
        let client = client_for("http://localhost:8080");
        let url = client
            .endpoint("suggest", &[("keyword", "ceo & bride")])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/suggest?keyword=ceo+%26+bride");
    }

    #[test]
    fn test_invalid_base_url() {
        let config = Config::from_lookup(|key| match key {
            "DRAMABOX_API_URL" => Some("not a url".to_string()),
            _ => None,
        });
        assert!(matches!(
            DramaboxClient::new(&config),
            Err(DramaboxError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_backoff() {
        assert_eq!(backoff_ms(0), 500);
        assert_eq!(backoff_ms(1), 1000);
        assert_eq!(backoff_ms(3), 4000);
        assert_eq!(backoff_ms(5), MAX_BACKOFF_MS);
        assert_eq!(backoff_ms(80), MAX_BACKOFF_MS);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_folds_into_bad_gateway() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let config = Config::from_lookup(|key| match key {
            "DRAMABOX_API_URL" => Some("http://127.0.0.1:9".to_string()),
            "MAX_RETRIES" => Some("0".to_string()),
            "FETCH_TIMEOUT_MS" => Some("2000".to_string()),
            _ => None,
        });
        let client = DramaboxClient::new(&config).unwrap();

        let response = client.fetch_stream("1", 1).await;
        assert!(response.status == 502 || response.status == 504);
        assert!(response.data.get("error").is_some());
    }
}
