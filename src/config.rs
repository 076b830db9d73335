use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,

    // Upstream scraping backend
    pub dramabox_api_url: String,
    pub dramabox_api_token: Option<String>,
    pub fetch_timeout_ms: u64,
    pub max_retries: u32,

    // Telegram
    pub telegram_bot_token: Option<String>,
    pub telegram_webhook_secret: Option<String>,
    pub telegram_api_url: String,
    pub telegram_polling: bool,
    pub telegram_poll_timeout_secs: u64,

    // Misc
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset, numeric values fall back to their
    /// defaults when they fail to parse.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            // Server
            port: get("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000),
            node_env: get("NODE_ENV").unwrap_or_else(|| "development".to_string()),

            // Upstream
            dramabox_api_url: get("DRAMABOX_API_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            dramabox_api_token: get("DRAMABOX_API_TOKEN"),
            fetch_timeout_ms: get("FETCH_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(15_000), // 15 seconds
            max_retries: get("MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),

            // Telegram
            telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
            telegram_webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| "https://api.telegram.org".to_string())
                .trim_end_matches('/')
                .to_string(),
            telegram_polling: get("TELEGRAM_POLLING")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            telegram_poll_timeout_secs: get("TELEGRAM_POLL_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),

            // Misc
            user_agent: get("USER_AGENT")
                .unwrap_or_else(|| format!("dramabox-server/{}", env!("CARGO_PKG_VERSION"))),
        }
    }

    /// Whether the Telegram front-end can talk to the Bot API at all
    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.node_env, "development");
        assert_eq!(config.dramabox_api_url, "http://localhost:8080");
        assert_eq!(config.fetch_timeout_ms, 15_000);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.telegram_api_url, "https://api.telegram.org");
        assert!(config.telegram_bot_token.is_none());
        assert!(!config.telegram_polling);
        assert!(!config.telegram_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8081"),
            ("DRAMABOX_API_URL", "https://scraper.example.com/api/"),
            ("DRAMABOX_API_TOKEN", "secret"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_POLLING", "yes"),
            ("MAX_RETRIES", "5"),
        ]);
        assert_eq!(config.port, 8081);
        assert_eq!(config.dramabox_api_url, "https://scraper.example.com/api");
        assert_eq!(config.dramabox_api_token.as_deref(), Some("secret"));
        assert!(config.telegram_enabled());
        assert!(config.telegram_polling);
        assert_eq!(config.max_retries, 5);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("FETCH_TIMEOUT_MS", "-1")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.fetch_timeout_ms, 15_000);
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "  "), ("TELEGRAM_WEBHOOK_SECRET", "")]);
        assert!(config.telegram_bot_token.is_none());
        assert!(config.telegram_webhook_secret.is_none());
    }
}
