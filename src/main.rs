mod config;
mod models;
mod routes;
mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{
    dramabox::DramaboxClient,
    telegram::{start_polling_task, TelegramBot, TelegramClient},
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub dramabox: DramaboxClient,
    /// Present only when a bot token is configured
    pub telegram: Option<Arc<TelegramBot>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let dramabox = DramaboxClient::new(&config)?;

        let telegram = match config.telegram_bot_token.as_deref() {
            Some(token) => {
                let client = TelegramClient::new(&config, token)?;
                Some(Arc::new(TelegramBot::new(client, dramabox.clone())))
            }
            None => None,
        };

        Ok(Self {
            config,
            dramabox,
            telegram,
            start_time: Instant::now(),
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Dramabox endpoints
        .route(
            "/api/dramabox/chapters/:book_id",
            get(routes::dramabox::get_chapters),
        )
        .route("/api/dramabox/latest", get(routes::dramabox::get_latest))
        .route("/api/dramabox/search", post(routes::dramabox::search))
        // Telegram webhook
        .route("/api/telegram", post(routes::telegram::webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dramabox_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting Dramabox Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    let state = Arc::new(AppState::new(config)?);
    tracing::info!("Upstream API: {}", state.dramabox.base_url());

    match &state.telegram {
        Some(bot) if state.config.telegram_polling => {
            tokio::spawn(start_polling_task(
                bot.clone(),
                state.config.telegram_poll_timeout_secs,
            ));
            tracing::info!("Telegram bot enabled (long polling)");
        }
        Some(_) => tracing::info!("Telegram bot enabled (webhook at /api/telegram)"),
        None => tracing::warn!("TELEGRAM_BOT_TOKEN not set, Telegram bot disabled"),
    }

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
