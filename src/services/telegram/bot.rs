//! Command dispatch for the Telegram front-end

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, warn};

use super::client::{TelegramClient, TelegramError};
use super::format::{build_detail_keyboard, build_episode_buttons, format_detail, format_item};
use super::types::{CallbackQuery, Message, Update};
use crate::services::dramabox::{latest_records, suggest_records, BookItem, DramaboxClient};
use crate::services::metrics;
use crate::services::normalizer::normalize_stream_response;

const LATEST_LIMIT: usize = 5;
const SEARCH_LIMIT: usize = 8;
const DEFAULT_INDEX: i64 = 1;

const START_TEXT: &str = "Halo! Kirim /latest untuk daftar drama terbaru,\n\
atau gunakan /search <judul> untuk mencari.\n\
Gunakan tombol \"Lihat episode\" untuk mendapatkan link streaming cepat.";
const SEARCH_USAGE: &str = "Masukkan judul setelah perintah /search.";
const DETAIL_USAGE: &str = "Masukkan bookId setelah /detail.";
const UNKNOWN_COMMAND: &str = "Perintah tidak dikenal. Gunakan /latest atau /search <judul>.";
const NO_LATEST: &str = "Tidak ada drama terbaru saat ini.";
const LOADING_DETAIL: &str = "Memuat detail...";
const UNRECOGNIZED_CALLBACK: &str = "Tidak dikenali";

lazy_static! {
    /// `/command`, optional `@botname`, then free-form arguments
    static ref COMMAND_REGEX: Regex = Regex::new(r"(?s)^/([A-Za-z_]+)(?:@\w+)?(?:\s+(.*))?$").unwrap();
}

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Latest,
    /// Keyword may be empty; the handler asks for one
    Search(String),
    /// Book id may be empty; the handler asks for one
    Detail { book_id: String, index: i64 },
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let Some(caps) = COMMAND_REGEX.captures(text.trim()) else {
            return Command::Unknown;
        };
        let name = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();
        let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

        match name.as_str() {
            "start" => Command::Start,
            "latest" => Command::Latest,
            "search" => Command::Search(args.to_string()),
            "detail" => {
                let mut parts = args.split_whitespace();
                let book_id = parts.next().unwrap_or_default().to_string();
                let index = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_INDEX);
                Command::Detail { book_id, index }
            }
            _ => Command::Unknown,
        }
    }
}

/// Action requested by an inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Detail(String),
    Unknown,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Self {
        match data.strip_prefix("detail:") {
            Some(book_id) if !book_id.is_empty() => CallbackAction::Detail(book_id.to_string()),
            _ => CallbackAction::Unknown,
        }
    }
}

/// Telegram bot: routes updates to the upstream client and renders replies
pub struct TelegramBot {
    client: TelegramClient,
    dramabox: DramaboxClient,
}

impl TelegramBot {
    pub fn new(client: TelegramClient, dramabox: DramaboxClient) -> Self {
        Self { client, dramabox }
    }

    pub fn client(&self) -> &TelegramClient {
        &self.client
    }

    pub async fn handle_update(&self, update: &Update) -> Result<(), TelegramError> {
        metrics::record_telegram_update(update.kind());

        if let Some(message) = &update.message {
            self.handle_message(message).await?;
        }
        if let Some(callback) = &update.callback_query {
            self.handle_callback(callback).await?;
        }
        Ok(())
    }

    async fn handle_message(&self, message: &Message) -> Result<(), TelegramError> {
        let chat_id = message.chat.id;
        let text = message.text.as_deref().unwrap_or_default();
        debug!(
            "Message {} in chat {} from {}",
            message.message_id,
            chat_id,
            message
                .from
                .as_ref()
                .and_then(|user| user.username.as_deref().or(user.first_name.as_deref()))
                .unwrap_or("unknown")
        );

        match Command::parse(text) {
            Command::Start => self.client.send_message(chat_id, START_TEXT, None).await,
            Command::Latest => self.send_latest(chat_id).await,
            Command::Search(keyword) if keyword.is_empty() => {
                self.client.send_message(chat_id, SEARCH_USAGE, None).await
            }
            Command::Search(keyword) => self.send_search(chat_id, &keyword).await,
            Command::Detail { book_id, .. } if book_id.is_empty() => {
                self.client.send_message(chat_id, DETAIL_USAGE, None).await
            }
            Command::Detail { book_id, index } => self.send_detail(chat_id, &book_id, index).await,
            Command::Unknown => self.client.send_message(chat_id, UNKNOWN_COMMAND, None).await,
        }
    }

    async fn handle_callback(&self, callback: &CallbackQuery) -> Result<(), TelegramError> {
        let (Some(message), Some(data)) = (&callback.message, &callback.data) else {
            return Ok(());
        };
        let chat_id = message.chat.id;

        match CallbackAction::parse(data) {
            CallbackAction::Detail(book_id) => {
                self.send_detail(chat_id, &book_id, DEFAULT_INDEX).await?;
                self.client
                    .answer_callback_query(&callback.id, Some(LOADING_DETAIL))
                    .await
            }
            CallbackAction::Unknown => {
                self.client
                    .answer_callback_query(&callback.id, Some(UNRECOGNIZED_CALLBACK))
                    .await
            }
        }
    }

    async fn send_items(&self, chat_id: i64, items: &[BookItem]) -> Result<(), TelegramError> {
        for item in items {
            let keyboard = build_detail_keyboard(&item.book_id);
            self.client
                .send_message(chat_id, &format_item(item), Some(&keyboard))
                .await?;
        }
        Ok(())
    }

    async fn send_latest(&self, chat_id: i64) -> Result<(), TelegramError> {
        let response = self.dramabox.fetch_latest(1).await;
        let items: Vec<BookItem> = latest_records(&response.data)
            .into_iter()
            .take(LATEST_LIMIT)
            .collect();

        if items.is_empty() {
            return self.client.send_message(chat_id, NO_LATEST, None).await;
        }
        self.send_items(chat_id, &items).await
    }

    async fn send_search(&self, chat_id: i64, keyword: &str) -> Result<(), TelegramError> {
        let response = self.dramabox.fetch_suggest(keyword).await;
        let items: Vec<BookItem> = suggest_records(&response.data)
            .into_iter()
            .take(SEARCH_LIMIT)
            .collect();

        if items.is_empty() {
            let text = format!("Tidak ada hasil untuk \"{}\".", keyword);
            return self.client.send_message(chat_id, &text, None).await;
        }
        self.send_items(chat_id, &items).await
    }

    async fn send_detail(&self, chat_id: i64, book_id: &str, index: i64) -> Result<(), TelegramError> {
        let response = self.dramabox.fetch_stream(book_id, index).await;
        if response.is_error() {
            warn!("Detail for {} failed with status {}", book_id, response.status);
            let text = format!("Gagal memuat drama {} (status {}).", book_id, response.status);
            return self.client.send_message(chat_id, &text, None).await;
        }

        let stream = normalize_stream_response(Some(&response.data));
        metrics::record_episodes(stream.episodes.len());
        info!("Sending detail for {} ({} episodes)", book_id, stream.episodes.len());

        let keyboard = build_episode_buttons(&stream.episodes);
        self.client
            .send_message(chat_id, &format_detail(&stream), keyboard.as_ref())
            .await
    }
}
