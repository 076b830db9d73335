//! Telegram Bot Front-end
//!
//! Chat interface over the same normalized data the HTTP API serves.
//!
//! # Commands
//!
//! ```text
//! /start                    usage
//! /latest                   newest dramas, one message per title
//! /search <title>           search suggestions
//! /detail <bookId> [index]  metadata, first episodes and play buttons
//! ```
//!
//! Updates arrive either through the webhook route (`POST /api/telegram`) or
//! through the optional long-polling task in [`poller`].

pub mod bot;
pub mod client;
pub mod format;
pub mod poller;
pub mod types;

pub use bot::TelegramBot;
pub use client::{TelegramClient, TelegramError};
pub use poller::start_polling_task;
pub use types::Update;
