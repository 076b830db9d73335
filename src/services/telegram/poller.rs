//! Long-polling loop for deployments without a public webhook URL
//!
//! Runs as a background task: fetches updates with `getUpdates` and feeds
//! them through the same handler as the webhook route.

use std::sync::Arc;
use std::time::Duration;
use tokio::time;

use super::bot::TelegramBot;
use super::types::Update;

/// Pause after a failed `getUpdates` call
const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Offset to request after a batch: one past the highest update id seen
pub fn next_offset(current: Option<i64>, updates: &[Update]) -> Option<i64> {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .max(current)
}

/// Start the background polling task
///
/// This should be spawned as a background task using `tokio::spawn`.
pub async fn start_polling_task(bot: Arc<TelegramBot>, timeout_secs: u64) {
    tracing::info!("Starting Telegram polling (timeout: {}s)", timeout_secs);

    if let Err(e) = bot.client().delete_webhook().await {
        tracing::warn!("Could not remove webhook before polling: {}", e);
    }

    let mut offset: Option<i64> = None;

    loop {
        let updates = match bot.client().get_updates(offset, timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::error!("Telegram polling failed: {}", e);
                time::sleep(ERROR_PAUSE).await;
                continue;
            }
        };

        offset = next_offset(offset, &updates);

        for update in &updates {
            if let Err(e) = bot.handle_update(update).await {
                tracing::error!("Failed to process Telegram update {}: {}", update.update_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(id: i64) -> Update {
        Update {
            update_id: id,
            message: None,
            callback_query: None,
        }
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset(None, &[]), None);
        assert_eq!(next_offset(Some(10), &[]), Some(10));
        assert_eq!(next_offset(None, &[update(5), update(7), update(6)]), Some(8));
        assert_eq!(next_offset(Some(20), &[update(5)]), Some(20));
    }
}
