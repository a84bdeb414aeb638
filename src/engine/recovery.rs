//! Conflict recovery: webhook toggle plus a single most-recent-update fetch.

use courier_core::model::Bot;
use courier_core::traits::CursorStore;
use courier_telegram::api::BotApi;
use courier_telegram::types::TgUpdate;
use tracing::{info, warn};

/// A URL the API can never deliver to. Setting it forces the server to drop
/// whichever poller currently holds the getUpdates slot for the token.
const SENTINEL_WEBHOOK_URL: &str = "https://example.com/non-existent-webhook";

/// One poll cycle's worth of updates.
pub(crate) struct Batch {
    pub updates: Vec<TgUpdate>,
    /// Set when recovery already advanced the cursor for these updates, so
    /// the poller does not advance it again.
    pub cursor_advanced: bool,
}

impl Batch {
    pub fn fresh(updates: Vec<TgUpdate>) -> Self {
        Self {
            updates,
            cursor_advanced: false,
        }
    }

    fn empty() -> Self {
        Self::fresh(Vec::new())
    }
}

/// Recover from a getUpdates conflict.
///
/// Best-effort throughout: each sub-step failure falls through, and the
/// worst outcome is an empty batch for this cycle. A conflict is retryable,
/// never fatal.
pub(crate) async fn recover(
    api: &dyn BotApi,
    cursors: &dyn CursorStore,
    bot: &Bot,
) -> Batch {
    // Force the API server to release the long-poll slot, then restore
    // polling mode.
    if let Err(e) = api.set_webhook(&bot.token, SENTINEL_WEBHOOK_URL).await {
        warn!("recovery: failed to set sentinel webhook for bot {}: {e}", bot.name);
    }
    if let Err(e) = api.delete_webhook(&bot.token).await {
        warn!("recovery: failed to clear webhook for bot {}: {e}", bot.name);
    }

    // Fetch only the single most recent update.
    match api.get_updates(&bot.token, -1, 1, 0).await {
        Ok(updates) => {
            let last_id = updates.last().map(|u| u.update_id);
            match last_id {
                Some(update_id) => {
                    cursors.advance(&bot.id, update_id).await;
                    info!(
                        "recovery succeeded for bot {}, resuming at update {update_id}",
                        bot.name
                    );
                    Batch {
                        updates,
                        cursor_advanced: true,
                    }
                }
                None => Batch::empty(),
            }
        }
        Err(e) => {
            info!("recovery retry failed for bot {}, skipping this cycle: {e}", bot.name);
            Batch::empty()
        }
    }
}
