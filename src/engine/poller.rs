//! Per-bot poll cycle: fetch, advance, filter, authorize, forward.

use super::routing::{self, AuthDecision};
use super::{media, recovery, Engine};
use courier_core::error::CourierError;
use courier_core::model::{Bot, MessagePayload};
use courier_core::rewrite;
use tracing::{debug, info, warn};

impl Engine {
    /// Drive one polling cycle for `bot`.
    ///
    /// Per-update failures are logged and skipped; one update never aborts
    /// the rest of the batch.
    pub(crate) async fn poll_bot(&self, bot: &Bot) -> Result<(), CourierError> {
        // A stale webhook blocks getUpdates; clearing it is best-effort.
        if let Err(e) = self.api.delete_webhook(&bot.token).await {
            warn!("failed to clear webhook for bot {}: {e}", bot.name);
        }

        let last_seen = self.cursors.offset(&bot.id).await;
        let offset = if last_seen == 0 { 0 } else { last_seen + 1 };

        let batch = match self
            .api
            .get_updates(&bot.token, offset, self.poll.limit, self.poll.timeout_secs)
            .await
        {
            Ok(updates) => recovery::Batch::fresh(updates),
            Err(CourierError::Conflict) => {
                info!("conflict detected for bot {}, attempting recovery", bot.name);
                recovery::recover(self.api.as_ref(), self.cursors.as_ref(), bot).await
            }
            Err(e) => return Err(e),
        };

        if batch.updates.is_empty() {
            return Ok(());
        }
        debug!("received {} updates for bot {}", batch.updates.len(), bot.name);

        // The cursor reflects "seen", not "forwarded": a rejected update
        // would only be rejected again on refetch.
        if !batch.cursor_advanced {
            if let Some(last) = batch.updates.last() {
                self.cursors.advance(&bot.id, last.update_id).await;
            }
        }

        for update in &batch.updates {
            let Some(msg) = update.message.as_ref() else {
                debug!("update {} carries no message, ignoring", update.update_id);
                continue;
            };

            let Some(username) = msg.sender_username() else {
                debug!("update {} has no sender username, ignoring", update.update_id);
                continue;
            };

            if self.poll.private_only && !msg.chat.is_private() {
                debug!(
                    "skipping message from @{username}: chat type '{}' is not private",
                    msg.chat.chat_type
                );
                continue;
            }

            let destination =
                match routing::authorize(self.directory.as_ref(), bot, username).await {
                    Ok(AuthDecision::Approved(destination)) => destination,
                    Ok(AuthDecision::NotAuthorized) => {
                        info!(
                            "unauthorized message from @{username} for bot {}, ignoring",
                            bot.name
                        );
                        continue;
                    }
                    Ok(AuthDecision::NoDestination) => {
                        warn!(
                            "no default destination for bot {}, ignoring message from @{username}",
                            bot.name
                        );
                        continue;
                    }
                    Err(e) => {
                        warn!("authorization lookup failed for @{username}: {e}");
                        continue;
                    }
                };

            let Some(payload) = msg.payload() else {
                debug!("message from @{username} has no relayable payload, ignoring");
                continue;
            };

            let outcome = match payload {
                MessagePayload::Text(text) => {
                    let text = if self.rewrite.enabled {
                        rewrite::rewrite_links(&text, &self.rewrite.mirror_host)
                    } else {
                        text
                    };
                    self.api
                        .send_text(&bot.token, &destination.chat_id, destination.topic_id, &text)
                        .await
                }
                MessagePayload::Media {
                    kind,
                    file_id,
                    caption,
                } => {
                    media::relay(
                        self.api.as_ref(),
                        &bot.token,
                        &destination,
                        kind,
                        &file_id,
                        caption.as_deref(),
                    )
                    .await
                }
            };

            match outcome {
                Ok(()) => info!(
                    "forwarded message from @{username} to {}",
                    destination.group_label
                ),
                Err(e) => warn!(
                    "failed to forward update {} from @{username}: {e}",
                    update.update_id
                ),
            }
        }

        Ok(())
    }
}
