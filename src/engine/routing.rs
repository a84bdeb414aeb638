//! Sender authorization, destination resolution, and the direct-send path.

use courier_core::config::RewriteConfig;
use courier_core::error::CourierError;
use courier_core::model::{Bot, Destination};
use courier_core::rewrite;
use courier_core::traits::Directory;
use courier_telegram::api::BotApi;
use tracing::info;

/// Outcome of authorizing a sender against a bot's allow-list.
///
/// Denial is a normal filtering result, not an error.
#[derive(Debug, Clone)]
pub enum AuthDecision {
    /// Forwarding is permitted; relay to this destination.
    Approved(Destination),
    /// No active allow-list entry for this (username, bot) pair.
    NotAuthorized,
    /// The sender is allowed, but the bot has no default destination.
    NoDestination,
}

/// Decide whether `username` may relay through `bot`, and where to.
///
/// Usernames match exactly: case-sensitive, no leading `@`.
pub async fn authorize(
    directory: &dyn Directory,
    bot: &Bot,
    username: &str,
) -> Result<AuthDecision, CourierError> {
    let user = directory.find_authorized_user(username, &bot.id).await?;
    if user.is_none() {
        return Ok(AuthDecision::NotAuthorized);
    }

    match directory.default_destination(&bot.id).await? {
        Some(destination) => Ok(AuthDecision::Approved(destination)),
        None => Ok(AuthDecision::NoDestination),
    }
}

/// Result of the synchronous direct-send path.
#[derive(Debug)]
pub enum DirectSendOutcome {
    Sent { destination: Destination },
    NoDefaultBot,
    NotAuthorized { username: String },
    NoDestination,
    DeliveryFailed(String),
}

impl DirectSendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    /// Human-readable reason for the administrative caller.
    pub fn describe(&self) -> String {
        match self {
            Self::Sent { destination } => {
                format!("message forwarded to {}", destination.group_label)
            }
            Self::NoDefaultBot => "default bot not found or inactive".to_string(),
            Self::NotAuthorized { username } => {
                format!("user @{username} is not authorized for this bot")
            }
            Self::NoDestination => {
                "no default destination configured for this bot".to_string()
            }
            Self::DeliveryFailed(reason) => format!("delivery failed: {reason}"),
        }
    }
}

/// Send `text` on behalf of `username` through the default bot.
///
/// The synchronous counterpart to the polling path: it reuses the same
/// authorization and link-rewrite logic. Store failures propagate; every
/// per-request condition comes back as a [`DirectSendOutcome`].
pub async fn send_direct(
    api: &dyn BotApi,
    directory: &dyn Directory,
    rewrite_cfg: &RewriteConfig,
    username: &str,
    text: &str,
) -> Result<DirectSendOutcome, CourierError> {
    let username = username.strip_prefix('@').unwrap_or(username);

    let Some(bot) = directory.default_bot().await? else {
        return Ok(DirectSendOutcome::NoDefaultBot);
    };
    if !bot.is_active {
        return Ok(DirectSendOutcome::NoDefaultBot);
    }

    let destination = match authorize(directory, &bot, username).await? {
        AuthDecision::Approved(destination) => destination,
        AuthDecision::NotAuthorized => {
            return Ok(DirectSendOutcome::NotAuthorized {
                username: username.to_string(),
            })
        }
        AuthDecision::NoDestination => return Ok(DirectSendOutcome::NoDestination),
    };

    let text = if rewrite_cfg.enabled {
        rewrite::rewrite_links(text, &rewrite_cfg.mirror_host)
    } else {
        text.to_string()
    };

    match api
        .send_text(&bot.token, &destination.chat_id, destination.topic_id, &text)
        .await
    {
        Ok(()) => {
            info!(
                "direct message from @{username} forwarded to {}",
                destination.group_label
            );
            Ok(DirectSendOutcome::Sent { destination })
        }
        Err(e) => Ok(DirectSendOutcome::DeliveryFailed(e.to_string())),
    }
}
