use crate::error::CourierError;
use crate::model::{AuthorizedUser, Bot, Destination};
use async_trait::async_trait;

/// Read-only view of the administrative records the relay engine consumes.
///
/// Bots, destinations, and authorized users are created and edited by an
/// administrative collaborator; the engine only reads them to make routing
/// and authorization decisions.
#[async_trait]
pub trait Directory: Send + Sync {
    /// All bots with the active flag set.
    async fn list_active_bots(&self) -> Result<Vec<Bot>, CourierError>;

    /// The bot holding the default flag, if any. Used by the direct-send
    /// path; callers still check the active flag.
    async fn default_bot(&self) -> Result<Option<Bot>, CourierError>;

    /// The bot's default destination, if one is configured.
    async fn default_destination(&self, bot_id: &str)
        -> Result<Option<Destination>, CourierError>;

    /// Exact (username, bot) allow-list lookup. Returns only active entries;
    /// usernames are case-sensitive and carry no leading `@`.
    async fn find_authorized_user(
        &self,
        username: &str,
        bot_id: &str,
    ) -> Result<Option<AuthorizedUser>, CourierError>;
}

/// Per-bot last-seen update id.
///
/// `advance` is best-effort: implementations log persistence failures rather
/// than propagate them, so a failed write never aborts a poll cycle.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Last update id seen for `bot_id`, or 0 if the bot has never polled.
    async fn offset(&self, bot_id: &str) -> i64;

    /// Record `update_id` as the last-seen update for `bot_id`.
    /// Unconditional; last write wins.
    async fn advance(&self, bot_id: &str, update_id: i64);
}
