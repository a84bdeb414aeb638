//! Typed access to the Bot API, abstracted behind a trait.

use async_trait::async_trait;
use courier_core::error::CourierError;
use courier_core::model::MediaKind;

use crate::types::TgUpdate;

/// Thin typed surface over the Telegram Bot API.
///
/// [`crate::client::TelegramClient`] is the production implementation; tests
/// substitute their own to drive the relay engine without network access.
/// Tokens are passed per call so one client serves every configured bot.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Long-poll for updates.
    ///
    /// Fails with [`CourierError::Conflict`] when the transport reports
    /// HTTP 409 (another poller holds the getUpdates slot for this token)
    /// and with [`CourierError::Api`] on a non-ok envelope.
    async fn get_updates(
        &self,
        token: &str,
        offset: i64,
        limit: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TgUpdate>, CourierError>;

    /// Point the bot at a webhook URL. Only conflict recovery uses this.
    async fn set_webhook(&self, token: &str, url: &str) -> Result<(), CourierError>;

    /// Remove any webhook so long polling works.
    async fn delete_webhook(&self, token: &str) -> Result<(), CourierError>;

    /// Resolve a file id to a server-side file path.
    async fn get_file(&self, token: &str, file_id: &str) -> Result<String, CourierError>;

    /// Download file bytes by server-side path.
    async fn download_file(&self, token: &str, file_path: &str)
        -> Result<Vec<u8>, CourierError>;

    /// Send a text message, optionally into a forum topic.
    async fn send_text(
        &self,
        token: &str,
        chat_id: &str,
        topic_id: Option<i64>,
        text: &str,
    ) -> Result<(), CourierError>;

    /// Upload media bytes to the endpoint matching `kind`.
    #[allow(clippy::too_many_arguments)]
    async fn send_media(
        &self,
        token: &str,
        chat_id: &str,
        topic_id: Option<i64>,
        kind: MediaKind,
        data: Vec<u8>,
        filename: &str,
        caption: Option<&str>,
    ) -> Result<(), CourierError>;
}
