use thiserror::Error;

/// Top-level error type for Courier.
#[derive(Debug, Error)]
pub enum CourierError {
    /// The Telegram API returned a non-ok envelope.
    #[error("telegram API error: {0}")]
    Api(String),

    /// Another poller holds the getUpdates slot for this token (HTTP 409).
    /// Retryable; handled by conflict recovery, never fatal.
    #[error("getUpdates conflict: another poller is active for this token")]
    Conflict,

    /// A media download or re-upload failed mid-relay.
    #[error("transfer error: {0}")]
    Transfer(String),

    /// Transport-level failure talking to the Telegram API.
    #[error("http error: {0}")]
    Http(String),

    /// Record store error.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
