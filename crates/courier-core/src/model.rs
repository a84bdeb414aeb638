use serde::{Deserialize, Serialize};

/// A configured Telegram bot whose private messages are relayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub name: String,
    /// Bot API token. Secret; never logged.
    pub token: String,
    pub is_active: bool,
    /// At most one bot holds this flag; the direct-send path uses it.
    pub is_default: bool,
}

/// Where an authorized sender's messages are forwarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    /// Owning bot. A destination belongs to exactly one bot.
    pub bot_id: String,
    /// Target chat (group/supergroup) identifier.
    pub chat_id: String,
    /// Optional forum topic within the target chat.
    pub topic_id: Option<i64>,
    pub group_label: String,
    pub topic_label: String,
    /// At most one default destination per bot.
    pub is_default: bool,
}

/// A sender allowed to relay through a bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    pub id: String,
    pub bot_id: String,
    /// Telegram username, case-sensitive, without the leading `@`.
    pub username: String,
    pub label: String,
    pub is_active: bool,
}

/// What a relayable message carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text(String),
    Media {
        kind: MediaKind,
        file_id: String,
        caption: Option<String>,
    },
}

/// Media kinds the relay can download and re-upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Animation,
}

impl MediaKind {
    /// Multipart field name the Bot API expects for this kind.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Animation => "animation",
        }
    }

    /// The matching send endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Photo => "sendPhoto",
            Self::Video => "sendVideo",
            Self::Document => "sendDocument",
            Self::Animation => "sendAnimation",
        }
    }
}
