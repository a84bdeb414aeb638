//! Telegram Bot API deserialization types.

use courier_core::model::{MediaKind, MessagePayload};
use serde::Deserialize;

/// Standard Bot API response envelope.
#[derive(Debug, Deserialize)]
pub struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

/// One long-poll update.
#[derive(Debug, Deserialize)]
pub struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
    pub photo: Option<Vec<TgPhotoSize>>,
    pub video: Option<TgVideo>,
    pub animation: Option<TgAnimation>,
    pub document: Option<TgDocument>,
    pub caption: Option<String>,
}

impl TgMessage {
    /// Sender username, if the message carries one.
    pub fn sender_username(&self) -> Option<&str> {
        self.from.as_ref().and_then(|u| u.username.as_deref())
    }

    /// Classify the message into a relayable payload.
    ///
    /// Photos arrive in resolution order; the last entry is the largest.
    /// Animations also carry a `document` field, so they are classified
    /// before documents.
    pub fn payload(&self) -> Option<MessagePayload> {
        if let Some(ref text) = self.text {
            return Some(MessagePayload::Text(text.clone()));
        }

        let caption = self.caption.clone();

        if let Some(ref photos) = self.photo {
            let largest = photos.last()?;
            return Some(MessagePayload::Media {
                kind: MediaKind::Photo,
                file_id: largest.file_id.clone(),
                caption,
            });
        }
        if let Some(ref video) = self.video {
            return Some(MessagePayload::Media {
                kind: MediaKind::Video,
                file_id: video.file_id.clone(),
                caption,
            });
        }
        if let Some(ref animation) = self.animation {
            return Some(MessagePayload::Media {
                kind: MediaKind::Animation,
                file_id: animation.file_id.clone(),
                caption,
            });
        }
        if let Some(ref document) = self.document {
            return Some(MessagePayload::Media {
                kind: MediaKind::Document,
                file_id: document.file_id.clone(),
                caption,
            });
        }

        None
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
}

impl TgChat {
    pub fn is_private(&self) -> bool {
        self.chat_type == "private"
    }
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgPhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    pub file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgVideo {
    pub file_id: String,
    pub mime_type: Option<String>,
    pub file_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgAnimation {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct TgDocument {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TgFile {
    pub file_path: Option<String>,
}
