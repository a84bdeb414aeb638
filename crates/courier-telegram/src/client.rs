//! reqwest-backed implementation of [`BotApi`].

use async_trait::async_trait;
use courier_core::error::CourierError;
use courier_core::model::MediaKind;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::api::BotApi;
use crate::types::{TgFile, TgResponse, TgUpdate};

const API_BASE: &str = "https://api.telegram.org";

/// How much longer than the long-poll timeout the HTTP request may run.
const POLL_GRACE_SECS: u64 = 5;

/// Telegram Bot API client.
pub struct TelegramClient {
    client: reqwest::Client,
    api_base: String,
}

impl TelegramClient {
    pub fn new() -> Self {
        Self::with_api_base(API_BASE)
    }

    /// Point the client at a different API server (tests, local bot-api).
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
        }
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{token}/{method}", self.api_base)
    }

    /// Unwrap the standard `{ok, result, description}` envelope.
    fn unwrap_envelope<T>(body: TgResponse<T>) -> Result<T, CourierError> {
        if !body.ok {
            return Err(CourierError::Api(
                body.description.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        body.result
            .ok_or_else(|| CourierError::Api("ok envelope with no result".into()))
    }

    fn check_conflict(resp: &reqwest::Response) -> Result<(), CourierError> {
        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(CourierError::Conflict);
        }
        Ok(())
    }

    async fn read_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, CourierError> {
        Self::check_conflict(&resp)?;
        let body: TgResponse<T> = resp
            .json()
            .await
            .map_err(|e| CourierError::Http(format!("telegram response parse failed: {e}")))?;
        Self::unwrap_envelope(body)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        token: &str,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, CourierError> {
        let resp = self
            .client
            .post(self.method_url(token, method))
            .json(body)
            .send()
            .await
            .map_err(|e| CourierError::Http(format!("telegram {method} failed: {e}")))?;
        Self::read_envelope(resp).await
    }
}

impl Default for TelegramClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(
        &self,
        token: &str,
        offset: i64,
        limit: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TgUpdate>, CourierError> {
        let body = serde_json::json!({
            "offset": offset,
            "limit": limit,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });

        let resp = self
            .client
            .post(self.method_url(token, "getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + POLL_GRACE_SECS))
            .json(&body)
            .send()
            .await
            .map_err(|e| CourierError::Http(format!("telegram getUpdates failed: {e}")))?;

        Self::read_envelope(resp).await
    }

    async fn set_webhook(&self, token: &str, url: &str) -> Result<(), CourierError> {
        let body = serde_json::json!({ "url": url });
        let _: serde_json::Value = self.post_json(token, "setWebhook", &body).await?;
        Ok(())
    }

    async fn delete_webhook(&self, token: &str) -> Result<(), CourierError> {
        let body = serde_json::json!({});
        let _: serde_json::Value = self.post_json(token, "deleteWebhook", &body).await?;
        Ok(())
    }

    async fn get_file(&self, token: &str, file_id: &str) -> Result<String, CourierError> {
        let body = serde_json::json!({ "file_id": file_id });
        let file: TgFile = self.post_json(token, "getFile", &body).await?;
        file.file_path
            .ok_or_else(|| CourierError::Api("getFile returned no file_path".into()))
    }

    async fn download_file(
        &self,
        token: &str,
        file_path: &str,
    ) -> Result<Vec<u8>, CourierError> {
        let url = format!("{}/file/bot{token}/{file_path}", self.api_base);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CourierError::Http(format!("file download failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(CourierError::Transfer(format!(
                "file download got {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CourierError::Transfer(format!("file read failed: {e}")))?;

        debug!("downloaded {} bytes for {file_path}", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn send_text(
        &self,
        token: &str,
        chat_id: &str,
        topic_id: Option<i64>,
        text: &str,
    ) -> Result<(), CourierError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(topic) = topic_id {
            body["message_thread_id"] = serde_json::json!(topic);
        }

        let _: serde_json::Value = self.post_json(token, "sendMessage", &body).await?;
        Ok(())
    }

    async fn send_media(
        &self,
        token: &str,
        chat_id: &str,
        topic_id: Option<i64>,
        kind: MediaKind,
        data: Vec<u8>,
        filename: &str,
        caption: Option<&str>,
    ) -> Result<(), CourierError> {
        let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());

        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .part(kind.field_name(), part);
        if let Some(topic) = topic_id {
            form = form.text("message_thread_id", topic.to_string());
        }
        if let Some(caption) = caption {
            form = form.text("caption", caption.to_string());
        }

        let resp = self
            .client
            .post(self.method_url(token, kind.endpoint()))
            .multipart(form)
            .send()
            .await
            .map_err(|e| CourierError::Http(format!("telegram {} failed: {e}", kind.endpoint())))?;

        let _: serde_json::Value = Self::read_envelope(resp).await?;
        Ok(())
    }
}
