//! Media relay: download from Telegram, re-upload to the destination.

use courier_core::error::CourierError;
use courier_core::model::{Destination, MediaKind};
use courier_telegram::api::BotApi;
use tracing::debug;
use uuid::Uuid;

/// Relay one media payload to `destination`.
///
/// The downloaded bytes live only for the duration of this call and are
/// dropped on every exit path, including mid-transfer API failures.
pub(crate) async fn relay(
    api: &dyn BotApi,
    token: &str,
    destination: &Destination,
    kind: MediaKind,
    file_id: &str,
    caption: Option<&str>,
) -> Result<(), CourierError> {
    let file_path = api.get_file(token, file_id).await?;
    let data = api.download_file(token, &file_path).await?;

    // An empty body means the transfer failed upstream, not that the file
    // is legitimately empty.
    if data.is_empty() {
        return Err(CourierError::Transfer(format!(
            "zero-byte download for file {file_id}"
        )));
    }

    let filename = upload_filename(&file_path);
    debug!("relaying {} bytes of {} as {filename}", data.len(), kind.field_name());

    api.send_media(
        token,
        &destination.chat_id,
        destination.topic_id,
        kind,
        data,
        &filename,
        caption,
    )
    .await
}

/// Derive an upload filename from the server-side file path.
fn upload_filename(file_path: &str) -> String {
    match file_path.rsplit('/').next().filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("{}.bin", Uuid::new_v4()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_filename_from_path() {
        assert_eq!(upload_filename("photos/file_42.jpg"), "file_42.jpg");
        assert_eq!(upload_filename("file_1.mp4"), "file_1.mp4");
    }

    #[test]
    fn test_upload_filename_fallback_for_empty_basename() {
        let name = upload_filename("documents/");
        assert!(name.ends_with(".bin"));
    }
}
