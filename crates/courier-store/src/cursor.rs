//! Poll-cursor persistence.
//!
//! Two backends: in-memory for the multi-bot deployment (a restart may
//! reprocess the last batch) and file-backed for deployments that must
//! survive restarts without reprocessing.

use async_trait::async_trait;
use courier_core::traits::CursorStore;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// In-memory cursor store keyed by bot id.
#[derive(Default)]
pub struct MemoryCursorStore {
    cursors: Mutex<HashMap<String, i64>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn offset(&self, bot_id: &str) -> i64 {
        self.cursors.lock().await.get(bot_id).copied().unwrap_or(0)
    }

    async fn advance(&self, bot_id: &str, update_id: i64) {
        self.cursors
            .lock()
            .await
            .insert(bot_id.to_string(), update_id);
    }
}

/// File-backed cursor store: one plain-text integer per bot under `dir`.
///
/// A missing file or non-numeric content reads as 0. Writes are
/// best-effort; failures are logged and the cycle continues.
pub struct FileCursorStore {
    dir: PathBuf,
}

impl FileCursorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn cursor_path(&self, bot_id: &str) -> PathBuf {
        self.dir.join(format!("{bot_id}.txt"))
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    async fn offset(&self, bot_id: &str) -> i64 {
        match std::fs::read_to_string(self.cursor_path(bot_id)) {
            Ok(content) => content.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    async fn advance(&self, bot_id: &str, update_id: i64) {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!("failed to create cursor dir {}: {e}", self.dir.display());
            return;
        }
        let path = self.cursor_path(bot_id);
        if let Err(e) = std::fs::write(&path, update_id.to_string()) {
            warn!("failed to save cursor for bot {bot_id}: {e}");
        } else {
            debug!("saved cursor {update_id} for bot {bot_id}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cursor_defaults_to_zero() {
        let store = MemoryCursorStore::new();
        assert_eq!(store.offset("bot1").await, 0);
    }

    #[tokio::test]
    async fn test_memory_cursor_advance_and_isolation() {
        let store = MemoryCursorStore::new();
        store.advance("bot1", 41).await;
        store.advance("bot2", 7).await;

        assert_eq!(store.offset("bot1").await, 41);
        assert_eq!(store.offset("bot2").await, 7);

        // Last write wins.
        store.advance("bot1", 50).await;
        assert_eq!(store.offset("bot1").await, 50);
    }

    fn temp_cursor_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("__courier_cursor_test_{name}__"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_file_cursor_missing_file_reads_zero() {
        let dir = temp_cursor_dir("missing");
        let store = FileCursorStore::new(&dir);
        assert_eq!(store.offset("bot1").await, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_cursor_garbage_reads_zero() {
        let dir = temp_cursor_dir("garbage");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bot1.txt"), "not a number").unwrap();

        let store = FileCursorStore::new(&dir);
        assert_eq!(store.offset("bot1").await, 0);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_cursor_roundtrip() {
        let dir = temp_cursor_dir("roundtrip");
        let store = FileCursorStore::new(&dir);

        store.advance("bot1", 12345).await;
        assert_eq!(store.offset("bot1").await, 12345);

        // Survives a fresh store over the same directory.
        let reopened = FileCursorStore::new(&dir);
        assert_eq!(reopened.offset("bot1").await, 12345);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_cursor_tolerates_whitespace() {
        let dir = temp_cursor_dir("whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("bot1.txt"), " 99\n").unwrap();

        let store = FileCursorStore::new(&dir);
        assert_eq!(store.offset("bot1").await, 99);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
