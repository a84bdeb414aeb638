//! SQLite-backed record store.
//!
//! Holds the bots, destinations, and authorized users the relay engine
//! reads. Write helpers exist for the administrative collaborator and for
//! tests; the engine itself only uses the [`Directory`] view.

use async_trait::async_trait;
use courier_core::config::StoreConfig;
use courier_core::error::CourierError;
use courier_core::model::{AuthorizedUser, Bot, Destination};
use courier_core::shellexpand;
use courier_core::traits::Directory;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// Persistent record store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the store, running migrations on first use.
    pub async fn new(config: &StoreConfig) -> Result<Self, CourierError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CourierError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| CourierError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| CourierError::Store(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Record store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    pub(crate) async fn run_migrations(pool: &SqlitePool) -> Result<(), CourierError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| CourierError::Store(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        CourierError::Store(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| CourierError::Store(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    CourierError::Store(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }

    // --- Write helpers (administrative collaborator / tests) ---

    /// Create a bot. Setting `is_default` clears any prior holder; at most
    /// one bot carries the flag.
    pub async fn create_bot(
        &self,
        name: &str,
        token: &str,
        is_default: bool,
    ) -> Result<Bot, CourierError> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CourierError::Store(format!("begin failed: {e}")))?;

        if is_default {
            sqlx::query("UPDATE bots SET is_default = 0 WHERE is_default = 1")
                .execute(&mut *tx)
                .await
                .map_err(|e| CourierError::Store(format!("update failed: {e}")))?;
        }

        sqlx::query("INSERT INTO bots (id, name, token, is_active, is_default) VALUES (?, ?, ?, 1, ?)")
            .bind(&id)
            .bind(name)
            .bind(token)
            .bind(is_default)
            .execute(&mut *tx)
            .await
            .map_err(|e| CourierError::Store(format!("insert failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CourierError::Store(format!("commit failed: {e}")))?;

        Ok(Bot {
            id,
            name: name.to_string(),
            token: token.to_string(),
            is_active: true,
            is_default,
        })
    }

    /// Create a destination for a bot. Setting `is_default` clears any prior
    /// default holder for that bot only.
    pub async fn create_destination(
        &self,
        bot_id: &str,
        chat_id: &str,
        topic_id: Option<i64>,
        group_label: &str,
        topic_label: &str,
        is_default: bool,
    ) -> Result<Destination, CourierError> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CourierError::Store(format!("begin failed: {e}")))?;

        if is_default {
            sqlx::query("UPDATE destinations SET is_default = 0 WHERE bot_id = ? AND is_default = 1")
                .bind(bot_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| CourierError::Store(format!("update failed: {e}")))?;
        }

        sqlx::query(
            "INSERT INTO destinations (id, bot_id, chat_id, topic_id, group_label, topic_label, is_default) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(bot_id)
        .bind(chat_id)
        .bind(topic_id)
        .bind(group_label)
        .bind(topic_label)
        .bind(is_default)
        .execute(&mut *tx)
        .await
        .map_err(|e| CourierError::Store(format!("insert failed: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CourierError::Store(format!("commit failed: {e}")))?;

        Ok(Destination {
            id,
            bot_id: bot_id.to_string(),
            chat_id: chat_id.to_string(),
            topic_id,
            group_label: group_label.to_string(),
            topic_label: topic_label.to_string(),
            is_default,
        })
    }

    /// Add a sender to a bot's allow-list. The (username, bot) pair is
    /// unique; duplicates fail.
    pub async fn create_authorized_user(
        &self,
        bot_id: &str,
        username: &str,
        label: &str,
    ) -> Result<AuthorizedUser, CourierError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO authorized_users (id, bot_id, username, label, is_active) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(bot_id)
        .bind(username)
        .bind(label)
        .execute(&self.pool)
        .await
        .map_err(|e| CourierError::Store(format!("insert failed: {e}")))?;

        Ok(AuthorizedUser {
            id,
            bot_id: bot_id.to_string(),
            username: username.to_string(),
            label: label.to_string(),
            is_active: true,
        })
    }

    pub async fn set_bot_active(&self, bot_id: &str, active: bool) -> Result<(), CourierError> {
        sqlx::query("UPDATE bots SET is_active = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(active)
            .bind(bot_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CourierError::Store(format!("update failed: {e}")))?;
        Ok(())
    }

    pub async fn set_user_active(&self, user_id: &str, active: bool) -> Result<(), CourierError> {
        sqlx::query("UPDATE authorized_users SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| CourierError::Store(format!("update failed: {e}")))?;
        Ok(())
    }
}

type BotRow = (String, String, String, bool, bool);
type DestinationRow = (String, String, String, Option<i64>, String, String, bool);
type UserRow = (String, String, String, String, bool);

fn bot_from_row((id, name, token, is_active, is_default): BotRow) -> Bot {
    Bot {
        id,
        name,
        token,
        is_active,
        is_default,
    }
}

fn destination_from_row(
    (id, bot_id, chat_id, topic_id, group_label, topic_label, is_default): DestinationRow,
) -> Destination {
    Destination {
        id,
        bot_id,
        chat_id,
        topic_id,
        group_label,
        topic_label,
        is_default,
    }
}

#[async_trait]
impl Directory for Store {
    async fn list_active_bots(&self) -> Result<Vec<Bot>, CourierError> {
        let rows: Vec<BotRow> = sqlx::query_as(
            "SELECT id, name, token, is_active, is_default FROM bots \
             WHERE is_active = 1 ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CourierError::Store(format!("query failed: {e}")))?;

        Ok(rows.into_iter().map(bot_from_row).collect())
    }

    async fn default_bot(&self) -> Result<Option<Bot>, CourierError> {
        let row: Option<BotRow> = sqlx::query_as(
            "SELECT id, name, token, is_active, is_default FROM bots \
             WHERE is_default = 1 LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CourierError::Store(format!("query failed: {e}")))?;

        Ok(row.map(bot_from_row))
    }

    async fn default_destination(
        &self,
        bot_id: &str,
    ) -> Result<Option<Destination>, CourierError> {
        let row: Option<DestinationRow> = sqlx::query_as(
            "SELECT id, bot_id, chat_id, topic_id, group_label, topic_label, is_default \
             FROM destinations WHERE bot_id = ? AND is_default = 1 LIMIT 1",
        )
        .bind(bot_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CourierError::Store(format!("query failed: {e}")))?;

        Ok(row.map(destination_from_row))
    }

    async fn find_authorized_user(
        &self,
        username: &str,
        bot_id: &str,
    ) -> Result<Option<AuthorizedUser>, CourierError> {
        // TEXT comparison in SQLite is case-sensitive; usernames must match
        // exactly.
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, bot_id, username, label, is_active FROM authorized_users \
             WHERE username = ? AND bot_id = ? AND is_active = 1",
        )
        .bind(username)
        .bind(bot_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CourierError::Store(format!("query failed: {e}")))?;

        Ok(row.map(|(id, bot_id, username, label, is_active)| AuthorizedUser {
            id,
            bot_id,
            username,
            label,
            is_active,
        }))
    }
}
