//! SQLite-backed message log.
//!
//! Every operation except `open` and `ping` swallows storage errors after
//! logging them: a broken store must never stop command handling, so callers
//! see "nothing saved" or "nothing found" instead.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use crate::core::models::StoredMessage;
use crate::errors::BotError;

const SECONDS_PER_DAY: i64 = 86_400;

const SCHEMA: [&str; 2] = [
    r#"CREATE TABLE IF NOT EXISTS messages (
           chat_id    TEXT    NOT NULL,
           message_id INTEGER NOT NULL,
           from_id    TEXT    NOT NULL,
           date       INTEGER NOT NULL,
           text       TEXT    NOT NULL,
           PRIMARY KEY (chat_id, message_id)
       )"#,
    "CREATE INDEX IF NOT EXISTS idx_messages_date ON messages(date)",
];

/// Append-only log of chat messages keyed by `(chat_id, message_id)`.
#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    /// Open (creating if needed) the database at `database_url` and ensure the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema cannot be created.
    pub async fn open(database_url: &str) -> Result<Self, BotError> {
        let in_memory = database_url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(database_url)?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .create_if_missing(true);

        // An in-memory database lives and dies with its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(4)
        };
        let pool = pool_options.connect_with(options).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("Message store ready at {}", database_url);
        Ok(Self { pool })
    }

    /// Private in-memory store, used by tests and local runs.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot be initialised.
    pub async fn in_memory() -> Result<Self, BotError> {
        Self::open("sqlite::memory:").await
    }

    /// Persist one message unless its text is blank or the key already exists.
    ///
    /// Returns `true` when a new row was written.
    pub async fn save(
        &self,
        chat_id: &str,
        message_id: i64,
        from_id: &str,
        timestamp: i64,
        text: &str,
    ) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let result = sqlx::query(
            "INSERT OR IGNORE INTO messages (chat_id, message_id, from_id, date, text) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(chat_id)
        .bind(message_id)
        .bind(from_id)
        .bind(timestamp)
        .bind(text)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => done.rows_affected() > 0,
            Err(e) => {
                error!("Failed to save message {} in chat {}: {}", message_id, chat_id, e);
                false
            }
        }
    }

    /// Convenience wrapper around `save` for an already-built record.
    pub async fn save_message(&self, message: &StoredMessage) -> bool {
        self.save(
            &message.chat_id,
            message.message_id,
            &message.from_id,
            message.timestamp,
            &message.text,
        )
        .await
    }

    /// Up to `n` texts of `chat_id`, newest message id first.
    pub async fn fetch_last(&self, chat_id: &str, n: u32) -> Vec<String> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT text FROM messages WHERE chat_id = ? AND text != '' \
             ORDER BY message_id DESC LIMIT ?",
        )
        .bind(chat_id)
        .bind(i64::from(n))
        .fetch_all(&self.pool)
        .await;

        match rows {
            Ok(texts) => texts,
            Err(e) => {
                error!("Failed to fetch messages for chat {}: {}", chat_id, e);
                Vec::new()
            }
        }
    }

    /// Number of retained messages for `chat_id`.
    pub async fn count(&self, chat_id: &str) -> i64 {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .fetch_one(&self.pool)
            .await;

        count.unwrap_or_else(|e| {
            error!("Failed to count messages for chat {}: {}", chat_id, e);
            0
        })
    }

    /// Remove every message, in any chat, with `timestamp < cutoff`.
    pub async fn delete_older_than(&self, cutoff: i64) -> u64 {
        let result = sqlx::query("DELETE FROM messages WHERE date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                error!("Failed to delete messages older than {}: {}", cutoff, e);
                0
            }
        }
    }

    /// Retention sweep: drop messages older than `retention_days` before `now`.
    ///
    /// `retention_days <= 0` disables the sweep.
    pub async fn cleanup_expired(&self, retention_days: i64, now: i64) -> u64 {
        if retention_days <= 0 {
            return 0;
        }
        let cutoff = now.saturating_sub(retention_days.saturating_mul(SECONDS_PER_DAY));
        let deleted = self.delete_older_than(cutoff).await;
        if deleted > 0 {
            info!("Retention cleanup removed {} messages", deleted);
        }
        deleted
    }

    /// Remove all messages of one chat.
    pub async fn clear_chat(&self, chat_id: &str) -> u64 {
        let result = sqlx::query("DELETE FROM messages WHERE chat_id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                error!("Failed to clear chat {}: {}", chat_id, e);
                0
            }
        }
    }

    /// Close the pool; later calls degrade like any other storage failure.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Round-trip a trivial query; used by the health route.
    ///
    /// # Errors
    ///
    /// Returns the storage error when the database is unreachable.
    pub async fn ping(&self) -> Result<(), BotError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
