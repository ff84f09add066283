//! SQL implementation of the message repository

use crate::error::DbError;
use crate::repositories::message::{Message, MessageRepository};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

/// SQL implementation of the message repository
#[derive(Debug, Clone)]
pub struct SqlMessageRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlMessageRepository {
    /// Create a new SQL message repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message, DbError> {
    Ok(Message {
        id: row
            .try_get("id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        sender_id: row
            .try_get("sender_id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        recipient_id: row
            .try_get("recipient_id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        content: row
            .try_get("content")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        read: row
            .try_get("read")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
    })
}

const MESSAGE_COLUMNS: &str = "id, sender_id, recipient_id, content, read, created_at";

impl MessageRepository for SqlMessageRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing message schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id TEXT NOT NULL,
                recipient_id TEXT NOT NULL,
                content TEXT NOT NULL,
                read BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_messages_sender ON messages (sender_id, created_at)",
            )
            .await?;
        self.db_client
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_messages_recipient ON messages (recipient_id, created_at)",
            )
            .await?;

        Ok(())
    }

    async fn create(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
    ) -> Result<Message, DbError> {
        debug!("Storing message from {} to {}", sender_id, recipient_id);

        let query = format!(
            "INSERT INTO messages (sender_id, recipient_id, content, read, created_at) \
             VALUES (?, ?, ?, 0, ?) RETURNING {MESSAGE_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(sender_id)
            .bind(recipient_id)
            .bind(content)
            .bind(Utc::now())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to store message: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        message_from_row(&row)
    }

    async fn list_between(&self, user_a: &str, user_b: &str) -> Result<Vec<Message>, DbError> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE (sender_id = ? AND recipient_id = ?) OR (sender_id = ? AND recipient_id = ?) \
             ORDER BY created_at ASC, id ASC"
        );

        let rows = sqlx::query(&query)
            .bind(user_a)
            .bind(user_b)
            .bind(user_b)
            .bind(user_a)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn list_all_for(&self, user_id: &str) -> Result<Vec<Message>, DbError> {
        let query = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE sender_id = ? OR recipient_id = ? \
             ORDER BY created_at ASC, id ASC"
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(message_from_row).collect()
    }

    async fn mark_read(&self, recipient_id: &str, sender_id: &str) -> Result<u64, DbError> {
        debug!(
            "Marking messages from {} to {} as read",
            sender_id, recipient_id
        );

        let result = sqlx::query(
            "UPDATE messages SET read = 1 \
             WHERE sender_id = ? AND recipient_id = ? AND read = 0",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to mark messages read: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
