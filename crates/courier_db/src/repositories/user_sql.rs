//! Read-only SQL view of the users table
//!
//! User records are owned by the identity collaborator; the messaging layer
//! only resolves ids to profiles (recipient validation, display names for
//! summaries and notification titles). This adapter implements the
//! [`UserDirectory`] seam against the shared users table.

use crate::error::DbError;
use crate::DbClient;
use courier_common::models::UserProfile;
use courier_common::services::{BoxFuture, BoxedError, UserDirectory};
use sqlx::Row;

/// SQL-backed user directory
#[derive(Debug, Clone)]
pub struct SqlUserDirectory {
    /// The database client
    db_client: DbClient,
}

impl SqlUserDirectory {
    /// Create a new SQL user directory
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Create the users table if it doesn't already exist.
    ///
    /// The identity collaborator owns this table; creating it here is
    /// idempotent and keeps standalone deployments and tests working.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        self.db_client
            .execute(
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL
                )
                "#,
            )
            .await
    }
}

impl UserDirectory for SqlUserDirectory {
    type Error = BoxedError;

    fn find_user<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Option<UserProfile>, BoxedError> {
        Box::pin(async move {
            let row = sqlx::query("SELECT id, username FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(self.db_client.pool())
                .await
                .map_err(|e| BoxedError(Box::new(DbError::QueryError(e.to_string()))))?;

            match row {
                Some(row) => Ok(Some(UserProfile {
                    id: row
                        .try_get("id")
                        .map_err(|e| BoxedError(Box::new(DbError::QueryError(e.to_string()))))?,
                    username: row
                        .try_get("username")
                        .map_err(|e| BoxedError(Box::new(DbError::QueryError(e.to_string()))))?,
                })),
                None => Ok(None),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_existing_users_and_misses_unknown_ids() {
        let client = DbClient::in_memory().await.unwrap();
        let directory = SqlUserDirectory::new(client.clone());
        directory.init_schema().await.unwrap();

        sqlx::query("INSERT INTO users (id, username) VALUES (?, ?)")
            .bind("u1")
            .bind("alice")
            .execute(client.pool())
            .await
            .unwrap();

        let found = directory.find_user("u1").await.unwrap();
        assert_eq!(
            found,
            Some(UserProfile {
                id: "u1".to_string(),
                username: "alice".to_string()
            })
        );

        assert!(directory.find_user("nope").await.unwrap().is_none());
    }
}
