//! SQL implementation of the push subscription repository

use crate::error::DbError;
use crate::repositories::subscription::{PushSubscription, PushSubscriptionRepository};
use crate::DbClient;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error};

/// SQL implementation of the push subscription repository
#[derive(Debug, Clone)]
pub struct SqlPushSubscriptionRepository {
    /// The database client
    db_client: DbClient,
}

impl SqlPushSubscriptionRepository {
    /// Create a new SQL push subscription repository
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

fn subscription_from_row(row: &SqliteRow) -> Result<PushSubscription, DbError> {
    Ok(PushSubscription {
        id: row.try_get("id").ok(),
        user_id: row
            .try_get("user_id")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        endpoint: row
            .try_get("endpoint")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        p256dh: row
            .try_get("p256dh")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        auth: row
            .try_get("auth")
            .map_err(|e| DbError::QueryError(e.to_string()))?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").ok(),
    })
}

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, endpoint, p256dh, auth, created_at";

impl PushSubscriptionRepository for SqlPushSubscriptionRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing push subscription schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS push_subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                endpoint TEXT NOT NULL,
                p256dh TEXT NOT NULL,
                auth TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                UNIQUE(user_id, endpoint)
            )
        "#;

        self.db_client.execute(query).await?;
        Ok(())
    }

    async fn upsert(&self, subscription: PushSubscription) -> Result<PushSubscription, DbError> {
        debug!(
            "Upserting push subscription for user: {}",
            subscription.user_id
        );

        let query = format!(
            "INSERT INTO push_subscriptions (user_id, endpoint, p256dh, auth, created_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(user_id, endpoint) DO UPDATE SET p256dh = excluded.p256dh, auth = excluded.auth \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(&subscription.user_id)
            .bind(&subscription.endpoint)
            .bind(&subscription.p256dh)
            .bind(&subscription.auth)
            .bind(Utc::now())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert push subscription: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        subscription_from_row(&row)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, DbError> {
        let query = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM push_subscriptions WHERE user_id = ? ORDER BY id"
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        rows.iter().map(subscription_from_row).collect()
    }

    async fn delete_owned(&self, id: i64, user_id: &str) -> Result<bool, DbError> {
        debug!("Deleting push subscription {} for user {}", id, user_id);

        let result = sqlx::query("DELETE FROM push_subscriptions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(user_id: &str, endpoint: &str) -> PushSubscription {
        PushSubscription {
            id: None,
            user_id: user_id.to_string(),
            endpoint: endpoint.to_string(),
            p256dh: "p256dh-key".to_string(),
            auth: "auth-secret".to_string(),
            created_at: None,
        }
    }

    async fn repo() -> SqlPushSubscriptionRepository {
        let client = DbClient::in_memory().await.unwrap();
        let repo = SqlPushSubscriptionRepository::new(client);
        repo.init_schema().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn upsert_updates_keys_in_place_per_user_endpoint() {
        let repo = repo().await;

        let first = repo
            .upsert(subscription("alice", "https://push.example/a"))
            .await
            .unwrap();

        let mut renewed = subscription("alice", "https://push.example/a");
        renewed.p256dh = "rotated".to_string();
        let second = repo.upsert(renewed).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.p256dh, "rotated");

        let all = repo.find_by_user("alice").await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn distinct_endpoints_accumulate() {
        let repo = repo().await;

        repo.upsert(subscription("alice", "https://push.example/a"))
            .await
            .unwrap();
        repo.upsert(subscription("alice", "https://push.example/b"))
            .await
            .unwrap();
        repo.upsert(subscription("bob", "https://push.example/a"))
            .await
            .unwrap();

        assert_eq!(repo.find_by_user("alice").await.unwrap().len(), 2);
        assert_eq!(repo.find_by_user("bob").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_owner_only() {
        let repo = repo().await;

        let stored = repo
            .upsert(subscription("alice", "https://push.example/a"))
            .await
            .unwrap();
        let id = stored.id.unwrap();

        // Another user cannot delete it
        assert!(!repo.delete_owned(id, "bob").await.unwrap());
        assert_eq!(repo.find_by_user("alice").await.unwrap().len(), 1);

        // The owner can
        assert!(repo.delete_owned(id, "alice").await.unwrap());
        assert!(repo.find_by_user("alice").await.unwrap().is_empty());

        // A repeat delete reports nothing deleted
        assert!(!repo.delete_owned(id, "alice").await.unwrap());
    }
}
