//! Newsletter subscriber repository
//!
//! Subscriptions are append-only; re-subscribing with a known address is a
//! no-op rather than an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Subscriber;

/// Subscriber repository trait
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Subscribe an email address; idempotent on the address. Returns the
    /// stored record either way.
    async fn subscribe(&self, email: &str) -> Result<Subscriber>;

    /// Get subscriber by email
    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>>;

    /// List all subscribers with pagination
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Subscriber>>;

    /// Count all subscribers
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based subscriber repository implementation
pub struct SqlxSubscriberRepository {
    pool: SqlitePool,
}

impl SqlxSubscriberRepository {
    /// Create a new SQLx subscriber repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SubscriberRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SubscriberRepository for SqlxSubscriberRepository {
    async fn subscribe(&self, email: &str) -> Result<Subscriber> {
        let now = Utc::now();
        sqlx::query("INSERT OR IGNORE INTO subscribers (email, created_at) VALUES (?, ?)")
            .bind(email)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to subscribe email")?;

        self.get_by_email(email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber not found after insert: {}", email))
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Subscriber>> {
        let row = sqlx::query("SELECT * FROM subscribers WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get subscriber")?;

        Ok(row.map(|row| row_to_subscriber(&row)))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Subscriber>> {
        let rows = sqlx::query("SELECT * FROM subscribers ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list subscribers")?;

        Ok(rows.iter().map(row_to_subscriber).collect())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM subscribers")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count subscribers")?;
        Ok(row.get("count"))
    }
}

fn row_to_subscriber(row: &SqliteRow) -> Subscriber {
    Subscriber {
        id: row.get("id"),
        email: row.get("email"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_subscribe_and_list() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxSubscriberRepository::new(pool);

        repo.subscribe("a@example.org").await.unwrap();
        repo.subscribe("b@example.org").await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
        let listed = repo.list(0, 10).await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_resubscribe_is_idempotent() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxSubscriberRepository::new(pool);

        let first = repo.subscribe("a@example.org").await.unwrap();
        let second = repo.subscribe("a@example.org").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
