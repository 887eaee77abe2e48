//! User repository
//!
//! Database operations for identity-synced users. The key operation is the
//! lookup by external identity reference used by the sync bridge and the
//! auth middleware; the application never deletes users.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{User, UserRole};

/// Mutable profile fields overwritten on every sign-in.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user for the given external identity, defaulting the
    /// role to the least-privileged value.
    async fn create(&self, external_id: &str, profile: &UserProfile) -> Result<User>;

    /// Get user by internal id
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by external identity reference
    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>>;

    /// Overwrite the mutable profile fields of an existing user
    async fn update_profile(&self, id: i64, profile: &UserProfile) -> Result<User>;

    /// Change a user's role
    async fn update_role(&self, id: i64, role: UserRole) -> Result<User>;

    /// Count all users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, external_id: &str, profile: &UserProfile) -> Result<User> {
        let now = Utc::now();
        let role = UserRole::default();

        let result = sqlx::query(
            r#"
            INSERT INTO users (external_id, email, first_name, last_name, avatar_url, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(external_id)
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            external_id: external_id.to_string(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            avatar_url: profile.avatar_url.clone(),
            role,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by id")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by external id")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn update_profile(&self, id: i64, profile: &UserProfile) -> Result<User> {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE users
            SET email = ?, first_name = ?, last_name = ?, avatar_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user profile")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update: {}", id))
    }

    async fn update_role(&self, id: i64, role: UserRole) -> Result<User> {
        let now = Utc::now();
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user role")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update: {}", id))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }
}

fn row_to_user(row: &SqliteRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        external_id: row.get("external_id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar_url: row.get("avatar_url"),
        role: UserRole::from_str(&role)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
