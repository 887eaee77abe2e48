//! Program repository
//!
//! Database operations for programs. The public surface only sees approved
//! programs; `is_featured` narrows that to the promoted subset.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use super::{decode_list, encode_list};
use crate::models::{CreateProgramInput, Program, ProgramStatus, UpdateProgramInput};

/// Server-side filter for public program queries
#[derive(Debug, Clone, Default)]
pub struct ProgramFilter {
    /// Free-text search over name, description and tags
    pub search: Option<String>,
    /// Lifecycle status selection
    pub status: Option<ProgramStatus>,
    /// Restrict to the featured subset
    pub featured_only: bool,
}

/// Program repository trait
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Create a new program
    async fn create(&self, input: &CreateProgramInput) -> Result<Program>;

    /// Get program by id (any visibility)
    async fn get_by_id(&self, id: i64) -> Result<Option<Program>>;

    /// List all programs with pagination (unapproved included)
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Program>>;

    /// Count all programs
    async fn count(&self) -> Result<i64>;

    /// Apply a partial update; only fields present in `input` are written,
    /// plus the `updated_at` timestamp.
    async fn update(&self, id: i64, input: &UpdateProgramInput) -> Result<Program>;

    /// Delete a program by id; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// List approved programs matching the filter
    async fn list_approved(
        &self,
        filter: &ProgramFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Program>>;

    /// Count approved programs matching the filter
    async fn count_approved(&self, filter: &ProgramFilter) -> Result<i64>;
}

/// SQLx-based program repository implementation
pub struct SqlxProgramRepository {
    pool: SqlitePool,
}

impl SqlxProgramRepository {
    /// Create a new SQLx program repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ProgramRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProgramRepository for SqlxProgramRepository {
    async fn create(&self, input: &CreateProgramInput) -> Result<Program> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO programs (name, description, goal, start_date, end_date, location,
                                  images, videos, status, contact_person, contact_phone,
                                  contact_email, tags, is_featured, is_approved, created_at,
                                  updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.goal)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.location)
        .bind(encode_list(&input.images))
        .bind(encode_list(&input.videos))
        .bind(input.status.as_str())
        .bind(&input.contact_person)
        .bind(&input.contact_phone)
        .bind(&input.contact_email)
        .bind(encode_list(&input.tags))
        .bind(input.is_featured)
        .bind(input.is_approved)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create program")?;

        Ok(Program {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            description: input.description.clone(),
            goal: input.goal.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            location: input.location.clone(),
            images: input.images.clone(),
            videos: input.videos.clone(),
            status: input.status,
            contact_person: input.contact_person.clone(),
            contact_phone: input.contact_phone.clone(),
            contact_email: input.contact_email.clone(),
            tags: input.tags.clone(),
            is_featured: input.is_featured,
            is_approved: input.is_approved,
            created_at: now,
            updated_at: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Program>> {
        let row = sqlx::query("SELECT * FROM programs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get program")?;

        row.map(|row| row_to_program(&row)).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Program>> {
        let rows = sqlx::query("SELECT * FROM programs ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list programs")?;

        rows.iter().map(row_to_program).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM programs")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count programs")?;
        Ok(row.get("count"))
    }

    async fn update(&self, id: i64, input: &UpdateProgramInput) -> Result<Program> {
        let now = Utc::now();
        let sql = build_update_sql(input);

        let mut query = sqlx::query(&sql);
        if let Some(name) = &input.name {
            query = query.bind(name);
        }
        if let Some(description) = &input.description {
            query = query.bind(description);
        }
        if let Some(goal) = &input.goal {
            query = query.bind(goal.clone());
        }
        if let Some(start_date) = input.start_date {
            query = query.bind(start_date);
        }
        if let Some(end_date) = input.end_date {
            query = query.bind(end_date);
        }
        if let Some(location) = &input.location {
            query = query.bind(location.clone());
        }
        if let Some(images) = &input.images {
            query = query.bind(encode_list(images));
        }
        if let Some(videos) = &input.videos {
            query = query.bind(encode_list(videos));
        }
        if let Some(status) = input.status {
            query = query.bind(status.as_str());
        }
        if let Some(contact_person) = &input.contact_person {
            query = query.bind(contact_person.clone());
        }
        if let Some(contact_phone) = &input.contact_phone {
            query = query.bind(contact_phone.clone());
        }
        if let Some(contact_email) = &input.contact_email {
            query = query.bind(contact_email.clone());
        }
        if let Some(tags) = &input.tags {
            query = query.bind(encode_list(tags));
        }
        if let Some(is_featured) = input.is_featured {
            query = query.bind(is_featured);
        }
        if let Some(is_approved) = input.is_approved {
            query = query.bind(is_approved);
        }
        query = query.bind(now).bind(id);

        let result = query
            .execute(&self.pool)
            .await
            .context("Failed to update program")?;
        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("Program not found: {}", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Program not found after update: {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete program")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_approved(
        &self,
        filter: &ProgramFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Program>> {
        let mut sql = String::from("SELECT * FROM programs WHERE is_approved = 1");
        push_filter_sql(&mut sql, filter);
        sql.push_str(" ORDER BY start_date DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list approved programs")?;

        rows.iter().map(row_to_program).collect()
    }

    async fn count_approved(&self, filter: &ProgramFilter) -> Result<i64> {
        let mut sql =
            String::from("SELECT COUNT(*) AS count FROM programs WHERE is_approved = 1");
        push_filter_sql(&mut sql, filter);

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let row = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count approved programs")?;
        Ok(row.get("count"))
    }
}

/// Build an UPDATE statement covering only the fields present in `input`.
///
/// Absent fields never appear in the SET clause, so two overlapping partial
/// updates to disjoint fields both land.
fn build_update_sql(input: &UpdateProgramInput) -> String {
    let mut sets: Vec<&str> = Vec::new();
    if input.name.is_some() {
        sets.push("name = ?");
    }
    if input.description.is_some() {
        sets.push("description = ?");
    }
    if input.goal.is_some() {
        sets.push("goal = ?");
    }
    if input.start_date.is_some() {
        sets.push("start_date = ?");
    }
    if input.end_date.is_some() {
        sets.push("end_date = ?");
    }
    if input.location.is_some() {
        sets.push("location = ?");
    }
    if input.images.is_some() {
        sets.push("images = ?");
    }
    if input.videos.is_some() {
        sets.push("videos = ?");
    }
    if input.status.is_some() {
        sets.push("status = ?");
    }
    if input.contact_person.is_some() {
        sets.push("contact_person = ?");
    }
    if input.contact_phone.is_some() {
        sets.push("contact_phone = ?");
    }
    if input.contact_email.is_some() {
        sets.push("contact_email = ?");
    }
    if input.tags.is_some() {
        sets.push("tags = ?");
    }
    if input.is_featured.is_some() {
        sets.push("is_featured = ?");
    }
    if input.is_approved.is_some() {
        sets.push("is_approved = ?");
    }
    sets.push("updated_at = ?");
    format!("UPDATE programs SET {} WHERE id = ?", sets.join(", "))
}

fn push_filter_sql(sql: &mut String, filter: &ProgramFilter) {
    if filter.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if filter.featured_only {
        sql.push_str(" AND is_featured = 1");
    }
    if filter.search.is_some() {
        sql.push_str(" AND (name LIKE ? OR description LIKE ? OR tags LIKE ?)");
    }
}

fn bind_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &ProgramFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(status) = filter.status {
        query = query.bind(status.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    query
}

fn row_to_program(row: &SqliteRow) -> Result<Program> {
    let status: String = row.get("status");
    let images: String = row.get("images");
    let videos: String = row.get("videos");
    let tags: String = row.get("tags");

    Ok(Program {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        goal: row.get("goal"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        location: row.get("location"),
        images: decode_list(&images),
        videos: decode_list(&videos),
        status: ProgramStatus::from_str(&status)?,
        contact_person: row.get("contact_person"),
        contact_phone: row.get("contact_phone"),
        contact_email: row.get("contact_email"),
        tags: decode_list(&tags),
        is_featured: row.get("is_featured"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample_input(name: &str, approved: bool) -> CreateProgramInput {
        CreateProgramInput {
            name: name.to_string(),
            description: "Community outreach".to_string(),
            goal: None,
            start_date: Utc::now(),
            end_date: None,
            location: None,
            images: vec![],
            videos: vec![],
            status: ProgramStatus::Upcoming,
            contact_person: None,
            contact_phone: None,
            contact_email: None,
            tags: vec![],
            is_featured: false,
            is_approved: approved,
        }
    }

    #[tokio::test]
    async fn test_approved_listing_excludes_unapproved() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        repo.create(&sample_input("Pending", false)).await.unwrap();
        repo.create(&sample_input("Approved", true)).await.unwrap();

        let filter = ProgramFilter::default();
        let approved = repo.list_approved(&filter, 0, 10).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].name, "Approved");
        assert_eq!(repo.count_approved(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_featured_filter_selects_promoted_subset() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let mut featured = sample_input("Featured", true);
        featured.is_featured = true;
        repo.create(&featured).await.unwrap();
        repo.create(&sample_input("Plain", true)).await.unwrap();

        let filter = ProgramFilter {
            featured_only: true,
            ..Default::default()
        };
        let results = repo.list_approved(&filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_featured);
    }

    #[tokio::test]
    async fn test_status_filter() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let mut ongoing = sample_input("Running", true);
        ongoing.status = ProgramStatus::Ongoing;
        repo.create(&ongoing).await.unwrap();
        repo.create(&sample_input("Planned", true)).await.unwrap();

        let filter = ProgramFilter {
            status: Some(ProgramStatus::Ongoing),
            ..Default::default()
        };
        let results = repo.list_approved(&filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, ProgramStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_partial_update_preserves_other_fields() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let mut input = sample_input("Original", true);
        input.goal = Some("Reach 100 villages".to_string());
        let created = repo.create(&input).await.unwrap();

        let update = UpdateProgramInput {
            status: Some(ProgramStatus::Completed),
            ..Default::default()
        };
        let updated = repo.update(created.id, &update).await.unwrap();

        assert_eq!(updated.status, ProgramStatus::Completed);
        assert_eq!(updated.goal.as_deref(), Some("Reach 100 villages"));
        assert!(updated.is_approved);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_sql_covers_only_present_fields() {
        let update = UpdateProgramInput {
            status: Some(ProgramStatus::Completed),
            ..Default::default()
        };
        let sql = build_update_sql(&update);
        assert!(sql.contains("status = ?"));
        assert!(sql.contains("updated_at = ?"));
        assert!(!sql.contains("name"));
        assert!(!sql.contains("goal"));
        assert!(!sql.contains("is_approved"));
    }

    #[tokio::test]
    async fn test_overlapping_disjoint_updates_both_land() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let created = repo.create(&sample_input("Original", true)).await.unwrap();

        // Two editors save against the same snapshot, touching different fields
        let rename = UpdateProgramInput {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let complete = UpdateProgramInput {
            status: Some(ProgramStatus::Completed),
            ..Default::default()
        };
        repo.update(created.id, &rename).await.unwrap();
        repo.update(created.id, &complete).await.unwrap();

        let after = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(after.name, "Renamed");
        assert_eq!(after.status, ProgramStatus::Completed);
    }

    #[tokio::test]
    async fn test_clearing_optional_field() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let mut input = sample_input("With goal", true);
        input.goal = Some("Old goal".to_string());
        let created = repo.create(&input).await.unwrap();

        let update = UpdateProgramInput {
            goal: Some(None),
            ..Default::default()
        };
        let updated = repo.update(created.id, &update).await.unwrap();
        assert!(updated.goal.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxProgramRepository::new(pool);

        let created = repo.create(&sample_input("Doomed", true)).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
