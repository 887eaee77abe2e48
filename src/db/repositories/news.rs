//! News repository
//!
//! Database operations for news articles. Public queries only ever touch
//! the published subset; the admin surface lists everything.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use super::{decode_list, encode_list};
use crate::models::{CreateNewsInput, NewsArticle, NewsCategory, UpdateNewsInput};

/// Server-side filter for public news queries
#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    /// Free-text search over title, summary and tags
    pub search: Option<String>,
    /// Category selection
    pub category: Option<NewsCategory>,
}

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Create a new article
    async fn create(&self, input: &CreateNewsInput, content_html: &str) -> Result<NewsArticle>;

    /// Get article by id (any visibility)
    async fn get_by_id(&self, id: i64) -> Result<Option<NewsArticle>>;

    /// List all articles with pagination (drafts included)
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<NewsArticle>>;

    /// Count all articles
    async fn count(&self) -> Result<i64>;

    /// Apply a partial update; only fields present in `input` are written,
    /// plus the `updated_at` timestamp.
    async fn update(
        &self,
        id: i64,
        input: &UpdateNewsInput,
        content_html: Option<&str>,
    ) -> Result<NewsArticle>;

    /// Delete an article by id; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// List published articles matching the filter
    async fn list_published(
        &self,
        filter: &NewsFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsArticle>>;

    /// Count published articles matching the filter
    async fn count_published(&self, filter: &NewsFilter) -> Result<i64>;
}

/// SQLx-based news repository implementation
pub struct SqlxNewsRepository {
    pool: SqlitePool,
}

impl SqlxNewsRepository {
    /// Create a new SQLx news repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput, content_html: &str) -> Result<NewsArticle> {
        let now = Utc::now();
        let published_at = if input.is_published { Some(now) } else { None };

        let result = sqlx::query(
            r#"
            INSERT INTO news (title, summary, content, content_html, category, images, videos,
                              institution, location, start_date, end_date, is_published,
                              published_at, tags, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&input.title)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(content_html)
        .bind(input.category.as_str())
        .bind(encode_list(&input.images))
        .bind(encode_list(&input.videos))
        .bind(&input.institution)
        .bind(&input.location)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_published)
        .bind(published_at)
        .bind(encode_list(&input.tags))
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create news article")?;

        Ok(NewsArticle {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            summary: input.summary.clone(),
            content: input.content.clone(),
            content_html: content_html.to_string(),
            category: input.category,
            images: input.images.clone(),
            videos: input.videos.clone(),
            institution: input.institution.clone(),
            location: input.location.clone(),
            start_date: input.start_date,
            end_date: input.end_date,
            is_published: input.is_published,
            published_at,
            tags: input.tags.clone(),
            created_at: now,
            updated_at: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<NewsArticle>> {
        let row = sqlx::query("SELECT * FROM news WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get news article")?;

        row.map(|row| row_to_news(&row)).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<NewsArticle>> {
        let rows = sqlx::query("SELECT * FROM news ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list news articles")?;

        rows.iter().map(row_to_news).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM news")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count news articles")?;
        Ok(row.get("count"))
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateNewsInput,
        content_html: Option<&str>,
    ) -> Result<NewsArticle> {
        let now = Utc::now();
        let sql = build_update_sql(input, content_html.is_some());

        let mut query = sqlx::query(&sql);
        if let Some(title) = &input.title {
            query = query.bind(title);
        }
        if let Some(summary) = &input.summary {
            query = query.bind(summary);
        }
        if let Some(content) = &input.content {
            query = query.bind(content);
        }
        if let Some(html) = content_html {
            query = query.bind(html.to_string());
        }
        if let Some(category) = input.category {
            query = query.bind(category.as_str());
        }
        if let Some(images) = &input.images {
            query = query.bind(encode_list(images));
        }
        if let Some(videos) = &input.videos {
            query = query.bind(encode_list(videos));
        }
        if let Some(institution) = &input.institution {
            query = query.bind(institution.clone());
        }
        if let Some(location) = &input.location {
            query = query.bind(location.clone());
        }
        if let Some(start_date) = input.start_date {
            query = query.bind(start_date);
        }
        if let Some(end_date) = input.end_date {
            query = query.bind(end_date);
        }
        if let Some(is_published) = input.is_published {
            query = query.bind(is_published);
            if is_published {
                query = query.bind(now);
            }
        }
        if let Some(tags) = &input.tags {
            query = query.bind(encode_list(tags));
        }
        query = query.bind(now).bind(id);

        let result = query
            .execute(&self.pool)
            .await
            .context("Failed to update news article")?;
        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("News article not found: {}", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("News article not found after update: {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete news article")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_published(
        &self,
        filter: &NewsFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<NewsArticle>> {
        let mut sql = String::from("SELECT * FROM news WHERE is_published = 1");
        push_filter_sql(&mut sql, filter);
        sql.push_str(" ORDER BY published_at DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list published news")?;

        rows.iter().map(row_to_news).collect()
    }

    async fn count_published(&self, filter: &NewsFilter) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS count FROM news WHERE is_published = 1");
        push_filter_sql(&mut sql, filter);

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let row = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count published news")?;
        Ok(row.get("count"))
    }
}

/// Build an UPDATE statement covering only the fields present in `input`.
///
/// Absent fields never appear in the SET clause, so two overlapping partial
/// updates to disjoint fields both land. Publishing stamps `published_at`
/// through COALESCE: the first transition wins and later edits keep it.
fn build_update_sql(input: &UpdateNewsInput, with_html: bool) -> String {
    let mut sets: Vec<&str> = Vec::new();
    if input.title.is_some() {
        sets.push("title = ?");
    }
    if input.summary.is_some() {
        sets.push("summary = ?");
    }
    if input.content.is_some() {
        sets.push("content = ?");
    }
    if with_html {
        sets.push("content_html = ?");
    }
    if input.category.is_some() {
        sets.push("category = ?");
    }
    if input.images.is_some() {
        sets.push("images = ?");
    }
    if input.videos.is_some() {
        sets.push("videos = ?");
    }
    if input.institution.is_some() {
        sets.push("institution = ?");
    }
    if input.location.is_some() {
        sets.push("location = ?");
    }
    if input.start_date.is_some() {
        sets.push("start_date = ?");
    }
    if input.end_date.is_some() {
        sets.push("end_date = ?");
    }
    match input.is_published {
        Some(true) => {
            sets.push("is_published = ?");
            sets.push("published_at = COALESCE(published_at, ?)");
        }
        Some(false) => sets.push("is_published = ?"),
        None => {}
    }
    if input.tags.is_some() {
        sets.push("tags = ?");
    }
    sets.push("updated_at = ?");
    format!("UPDATE news SET {} WHERE id = ?", sets.join(", "))
}

fn push_filter_sql(sql: &mut String, filter: &NewsFilter) {
    if filter.category.is_some() {
        sql.push_str(" AND category = ?");
    }
    if filter.search.is_some() {
        sql.push_str(" AND (title LIKE ? OR summary LIKE ? OR tags LIKE ?)");
    }
}

fn bind_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &NewsFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(category) = filter.category {
        query = query.bind(category.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    query
}

fn row_to_news(row: &SqliteRow) -> Result<NewsArticle> {
    let category: String = row.get("category");
    let images: String = row.get("images");
    let videos: String = row.get("videos");
    let tags: String = row.get("tags");

    Ok(NewsArticle {
        id: row.get("id"),
        title: row.get("title"),
        summary: row.get("summary"),
        content: row.get("content"),
        content_html: row.get("content_html"),
        category: NewsCategory::from_str(&category)?,
        images: decode_list(&images),
        videos: decode_list(&videos),
        institution: row.get("institution"),
        location: row.get("location"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_published: row.get("is_published"),
        published_at: row.get("published_at"),
        tags: decode_list(&tags),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    fn sample_input(title: &str, published: bool) -> CreateNewsInput {
        CreateNewsInput {
            title: title.to_string(),
            summary: "A short summary".to_string(),
            content: "Body text".to_string(),
            category: NewsCategory::Announcement,
            images: vec!["/uploads/one.jpg".to_string()],
            videos: vec![],
            institution: None,
            location: None,
            start_date: Utc::now(),
            end_date: None,
            is_published: published,
            tags: vec!["clinic".to_string()],
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let created = repo
            .create(&sample_input("Opening hours", false), "<p>Body text</p>")
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(created.published_at.is_none());

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Opening hours");
        assert_eq!(fetched.images, vec!["/uploads/one.jpg".to_string()]);
        assert_eq!(fetched.tags, vec!["clinic".to_string()]);
    }

    #[tokio::test]
    async fn test_published_listing_excludes_drafts() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        repo.create(&sample_input("Draft", false), "").await.unwrap();
        repo.create(&sample_input("Live", true), "").await.unwrap();

        let filter = NewsFilter::default();
        let published = repo.list_published(&filter, 0, 10).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Live");
        assert_eq!(repo.count_published(&filter).await.unwrap(), 1);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_search_filter_matches_title_and_tags() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let mut input = sample_input("Vaccination campaign", true);
        input.tags = vec!["outreach".to_string()];
        repo.create(&input, "").await.unwrap();
        repo.create(&sample_input("Unrelated", true), "").await.unwrap();

        let by_title = NewsFilter {
            search: Some("vaccination".to_string()),
            category: None,
        };
        assert_eq!(repo.list_published(&by_title, 0, 10).await.unwrap().len(), 1);

        let by_tag = NewsFilter {
            search: Some("outreach".to_string()),
            category: None,
        };
        assert_eq!(repo.list_published(&by_tag, 0, 10).await.unwrap().len(), 1);

        let miss = NewsFilter {
            search: Some("nonexistent".to_string()),
            category: None,
        };
        assert!(repo.list_published(&miss, 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_category_filter() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let mut event = sample_input("Health fair", true);
        event.category = NewsCategory::Event;
        repo.create(&event, "").await.unwrap();
        repo.create(&sample_input("Notice", true), "").await.unwrap();

        let filter = NewsFilter {
            search: None,
            category: Some(NewsCategory::Event),
        };
        let results = repo.list_published(&filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, NewsCategory::Event);
    }

    #[tokio::test]
    async fn test_partial_update_touches_only_given_fields() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let created = repo
            .create(&sample_input("Original", false), "<p>Body text</p>")
            .await
            .unwrap();

        let update = UpdateNewsInput {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = repo.update(created.id, &update, None).await.unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.summary, created.summary);
        assert_eq!(updated.content_html, created.content_html);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_sql_covers_only_present_fields() {
        let update = UpdateNewsInput {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let sql = build_update_sql(&update, false);
        assert!(sql.contains("title = ?"));
        assert!(sql.contains("updated_at = ?"));
        assert!(!sql.contains("summary"));
        assert!(!sql.contains("content"));
        assert!(!sql.contains("is_published"));
        assert!(!sql.contains("tags"));
    }

    #[tokio::test]
    async fn test_overlapping_disjoint_updates_both_land() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let created = repo
            .create(&sample_input("Original", true), "<p>Body text</p>")
            .await
            .unwrap();

        // Two editors save against the same snapshot, touching different fields
        let retitle = UpdateNewsInput {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let retag = UpdateNewsInput {
            tags: Some(vec!["outreach".to_string()]),
            ..Default::default()
        };
        repo.update(created.id, &retitle, None).await.unwrap();
        repo.update(created.id, &retag, None).await.unwrap();

        let after = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.tags, vec!["outreach".to_string()]);
    }

    #[tokio::test]
    async fn test_publishing_stamps_published_at_once() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let created = repo.create(&sample_input("Draft", false), "").await.unwrap();

        let publish = UpdateNewsInput {
            is_published: Some(true),
            ..Default::default()
        };
        let published = repo.update(created.id, &publish, None).await.unwrap();
        let first_stamp = published.published_at.expect("publish stamp set");

        // A later unrelated edit keeps the original stamp
        let retitle = UpdateNewsInput {
            title: Some("Still live".to_string()),
            ..Default::default()
        };
        let edited = repo.update(created.id, &retitle, None).await.unwrap();
        assert_eq!(edited.published_at, Some(first_stamp));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one_row() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxNewsRepository::new(pool);

        let first = repo.create(&sample_input("One", true), "").await.unwrap();
        repo.create(&sample_input("Two", true), "").await.unwrap();

        assert!(repo.delete(first.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id(first.id).await.unwrap().is_none());

        // Deleting again is a no-op
        assert!(!repo.delete(first.id).await.unwrap());
    }
}
