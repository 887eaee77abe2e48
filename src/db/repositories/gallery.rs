//! Gallery repository
//!
//! Database operations for gallery items. Kind and URL are always written
//! together (the service derives the kind from the upload MIME type before
//! calling in).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

use super::{decode_list, encode_list};
use crate::models::{
    CreateGalleryInput, GalleryCategory, GalleryItem, MediaKind, UpdateGalleryInput,
};

/// Server-side filter for public gallery queries
#[derive(Debug, Clone, Default)]
pub struct GalleryFilter {
    /// Free-text search over title, description and tags
    pub search: Option<String>,
    /// Category selection
    pub category: Option<GalleryCategory>,
    /// Media-kind selection
    pub kind: Option<MediaKind>,
}

/// Gallery repository trait
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    /// Create a new gallery item with the given derived media kind
    async fn create(&self, input: &CreateGalleryInput, kind: MediaKind) -> Result<GalleryItem>;

    /// Get item by id (any visibility)
    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryItem>>;

    /// List all items with pagination (drafts included)
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<GalleryItem>>;

    /// Count all items
    async fn count(&self) -> Result<i64>;

    /// Apply a partial update; when `new_kind` is set the media URL is
    /// being replaced and kind/URL change together.
    async fn update(
        &self,
        id: i64,
        input: &UpdateGalleryInput,
        new_kind: Option<MediaKind>,
    ) -> Result<GalleryItem>;

    /// Delete an item by id; returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;

    /// List published items matching the filter
    async fn list_published(
        &self,
        filter: &GalleryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<GalleryItem>>;

    /// Count published items matching the filter
    async fn count_published(&self, filter: &GalleryFilter) -> Result<i64>;
}

/// SQLx-based gallery repository implementation
pub struct SqlxGalleryRepository {
    pool: SqlitePool,
}

impl SqlxGalleryRepository {
    /// Create a new SQLx gallery repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn GalleryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl GalleryRepository for SqlxGalleryRepository {
    async fn create(&self, input: &CreateGalleryInput, kind: MediaKind) -> Result<GalleryItem> {
        let now = Utc::now();
        // Thumbnails only make sense for videos
        let thumbnail_url = match kind {
            MediaKind::Video => input.thumbnail_url.clone(),
            MediaKind::Image => None,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO gallery (title, description, kind, url, thumbnail_url, category,
                                 event_date, location, tags, is_published, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(kind.as_str())
        .bind(&input.url)
        .bind(&thumbnail_url)
        .bind(input.category.as_str())
        .bind(input.event_date)
        .bind(&input.location)
        .bind(encode_list(&input.tags))
        .bind(input.is_published)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create gallery item")?;

        Ok(GalleryItem {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            description: input.description.clone(),
            kind,
            url: input.url.clone(),
            thumbnail_url,
            category: input.category,
            event_date: input.event_date,
            location: input.location.clone(),
            tags: input.tags.clone(),
            is_published: input.is_published,
            created_at: now,
            updated_at: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<GalleryItem>> {
        let row = sqlx::query("SELECT * FROM gallery WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get gallery item")?;

        row.map(|row| row_to_gallery(&row)).transpose()
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<GalleryItem>> {
        let rows = sqlx::query("SELECT * FROM gallery ORDER BY event_date DESC LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list gallery items")?;

        rows.iter().map(row_to_gallery).collect()
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM gallery")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count gallery items")?;
        Ok(row.get("count"))
    }

    async fn update(
        &self,
        id: i64,
        input: &UpdateGalleryInput,
        new_kind: Option<MediaKind>,
    ) -> Result<GalleryItem> {
        // Read only to learn the resulting kind; absent fields are never
        // rewritten from this snapshot.
        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Gallery item not found: {}", id))?;

        let now = Utc::now();
        let media_change = match (&input.media, new_kind) {
            (Some(media), Some(kind)) => Some((media, kind)),
            _ => None,
        };
        let kind_after = new_kind.unwrap_or(existing.kind);
        let sql = build_update_sql(input, media_change.is_some(), kind_after);

        let mut query = sqlx::query(&sql);
        if let Some(title) = &input.title {
            query = query.bind(title);
        }
        if let Some(description) = &input.description {
            query = query.bind(description);
        }
        if let Some((media, kind)) = media_change {
            query = query.bind(kind.as_str()).bind(&media.url);
        }
        if kind_after == MediaKind::Video {
            if let Some(thumbnail_url) = &input.thumbnail_url {
                query = query.bind(thumbnail_url.clone());
            }
        }
        if let Some(category) = input.category {
            query = query.bind(category.as_str());
        }
        if let Some(event_date) = input.event_date {
            query = query.bind(event_date);
        }
        if let Some(location) = &input.location {
            query = query.bind(location.clone());
        }
        if let Some(tags) = &input.tags {
            query = query.bind(encode_list(tags));
        }
        if let Some(is_published) = input.is_published {
            query = query.bind(is_published);
        }
        query = query.bind(now).bind(id);

        query
            .execute(&self.pool)
            .await
            .context("Failed to update gallery item")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Gallery item not found after update: {}", id))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM gallery WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete gallery item")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_published(
        &self,
        filter: &GalleryFilter,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<GalleryItem>> {
        let mut sql = String::from("SELECT * FROM gallery WHERE is_published = 1");
        push_filter_sql(&mut sql, filter);
        sql.push_str(" ORDER BY event_date DESC LIMIT ? OFFSET ?");

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let rows = query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list published gallery items")?;

        rows.iter().map(row_to_gallery).collect()
    }

    async fn count_published(&self, filter: &GalleryFilter) -> Result<i64> {
        let mut sql = String::from("SELECT COUNT(*) AS count FROM gallery WHERE is_published = 1");
        push_filter_sql(&mut sql, filter);

        let mut query = sqlx::query(&sql);
        query = bind_filter(query, filter);
        let row = query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count published gallery items")?;
        Ok(row.get("count"))
    }
}

/// Build an UPDATE statement covering only the fields present in `input`.
///
/// Absent fields never appear in the SET clause, so two overlapping partial
/// updates to disjoint fields both land. A media replacement writes kind and
/// URL together; when the item ends up an image, the thumbnail is cleared
/// rather than taken from the input.
fn build_update_sql(
    input: &UpdateGalleryInput,
    media_replaced: bool,
    kind_after: MediaKind,
) -> String {
    let mut sets: Vec<&str> = Vec::new();
    if input.title.is_some() {
        sets.push("title = ?");
    }
    if input.description.is_some() {
        sets.push("description = ?");
    }
    if media_replaced {
        sets.push("kind = ?");
        sets.push("url = ?");
    }
    match kind_after {
        MediaKind::Video => {
            if input.thumbnail_url.is_some() {
                sets.push("thumbnail_url = ?");
            }
        }
        MediaKind::Image => {
            if media_replaced || input.thumbnail_url.is_some() {
                sets.push("thumbnail_url = NULL");
            }
        }
    }
    if input.category.is_some() {
        sets.push("category = ?");
    }
    if input.event_date.is_some() {
        sets.push("event_date = ?");
    }
    if input.location.is_some() {
        sets.push("location = ?");
    }
    if input.tags.is_some() {
        sets.push("tags = ?");
    }
    if input.is_published.is_some() {
        sets.push("is_published = ?");
    }
    sets.push("updated_at = ?");
    format!("UPDATE gallery SET {} WHERE id = ?", sets.join(", "))
}

fn push_filter_sql(sql: &mut String, filter: &GalleryFilter) {
    if filter.category.is_some() {
        sql.push_str(" AND category = ?");
    }
    if filter.kind.is_some() {
        sql.push_str(" AND kind = ?");
    }
    if filter.search.is_some() {
        sql.push_str(" AND (title LIKE ? OR description LIKE ? OR tags LIKE ?)");
    }
}

fn bind_filter<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    filter: &GalleryFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    if let Some(category) = filter.category {
        query = query.bind(category.as_str());
    }
    if let Some(kind) = filter.kind {
        query = query.bind(kind.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    query
}

fn row_to_gallery(row: &SqliteRow) -> Result<GalleryItem> {
    let kind: String = row.get("kind");
    let category: String = row.get("category");
    let tags: String = row.get("tags");

    Ok(GalleryItem {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        kind: MediaKind::from_str(&kind)?,
        url: row.get("url"),
        thumbnail_url: row.get("thumbnail_url"),
        category: GalleryCategory::from_str(&category)?,
        event_date: row.get("event_date"),
        location: row.get("location"),
        tags: decode_list(&tags),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::models::MediaChange;

    fn sample_input(title: &str, published: bool) -> CreateGalleryInput {
        CreateGalleryInput {
            title: title.to_string(),
            description: "Outreach day photo".to_string(),
            url: "/uploads/photo.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            thumbnail_url: None,
            category: GalleryCategory::Events,
            event_date: Utc::now(),
            location: None,
            tags: vec![],
            is_published: published,
        }
    }

    #[tokio::test]
    async fn test_published_listing_excludes_drafts() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        repo.create(&sample_input("Hidden", false), MediaKind::Image)
            .await
            .unwrap();
        repo.create(&sample_input("Visible", true), MediaKind::Image)
            .await
            .unwrap();

        let filter = GalleryFilter::default();
        let published = repo.list_published(&filter, 0, 10).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Visible");
    }

    #[tokio::test]
    async fn test_kind_filter() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        repo.create(&sample_input("Photo", true), MediaKind::Image)
            .await
            .unwrap();
        let mut video = sample_input("Clip", true);
        video.url = "/uploads/clip.mp4".to_string();
        video.content_type = "video/mp4".to_string();
        video.thumbnail_url = Some("/uploads/clip.jpg".to_string());
        repo.create(&video, MediaKind::Video).await.unwrap();

        let filter = GalleryFilter {
            kind: Some(MediaKind::Video),
            ..Default::default()
        };
        let results = repo.list_published(&filter, 0, 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, MediaKind::Video);
        assert!(results[0].thumbnail_url.is_some());
    }

    #[tokio::test]
    async fn test_image_never_stores_thumbnail() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let mut input = sample_input("Photo", true);
        input.thumbnail_url = Some("/uploads/ignored.jpg".to_string());
        let created = repo.create(&input, MediaKind::Image).await.unwrap();
        assert!(created.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_media_replacement_changes_kind_and_url_together() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let created = repo
            .create(&sample_input("Photo", true), MediaKind::Image)
            .await
            .unwrap();

        let update = UpdateGalleryInput {
            media: Some(MediaChange {
                url: "/uploads/replacement.mp4".to_string(),
                content_type: "video/mp4".to_string(),
            }),
            ..Default::default()
        };
        let updated = repo
            .update(created.id, &update, Some(MediaKind::Video))
            .await
            .unwrap();

        assert_eq!(updated.kind, MediaKind::Video);
        assert_eq!(updated.url, "/uploads/replacement.mp4");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_sql_covers_only_present_fields() {
        let update = UpdateGalleryInput {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let sql = build_update_sql(&update, false, MediaKind::Image);
        assert!(sql.contains("title = ?"));
        assert!(sql.contains("updated_at = ?"));
        assert!(!sql.contains("description"));
        assert!(!sql.contains("kind"));
        assert!(!sql.contains("thumbnail_url"));
        assert!(!sql.contains("is_published"));
    }

    #[tokio::test]
    async fn test_overlapping_disjoint_updates_both_land() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let created = repo
            .create(&sample_input("Photo", true), MediaKind::Image)
            .await
            .unwrap();

        // Two editors save against the same snapshot, touching different fields
        let retitle = UpdateGalleryInput {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };
        let relocate = UpdateGalleryInput {
            location: Some(Some("Field clinic".to_string())),
            ..Default::default()
        };
        repo.update(created.id, &retitle, None).await.unwrap();
        repo.update(created.id, &relocate, None).await.unwrap();

        let after = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(after.title, "Renamed");
        assert_eq!(after.location.as_deref(), Some("Field clinic"));
    }

    #[tokio::test]
    async fn test_media_swap_to_image_clears_thumbnail() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let mut video = sample_input("Clip", true);
        video.url = "/uploads/clip.mp4".to_string();
        video.content_type = "video/mp4".to_string();
        video.thumbnail_url = Some("/uploads/clip.jpg".to_string());
        let created = repo.create(&video, MediaKind::Video).await.unwrap();
        assert!(created.thumbnail_url.is_some());

        let update = UpdateGalleryInput {
            media: Some(MediaChange {
                url: "/uploads/still.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
            }),
            ..Default::default()
        };
        let updated = repo
            .update(created.id, &update, Some(MediaKind::Image))
            .await
            .unwrap();

        assert_eq!(updated.kind, MediaKind::Image);
        assert!(updated.thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxGalleryRepository::new(pool);

        let created = repo
            .create(&sample_input("Photo", true), MediaKind::Image)
            .await
            .unwrap();
        assert!(repo.delete(created.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
