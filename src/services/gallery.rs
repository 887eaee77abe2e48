//! Gallery service
//!
//! Derives the media kind from the upload MIME type and keeps the
//! thumbnail rule (videos only) before handing off to the repository.

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::db::repositories::{GalleryFilter, GalleryRepository};
use crate::events::{ChangeAction, Collection, ContentEvent, EventBus};
use crate::models::{
    CreateGalleryInput, GalleryItem, ListParams, MediaKind, PagedResult, UpdateGalleryInput,
};

pub struct GalleryService {
    repo: Arc<dyn GalleryRepository>,
    events: EventBus,
}

impl GalleryService {
    pub fn new(repo: Arc<dyn GalleryRepository>, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Create a gallery item. The stored kind comes from the upload's MIME
    /// type; an unrecognized type is a validation error.
    pub async fn create(&self, input: &CreateGalleryInput) -> ServiceResult<GalleryItem> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::validation("Title is required"));
        }
        if input.url.trim().is_empty() {
            return Err(ServiceError::validation("Media URL is required"));
        }
        let kind = MediaKind::from_mime(&input.content_type).ok_or_else(|| {
            ServiceError::validation(format!(
                "Unsupported media type: {}",
                input.content_type
            ))
        })?;

        let item = self.repo.create(input, kind).await?;
        self.events.publish(ContentEvent::new(
            Collection::Gallery,
            ChangeAction::Created,
            item.id,
        ));
        Ok(item)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<GalleryItem> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("Gallery item"))
    }

    /// List all items for the dashboard, drafts included.
    pub async fn list_all(&self, params: &ListParams) -> ServiceResult<PagedResult<GalleryItem>> {
        let items = self.repo.list(params.offset(), params.limit()).await?;
        let total = self.repo.count().await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// List published items matching the filter, for the public site.
    pub async fn list_published(
        &self,
        filter: &GalleryFilter,
        params: &ListParams,
    ) -> ServiceResult<PagedResult<GalleryItem>> {
        let items = self
            .repo
            .list_published(filter, params.offset(), params.limit())
            .await?;
        let total = self.repo.count_published(filter).await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// Apply a partial update. When the media is being replaced the kind is
    /// re-derived from the new MIME type so URL and kind change together.
    pub async fn update(&self, id: i64, input: &UpdateGalleryInput) -> ServiceResult<GalleryItem> {
        if !input.has_changes() {
            return self.get(id).await;
        }
        if matches!(&input.title, Some(title) if title.trim().is_empty()) {
            return Err(ServiceError::validation("Title cannot be empty"));
        }

        let new_kind = match &input.media {
            Some(media) => Some(MediaKind::from_mime(&media.content_type).ok_or_else(|| {
                ServiceError::validation(format!(
                    "Unsupported media type: {}",
                    media.content_type
                ))
            })?),
            None => None,
        };

        self.get(id).await?;

        let item = self.repo.update(id, input, new_kind).await?;
        self.events.publish(ContentEvent::new(
            Collection::Gallery,
            ChangeAction::Updated,
            id,
        ));
        Ok(item)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound("Gallery item"));
        }
        self.events.publish(ContentEvent::new(
            Collection::Gallery,
            ChangeAction::Deleted,
            id,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxGalleryRepository;
    use crate::models::{GalleryCategory, MediaChange};
    use chrono::Utc;

    async fn service() -> (GalleryService, EventBus) {
        let pool = create_test_pool().await.unwrap();
        let events = EventBus::new(16);
        (
            GalleryService::new(SqlxGalleryRepository::boxed(pool), events.clone()),
            events,
        )
    }

    fn input(content_type: &str) -> CreateGalleryInput {
        CreateGalleryInput {
            title: "Outreach day".to_string(),
            description: "Photos from the field".to_string(),
            url: "/uploads/a.jpg".to_string(),
            content_type: content_type.to_string(),
            thumbnail_url: None,
            category: GalleryCategory::Events,
            event_date: Utc::now(),
            location: None,
            tags: vec![],
            is_published: true,
        }
    }

    #[tokio::test]
    async fn test_kind_derived_from_mime() {
        let (service, _) = service().await;
        let image = service.create(&input("image/png")).await.unwrap();
        assert_eq!(image.kind, MediaKind::Image);

        let video = service.create(&input("video/mp4")).await.unwrap();
        assert_eq!(video.kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn test_unsupported_mime_rejected() {
        let (service, _) = service().await;
        assert!(matches!(
            service.create(&input("application/pdf")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_media_replacement_rederives_kind() {
        let (service, _) = service().await;
        let item = service.create(&input("image/png")).await.unwrap();

        let update = UpdateGalleryInput {
            media: Some(MediaChange {
                url: "/uploads/clip.mp4".to_string(),
                content_type: "video/mp4".to_string(),
            }),
            ..Default::default()
        };
        let updated = service.update(item.id, &update).await.unwrap();
        assert_eq!(updated.kind, MediaKind::Video);
        assert_eq!(updated.url, "/uploads/clip.mp4");
    }

    #[tokio::test]
    async fn test_mutations_publish_events() {
        let (service, events) = service().await;
        let mut rx = events.subscribe();

        let item = service.create(&input("image/png")).await.unwrap();
        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, Collection::Gallery);
        assert_eq!(event.action, ChangeAction::Created);

        service.delete(item.id).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().action, ChangeAction::Deleted);
    }
}
