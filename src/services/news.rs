//! News service
//!
//! Validation, markdown rendering and change-event publication around the
//! news repository.

use std::sync::Arc;

use super::{markdown, ServiceError, ServiceResult};
use crate::db::repositories::{NewsFilter, NewsRepository};
use crate::events::{ChangeAction, Collection, ContentEvent, EventBus};
use crate::models::{CreateNewsInput, ListParams, NewsArticle, PagedResult, UpdateNewsInput};

pub struct NewsService {
    repo: Arc<dyn NewsRepository>,
    events: EventBus,
}

impl NewsService {
    pub fn new(repo: Arc<dyn NewsRepository>, events: EventBus) -> Self {
        Self { repo, events }
    }

    /// Create an article. Title, summary and content are required; the
    /// markdown body is rendered to HTML before storage.
    pub async fn create(&self, input: &CreateNewsInput) -> ServiceResult<NewsArticle> {
        validate_required(input)?;
        let content_html = markdown::render(&input.content);
        let article = self.repo.create(input, &content_html).await?;
        self.events
            .publish(ContentEvent::new(Collection::News, ChangeAction::Created, article.id));
        Ok(article)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<NewsArticle> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("News article"))
    }

    /// List all articles for the dashboard, drafts included.
    pub async fn list_all(&self, params: &ListParams) -> ServiceResult<PagedResult<NewsArticle>> {
        let items = self.repo.list(params.offset(), params.limit()).await?;
        let total = self.repo.count().await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// List published articles matching the filter, for the public site.
    pub async fn list_published(
        &self,
        filter: &NewsFilter,
        params: &ListParams,
    ) -> ServiceResult<PagedResult<NewsArticle>> {
        let items = self
            .repo
            .list_published(filter, params.offset(), params.limit())
            .await?;
        let total = self.repo.count_published(filter).await?;
        Ok(PagedResult::new(items, total, params))
    }

    /// Get a single published article, for the public site.
    pub async fn get_published(&self, id: i64) -> ServiceResult<NewsArticle> {
        let article = self.get(id).await?;
        if !article.is_published {
            return Err(ServiceError::NotFound("News article"));
        }
        Ok(article)
    }

    /// Apply a partial update. A no-op payload returns the article
    /// unchanged without touching the database.
    pub async fn update(&self, id: i64, input: &UpdateNewsInput) -> ServiceResult<NewsArticle> {
        if !input.has_changes() {
            return self.get(id).await;
        }
        if matches!(&input.title, Some(title) if title.trim().is_empty()) {
            return Err(ServiceError::validation("Title cannot be empty"));
        }
        if matches!(&input.summary, Some(summary) if summary.trim().is_empty()) {
            return Err(ServiceError::validation("Summary cannot be empty"));
        }
        if matches!(&input.content, Some(content) if content.trim().is_empty()) {
            return Err(ServiceError::validation("Content cannot be empty"));
        }

        // Exists check up front so a bad id is NotFound, not Internal
        self.get(id).await?;

        let content_html = input.content.as_deref().map(markdown::render);
        let article = self.repo.update(id, input, content_html.as_deref()).await?;
        self.events
            .publish(ContentEvent::new(Collection::News, ChangeAction::Updated, id));
        Ok(article)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::NotFound("News article"));
        }
        self.events
            .publish(ContentEvent::new(Collection::News, ChangeAction::Deleted, id));
        Ok(())
    }
}

fn validate_required(input: &CreateNewsInput) -> ServiceResult<()> {
    if input.title.trim().is_empty() {
        return Err(ServiceError::validation("Title is required"));
    }
    if input.summary.trim().is_empty() {
        return Err(ServiceError::validation("Summary is required"));
    }
    if input.content.trim().is_empty() {
        return Err(ServiceError::validation("Content is required"));
    }
    Ok(())
}
