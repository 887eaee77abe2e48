//! Shared API response types
//!
//! Common response structures used across endpoints so listing and detail
//! shapes stay consistent.

use serde::Serialize;

use crate::models::{NewsArticle, PagedResult, Program};
use crate::services::media::{combined_media, MediaEntry};

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl<T> From<PagedResult<T>> for PaginatedResponse<T> {
    fn from(result: PagedResult<T>) -> Self {
        let total_pages = result.total_pages();
        Self {
            items: result.items,
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// News detail with the combined media strip used by the lightbox
#[derive(Debug, Serialize)]
pub struct NewsDetailResponse {
    #[serde(flatten)]
    pub article: NewsArticle,
    pub media: Vec<MediaEntry>,
}

impl From<NewsArticle> for NewsDetailResponse {
    fn from(article: NewsArticle) -> Self {
        let media = combined_media(&article.images, &article.videos);
        Self { article, media }
    }
}

/// Program detail with the combined media strip
#[derive(Debug, Serialize)]
pub struct ProgramDetailResponse {
    #[serde(flatten)]
    pub program: Program,
    pub media: Vec<MediaEntry>,
}

impl From<Program> for ProgramDetailResponse {
    fn from(program: Program) -> Self {
        let media = combined_media(&program.images, &program.videos);
        Self { program, media }
    }
}
