//! News API endpoints
//!
//! Public routes only ever see published articles; the admin routes (behind
//! editor role) see everything, drafts included.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{NewsDetailResponse, PaginatedResponse};
use crate::db::repositories::NewsFilter;
use crate::models::{CreateNewsInput, ListParams, NewsArticle, NewsCategory, UpdateNewsInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published))
        .route("/{id}", get(get_published))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all))
        .route("/", post(create))
        .route("/{id}", get(get_any))
        .route("/{id}", put(update))
        .route("/{id}", delete(remove))
}

#[derive(Debug, Deserialize)]
struct NewsListQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl NewsListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }

    fn filter(&self) -> Result<NewsFilter, ApiError> {
        let category = match &self.category {
            Some(raw) => Some(
                NewsCategory::from_str(raw)
                    .map_err(|_| ApiError::validation_error(format!("Invalid category: {}", raw)))?,
            ),
            None => None,
        };
        Ok(NewsFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            category,
        })
    }
}

/// GET /api/v1/news - Published articles with search and category filter
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> Result<Json<PaginatedResponse<NewsArticle>>, ApiError> {
    let filter = query.filter()?;
    let result = state
        .news_service
        .list_published(&filter, &query.params())
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/news/{id} - Published article detail; drafts 404
async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsDetailResponse>, ApiError> {
    let article = state.news_service.get_published(id).await?;
    Ok(Json(article.into()))
}

/// GET /api/v1/admin/news - All articles, drafts included
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<NewsListQuery>,
) -> Result<Json<PaginatedResponse<NewsArticle>>, ApiError> {
    let result = state.news_service.list_all(&query.params()).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/admin/news/{id} - Any article, for edit-form pre-fill
async fn get_any(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsDetailResponse>, ApiError> {
    let article = state.news_service.get(id).await?;
    Ok(Json(article.into()))
}

/// POST /api/v1/admin/news - Create an article
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateNewsInput>,
) -> Result<Json<NewsArticle>, ApiError> {
    let article = state.news_service.create(&input).await?;
    Ok(Json(article))
}

/// PUT /api/v1/admin/news/{id} - Partial update
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateNewsInput>,
) -> Result<Json<NewsArticle>, ApiError> {
    let article = state.news_service.update(id, &input).await?;
    Ok(Json(article))
}

/// DELETE /api/v1/admin/news/{id}
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.news_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
