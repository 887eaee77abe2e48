//! Gallery API endpoints
//!
//! Public listing supports search, category and media-kind filters; detail
//! is gated on `is_published`.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PaginatedResponse;
use crate::db::repositories::GalleryFilter;
use crate::models::{
    CreateGalleryInput, GalleryCategory, GalleryItem, ListParams, MediaKind, UpdateGalleryInput,
};
use crate::services::ServiceError;

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
struct GalleryListQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

impl GalleryListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }

    fn filter(&self) -> Result<GalleryFilter, ApiError> {
        let category = match &self.category {
            Some(raw) => Some(
                GalleryCategory::from_str(raw)
                    .map_err(|_| ApiError::validation_error(format!("Invalid category: {}", raw)))?,
            ),
            None => None,
        };
        let kind = match &self.kind {
            Some(raw) => Some(
                MediaKind::from_str(raw)
                    .map_err(|_| ApiError::validation_error(format!("Invalid media kind: {}", raw)))?,
            ),
            None => None,
        };
        Ok(GalleryFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            category,
            kind,
        })
    }
}

/// GET /api/v1/gallery - Published items with filters
async fn list_published(
    State(state): State<AppState>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<PaginatedResponse<GalleryItem>>, ApiError> {
    let filter = query.filter()?;
    let result = state
        .gallery_service
        .list_published(&filter, &query.params())
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/gallery/{id} - Published item detail; drafts 404
async fn get_published(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GalleryItem>, ApiError> {
    let item = state.gallery_service.get(id).await?;
    if !item.is_published {
        return Err(ServiceError::NotFound("Gallery item").into());
    }
    Ok(Json(item))
}

/// GET /api/v1/admin/gallery - All items, drafts included
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<GalleryListQuery>,
) -> Result<Json<PaginatedResponse<GalleryItem>>, ApiError> {
    let result = state.gallery_service.list_all(&query.params()).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/admin/gallery/{id} - Any item, for edit-form pre-fill
async fn get_any(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<GalleryItem>, ApiError> {
    let item = state.gallery_service.get(id).await?;
    Ok(Json(item))
}

/// POST /api/v1/admin/gallery - Create an item
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateGalleryInput>,
) -> Result<Json<GalleryItem>, ApiError> {
    let item = state.gallery_service.create(&input).await?;
    Ok(Json(item))
}

/// PUT /api/v1/admin/gallery/{id} - Partial update
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateGalleryInput>,
) -> Result<Json<GalleryItem>, ApiError> {
    let item = state.gallery_service.update(id, &input).await?;
    Ok(Json(item))
}

/// DELETE /api/v1/admin/gallery/{id}
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.gallery_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
