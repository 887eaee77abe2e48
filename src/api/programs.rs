//! Program API endpoints
//!
//! Public visibility is gated by `is_approved`; `featured=true` narrows the
//! listing to the promoted subset shown on the home page.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{PaginatedResponse, ProgramDetailResponse};
use crate::db::repositories::ProgramFilter;
use crate::models::{CreateProgramInput, ListParams, Program, ProgramStatus, UpdateProgramInput};

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_approved))
        .route("/{id}", get(get_approved))
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
struct ProgramListQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    featured: Option<bool>,
}

impl ProgramListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }

    fn filter(&self) -> Result<ProgramFilter, ApiError> {
        let status = match &self.status {
            Some(raw) => Some(
                ProgramStatus::from_str(raw)
                    .map_err(|_| ApiError::validation_error(format!("Invalid status: {}", raw)))?,
            ),
            None => None,
        };
        Ok(ProgramFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            status,
            featured_only: self.featured.unwrap_or(false),
        })
    }
}

/// GET /api/v1/programs - Approved programs with status/featured filters
async fn list_approved(
    State(state): State<AppState>,
    Query(query): Query<ProgramListQuery>,
) -> Result<Json<PaginatedResponse<Program>>, ApiError> {
    let filter = query.filter()?;
    let result = state
        .program_service
        .list_approved(&filter, &query.params())
        .await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/programs/{id} - Approved program detail; unapproved 404
async fn get_approved(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProgramDetailResponse>, ApiError> {
    let program = state.program_service.get_approved(id).await?;
    Ok(Json(program.into()))
}

/// GET /api/v1/admin/programs - All programs, unapproved included
async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<ProgramListQuery>,
) -> Result<Json<PaginatedResponse<Program>>, ApiError> {
    let result = state.program_service.list_all(&query.params()).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/admin/programs/{id} - Any program, for edit-form pre-fill
async fn get_any(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProgramDetailResponse>, ApiError> {
    let program = state.program_service.get(id).await?;
    Ok(Json(program.into()))
}

/// POST /api/v1/admin/programs - Create a program
async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProgramInput>,
) -> Result<Json<Program>, ApiError> {
    let program = state.program_service.create(&input).await?;
    Ok(Json(program))
}

/// PUT /api/v1/admin/programs/{id} - Partial update
async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateProgramInput>,
) -> Result<Json<Program>, ApiError> {
    let program = state.program_service.update(id, &input).await?;
    Ok(Json(program))
}

/// DELETE /api/v1/admin/programs/{id}
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.program_service.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
