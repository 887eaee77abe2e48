//! Newsletter subscriber endpoints
//!
//! Subscribing is public; listing sits on the editor-gated dashboard
//! surface alongside the other content management routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::PaginatedResponse;
use crate::models::{ListParams, Subscriber};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/", post(subscribe))
}

pub fn admin_router() -> Router<AppState> {
    Router::new().route("/", get(list))
}

#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    per_page: Option<u32>,
}

/// POST /api/v1/subscribers - Subscribe an email address (idempotent)
async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<Subscriber>, ApiError> {
    let subscriber = state.subscriber_service.subscribe(&request.email).await?;
    Ok(Json(subscriber))
}

/// GET /api/v1/admin/subscribers - List subscribers (editor role or above)
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PaginatedResponse<Subscriber>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));
    let result = state.subscriber_service.list(&params).await?;
    Ok(Json(result.into()))
}
