//! Auth API endpoints
//!
//! The server never issues credentials; these endpoints bridge the external
//! identity provider into our user table. `sync` runs on session start and
//! is deliberately callable before any user row exists, so it verifies the
//! token itself instead of sitting behind the auth middleware.

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::identity;
use crate::models::User;

/// Routes that work without an existing user record
pub fn public_router() -> Router<AppState> {
    Router::new().route("/sync", post(sync_user))
}

/// Routes behind the auth middleware
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[derive(Debug, Serialize)]
struct SyncResponse {
    user: User,
}

/// POST /api/v1/auth/sync - Mirror verified identity claims into the users table
async fn sync_user(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> Result<Json<SyncResponse>, ApiError> {
    let token = identity::bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;
    let claims = identity::verify_token(&state.auth_config, token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    let user = state.user_sync.sync(&claims).await?;
    Ok(Json(SyncResponse { user }))
}

/// GET /api/v1/auth/me - Return the synced profile of the caller
async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
