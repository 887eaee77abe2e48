//! API middleware
//!
//! Authentication (identity token verification) and authorization (role
//! checks) for the admin surface. Roles always come from our own user
//! records, never from token claims, so a revoked editor loses access the
//! moment their row changes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{AuthConfig, SiteConfig, UploadConfig};
use crate::db::repositories::UserRepository;
use crate::events::EventBus;
use crate::identity;
use crate::models::{User, UserRole};
use crate::services::{
    email::EmailService, gallery::GalleryService, news::NewsService, program::ProgramService,
    subscriber::SubscriberService, user_sync::UserSyncService, ServiceError,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub user_repo: Arc<dyn UserRepository>,
    pub user_sync: Arc<UserSyncService>,
    pub news_service: Arc<NewsService>,
    pub program_service: Arc<ProgramService>,
    pub gallery_service: Arc<GalleryService>,
    pub subscriber_service: Arc<SubscriberService>,
    pub email_service: Arc<EmailService>,
    pub events: EventBus,
    pub auth_config: Arc<AuthConfig>,
    pub upload_config: Arc<UploadConfig>,
    pub site_config: Arc<SiteConfig>,
}

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::Validation(message) => ApiError::validation_error(message),
            ServiceError::Internal(error) => {
                tracing::error!(error = %error, "internal service error");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

/// Authentication middleware: verify the bearer token and attach the
/// matching user record to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = identity::bearer_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let claims = identity::verify_token(&state.auth_config, token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    let user = state
        .user_repo
        .get_by_external_id(&claims.sub)
        .await
        .map_err(|e| ApiError::internal_error(format!("User lookup failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Unknown user; session not synced"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Editor authorization middleware
pub async fn require_editor(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_editor() {
        return Err(ApiError::forbidden("Editor privileges required"));
    }

    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if user.0.role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn role_strategy() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::Admin),
            Just(UserRole::Editor),
            Just(UserRole::Patient),
            Just(UserRole::User),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn editor_privileges_match_role(role in role_strategy()) {
            let user = User {
                id: 1,
                external_id: "ext_abc".to_string(),
                email: "test@example.org".to_string(),
                first_name: None,
                last_name: None,
                avatar_url: None,
                role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            let expected = matches!(role, UserRole::Admin | UserRole::Editor);
            prop_assert_eq!(user.is_editor(), expected);
            prop_assert_eq!(user.is_admin(), matches!(role, UserRole::Admin));
        }
    }
}
