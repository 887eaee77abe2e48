//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the CareBridge backend:
//! - Public content routes (news, programs, gallery) showing only the
//!   published/approved subset
//! - Admin routes behind identity verification and role middleware
//! - Auth sync bridge endpoints
//! - Upload, contact/donation relay, newsletter and site-surface routes
//! - SSE content event stream

pub mod auth;
pub mod contact;
pub mod events;
pub mod gallery;
pub mod middleware;
pub mod news;
pub mod programs;
pub mod responses;
pub mod site;
pub mod subscribers;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (editor role; role checks run after authentication)
    let editor_routes = Router::new()
        .nest("/admin/news", news::admin_router())
        .nest("/admin/programs", programs::admin_router())
        .nest("/admin/gallery", gallery::admin_router())
        .nest("/admin/subscribers", subscribers::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_editor))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but no particular role)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/upload", upload::router())
        .layer(DefaultBodyLimit::max(state.upload_config.max_request_size()))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/news", news::public_router())
        .nest("/programs", programs::public_router())
        .nest("/gallery", gallery::public_router())
        .nest("/subscribers", subscribers::public_router())
        .nest("/auth", auth::public_router())
        .nest("/site", site::router())
        .nest("/events", events::router())
        .merge(contact::router())
        .merge(editor_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let uploads_dir = state.upload_config.path.clone();

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .route("/robots.txt", get(site::robots_txt))
        .route("/sitemap.xml", get(site::sitemap_xml))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
