//! CareBridge - content management backend for a health-focused NGO website

use anyhow::{bail, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carebridge::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxGalleryRepository, SqlxNewsRepository, SqlxProgramRepository,
            SqlxSubscriberRepository, SqlxUserRepository,
        },
    },
    events::EventBus,
    services::{
        email::EmailService,
        gallery::GalleryService,
        news::NewsService,
        program::ProgramService,
        subscriber::SubscriberService,
        user_sync::UserSyncService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carebridge=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CareBridge content backend...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Refuse to serve without identity configuration. Every admin operation
    // depends on verified claims, so a missing secret is a deployment error,
    // not something to limp along without.
    if config.auth.jwt_secret.is_empty() {
        bail!(
            "Identity configuration missing: auth.jwt_secret is empty. \
             Set it in config.yml or via CAREBRIDGE_JWT_SECRET."
        );
    }

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Content event bus (replaces the hosted database's reactive push)
    let events = EventBus::new(256);

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let news_repo = SqlxNewsRepository::boxed(pool.clone());
    let program_repo = SqlxProgramRepository::boxed(pool.clone());
    let gallery_repo = SqlxGalleryRepository::boxed(pool.clone());
    let subscriber_repo = SqlxSubscriberRepository::boxed(pool.clone());

    // Initialize services
    let user_sync = Arc::new(UserSyncService::new(user_repo.clone()));
    let news_service = Arc::new(NewsService::new(news_repo, events.clone()));
    let program_service = Arc::new(ProgramService::new(program_repo, events.clone()));
    let gallery_service = Arc::new(GalleryService::new(gallery_repo, events.clone()));
    let subscriber_service = Arc::new(SubscriberService::new(subscriber_repo));
    let email_service = Arc::new(EmailService::new(config.email.clone()));

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        user_repo,
        user_sync,
        news_service,
        program_service,
        gallery_service,
        subscriber_service,
        email_service,
        events,
        auth_config: Arc::new(config.auth.clone()),
        upload_config: Arc::new(config.upload.clone()),
        site_config: Arc::new(config.site.clone()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
