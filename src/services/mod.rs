//! Business logic services
//!
//! Services sit between the HTTP handlers and the repositories: they own
//! validation, markdown rendering, media-kind derivation and event
//! publication. Handlers stay thin and repositories stay dumb.

pub mod email;
pub mod gallery;
pub mod markdown;
pub mod media;
pub mod news;
pub mod program;
pub mod subscriber;
pub mod user_sync;

use thiserror::Error;

/// Errors surfaced by the service layer.
///
/// Validation failures carry a message safe to show to API clients;
/// everything else is collapsed into `Internal` and logged at the boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
