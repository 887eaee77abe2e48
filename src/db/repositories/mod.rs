//! Database repositories
//!
//! Repository pattern implementations for database access. Each repository
//! handles CRUD operations for a specific collection; the traits are the
//! narrow interface the rest of the application depends on, so the storage
//! backend stays swappable.

pub mod gallery;
pub mod news;
pub mod program;
pub mod subscriber;
pub mod user;

pub use gallery::{GalleryFilter, GalleryRepository, SqlxGalleryRepository};
pub use news::{NewsFilter, NewsRepository, SqlxNewsRepository};
pub use program::{ProgramFilter, ProgramRepository, SqlxProgramRepository};
pub use subscriber::{SqlxSubscriberRepository, SubscriberRepository};
pub use user::{SqlxUserRepository, UserProfile, UserRepository};

/// Encode a string list as a JSON text column value.
pub(crate) fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON text column value into a string list.
///
/// Malformed stored JSON degrades to an empty list rather than failing the
/// whole row.
pub(crate) fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
