//! Upload API endpoints
//!
//! Three multipart routes distinguished by what they accept:
//! - gallery: exactly one file, images only
//! - news / programs: up to `max_files` files, images and videos
//!
//! Accepted files land in the configured upload directory under UUID names
//! and are served statically from `/uploads`.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState};
use crate::config::UploadConfig;

/// One accepted file
#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub url: String,
    pub content_type: String,
    pub original_name: String,
}

/// Response for multi-file uploads
#[derive(Debug, Serialize)]
pub struct MultiUploadResponse {
    pub files: Vec<UploadedFile>,
    pub failed: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gallery", post(upload_gallery_media))
        .route("/news", post(upload_news_media))
        .route("/programs", post(upload_program_media))
}

/// POST /api/v1/upload/gallery - Single image for a gallery item
async fn upload_gallery_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadedFile>, ApiError> {
    let config = &state.upload_config;
    ensure_upload_dir(&config.path).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_image_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "Invalid file type: {}",
                content_type
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to read file: {}", e)))?;

        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} MB",
                config.max_file_size / 1024 / 1024
            )));
        }

        let file = store_file(config, &original_name, &content_type, &data).await?;
        return Ok(Json(file));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// POST /api/v1/upload/news - Media files for a news article
async fn upload_news_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MultiUploadResponse>, ApiError> {
    upload_many(&state, multipart).await
}

/// POST /api/v1/upload/programs - Media files for a program
async fn upload_program_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<MultiUploadResponse>, ApiError> {
    upload_many(&state, multipart).await
}

async fn upload_many(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<Json<MultiUploadResponse>, ApiError> {
    let config = &state.upload_config;
    ensure_upload_dir(&config.path).await?;

    let mut files = Vec::new();
    let mut failed = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "files" && name != "file" {
            continue;
        }

        if files.len() >= config.max_files {
            failed.push("Too many files in one request".to_string());
            break;
        }

        let original_name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_media_allowed(&content_type) {
            failed.push(format!("{}: invalid type {}", original_name, content_type));
            continue;
        }

        let data = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                failed.push(format!("{}: {}", original_name, e));
                continue;
            }
        };

        if data.len() as u64 > config.max_file_size {
            failed.push(format!(
                "{}: file too large (max {} MB)",
                original_name,
                config.max_file_size / 1024 / 1024
            ));
            continue;
        }

        match store_file(config, &original_name, &content_type, &data).await {
            Ok(file) => files.push(file),
            Err(e) => failed.push(format!("{}: {}", original_name, e.error.message)),
        }
    }

    Ok(Json(MultiUploadResponse { files, failed }))
}

async fn store_file(
    config: &UploadConfig,
    original_name: &str,
    content_type: &str,
    data: &[u8],
) -> Result<UploadedFile, ApiError> {
    let ext = file_extension(original_name, content_type);
    let filename = format!("{}.{}", Uuid::new_v4(), ext);
    let path = config.path.join(&filename);

    fs::write(&path, data)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

    Ok(UploadedFile {
        url: format!("/uploads/{}", filename),
        content_type: content_type.to_string(),
        original_name: original_name.to_string(),
    })
}

async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}

/// Pick a file extension from the original name, falling back to the MIME type
fn file_extension(filename: &str, content_type: &str) -> String {
    if let Some(ext) = filename.rsplit('.').next() {
        if ext != filename && !ext.is_empty() && ext.len() < 10 {
            return ext.to_lowercase();
        }
    }

    match content_type {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/webp" => "webp".to_string(),
        "video/mp4" => "mp4".to_string(),
        "video/webm" => "webm".to_string(),
        "video/quicktime" => "mov".to_string(),
        _ => "bin".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_route_rejects_video_types() {
        // The gallery upload is images only; videos go through news/programs
        let config = UploadConfig::default();
        for mime in ["video/mp4", "video/webm", "video/quicktime"] {
            assert!(config.is_media_allowed(mime));
            assert!(!config.is_image_allowed(mime));
        }
        assert!(config.is_image_allowed("image/jpeg"));
    }

    #[test]
    fn test_extension_from_filename() {
        assert_eq!(file_extension("photo.JPG", "image/jpeg"), "jpg");
        assert_eq!(file_extension("clip.mp4", "video/mp4"), "mp4");
    }

    #[test]
    fn test_extension_falls_back_to_mime() {
        assert_eq!(file_extension("noext", "image/png"), "png");
        assert_eq!(file_extension("noext", "video/quicktime"), "mov");
        assert_eq!(file_extension("noext", "application/octet-stream"), "bin");
    }

    #[tokio::test]
    async fn test_store_file_writes_under_uuid_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = UploadConfig {
            path: dir.path().to_path_buf(),
            ..Default::default()
        };

        let file = store_file(&config, "photo.jpg", "image/jpeg", b"abc")
            .await
            .unwrap();
        assert!(file.url.starts_with("/uploads/"));
        assert!(file.url.ends_with(".jpg"));
        assert_eq!(file.original_name, "photo.jpg");

        let stored = dir.path().join(file.url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(stored).unwrap(), b"abc");
    }
}
