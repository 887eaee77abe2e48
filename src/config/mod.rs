//! Configuration management
//!
//! This module handles loading and parsing configuration for the CareBridge
//! backend. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Identity/auth configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// Outbound email configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Public site metadata
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead so the
    /// server can start with nothing but a JWT secret in the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("CAREBRIDGE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("CAREBRIDGE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(port) = std::env::var("CAREBRIDGE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(base_url) = std::env::var("CAREBRIDGE_BASE_URL") {
            self.site.base_url = base_url;
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (the website frontend)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/carebridge.db".to_string()
}

/// Identity/auth configuration
///
/// Sign-in itself is owned by the external identity provider; this server
/// only verifies the tokens it issues and reads the claims inside them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify identity-provider JWTs (HS256)
    #[serde(default)]
    pub jwt_secret: String,
    /// Expected token issuer (checked when set)
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 16MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum number of files per multi-file request
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Allowed image MIME types
    #[serde(default = "default_image_types")]
    pub allowed_image_types: Vec<String>,
    /// Allowed video MIME types
    #[serde(default = "default_video_types")]
    pub allowed_video_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            max_files: default_max_files(),
            allowed_image_types: default_image_types(),
            allowed_video_types: default_video_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    16 * 1024 * 1024 // 16MB
}

fn default_max_files() -> usize {
    10
}

fn default_image_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

fn default_video_types() -> Vec<String> {
    vec![
        "video/mp4".to_string(),
        "video/webm".to_string(),
        "video/quicktime".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is an allowed image type
    pub fn is_image_allowed(&self, mime_type: &str) -> bool {
        self.allowed_image_types.iter().any(|t| t == mime_type)
    }

    /// Check if a MIME type is an allowed video type
    pub fn is_video_allowed(&self, mime_type: &str) -> bool {
        self.allowed_video_types.iter().any(|t| t == mime_type)
    }

    /// Check if a MIME type is allowed at all (image or video)
    pub fn is_media_allowed(&self, mime_type: &str) -> bool {
        self.is_image_allowed(mime_type) || self.is_video_allowed(mime_type)
    }

    /// Largest request body the upload routes should accept:
    /// every file at the size cap, plus some multipart framing slack.
    pub fn max_request_size(&self) -> usize {
        (self.max_file_size as usize) * self.max_files + 1024 * 1024
    }
}

/// Outbound email (SMTP) configuration for the contact/donation relays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay hostname; empty disables outbound email
    #[serde(default)]
    pub smtp_host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password
    #[serde(default)]
    pub smtp_password: String,
    /// From address for relayed messages
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Display name on relayed messages
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Recipient inbox for contact and donation submissions
    #[serde(default = "default_recipient")]
    pub recipient: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            recipient: default_recipient(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "noreply@carebridge.org".to_string()
}

fn default_from_name() -> String {
    "CareBridge".to_string()
}

fn default_recipient() -> String {
    "info@carebridge.org".to_string()
}

/// Public site metadata served to the frontend and used by the sitemap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site display name
    #[serde(default = "default_site_name")]
    pub name: String,
    /// Short site description
    #[serde(default = "default_site_description")]
    pub description: String,
    /// Canonical base URL (used in sitemap entries)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            description: default_site_description(),
            base_url: default_base_url(),
        }
    }
}

fn default_site_name() -> String {
    "CareBridge".to_string()
}

fn default_site_description() -> String {
    "Community health programs, news and services".to_string()
}

fn default_base_url() -> String {
    "https://carebridge.org".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/carebridge.db");
        assert!(config.auth.jwt_secret.is_empty());
        assert_eq!(config.upload.max_files, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load(Path::new("does-not-exist.yml")).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.site.name, "CareBridge");
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "server:\n  port: 9000\nauth:\n  jwt_secret: test-secret\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.jwt_secret, "test-secret");
        // Untouched sections fall back to defaults
        assert_eq!(config.database.url, "data/carebridge.db");
    }

    #[test]
    fn test_upload_mime_checks() {
        let config = UploadConfig::default();
        assert!(config.is_image_allowed("image/png"));
        assert!(config.is_video_allowed("video/mp4"));
        assert!(!config.is_image_allowed("video/mp4"));
        assert!(!config.is_media_allowed("application/pdf"));
    }
}
