//! Gallery item model
//!
//! A gallery item holds exactly one piece of media: an image or a video,
//! never both. The kind is derived from the uploaded file's MIME type so
//! the two can never disagree.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gallery item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Unique identifier
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Media kind (image or video)
    pub kind: MediaKind,
    /// Media URL
    pub url: String,
    /// Thumbnail URL (videos only)
    pub thumbnail_url: Option<String>,
    /// Category
    pub category: GalleryCategory,
    /// When the pictured event took place
    pub event_date: DateTime<Utc>,
    /// Location, if any
    pub location: Option<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Public visibility flag
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (set on every edit)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Media kind, mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image
    Image,
    /// Video
    Video,
}

impl MediaKind {
    /// Derive the media kind from an upload's MIME type.
    ///
    /// This is the single source of truth for the kind/MIME invariant:
    /// `video/*` is always a video, `image/*` always an image, anything
    /// else is neither.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        if mime_type.starts_with("video/") {
            Some(MediaKind::Video)
        } else if mime_type.starts_with("image/") {
            Some(MediaKind::Image)
        } else {
            None
        }
    }

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            _ => Err(anyhow::anyhow!("Invalid media kind: {}", s)),
        }
    }
}

/// Gallery category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryCategory {
    /// Events and campaigns
    Events,
    /// Program activities
    Programs,
    /// Buildings and equipment
    Facilities,
    /// Team members
    Staff,
    /// Community outreach
    Community,
}

impl Default for GalleryCategory {
    fn default() -> Self {
        Self::Events
    }
}

impl GalleryCategory {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryCategory::Events => "events",
            GalleryCategory::Programs => "programs",
            GalleryCategory::Facilities => "facilities",
            GalleryCategory::Staff => "staff",
            GalleryCategory::Community => "community",
        }
    }
}

impl fmt::Display for GalleryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GalleryCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "events" => Ok(GalleryCategory::Events),
            "programs" => Ok(GalleryCategory::Programs),
            "facilities" => Ok(GalleryCategory::Facilities),
            "staff" => Ok(GalleryCategory::Staff),
            "community" => Ok(GalleryCategory::Community),
            _ => Err(anyhow::anyhow!("Invalid gallery category: {}", s)),
        }
    }
}

/// Input for creating a gallery item; doubles as the editable draft shape.
///
/// The caller supplies the uploaded file's `content_type` rather than a
/// media kind; the service derives the kind from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGalleryInput {
    pub title: String,
    pub description: String,
    pub url: String,
    /// MIME type reported by the upload route for `url`
    pub content_type: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub category: GalleryCategory,
    pub event_date: DateTime<Utc>,
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_published: bool,
}

/// Partial update payload for a gallery item.
///
/// Media replacement travels as a (url, content_type) pair so the stored
/// kind is re-derived together with the URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGalleryInput {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replacement media: URL plus the MIME type it was uploaded with
    pub media: Option<MediaChange>,
    pub thumbnail_url: Option<Option<String>>,
    pub category: Option<GalleryCategory>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

/// A media replacement: the new URL and its upload MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaChange {
    pub url: String,
    pub content_type: String,
}

impl UpdateGalleryInput {
    /// Build a partial update containing only the fields where `draft`
    /// differs from `original`.
    pub fn diff(original: &GalleryItem, draft: &CreateGalleryInput) -> Self {
        let mut update = Self::default();
        if draft.title != original.title {
            update.title = Some(draft.title.clone());
        }
        if draft.description != original.description {
            update.description = Some(draft.description.clone());
        }
        if draft.url != original.url {
            update.media = Some(MediaChange {
                url: draft.url.clone(),
                content_type: draft.content_type.clone(),
            });
        }
        if draft.thumbnail_url != original.thumbnail_url {
            update.thumbnail_url = Some(draft.thumbnail_url.clone());
        }
        if draft.category != original.category {
            update.category = Some(draft.category);
        }
        if draft.event_date != original.event_date {
            update.event_date = Some(draft.event_date);
        }
        if draft.location != original.location {
            update.location = Some(draft.location.clone());
        }
        if draft.tags != original.tags {
            update.tags = Some(draft.tags.clone());
        }
        if draft.is_published != original.is_published {
            update.is_published = Some(draft.is_published);
        }
        update
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.media.is_some()
            || self.thumbnail_url.is_some()
            || self.category.is_some()
            || self.event_date.is_some()
            || self.location.is_some()
            || self.tags.is_some()
            || self.is_published.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("image/webp"), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_mime("video/mp4"), Some(MediaKind::Video));
        assert_eq!(
            MediaKind::from_mime("video/quicktime"),
            Some(MediaKind::Video)
        );
        assert_eq!(MediaKind::from_mime("application/pdf"), None);
        assert_eq!(MediaKind::from_mime(""), None);
    }

    #[test]
    fn test_video_mime_never_maps_to_image() {
        for mime in ["video/mp4", "video/webm", "video/ogg", "video/x-msvideo"] {
            assert_eq!(MediaKind::from_mime(mime), Some(MediaKind::Video));
        }
    }

    #[test]
    fn test_media_kind_round_trip() {
        assert_eq!(MediaKind::from_str("image").unwrap(), MediaKind::Image);
        assert_eq!(MediaKind::from_str("VIDEO").unwrap(), MediaKind::Video);
        assert!(MediaKind::from_str("audio").is_err());
    }

    #[test]
    fn test_gallery_category_round_trip() {
        for category in [
            GalleryCategory::Events,
            GalleryCategory::Programs,
            GalleryCategory::Facilities,
            GalleryCategory::Staff,
            GalleryCategory::Community,
        ] {
            assert_eq!(
                GalleryCategory::from_str(category.as_str()).unwrap(),
                category
            );
        }
    }
}
