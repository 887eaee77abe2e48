//! News article model
//!
//! This module provides:
//! - `NewsArticle` entity for news and announcements
//! - `NewsCategory` enum
//! - Input types for creating and updating articles
//!
//! Updates are partial: `UpdateNewsInput::diff` builds a payload holding
//! only the fields that actually changed, so concurrent edits to unrelated
//! fields are not clobbered (last-write-wins per field, no version token).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// News article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    /// Unique identifier
    pub id: i64,
    /// Article title
    pub title: String,
    /// Short summary shown in listings
    pub summary: String,
    /// Markdown body content
    pub content: String,
    /// Rendered HTML body
    pub content_html: String,
    /// Category
    pub category: NewsCategory,
    /// Ordered image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Ordered video URLs
    #[serde(default)]
    pub videos: Vec<String>,
    /// Related institution, if any
    pub institution: Option<String>,
    /// Location tag, if any
    pub location: Option<String>,
    /// Event/announcement start date
    pub start_date: DateTime<Utc>,
    /// Optional end date
    pub end_date: Option<DateTime<Utc>>,
    /// Public visibility flag
    pub is_published: bool,
    /// When the article was published
    pub published_at: Option<DateTime<Utc>>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (set on every edit)
    pub updated_at: Option<DateTime<Utc>>,
}

/// News category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NewsCategory {
    /// General announcements
    Announcement,
    /// Upcoming or past events
    Event,
    /// Health education content
    HealthTip,
    /// Press releases
    Press,
    /// Community stories
    Community,
}

impl Default for NewsCategory {
    fn default() -> Self {
        Self::Announcement
    }
}

impl NewsCategory {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsCategory::Announcement => "announcement",
            NewsCategory::Event => "event",
            NewsCategory::HealthTip => "health-tip",
            NewsCategory::Press => "press",
            NewsCategory::Community => "community",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NewsCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "announcement" => Ok(NewsCategory::Announcement),
            "event" => Ok(NewsCategory::Event),
            "health-tip" => Ok(NewsCategory::HealthTip),
            "press" => Ok(NewsCategory::Press),
            "community" => Ok(NewsCategory::Community),
            _ => Err(anyhow::anyhow!("Invalid news category: {}", s)),
        }
    }
}

/// Input for creating a news article.
///
/// Also serves as the editable draft shape: edit forms seed one of these
/// from an existing article and diff it back on submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNewsInput {
    pub title: String,
    pub summary: String,
    pub content: String,
    #[serde(default)]
    pub category: NewsCategory,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    pub institution: Option<String>,
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateNewsInput {
    /// Seed an editable draft from an existing article
    pub fn from_article(article: &NewsArticle) -> Self {
        Self {
            title: article.title.clone(),
            summary: article.summary.clone(),
            content: article.content.clone(),
            category: article.category,
            images: article.images.clone(),
            videos: article.videos.clone(),
            institution: article.institution.clone(),
            location: article.location.clone(),
            start_date: article.start_date,
            end_date: article.end_date,
            is_published: article.is_published,
            tags: article.tags.clone(),
        }
    }
}

/// Partial update payload for a news article
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateNewsInput {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub category: Option<NewsCategory>,
    pub images: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    /// `Some(None)` clears the field, `None` leaves it untouched
    pub institution: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl UpdateNewsInput {
    /// Build a partial update containing only the fields where `draft`
    /// differs from `original`.
    pub fn diff(original: &NewsArticle, draft: &CreateNewsInput) -> Self {
        let mut update = Self::default();
        if draft.title != original.title {
            update.title = Some(draft.title.clone());
        }
        if draft.summary != original.summary {
            update.summary = Some(draft.summary.clone());
        }
        if draft.content != original.content {
            update.content = Some(draft.content.clone());
        }
        if draft.category != original.category {
            update.category = Some(draft.category);
        }
        if draft.images != original.images {
            update.images = Some(draft.images.clone());
        }
        if draft.videos != original.videos {
            update.videos = Some(draft.videos.clone());
        }
        if draft.institution != original.institution {
            update.institution = Some(draft.institution.clone());
        }
        if draft.location != original.location {
            update.location = Some(draft.location.clone());
        }
        if draft.start_date != original.start_date {
            update.start_date = Some(draft.start_date);
        }
        if draft.end_date != original.end_date {
            update.end_date = Some(draft.end_date);
        }
        if draft.is_published != original.is_published {
            update.is_published = Some(draft.is_published);
        }
        if draft.tags != original.tags {
            update.tags = Some(draft.tags.clone());
        }
        update
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.summary.is_some()
            || self.content.is_some()
            || self.category.is_some()
            || self.images.is_some()
            || self.videos.is_some()
            || self.institution.is_some()
            || self.location.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.is_published.is_some()
            || self.tags.is_some()
    }
}
