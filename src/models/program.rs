//! Program model
//!
//! Health programs run by the organization. Public visibility is gated by
//! the `is_approved` flag; `is_featured` selects the promoted subset shown
//! on the home page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Program entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Unique identifier
    pub id: i64,
    /// Program name
    pub name: String,
    /// Description
    pub description: String,
    /// Goal statement, if any
    pub goal: Option<String>,
    /// Start date
    pub start_date: DateTime<Utc>,
    /// Optional end date
    pub end_date: Option<DateTime<Utc>>,
    /// Location, if any
    pub location: Option<String>,
    /// Ordered image URLs
    #[serde(default)]
    pub images: Vec<String>,
    /// Ordered video URLs
    #[serde(default)]
    pub videos: Vec<String>,
    /// Lifecycle status
    pub status: ProgramStatus,
    /// Contact person
    pub contact_person: Option<String>,
    /// Contact phone
    pub contact_phone: Option<String>,
    /// Contact email
    pub contact_email: Option<String>,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Promoted on the home page
    pub is_featured: bool,
    /// Public visibility flag
    pub is_approved: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (set on every edit)
    pub updated_at: Option<DateTime<Utc>>,
}

/// Program lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    /// Not yet started
    Upcoming,
    /// Currently running
    Ongoing,
    /// Finished
    Completed,
}

impl Default for ProgramStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

impl ProgramStatus {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Upcoming => "upcoming",
            ProgramStatus::Ongoing => "ongoing",
            ProgramStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProgramStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(ProgramStatus::Upcoming),
            "ongoing" => Ok(ProgramStatus::Ongoing),
            "completed" => Ok(ProgramStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid program status: {}", s)),
        }
    }
}

/// Input for creating a program; doubles as the editable draft shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgramInput {
    pub name: String,
    pub description: String,
    pub goal: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub videos: Vec<String>,
    #[serde(default)]
    pub status: ProgramStatus,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_approved: bool,
}

impl CreateProgramInput {
    /// Seed an editable draft from an existing program
    pub fn from_program(program: &Program) -> Self {
        Self {
            name: program.name.clone(),
            description: program.description.clone(),
            goal: program.goal.clone(),
            start_date: program.start_date,
            end_date: program.end_date,
            location: program.location.clone(),
            images: program.images.clone(),
            videos: program.videos.clone(),
            status: program.status,
            contact_person: program.contact_person.clone(),
            contact_phone: program.contact_phone.clone(),
            contact_email: program.contact_email.clone(),
            tags: program.tags.clone(),
            is_featured: program.is_featured,
            is_approved: program.is_approved,
        }
    }
}

/// Partial update payload for a program
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProgramInput {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the field, `None` leaves it untouched
    pub goal: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<Option<DateTime<Utc>>>,
    pub location: Option<Option<String>>,
    pub images: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    pub status: Option<ProgramStatus>,
    pub contact_person: Option<Option<String>>,
    pub contact_phone: Option<Option<String>>,
    pub contact_email: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_approved: Option<bool>,
}

impl UpdateProgramInput {
    /// Build a partial update containing only the fields where `draft`
    /// differs from `original`.
    pub fn diff(original: &Program, draft: &CreateProgramInput) -> Self {
        let mut update = Self::default();
        if draft.name != original.name {
            update.name = Some(draft.name.clone());
        }
        if draft.description != original.description {
            update.description = Some(draft.description.clone());
        }
        if draft.goal != original.goal {
            update.goal = Some(draft.goal.clone());
        }
        if draft.start_date != original.start_date {
            update.start_date = Some(draft.start_date);
        }
        if draft.end_date != original.end_date {
            update.end_date = Some(draft.end_date);
        }
        if draft.location != original.location {
            update.location = Some(draft.location.clone());
        }
        if draft.images != original.images {
            update.images = Some(draft.images.clone());
        }
        if draft.videos != original.videos {
            update.videos = Some(draft.videos.clone());
        }
        if draft.status != original.status {
            update.status = Some(draft.status);
        }
        if draft.contact_person != original.contact_person {
            update.contact_person = Some(draft.contact_person.clone());
        }
        if draft.contact_phone != original.contact_phone {
            update.contact_phone = Some(draft.contact_phone.clone());
        }
        if draft.contact_email != original.contact_email {
            update.contact_email = Some(draft.contact_email.clone());
        }
        if draft.tags != original.tags {
            update.tags = Some(draft.tags.clone());
        }
        if draft.is_featured != original.is_featured {
            update.is_featured = Some(draft.is_featured);
        }
        if draft.is_approved != original.is_approved {
            update.is_approved = Some(draft.is_approved);
        }
        update
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.goal.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.location.is_some()
            || self.images.is_some()
            || self.videos.is_some()
            || self.status.is_some()
            || self.contact_person.is_some()
            || self.contact_phone.is_some()
            || self.contact_email.is_some()
            || self.tags.is_some()
            || self.is_featured.is_some()
            || self.is_approved.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_program() -> Program {
        let now = Utc::now();
        Program {
            id: 7,
            name: "Mobile vaccination drive".to_string(),
            description: "Door-to-door vaccination for rural districts".to_string(),
            goal: Some("Reach 5000 households".to_string()),
            start_date: now,
            end_date: None,
            location: Some("North district".to_string()),
            images: vec![],
            videos: vec![],
            status: ProgramStatus::Ongoing,
            contact_person: None,
            contact_phone: None,
            contact_email: None,
            tags: vec!["vaccination".to_string()],
            is_featured: true,
            is_approved: true,
            created_at: now,
            updated_at: None,
        }
    }

    #[test]
    fn test_diff_status_only() {
        let program = sample_program();
        let mut draft = CreateProgramInput::from_program(&program);
        draft.status = ProgramStatus::Completed;

        let update = UpdateProgramInput::diff(&program, &draft);
        assert_eq!(update.status, Some(ProgramStatus::Completed));
        assert!(update.name.is_none());
        assert!(update.is_approved.is_none());
    }

    #[test]
    fn test_diff_identical_has_no_changes() {
        let program = sample_program();
        let draft = CreateProgramInput::from_program(&program);
        assert!(!UpdateProgramInput::diff(&program, &draft).has_changes());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ProgramStatus::Upcoming,
            ProgramStatus::Ongoing,
            ProgramStatus::Completed,
        ] {
            assert_eq!(ProgramStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(ProgramStatus::from_str("paused").is_err());
    }
}
