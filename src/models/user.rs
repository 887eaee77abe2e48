//! User model
//!
//! Users are never created through a registration form: the sync bridge
//! reconciles identity-provider claims into a local record on sign-in
//! (create-or-update-by-external-id), and the application never deletes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity mirroring an identity-provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// External identity-provider subject id (unique)
    pub external_id: String,
    /// Email address
    pub email: String,
    /// First name
    pub first_name: Option<String>,
    /// Last name
    pub last_name: Option<String>,
    /// Avatar URL
    pub avatar_url: Option<String>,
    /// Role for dashboard authorization
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user may manage content (editor or admin)
    pub fn is_editor(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Editor)
    }
}

/// User role for authorization.
///
/// Content mutations require Editor or Admin; Admin additionally manages
/// users. Patient and User are public-site roles with no dashboard access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Editor - manages content
    Editor,
    /// Patient - public-site role
    Patient,
    /// Regular signed-in user (least privileged, the sync default)
    User,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl UserRole {
    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
            UserRole::Patient => "patient",
            UserRole::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "editor" => Ok(UserRole::Editor),
            "patient" => Ok(UserRole::Patient),
            "user" => Ok(UserRole::User),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: 1,
            external_id: "ext_1".to_string(),
            email: "person@example.org".to_string(),
            first_name: None,
            last_name: None,
            avatar_url: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_editor_includes_admin() {
        assert!(user_with_role(UserRole::Admin).is_editor());
        assert!(user_with_role(UserRole::Editor).is_editor());
        assert!(!user_with_role(UserRole::Patient).is_editor());
        assert!(!user_with_role(UserRole::User).is_editor());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::Admin,
            UserRole::Editor,
            UserRole::Patient,
            UserRole::User,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()).unwrap(), role);
        }
        assert!(UserRole::from_str("superuser").is_err());
    }

    #[test]
    fn test_default_role_is_least_privileged() {
        assert_eq!(UserRole::default(), UserRole::User);
    }
}
