//! Newsletter subscriber model
//!
//! Append-only from the application's perspective: the public form adds
//! rows, nothing in the application removes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newsletter subscriber entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique)
    pub email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
