/// User domain type
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account (owned by the CMS)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Login / display name
    pub username: String,

    /// Account email
    pub email: String,

    /// Absolute avatar URL
    pub avatar_url: Option<String>,

    /// Account creation timestamp
    pub created_at: Option<DateTime<Utc>>,
}
