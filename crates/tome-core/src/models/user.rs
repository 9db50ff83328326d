//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub team_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    /// Identifier of this user at the external identity provider.
    /// Unique within a team.
    pub service_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub team_id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub service_id: String,
}

/// Display fields refreshed from the identity provider on repeat logins.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}
