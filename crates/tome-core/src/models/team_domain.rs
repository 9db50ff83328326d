//! Allow-listed sign-in domain for a team.
//!
//! When a team lists one or more domains, a sign-in carrying a matching
//! email/login domain joins that team instead of creating a new one, and
//! sign-ins from unlisted domains are rejected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamDomain {
    pub id: Uuid,
    pub team_id: Uuid,
    /// The bare domain (e.g., `example.com`), unique per installation.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeamDomain {
    pub team_id: Uuid,
    pub name: String,
}
