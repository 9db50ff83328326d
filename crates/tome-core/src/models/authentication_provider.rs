//! Authentication provider domain model.
//!
//! One record per external identity-provider account linked to a team
//! (e.g., a Slack workspace or a Google Workspace domain). The
//! `(team_id, name, provider_id)` triple is unique; attaching the same
//! account to a team twice is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationProvider {
    pub id: Uuid,
    pub team_id: Uuid,
    /// Provider kind (e.g., `slack`, `google`).
    pub name: String,
    /// Account identifier at the external provider.
    pub provider_id: String,
    /// Disabled providers are kept for audit but rejected at sign-in.
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to attach a provider to a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuthenticationProvider {
    pub team_id: Uuid,
    pub name: String,
    pub provider_id: String,
}
