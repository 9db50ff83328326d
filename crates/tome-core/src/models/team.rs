//! Team domain model.
//!
//! A team is the unit of tenancy: every document, user, and integration
//! belongs to exactly one team. In a shared-hosting (multi-tenant)
//! installation each team is routed by a globally unique subdomain; a
//! self-hosted installation holds a single team with no subdomain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    /// Human-readable name, taken verbatim from the identity provider.
    pub name: String,
    /// URL-safe routing identifier (e.g., `acme`). `None` on a
    /// self-hosted single-tenant installation.
    pub subdomain: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    pub name: String,
    pub subdomain: Option<String>,
    pub avatar_url: Option<String>,
}

/// Fields that can be updated on an existing team.
///
/// The subdomain is deliberately absent: once assigned it is never
/// overwritten by provisioning.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}
