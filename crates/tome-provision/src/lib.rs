//! Tome Provisioning — the logic every OAuth sign-in callback funnels
//! through: resolve or create the team, attach the external identity
//! provider, and find or create the authenticated user.
//!
//! Generic over the `tome-core` repository traits so that this crate
//! has no dependency on the database backend.

pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod subdomain;

pub use config::{DeploymentMode, ProvisionConfig};
pub use error::ProvisionError;
pub use resolver::{ResolveTeamInput, ResolvedTeam, TeamResolver};
pub use service::{
    AuthenticationProviderParams, ProvisionInput, ProvisionOutcome, Provisioner, TeamParams,
    UserParams,
};
