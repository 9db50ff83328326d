//! Provisioning configuration.

use std::env;
use std::str::FromStr;

/// Whether this installation hosts many teams or exactly one.
///
/// An explicit value threaded into every resolution call — never ambient
/// process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Shared hosting: many teams, each routed by a unique subdomain.
    MultiTenant,
    /// Self-hosted: at most one team ever exists.
    SingleTenant,
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi_tenant" | "multi-tenant" => Ok(Self::MultiTenant),
            "single_tenant" | "single-tenant" | "self_hosted" | "self-hosted" => {
                Ok(Self::SingleTenant)
            }
            other => Err(format!("unknown deployment mode: {other}")),
        }
    }
}

/// Configuration for the account provisioner.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub deployment_mode: DeploymentMode,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        // A fresh installation is assumed self-hosted until configured
        // otherwise.
        Self {
            deployment_mode: DeploymentMode::SingleTenant,
        }
    }
}

impl ProvisionConfig {
    /// Build a config from the `TOME_DEPLOYMENT_MODE` environment
    /// variable, falling back to the default when unset or unparsable.
    pub fn from_env() -> Self {
        let deployment_mode = env::var("TOME_DEPLOYMENT_MODE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::default().deployment_mode);
        Self { deployment_mode }
    }
}
