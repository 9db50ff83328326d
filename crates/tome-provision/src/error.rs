//! Provisioning error types.

use thiserror::Error;
use tome_core::TomeError;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// A single-tenant installation already holds its team; creating
    /// another is refused outright rather than resolved.
    #[error("this installation already has a team; additional teams cannot be created")]
    TeamCreationDenied,

    #[error("the domain {domain} is not allowed to sign in to this team")]
    DomainNotAllowed { domain: String },

    /// The retry after a subdomain-creation conflict conflicted again.
    #[error("could not allocate a unique subdomain derived from {subdomain}")]
    SubdomainExhausted { subdomain: String },

    #[error(transparent)]
    Store(#[from] TomeError),
}

impl From<ProvisionError> for TomeError {
    fn from(err: ProvisionError) -> Self {
        match err {
            ProvisionError::Validation(message) => TomeError::Validation { message },
            ProvisionError::TeamCreationDenied | ProvisionError::DomainNotAllowed { .. } => {
                TomeError::AuthorizationDenied {
                    reason: err.to_string(),
                }
            }
            ProvisionError::SubdomainExhausted { subdomain } => TomeError::Conflict {
                detail: format!("subdomain {subdomain}"),
            },
            ProvisionError::Store(inner) => inner,
        }
    }
}
