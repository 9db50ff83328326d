//! Error types shared across the Tome backend.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TomeError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A storage-level uniqueness constraint rejected a write. Two
    /// concurrent requests racing on the same key produce this; callers
    /// that can re-derive the key may retry once.
    #[error("Conflict on unique key: {detail}")]
    Conflict { detail: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TomeResult<T> = Result<T, TomeError>;
