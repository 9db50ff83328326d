//! Database-specific error types and conversions.

use tome_core::TomeError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A write was rejected by a UNIQUE index. Distinguished from other
    /// query failures so the provisioning layer can retry the write with
    /// a re-derived key.
    #[error("Unique index violation on {index}")]
    UniqueViolation { index: String },
}

impl DbError {
    /// Classify a statement-level error returned by `Response::check`.
    pub(crate) fn from_query(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        match unique_index_name(&msg) {
            Some(index) => DbError::UniqueViolation { index },
            None => DbError::Query(msg),
        }
    }
}

/// Extract the index name from a SurrealDB unique-index rejection,
/// e.g. "Database index `idx_team_subdomain` already contains ...".
fn unique_index_name(msg: &str) -> Option<String> {
    if !msg.contains("already contains") {
        return None;
    }
    let start = msg.find('`')? + 1;
    let end = msg[start..].find('`')? + start;
    Some(msg[start..end].to_string())
}

impl From<DbError> for TomeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TomeError::NotFound { entity, id },
            DbError::UniqueViolation { index } => TomeError::Conflict { detail: index },
            other => TomeError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_index_name_from_violation_message() {
        let msg = "Database index `idx_team_subdomain` already contains 'acme', \
                   with record `team:abc`";
        assert_eq!(
            unique_index_name(msg),
            Some("idx_team_subdomain".to_string())
        );
    }

    #[test]
    fn other_messages_are_not_violations() {
        assert_eq!(unique_index_name("Parse error: unexpected token"), None);
    }
}
