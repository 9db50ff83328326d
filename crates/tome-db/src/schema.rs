//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity. UUIDs
//! are stored as strings. The UNIQUE indexes here are the authoritative
//! guard against concurrent sign-ups racing on the same subdomain or
//! provider key; the provisioning layer's availability probe is only a
//! best-effort optimization on top of them.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Teams
-- =======================================================================
DEFINE TABLE team SCHEMAFULL;
DEFINE FIELD name ON TABLE team TYPE string;
DEFINE FIELD subdomain ON TABLE team TYPE option<string>;
DEFINE FIELD avatar_url ON TABLE team TYPE option<string>;
DEFINE FIELD created_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE team TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_team_subdomain ON TABLE team \
    COLUMNS subdomain UNIQUE;

-- =======================================================================
-- Allow-listed sign-in domains (team scope)
-- =======================================================================
DEFINE TABLE team_domain SCHEMAFULL;
DEFINE FIELD team_id ON TABLE team_domain TYPE string;
DEFINE FIELD name ON TABLE team_domain TYPE string;
DEFINE FIELD created_at ON TABLE team_domain TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_team_domain_name ON TABLE team_domain \
    COLUMNS name UNIQUE;
DEFINE INDEX idx_team_domain_team ON TABLE team_domain \
    COLUMNS team_id;

-- =======================================================================
-- Authentication providers (team scope)
-- =======================================================================
DEFINE TABLE authentication_provider SCHEMAFULL;
DEFINE FIELD team_id ON TABLE authentication_provider TYPE string;
DEFINE FIELD name ON TABLE authentication_provider TYPE string;
DEFINE FIELD provider_id ON TABLE authentication_provider TYPE string;
DEFINE FIELD enabled ON TABLE authentication_provider TYPE bool \
    DEFAULT true;
DEFINE FIELD created_at ON TABLE authentication_provider TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_auth_provider_team_key ON TABLE authentication_provider \
    COLUMNS team_id, name, provider_id UNIQUE;
DEFINE INDEX idx_auth_provider_key ON TABLE authentication_provider \
    COLUMNS name, provider_id;

-- =======================================================================
-- Users (team scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD team_id ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD avatar_url ON TABLE user TYPE option<string>;
DEFINE FIELD service_id ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_team_service ON TABLE user \
    COLUMNS team_id, service_id UNIQUE;
DEFINE INDEX idx_user_team_email ON TABLE user \
    COLUMNS team_id, email;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            db.query("CREATE _migration SET version = $version, name = $name")
                .bind(("version", migration.version))
                .bind(("name", migration.name))
                .await?
                .check()
                .map_err(|e| {
                    DbError::Migration(format!(
                        "Failed to record migration v{}: {}",
                        migration.version, e,
                    ))
                })?;

            info!(version = migration.version, "Migration applied");
        }
    }

    Ok(())
}
