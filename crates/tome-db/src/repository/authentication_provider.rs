//! SurrealDB implementation of [`AuthenticationProviderRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tome_core::TomeResult;
use tome_core::models::authentication_provider::{
    AuthenticationProvider, CreateAuthenticationProvider,
};
use tome_core::repository::AuthenticationProviderRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ProviderRow {
    team_id: String,
    name: String,
    provider_id: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl ProviderRow {
    fn into_provider(self, id: Uuid) -> Result<AuthenticationProvider, DbError> {
        let team_id = Uuid::parse_str(&self.team_id)
            .map_err(|e| DbError::Query(format!("invalid team UUID: {e}")))?;
        Ok(AuthenticationProvider {
            id,
            team_id,
            name: self.name,
            provider_id: self.provider_id,
            enabled: self.enabled,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProviderRowWithId {
    record_id: String,
    team_id: String,
    name: String,
    provider_id: String,
    enabled: bool,
    created_at: DateTime<Utc>,
}

impl ProviderRowWithId {
    fn try_into_provider(self) -> Result<AuthenticationProvider, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid provider UUID: {e}")))?;
        ProviderRow {
            team_id: self.team_id,
            name: self.name,
            provider_id: self.provider_id,
            enabled: self.enabled,
            created_at: self.created_at,
        }
        .into_provider(id)
    }
}

/// SurrealDB implementation of the AuthenticationProvider repository.
#[derive(Clone)]
pub struct SurrealAuthenticationProviderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuthenticationProviderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuthenticationProviderRepository
    for SurrealAuthenticationProviderRepository<C>
{
    async fn create(
        &self,
        input: CreateAuthenticationProvider,
    ) -> TomeResult<AuthenticationProvider> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('authentication_provider', $id) SET \
                 team_id = $team_id, name = $name, provider_id = $provider_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("team_id", input.team_id.to_string()))
            .bind(("name", input.name))
            .bind(("provider_id", input.provider_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<ProviderRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "authentication_provider".into(),
            id: id_str,
        })?;

        Ok(row.into_provider(id)?)
    }

    async fn find_by_key(
        &self,
        name: &str,
        provider_id: &str,
    ) -> TomeResult<Option<AuthenticationProvider>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM authentication_provider \
                 WHERE name = $name AND provider_id = $provider_id \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("name", name.to_string()))
            .bind(("provider_id", provider_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProviderRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_provider()?)),
            None => Ok(None),
        }
    }

    async fn find_by_team_and_key(
        &self,
        team_id: Uuid,
        name: &str,
        provider_id: &str,
    ) -> TomeResult<Option<AuthenticationProvider>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM authentication_provider \
                 WHERE team_id = $team_id AND name = $name \
                 AND provider_id = $provider_id",
            )
            .bind(("team_id", team_id.to_string()))
            .bind(("name", name.to_string()))
            .bind(("provider_id", provider_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProviderRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_provider()?)),
            None => Ok(None),
        }
    }

    async fn list_by_team(&self, team_id: Uuid) -> TomeResult<Vec<AuthenticationProvider>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM authentication_provider \
                 WHERE team_id = $team_id ORDER BY created_at ASC",
            )
            .bind(("team_id", team_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProviderRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_provider())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
