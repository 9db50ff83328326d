//! SurrealDB implementation of [`TeamDomainRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tome_core::TomeResult;
use tome_core::models::team_domain::{CreateTeamDomain, TeamDomain};
use tome_core::repository::TeamDomainRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TeamDomainRow {
    team_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TeamDomainRow {
    fn into_team_domain(self, id: Uuid) -> Result<TeamDomain, DbError> {
        let team_id = Uuid::parse_str(&self.team_id)
            .map_err(|e| DbError::Query(format!("invalid team UUID: {e}")))?;
        Ok(TeamDomain {
            id,
            team_id,
            name: self.name,
            created_at: self.created_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TeamDomainRowWithId {
    record_id: String,
    team_id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TeamDomainRowWithId {
    fn try_into_team_domain(self) -> Result<TeamDomain, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid domain UUID: {e}")))?;
        TeamDomainRow {
            team_id: self.team_id,
            name: self.name,
            created_at: self.created_at,
        }
        .into_team_domain(id)
    }
}

/// SurrealDB implementation of the TeamDomain repository.
#[derive(Clone)]
pub struct SurrealTeamDomainRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTeamDomainRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TeamDomainRepository for SurrealTeamDomainRepository<C> {
    async fn create(&self, input: CreateTeamDomain) -> TomeResult<TeamDomain> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Domains compare case-insensitively; store them folded.
        let name = input.name.to_ascii_lowercase();

        let result = self
            .db
            .query(
                "CREATE type::record('team_domain', $id) SET \
                 team_id = $team_id, name = $name",
            )
            .bind(("id", id_str.clone()))
            .bind(("team_id", input.team_id.to_string()))
            .bind(("name", name))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<TeamDomainRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team_domain".into(),
            id: id_str,
        })?;

        Ok(row.into_team_domain(id)?)
    }

    async fn find_by_name(&self, name: &str) -> TomeResult<Option<TeamDomain>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM team_domain WHERE name = $name",
            )
            .bind(("name", name.to_ascii_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamDomainRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_team_domain()?)),
            None => Ok(None),
        }
    }

    async fn list_by_team(&self, team_id: Uuid) -> TomeResult<Vec<TeamDomain>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM team_domain \
                 WHERE team_id = $team_id ORDER BY created_at ASC",
            )
            .bind(("team_id", team_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamDomainRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_team_domain())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
