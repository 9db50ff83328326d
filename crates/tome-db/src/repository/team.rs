//! SurrealDB implementation of [`TeamRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tome_core::TomeResult;
use tome_core::models::team::{CreateTeam, Team, UpdateTeam};
use tome_core::repository::TeamRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TeamRow {
    name: String,
    subdomain: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamRow {
    fn into_team(self, id: Uuid) -> Team {
        Team {
            id,
            name: self.name,
            subdomain: self.subdomain,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TeamRowWithId {
    record_id: String,
    name: String,
    subdomain: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TeamRowWithId {
    fn try_into_team(self) -> Result<Team, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid team UUID: {e}")))?;
        Ok(Team {
            id,
            name: self.name,
            subdomain: self.subdomain,
            avatar_url: self.avatar_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Team repository.
#[derive(Clone)]
pub struct SurrealTeamRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTeamRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TeamRepository for SurrealTeamRepository<C> {
    async fn create(&self, input: CreateTeam) -> TomeResult<Team> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('team', $id) SET \
                 name = $name, subdomain = $subdomain, avatar_url = $avatar_url",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("subdomain", input.subdomain))
            .bind(("avatar_url", input.avatar_url))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: id_str,
        })?;

        Ok(row.into_team(id))
    }

    async fn get_by_id(&self, id: Uuid) -> TomeResult<Team> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('team', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: id_str,
        })?;

        Ok(row.into_team(id))
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> TomeResult<Option<Team>> {
        let subdomain_owned = subdomain.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM team WHERE subdomain = $subdomain",
            )
            .bind(("subdomain", subdomain_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_team()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateTeam) -> TomeResult<Team> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.avatar_url.is_some() {
            sets.push("avatar_url = $avatar_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('team', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(avatar_url) = input.avatar_url {
            builder = builder.bind(("avatar_url", avatar_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<TeamRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "team".into(),
            id: id_str,
        })?;

        Ok(row.into_team(id))
    }

    async fn delete(&self, id: Uuid) -> TomeResult<()> {
        self.db
            .query("DELETE type::record('team', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn count(&self) -> TomeResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM team GROUP ALL")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn first(&self) -> TomeResult<Option<Team>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM team ORDER BY created_at ASC LIMIT 1",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TeamRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_team()?)),
            None => Ok(None),
        }
    }
}
