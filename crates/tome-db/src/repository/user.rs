//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tome_core::TomeResult;
use tome_core::models::user::{CreateUser, UpdateUser, User};
use tome_core::repository::UserRepository;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    team_id: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    service_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let team_id = Uuid::parse_str(&self.team_id)
            .map_err(|e| DbError::Query(format!("invalid team UUID: {e}")))?;
        Ok(User {
            id,
            team_id,
            name: self.name,
            email: self.email,
            avatar_url: self.avatar_url,
            service_id: self.service_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    team_id: String,
    name: String,
    email: String,
    avatar_url: Option<String>,
    service_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid user UUID: {e}")))?;
        UserRow {
            team_id: self.team_id,
            name: self.name,
            email: self.email,
            avatar_url: self.avatar_url,
            service_id: self.service_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TomeResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 team_id = $team_id, name = $name, email = $email, \
                 avatar_url = $avatar_url, service_id = $service_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("team_id", input.team_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("avatar_url", input.avatar_url))
            .bind(("service_id", input.service_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn find_by_service_id(
        &self,
        team_id: Uuid,
        service_id: &str,
    ) -> TomeResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM user \
                 WHERE team_id = $team_id AND service_id = $service_id",
            )
            .bind(("team_id", team_id.to_string()))
            .bind(("service_id", service_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> TomeResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.avatar_url.is_some() {
            sets.push("avatar_url = $avatar_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(avatar_url) = input.avatar_url {
            builder = builder.bind(("avatar_url", avatar_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from_query)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }
}
