//! SurrealDB implementation of [`UserRepository`].
//!
//! Users are provisioned by the surrounding application when a new
//! identity-provider subject first signs in; the authorization core only
//! reads `external_id` and `default_role`.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tollgate_core::error::TollgateResult;
use tollgate_core::models::user::{CreateUser, UpdateUser, User};
use tollgate_core::repository::UserRepository;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    external_id: String,
    email: String,
    display_name: String,
    default_role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    external_id: String,
    email: String,
    display_name: String,
    default_role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> User {
        User {
            id,
            external_id: self.external_id,
            email: self.email,
            display_name: self.display_name,
            default_role: self.default_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid(&self.record_id)?,
            external_id: self.external_id,
            email: self.email,
            display_name: self.display_name,
            default_role: self.default_role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> TollgateResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let default_role = input.default_role_or_guest();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 external_id = $external_id, email = $email, \
                 display_name = $display_name, \
                 default_role = $default_role",
            )
            .bind(("id", id_str.clone()))
            .bind(("external_id", input.external_id))
            .bind(("email", input.email))
            .bind(("display_name", input.display_name))
            .bind(("default_role", default_role))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id))
    }

    async fn get_by_id(&self, id: Uuid) -> TollgateResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id))
    }

    async fn get_by_external_id(&self, external_id: &str) -> TollgateResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE external_id = $external_id LIMIT 1",
            )
            .bind(("external_id", external_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", external_id))?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> TollgateResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.display_name.is_some() {
            sets.push("display_name = $display_name");
        }
        if input.default_role.is_some() {
            sets.push("default_role = $default_role");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(display_name) = input.display_name {
            builder = builder.bind(("display_name", display_name));
        }
        if let Some(default_role) = input.default_role {
            builder = builder.bind(("default_role", default_role));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user", e))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user", id_str))?;

        Ok(row.into_user(id))
    }
}
