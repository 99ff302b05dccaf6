//! SurrealDB implementation of [`RoleRepository`].
//!
//! User-role assignments live in the `user_role` table. Each row's record
//! id is derived from the `(user, role)` pair, so a pair can never own two
//! rows; assignment is a conditional reactivation followed by a create that
//! the store rejects if a concurrent request got there first.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::role::{CreateRole, Role, UpdateRole};
use tollgate_core::models::user_role::UserRole;
use tollgate_core::repository::RoleRepository;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    name: String,
    description: String,
    is_active: bool,
    is_core: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Role {
        Role {
            id,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            is_core: self.is_core,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: String,
    is_active: bool,
    is_core: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        Ok(Role {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            is_core: self.is_core,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct UserRoleRow {
    user_id: String,
    role_id: String,
    assigned_by: Option<String>,
    assigned_at: DateTime<Utc>,
    is_active: bool,
}

impl UserRoleRow {
    fn try_into_user_role(self, id: Uuid) -> Result<UserRole, DbError> {
        Ok(UserRole {
            id,
            user_id: parse_uuid(&self.user_id)?,
            role_id: parse_uuid(&self.role_id)?,
            assigned_by: self.assigned_by.as_deref().map(parse_uuid).transpose()?,
            assigned_at: self.assigned_at,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct UserRoleRowWithId {
    record_id: String,
    user_id: String,
    role_id: String,
    assigned_by: Option<String>,
    assigned_at: DateTime<Utc>,
    is_active: bool,
}

impl UserRoleRowWithId {
    fn try_into_user_role(self) -> Result<UserRole, DbError> {
        let id = parse_uuid(&self.record_id)?;
        UserRoleRow {
            user_id: self.user_id,
            role_id: self.role_id,
            assigned_by: self.assigned_by,
            assigned_at: self.assigned_at,
            is_active: self.is_active,
        }
        .try_into_user_role(id)
    }
}

/// Losing a race for the same pair, whether to the unique record id or to
/// a concurrent commit, means the user already holds the role.
fn assignment_error(err: DbError) -> TollgateError {
    if err.is_conflict() {
        TollgateError::conflict("user already has this role")
    } else {
        err.into()
    }
}

/// SurrealDB implementation of the Role repository.
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealRoleRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> TollgateResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 name = $name, description = $description, \
                 is_active = true, is_core = $is_core",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("is_core", input.is_core))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("role", e))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", &id_str))?;

        info!(role_id = %id, name = %row.name, "Role created");
        Ok(row.into_role(id))
    }

    async fn get_by_id(&self, id: Uuid) -> TollgateResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", id_str))?;

        Ok(row.into_role(id))
    }

    async fn get_by_name(&self, name: &str) -> TollgateResult<Role> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE name = $name LIMIT 1",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", name))?;

        Ok(row.try_into_role()?)
    }

    async fn update(&self, id: Uuid, input: UpdateRole) -> TollgateResult<Role> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('role', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("role", e))?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("role", id_str))?;

        Ok(row.into_role(id))
    }

    async fn delete(&self, id: Uuid) -> TollgateResult<()> {
        // Surface NotFound instead of silently deleting nothing.
        self.get_by_id(id).await?;

        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE role_permission WHERE role_id = $id; \
                 UPDATE user_role SET is_active = false WHERE role_id = $id; \
                 DELETE type::record('role', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("role", e))?;

        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    async fn list(&self) -> TollgateResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 ORDER BY name ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> TollgateResult<UserRole> {
        let id = UserRole::assignment_id(user_id, role_id);
        let id_str = id.to_string();
        let assigned_by_str = assigned_by.map(|a| a.to_string());

        // Reactivate a previously removed row in place.
        let result = self
            .db
            .query(
                "UPDATE type::record('user_role', $id) SET \
                 is_active = true, assigned_by = $assigned_by, \
                 assigned_at = time::now() \
                 WHERE is_active = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("assigned_by", assigned_by_str.clone()))
            .await
            .map_err(|e| assignment_error(DbError::from_statement("user_role", e)))?;
        let mut result = result
            .check()
            .map_err(|e| assignment_error(DbError::from_statement("user_role", e)))?;

        let rows: Vec<UserRoleRow> = result.take(0).map_err(DbError::from)?;
        if let Some(row) = rows.into_iter().next() {
            info!(%user_id, %role_id, "Role assignment reactivated");
            return Ok(row.try_into_user_role(id)?);
        }

        // No inactive row: create one. The deterministic record id makes
        // this fail if the pair is already (or concurrently) assigned.
        let result = self
            .db
            .query(
                "CREATE type::record('user_role', $id) SET \
                 user_id = $user_id, role_id = $role_id, \
                 assigned_by = $assigned_by, assigned_at = time::now(), \
                 is_active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .bind(("assigned_by", assigned_by_str))
            .await
            .map_err(|e| assignment_error(DbError::from_statement("user_role", e)))?;

        let mut result = result
            .check()
            .map_err(|e| assignment_error(DbError::from_statement("user_role", e)))?;

        let rows: Vec<UserRoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("user_role", id_str))?;

        info!(%user_id, %role_id, "Role assigned");
        Ok(row.try_into_user_role(id)?)
    }

    async fn unassign_from_user(&self, user_id: Uuid, role_id: Uuid) -> TollgateResult<()> {
        let id_str = UserRole::assignment_id(user_id, role_id).to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('user_role', $id) SET \
                 is_active = false WHERE is_active = true",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("user_role", e))?;

        let rows: Vec<UserRoleRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("user_role", id_str).into());
        }

        info!(%user_id, %role_id, "Role assignment deactivated");
        Ok(())
    }

    async fn get_user_roles(&self, user_id: Uuid) -> TollgateResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE is_active = true \
                 AND meta::id(id) IN (\
                     SELECT VALUE role_id FROM user_role \
                     WHERE user_id = $user_id AND is_active = true\
                 ) \
                 ORDER BY name ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn get_user_assignments(&self, user_id: Uuid) -> TollgateResult<Vec<UserRole>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_role \
                 WHERE user_id = $user_id \
                 ORDER BY assigned_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let assignments = rows
            .into_iter()
            .map(|row| row.try_into_user_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(assignments)
    }
}
