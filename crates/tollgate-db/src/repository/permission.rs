//! SurrealDB implementation of [`PermissionRepository`].

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tollgate_core::error::TollgateResult;
use tollgate_core::models::action::Action;
use tollgate_core::models::permission::{CreatePermission, Permission, UpdatePermission};
use tollgate_core::models::resource::Resource;
use tollgate_core::repository::PermissionRepository;
use tracing::info;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    name: String,
    resource: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn try_into_permission(self, id: Uuid) -> Result<Permission, DbError> {
        Ok(Permission {
            id,
            name: self.name,
            resource: parse_resource(&self.resource)?,
            action: parse_action(&self.action)?,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct PermissionRowWithId {
    record_id: String,
    name: String,
    resource: String,
    action: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PermissionRowWithId {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        Ok(Permission {
            id: parse_uuid(&self.record_id)?,
            name: self.name,
            resource: parse_resource(&self.resource)?,
            action: parse_action(&self.action)?,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_resource(s: &str) -> Result<Resource, DbError> {
    s.parse()
        .map_err(|_| DbError::InvalidRow(format!("unknown resource: {s}")))
}

fn parse_action(s: &str) -> Result<Action, DbError> {
    s.parse()
        .map_err(|_| DbError::InvalidRow(format!("unknown action: {s}")))
}

/// SurrealDB implementation of the Permission repository.
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealPermissionRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Ids from `ids` with no permission record.
    async fn missing_permissions(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, DbError> {
        let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT VALUE meta::id(id) FROM permission \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", id_strs))
            .await?;
        let existing: Vec<String> = result.take(0)?;
        let existing: HashSet<String> = existing.into_iter().collect();

        Ok(ids
            .iter()
            .filter(|id| !existing.contains(&id.to_string()))
            .copied()
            .collect())
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn create(&self, input: CreatePermission) -> TollgateResult<Permission> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('permission', $id) SET \
                 name = $name, resource = $resource, \
                 action = $action, description = $description",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("resource", input.resource.as_str()))
            .bind(("action", input.action.as_str()))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("permission", e))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("permission", id_str))?;

        Ok(row.try_into_permission(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TollgateResult<Permission> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('permission', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("permission", id_str))?;

        Ok(row.try_into_permission(id)?)
    }

    async fn get_by_resource_action(
        &self,
        resource: Resource,
        action: Action,
    ) -> TollgateResult<Permission> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE resource = $resource AND action = $action LIMIT 1",
            )
            .bind(("resource", resource.as_str()))
            .bind(("action", action.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::not_found("permission", format!("{resource}:{action}"))
        })?;

        Ok(row.try_into_permission()?)
    }

    async fn update(&self, id: Uuid, input: UpdatePermission) -> TollgateResult<Permission> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.resource.is_some() {
            sets.push("resource = $resource");
        }
        if input.action.is_some() {
            sets.push("action = $action");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('permission', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(resource) = input.resource {
            builder = builder.bind(("resource", resource.as_str()));
        }
        if let Some(action) = input.action {
            builder = builder.bind(("action", action.as_str()));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_statement("permission", e))?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("permission", id_str))?;

        Ok(row.try_into_permission(id)?)
    }

    async fn delete(&self, id: Uuid) -> TollgateResult<()> {
        self.get_by_id(id).await?;

        // Links go with the permission; both deletes are hard deletes.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE role_permission WHERE permission_id = $id; \
                 DELETE type::record('permission', $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("permission", e))?;

        info!(permission_id = %id, "Permission deleted");
        Ok(())
    }

    async fn list(&self) -> TollgateResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 ORDER BY resource ASC, action ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }

    async fn grant_to_role(&self, role_id: Uuid, permission_id: Uuid) -> TollgateResult<()> {
        self.bulk_grant_to_role(role_id, &[permission_id]).await
    }

    async fn revoke_from_role(&self, role_id: Uuid, permission_id: Uuid) -> TollgateResult<()> {
        self.db
            .query(
                "DELETE role_permission WHERE \
                 role_id = $role_id AND permission_id = $permission_id",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("permission_id", permission_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("role_permission", e))?;

        Ok(())
    }

    async fn bulk_grant_to_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> TollgateResult<()> {
        if permission_ids.is_empty() {
            return Ok(());
        }

        let missing = self.missing_permissions(permission_ids).await?;
        if !missing.is_empty() {
            let ids: Vec<String> = missing.iter().map(Uuid::to_string).collect();
            return Err(DbError::not_found("permission", ids.join(", ")).into());
        }

        let id_strs: Vec<String> = permission_ids.iter().map(Uuid::to_string).collect();

        // Link rows are keyed by `{role_id}_{permission_id}`, so linking an
        // already-linked permission rewrites the same record.
        self.db
            .query(
                "BEGIN TRANSACTION; \
                 FOR $permission_id IN $permission_ids { \
                     UPSERT type::record('role_permission', \
                         string::concat($role_id, '_', $permission_id)) SET \
                         role_id = $role_id, permission_id = $permission_id; \
                 }; \
                 COMMIT TRANSACTION;",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("permission_ids", id_strs))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("role_permission", e))?;

        info!(
            %role_id,
            count = permission_ids.len(),
            "Permissions linked to role"
        );
        Ok(())
    }

    async fn bulk_revoke_from_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> TollgateResult<()> {
        if permission_ids.is_empty() {
            return Ok(());
        }

        let id_strs: Vec<String> = permission_ids.iter().map(Uuid::to_string).collect();

        self.db
            .query(
                "DELETE role_permission WHERE \
                 role_id = $role_id AND permission_id IN $permission_ids",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("permission_ids", id_strs))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_statement("role_permission", e))?;

        info!(
            %role_id,
            count = permission_ids.len(),
            "Permissions unlinked from role"
        );
        Ok(())
    }

    async fn get_role_permissions(&self, role_id: Uuid) -> TollgateResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE meta::id(id) IN (\
                     SELECT VALUE permission_id FROM role_permission \
                     WHERE role_id = $role_id\
                 ) \
                 ORDER BY resource ASC, action ASC",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRowWithId> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(|row| row.try_into_permission())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }
}
