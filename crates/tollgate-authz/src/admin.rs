//! Catalog administration.
//!
//! Every operation takes the inbound [`RequestContext`], authorizes it
//! against the permission the operation requires, validates its input,
//! and only then touches the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::action::Action;
use tollgate_core::models::permission::{
    CreatePermission, Permission, UpdatePermission, permission_name,
};
use tollgate_core::models::resource::Resource;
use tollgate_core::models::role::{CreateRole, Role, UpdateRole};
use tollgate_core::models::user_role::UserRole;
use tollgate_core::repository::{PermissionRepository, RoleRepository, UserRepository};
use tracing::info;
use uuid::Uuid;

use crate::guard::{Guard, RequestContext, ensure_role_deletable};
use crate::identity::IdentityBridge;
use crate::resolver::{EffectivePermissions, PermissionResolver};
use crate::seeder::{SeedReport, Seeder};

/// Payload for creating a role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRole {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_core: bool,
}

/// Payload for editing a role. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Payload for creating a permission. Resource and action arrive as
/// strings and are checked against the closed vocabularies here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPermission {
    /// Defaults to `RESOURCE_ACTION`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionPatch {
    pub name: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
    pub description: Option<String>,
}

/// A role together with the permissions linked to it.
#[derive(Debug, Clone, Serialize)]
pub struct RoleWithPermissions {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

/// Role to permission matrix, as shown on the administration screen.
#[derive(Debug, Clone, Serialize)]
pub struct RoleMatrix {
    pub roles: Vec<RoleWithPermissions>,
    pub permissions_by_resource: BTreeMap<Resource, Vec<Permission>>,
    pub resources: Vec<Resource>,
}

/// Guarded CRUD and bulk operations over the catalog.
#[derive(Clone)]
pub struct CatalogAdmin<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    guard: Guard<U, R, P>,
    users: U,
    roles: R,
    permissions: P,
    seeder: Seeder<R, P>,
}

impl<U, R, P> CatalogAdmin<U, R, P>
where
    U: UserRepository + Clone,
    R: RoleRepository + Clone,
    P: PermissionRepository + Clone,
{
    pub fn new(users: U, roles: R, permissions: P) -> Self {
        let guard = Guard::new(
            IdentityBridge::new(users.clone()),
            PermissionResolver::new(users.clone(), roles.clone(), permissions.clone()),
        );
        Self {
            guard,
            seeder: Seeder::new(roles.clone(), permissions.clone()),
            users,
            roles,
            permissions,
        }
    }
}

impl<U, R, P> CatalogAdmin<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    pub fn guard(&self) -> &Guard<U, R, P> {
        &self.guard
    }

    pub fn seeder(&self) -> &Seeder<R, P> {
        &self.seeder
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    pub async fn list_roles(&self, request: &RequestContext) -> TollgateResult<Vec<Role>> {
        self.guard
            .authorize(request, Resource::Role, Action::Read)
            .await?;
        self.roles.list().await
    }

    pub async fn get_role(&self, request: &RequestContext, id: Uuid) -> TollgateResult<Role> {
        self.guard
            .authorize(request, Resource::Role, Action::Read)
            .await?;
        self.roles.get_by_id(id).await
    }

    pub async fn create_role(
        &self,
        request: &RequestContext,
        input: NewRole,
    ) -> TollgateResult<Role> {
        let ctx = self
            .guard
            .authorize(request, Resource::Role, Action::Create)
            .await?;
        let name = required_name(input.name.as_deref(), "role name is required")?;

        let role = self
            .roles
            .create(CreateRole {
                name,
                description: input.description,
                is_core: input.is_core,
            })
            .await?;

        info!(role_id = %role.id, by = %ctx.user_id, "Role created via administration");
        Ok(role)
    }

    /// Core roles accept description edits only.
    pub async fn update_role(
        &self,
        request: &RequestContext,
        id: Uuid,
        patch: RolePatch,
    ) -> TollgateResult<Role> {
        self.guard
            .authorize(request, Resource::Role, Action::Update)
            .await?;

        let name = match patch.name.as_deref() {
            Some(raw) => Some(required_name(Some(raw), "role name must not be blank")?),
            None => None,
        };

        let existing = self.roles.get_by_id(id).await?;
        if existing.is_protected() {
            let renames = name.as_deref().is_some_and(|n| n != existing.name);
            let deactivates = patch.is_active == Some(false);
            if renames || deactivates {
                return Err(TollgateError::forbidden(
                    "cannot rename or deactivate core system roles",
                ));
            }
        }

        self.roles
            .update(
                id,
                UpdateRole {
                    name,
                    description: patch.description,
                    is_active: patch.is_active,
                },
            )
            .await
    }

    pub async fn delete_role(&self, request: &RequestContext, id: Uuid) -> TollgateResult<()> {
        let ctx = self
            .guard
            .authorize(request, Resource::Role, Action::Delete)
            .await?;

        let role = self.roles.get_by_id(id).await?;
        ensure_role_deletable(&role)?;
        self.roles.delete(id).await?;

        info!(role_id = %id, by = %ctx.user_id, "Role deleted via administration");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Permissions
    // -----------------------------------------------------------------------

    pub async fn list_permissions(
        &self,
        request: &RequestContext,
    ) -> TollgateResult<Vec<Permission>> {
        self.guard
            .authorize(request, Resource::Permission, Action::Read)
            .await?;
        self.permissions.list().await
    }

    pub async fn get_permission(
        &self,
        request: &RequestContext,
        id: Uuid,
    ) -> TollgateResult<Permission> {
        self.guard
            .authorize(request, Resource::Permission, Action::Read)
            .await?;
        self.permissions.get_by_id(id).await
    }

    pub async fn create_permission(
        &self,
        request: &RequestContext,
        input: NewPermission,
    ) -> TollgateResult<Permission> {
        self.guard
            .authorize(request, Resource::Permission, Action::Create)
            .await?;

        let resource: Resource = input
            .resource
            .as_deref()
            .ok_or_else(|| TollgateError::validation("resource is required"))?
            .parse()?;
        let action: Action = input
            .action
            .as_deref()
            .ok_or_else(|| TollgateError::validation("action is required"))?
            .parse()?;
        let name = match input.name.as_deref() {
            Some(raw) => required_name(Some(raw), "permission name must not be blank")?,
            None => permission_name(resource, action),
        };

        self.permissions
            .create(CreatePermission {
                name,
                resource,
                action,
                description: input.description,
            })
            .await
    }

    pub async fn update_permission(
        &self,
        request: &RequestContext,
        id: Uuid,
        patch: PermissionPatch,
    ) -> TollgateResult<Permission> {
        self.guard
            .authorize(request, Resource::Permission, Action::Update)
            .await?;

        let name = match patch.name.as_deref() {
            Some(raw) => Some(required_name(Some(raw), "permission name must not be blank")?),
            None => None,
        };
        let resource: Option<Resource> = patch.resource.as_deref().map(str::parse).transpose()?;
        let action: Option<Action> = patch.action.as_deref().map(str::parse).transpose()?;

        self.permissions
            .update(
                id,
                UpdatePermission {
                    name,
                    resource,
                    action,
                    description: patch.description,
                },
            )
            .await
    }

    pub async fn delete_permission(
        &self,
        request: &RequestContext,
        id: Uuid,
    ) -> TollgateResult<()> {
        self.guard
            .authorize(request, Resource::Permission, Action::Delete)
            .await?;
        self.permissions.delete(id).await
    }

    // -----------------------------------------------------------------------
    // Role to permission links
    // -----------------------------------------------------------------------

    pub async fn assign_permission(
        &self,
        request: &RequestContext,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> TollgateResult<()> {
        self.guard
            .authorize(request, Resource::Role, Action::Update)
            .await?;
        self.roles.get_by_id(role_id).await?;
        self.permissions.grant_to_role(role_id, permission_id).await
    }

    pub async fn remove_permission(
        &self,
        request: &RequestContext,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> TollgateResult<()> {
        self.guard
            .authorize(request, Resource::Role, Action::Update)
            .await?;
        self.permissions
            .revoke_from_role(role_id, permission_id)
            .await
    }

    /// Links every id or none; a missing id fails the whole call.
    pub async fn bulk_assign_permissions(
        &self,
        request: &RequestContext,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> TollgateResult<usize> {
        self.guard
            .authorize(request, Resource::Role, Action::Update)
            .await?;
        require_ids(permission_ids)?;
        self.roles.get_by_id(role_id).await?;
        self.permissions
            .bulk_grant_to_role(role_id, permission_ids)
            .await?;
        Ok(permission_ids.len())
    }

    pub async fn bulk_remove_permissions(
        &self,
        request: &RequestContext,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> TollgateResult<usize> {
        self.guard
            .authorize(request, Resource::Role, Action::Update)
            .await?;
        require_ids(permission_ids)?;
        self.permissions
            .bulk_revoke_from_role(role_id, permission_ids)
            .await?;
        Ok(permission_ids.len())
    }

    // -----------------------------------------------------------------------
    // User assignments
    // -----------------------------------------------------------------------

    /// The caller is recorded as `assigned_by`.
    pub async fn assign_role_to_user(
        &self,
        request: &RequestContext,
        user_id: Uuid,
        role_id: Uuid,
    ) -> TollgateResult<UserRole> {
        let ctx = self
            .guard
            .authorize(request, Resource::User, Action::Update)
            .await?;
        self.users.get_by_id(user_id).await?;
        self.roles.get_by_id(role_id).await?;
        self.roles
            .assign_to_user(user_id, role_id, Some(ctx.user_id))
            .await
    }

    pub async fn remove_role_from_user(
        &self,
        request: &RequestContext,
        user_id: Uuid,
        role_id: Uuid,
    ) -> TollgateResult<()> {
        self.guard
            .authorize(request, Resource::User, Action::Update)
            .await?;
        self.roles.unassign_from_user(user_id, role_id).await
    }

    pub async fn list_user_assignments(
        &self,
        request: &RequestContext,
        user_id: Uuid,
    ) -> TollgateResult<Vec<UserRole>> {
        self.guard
            .authorize(request, Resource::User, Action::Read)
            .await?;
        self.users.get_by_id(user_id).await?;
        self.roles.get_user_assignments(user_id).await
    }

    /// Callers may always read their own permissions; anyone else's needs
    /// `USER:READ`.
    pub async fn effective_permissions(
        &self,
        request: &RequestContext,
        user_id: Uuid,
    ) -> TollgateResult<EffectivePermissions> {
        let ctx = self.guard.require_context(request).await?;
        if ctx.user_id != user_id {
            self.guard
                .check(&ctx, Resource::User, Action::Read)
                .await?;
        }
        self.guard
            .resolver()
            .get_user_permissions_with_fallback(user_id)
            .await
    }

    // -----------------------------------------------------------------------
    // Matrix and seeding
    // -----------------------------------------------------------------------

    pub async fn matrix(&self, request: &RequestContext) -> TollgateResult<RoleMatrix> {
        self.guard
            .authorize(request, Resource::Role, Action::Read)
            .await?;

        let mut roles = Vec::new();
        for role in self.roles.list().await? {
            let permissions = self.permissions.get_role_permissions(role.id).await?;
            roles.push(RoleWithPermissions { role, permissions });
        }

        let mut permissions_by_resource: BTreeMap<Resource, Vec<Permission>> = BTreeMap::new();
        for permission in self.permissions.list().await? {
            permissions_by_resource
                .entry(permission.resource)
                .or_default()
                .push(permission);
        }

        Ok(RoleMatrix {
            roles,
            permissions_by_resource,
            resources: Resource::ALL.to_vec(),
        })
    }

    pub async fn seed(&self, request: &RequestContext) -> TollgateResult<SeedReport> {
        self.guard
            .authorize(request, Resource::Role, Action::Manage)
            .await?;
        self.seeder.seed_rbac_data().await
    }
}

fn required_name(raw: Option<&str>, message: &str) -> TollgateResult<String> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(TollgateError::validation(message)),
    }
}

fn require_ids(ids: &[Uuid]) -> TollgateResult<()> {
    if ids.is_empty() {
        return Err(TollgateError::validation("permission_ids must not be empty"));
    }
    Ok(())
}
