//! Effective permission resolution.
//!
//! A user's effective roles are their active explicit assignments to
//! active roles. Only when there are none is `User.default_role` looked up,
//! and then it is the sole effective role. Explicit assignments replace the
//! fallback entirely; the two are never merged.

use std::collections::HashSet;

use serde::Serialize;
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::action::Action;
use tollgate_core::models::permission::Permission;
use tollgate_core::models::resource::Resource;
use tollgate_core::models::role::Role;
use tollgate_core::repository::{PermissionRepository, RoleRepository, UserRepository};
use tracing::debug;
use uuid::Uuid;

/// Which path produced an effective permission set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
    /// At least one active explicit assignment.
    Explicit,
    /// No explicit assignment; the user's default role applied.
    DefaultRole,
    /// Neither path yielded an active role.
    None,
}

/// Roles and deduplicated permissions resolved together for one user.
#[derive(Debug, Clone, Serialize)]
pub struct EffectivePermissions {
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub source: PermissionSource,
}

impl EffectivePermissions {
    /// `MANAGE` on a resource satisfies every action on it.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.permissions.iter().any(|p| p.allows(resource, action))
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name == name)
    }

    pub fn has_any_role(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_role(name))
    }

    /// Vacuously true for an empty `names`.
    pub fn has_all_roles(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has_role(name))
    }
}

/// Computes effective permissions from the catalog store.
#[derive(Clone)]
pub struct PermissionResolver<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    users: U,
    roles: R,
    permissions: P,
}

impl<U, R, P> PermissionResolver<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    pub fn new(users: U, roles: R, permissions: P) -> Self {
        Self {
            users,
            roles,
            permissions,
        }
    }

    /// Resolve the effective roles and permissions for `user_id`.
    ///
    /// Fails with `NotFound` when the user does not exist. A default role
    /// that is missing or inactive yields an empty set, not an error.
    pub async fn get_user_permissions_with_fallback(
        &self,
        user_id: Uuid,
    ) -> TollgateResult<EffectivePermissions> {
        let user = self.users.get_by_id(user_id).await?;

        let explicit = self.roles.get_user_roles(user_id).await?;
        let (roles, source) = if !explicit.is_empty() {
            (explicit, PermissionSource::Explicit)
        } else {
            match self.roles.get_by_name(&user.default_role).await {
                Ok(role) if role.is_active => (vec![role], PermissionSource::DefaultRole),
                Ok(_) | Err(TollgateError::NotFound { .. }) => {
                    (Vec::new(), PermissionSource::None)
                }
                Err(e) => return Err(e),
            }
        };

        let mut seen = HashSet::new();
        let mut permissions = Vec::new();
        for role in &roles {
            for permission in self.permissions.get_role_permissions(role.id).await? {
                if seen.insert(permission.id) {
                    permissions.push(permission);
                }
            }
        }

        debug!(
            %user_id,
            ?source,
            roles = roles.len(),
            permissions = permissions.len(),
            "Resolved effective permissions"
        );

        Ok(EffectivePermissions {
            roles,
            permissions,
            source,
        })
    }

    pub async fn has_permission(
        &self,
        user_id: Uuid,
        resource: Resource,
        action: Action,
    ) -> TollgateResult<bool> {
        let effective = self.get_user_permissions_with_fallback(user_id).await?;
        Ok(effective.allows(resource, action))
    }

    pub async fn has_role(&self, user_id: Uuid, name: &str) -> TollgateResult<bool> {
        let effective = self.get_user_permissions_with_fallback(user_id).await?;
        Ok(effective.has_role(name))
    }

    pub async fn has_any_role(&self, user_id: Uuid, names: &[&str]) -> TollgateResult<bool> {
        let effective = self.get_user_permissions_with_fallback(user_id).await?;
        Ok(effective.has_any_role(names))
    }

    pub async fn has_all_roles(&self, user_id: Uuid, names: &[&str]) -> TollgateResult<bool> {
        let effective = self.get_user_permissions_with_fallback(user_id).await?;
        Ok(effective.has_all_roles(names))
    }
}
