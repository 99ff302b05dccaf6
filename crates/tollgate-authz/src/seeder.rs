//! Catalog bootstrap.
//!
//! Seeding is additive: missing permissions, core roles and default links
//! are created, nothing is ever updated or removed. A create that loses a
//! race with another seeder is followed by a lookup, and a link batch that
//! loses one was written by the winner, so parallel cold starts converge on
//! the same catalog.

use std::collections::HashMap;

use serde::Serialize;
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::action::Action;
use tollgate_core::models::permission::{CreatePermission, Permission, permission_name};
use tollgate_core::models::resource::Resource;
use tollgate_core::models::role::{ADMIN, CreateRole, GUEST, Role, SUPER_ADMIN};
use tollgate_core::repository::{PermissionRepository, RoleRepository};
use tracing::{debug, info};
use uuid::Uuid;

/// What a seeding run added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub roles_created: usize,
    /// Default links passed through the idempotent bulk grant.
    pub links_ensured: usize,
}

/// Resources on which ADMIN gets `MANAGE`.
const ADMIN_MANAGED: [Resource; 8] = [
    Resource::Course,
    Resource::Enrollment,
    Resource::Payment,
    Resource::PaymentAccount,
    Resource::MonthlyFee,
    Resource::Gallery,
    Resource::Blog,
    Resource::Dashboard,
];

const ADMIN_EXTRA: [(Resource, Action); 4] = [
    (Resource::User, Action::Read),
    (Resource::User, Action::Update),
    (Resource::Role, Action::Read),
    (Resource::Permission, Action::Read),
];

const GUEST_GRANTS: [(Resource, Action); 3] = [
    (Resource::Course, Action::Read),
    (Resource::Gallery, Action::Read),
    (Resource::Blog, Action::Read),
];

/// Default role to permission matrix.
pub fn default_matrix() -> Vec<(&'static str, Vec<(Resource, Action)>)> {
    let super_admin = Resource::ALL.iter().map(|&r| (r, Action::Manage)).collect();

    let admin = ADMIN_MANAGED
        .iter()
        .map(|&r| (r, Action::Manage))
        .chain(ADMIN_EXTRA)
        .collect();

    vec![
        (SUPER_ADMIN, super_admin),
        (ADMIN, admin),
        (GUEST, GUEST_GRANTS.to_vec()),
    ]
}

fn core_role_description(name: &str) -> &'static str {
    match name {
        SUPER_ADMIN => "Full access to every resource",
        ADMIN => "Manages site content, enrollments and payments",
        _ => "Read-only access to public content",
    }
}

/// Populates the permission catalog, the core roles and their default
/// links.
#[derive(Clone)]
pub struct Seeder<R: RoleRepository, P: PermissionRepository> {
    roles: R,
    permissions: P,
}

impl<R: RoleRepository, P: PermissionRepository> Seeder<R, P> {
    pub fn new(roles: R, permissions: P) -> Self {
        Self { roles, permissions }
    }

    pub async fn seed_rbac_data(&self) -> TollgateResult<SeedReport> {
        let mut report = SeedReport::default();

        let mut catalog: HashMap<(Resource, Action), Uuid> = HashMap::new();
        for resource in Resource::ALL {
            for action in Action::ALL {
                let (permission, created) = self.ensure_permission(resource, action).await?;
                if created {
                    report.permissions_created += 1;
                }
                catalog.insert((resource, action), permission.id);
            }
        }

        for (role_name, grants) in default_matrix() {
            let (role, created) = self.ensure_core_role(role_name).await?;
            if created {
                report.roles_created += 1;
            }

            let ids: Vec<Uuid> = grants
                .iter()
                .filter_map(|pair| catalog.get(pair).copied())
                .collect();
            match self.permissions.bulk_grant_to_role(role.id, &ids).await {
                Ok(()) => {}
                // Another seeder committed the same deterministic links.
                Err(TollgateError::Conflict { .. }) => {
                    debug!(role = role_name, "Default links written concurrently");
                }
                Err(e) => return Err(e),
            }
            report.links_ensured += ids.len();
        }

        info!(
            permissions_created = report.permissions_created,
            roles_created = report.roles_created,
            links_ensured = report.links_ensured,
            "RBAC catalog seeded"
        );
        Ok(report)
    }

    async fn ensure_permission(
        &self,
        resource: Resource,
        action: Action,
    ) -> TollgateResult<(Permission, bool)> {
        match self
            .permissions
            .get_by_resource_action(resource, action)
            .await
        {
            Ok(existing) => return Ok((existing, false)),
            Err(TollgateError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let input = CreatePermission {
            name: permission_name(resource, action),
            resource,
            action,
            description: format!("{action} on {resource}"),
        };
        match self.permissions.create(input).await {
            Ok(created) => Ok((created, true)),
            Err(TollgateError::Conflict { .. }) => {
                let existing = self
                    .permissions
                    .get_by_resource_action(resource, action)
                    .await?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    async fn ensure_core_role(&self, name: &str) -> TollgateResult<(Role, bool)> {
        match self.roles.get_by_name(name).await {
            Ok(existing) => return Ok((existing, false)),
            Err(TollgateError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let input = CreateRole {
            name: name.to_string(),
            description: core_role_description(name).to_string(),
            is_core: true,
        };
        match self.roles.create(input).await {
            Ok(created) => Ok((created, true)),
            Err(TollgateError::Conflict { .. }) => Ok((self.roles.get_by_name(name).await?, false)),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants_for(role: &str) -> Vec<(Resource, Action)> {
        default_matrix()
            .into_iter()
            .find(|(name, _)| *name == role)
            .map(|(_, grants)| grants)
            .unwrap_or_default()
    }

    #[test]
    fn matrix_covers_core_roles() {
        let names: Vec<&str> = default_matrix().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec![SUPER_ADMIN, ADMIN, GUEST]);
    }

    #[test]
    fn super_admin_manages_everything() {
        let grants = grants_for(SUPER_ADMIN);
        assert_eq!(grants.len(), Resource::ALL.len());
        assert!(grants.iter().all(|(_, a)| *a == Action::Manage));
    }

    #[test]
    fn admin_cannot_manage_users_or_roles() {
        let grants = grants_for(ADMIN);
        assert_eq!(grants.len(), 12);
        assert!(grants.contains(&(Resource::Course, Action::Manage)));
        assert!(grants.contains(&(Resource::User, Action::Update)));
        assert!(!grants.contains(&(Resource::User, Action::Manage)));
        assert!(!grants.contains(&(Resource::Role, Action::Manage)));
        assert!(!grants.iter().any(|(r, _)| *r == Resource::Settings));
    }

    #[test]
    fn guest_is_read_only() {
        let grants = grants_for(GUEST);
        assert_eq!(grants.len(), 3);
        assert!(grants.iter().all(|(_, a)| *a == Action::Read));
    }
}
