//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and re-read the store on every
//! call; nothing here caches across requests.

use uuid::Uuid;

use crate::error::TollgateResult;
use crate::models::{
    action::Action,
    permission::{CreatePermission, Permission, UpdatePermission},
    resource::Resource,
    role::{CreateRole, Role, UpdateRole},
    user::{CreateUser, UpdateUser, User},
    user_role::UserRole,
};

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TollgateResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TollgateResult<User>> + Send;
    /// Look up the local record for an identity-provider subject.
    fn get_by_external_id(
        &self,
        external_id: &str,
    ) -> impl Future<Output = TollgateResult<User>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = TollgateResult<User>> + Send;
}

pub trait RoleRepository: Send + Sync {
    /// Fails with `Conflict` when the name is taken.
    fn create(&self, input: CreateRole) -> impl Future<Output = TollgateResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TollgateResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = TollgateResult<Role>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = TollgateResult<Role>> + Send;
    /// Hard-deletes the role and its permission links; its user
    /// assignments are deactivated, not removed. Core-role protection is
    /// the caller's responsibility.
    fn delete(&self, id: Uuid) -> impl Future<Output = TollgateResult<()>> + Send;
    fn list(&self) -> impl Future<Output = TollgateResult<Vec<Role>>> + Send;

    /// Assign a role to a user, reactivating a previously removed
    /// assignment in place. Fails with `Conflict` if already active.
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        assigned_by: Option<Uuid>,
    ) -> impl Future<Output = TollgateResult<UserRole>> + Send;

    /// Deactivate an assignment. Fails with `NotFound` if no active one.
    fn unassign_from_user(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = TollgateResult<()>> + Send;

    /// Active roles held through active assignments.
    fn get_user_roles(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = TollgateResult<Vec<Role>>> + Send;

    /// Every assignment row for a user, active or not.
    fn get_user_assignments(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = TollgateResult<Vec<UserRole>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// Fails with `Conflict` when the `(resource, action)` pair exists.
    fn create(
        &self,
        input: CreatePermission,
    ) -> impl Future<Output = TollgateResult<Permission>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TollgateResult<Permission>> + Send;
    fn get_by_resource_action(
        &self,
        resource: Resource,
        action: Action,
    ) -> impl Future<Output = TollgateResult<Permission>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePermission,
    ) -> impl Future<Output = TollgateResult<Permission>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = TollgateResult<()>> + Send;
    fn list(&self) -> impl Future<Output = TollgateResult<Vec<Permission>>> + Send;

    /// Link a permission to a role. Re-linking is a no-op.
    fn grant_to_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = TollgateResult<()>> + Send;

    fn revoke_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> impl Future<Output = TollgateResult<()>> + Send;

    /// Link several permissions in one transaction. Every id must exist;
    /// otherwise nothing is written and `NotFound` lists the missing ids.
    fn bulk_grant_to_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> impl Future<Output = TollgateResult<()>> + Send;

    /// Unlink several permissions in one transaction. Missing links are
    /// ignored.
    fn bulk_revoke_from_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> impl Future<Output = TollgateResult<()>> + Send;

    /// All permissions linked to a role.
    fn get_role_permissions(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = TollgateResult<Vec<Permission>>> + Send;
}
