//! Authorization guard.
//!
//! Every protected operation runs through [`Guard::authorize`]: resolve the
//! caller's subject, map it to a local user, then check the required
//! `(resource, action)` against the freshly resolved permission set. A
//! failed check returns before the wrapped operation is touched.

use serde::Serialize;
use tollgate_core::error::{TollgateError, TollgateResult};
use tollgate_core::models::action::Action;
use tollgate_core::models::resource::Resource;
use tollgate_core::models::role::Role;
use tollgate_core::repository::{PermissionRepository, RoleRepository, UserRepository};
use tracing::warn;
use uuid::Uuid;

use crate::identity::IdentityBridge;
use crate::resolver::PermissionResolver;

/// Inbound request as seen by the guard.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    subject: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
        }
    }

    /// The external subject, if one was supplied and is non-blank.
    pub fn subject(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Identity handed to a protected operation once the caller is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RbacContext {
    pub user_id: Uuid,
    pub external_id: String,
}

/// Resolves callers and enforces required permissions.
#[derive(Clone)]
pub struct Guard<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    identity: IdentityBridge<U>,
    resolver: PermissionResolver<U, R, P>,
}

impl<U, R, P> Guard<U, R, P>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    pub fn new(identity: IdentityBridge<U>, resolver: PermissionResolver<U, R, P>) -> Self {
        Self { identity, resolver }
    }

    pub fn resolver(&self) -> &PermissionResolver<U, R, P> {
        &self.resolver
    }

    /// Resolve the caller without any permission check.
    ///
    /// Returns `Ok(None)` both when no subject was supplied and when the
    /// subject has no local user.
    pub async fn get_rbac_context(
        &self,
        request: &RequestContext,
    ) -> TollgateResult<Option<RbacContext>> {
        let Some(subject) = request.subject() else {
            return Ok(None);
        };

        let user_id = self.identity.resolve_local_user_id(subject).await?;
        Ok(user_id.map(|user_id| RbacContext {
            user_id,
            external_id: subject.to_string(),
        }))
    }

    /// Resolve the caller, failing with `Unauthenticated` when no subject
    /// was supplied and `UserNotFound` when it maps to no local user.
    pub async fn require_context(&self, request: &RequestContext) -> TollgateResult<RbacContext> {
        let Some(subject) = request.subject() else {
            return Err(TollgateError::Unauthenticated);
        };

        match self.identity.resolve_local_user_id(subject).await? {
            Some(user_id) => Ok(RbacContext {
                user_id,
                external_id: subject.to_string(),
            }),
            None => {
                warn!(%subject, "Authenticated subject has no local user");
                Err(TollgateError::UserNotFound)
            }
        }
    }

    /// Check that the caller holds `(resource, action)`.
    pub async fn authorize(
        &self,
        request: &RequestContext,
        resource: Resource,
        action: Action,
    ) -> TollgateResult<RbacContext> {
        let ctx = self.require_context(request).await?;
        self.check(&ctx, resource, action).await?;
        Ok(ctx)
    }

    /// Permission check for an already resolved caller.
    pub async fn check(
        &self,
        ctx: &RbacContext,
        resource: Resource,
        action: Action,
    ) -> TollgateResult<()> {
        if self
            .resolver
            .has_permission(ctx.user_id, resource, action)
            .await?
        {
            return Ok(());
        }

        warn!(
            user_id = %ctx.user_id,
            %resource,
            %action,
            "Permission denied"
        );
        Err(TollgateError::forbidden(format!(
            "missing permission {resource}:{action}"
        )))
    }

    /// Wrap `handler` so it only runs for callers holding
    /// `(resource, action)`.
    pub fn protect_api_route<F, Fut, T>(
        &self,
        resource: Resource,
        action: Action,
        handler: F,
    ) -> ProtectedRoute<'_, U, R, P, F>
    where
        F: Fn(RbacContext) -> Fut,
        Fut: Future<Output = TollgateResult<T>>,
    {
        ProtectedRoute {
            guard: self,
            resource,
            action,
            handler,
        }
    }
}

/// A handler bound to the permission it requires.
pub struct ProtectedRoute<'g, U, R, P, F>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    guard: &'g Guard<U, R, P>,
    resource: Resource,
    action: Action,
    handler: F,
}

impl<U, R, P, F> ProtectedRoute<'_, U, R, P, F>
where
    U: UserRepository,
    R: RoleRepository,
    P: PermissionRepository,
{
    /// Authorize `request` and, on success, run the handler and return its
    /// result unchanged.
    pub async fn call<Fut, T>(&self, request: &RequestContext) -> TollgateResult<T>
    where
        F: Fn(RbacContext) -> Fut,
        Fut: Future<Output = TollgateResult<T>>,
    {
        let ctx = self
            .guard
            .authorize(request, self.resource, self.action)
            .await?;
        (self.handler)(ctx).await
    }
}

/// Core roles can never be deleted, whatever the caller holds.
pub fn ensure_role_deletable(role: &Role) -> TollgateResult<()> {
    if role.is_protected() {
        warn!(role_id = %role.id, name = %role.name, "Refused to delete core role");
        return Err(TollgateError::forbidden("cannot delete core system roles"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn role(name: &str, is_core: bool) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            is_active: true,
            is_core,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn blank_subject_is_anonymous() {
        assert_eq!(RequestContext::anonymous().subject(), None);
        assert_eq!(RequestContext::with_subject("   ").subject(), None);
        assert_eq!(
            RequestContext::with_subject(" idp|u1 ").subject(),
            Some("idp|u1")
        );
    }

    #[test]
    fn core_roles_are_not_deletable() {
        for name in ["SUPER_ADMIN", "ADMIN", "GUEST"] {
            let err = ensure_role_deletable(&role(name, false)).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Forbidden: cannot delete core system roles"
            );
        }
        assert!(ensure_role_deletable(&role("CUSTOM_CORE", true)).is_err());
        assert!(ensure_role_deletable(&role("EDITOR", false)).is_ok());
    }
}
