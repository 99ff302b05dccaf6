//! Router construction and shared application state.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, HeaderName};
use axum::routing::{delete, get, post};
use surrealdb::{Connection, Surreal};
use tollgate_authz::{CatalogAdmin, RequestContext};
use tollgate_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealUserRepository,
};

use crate::api;
use crate::api::error::ApiError;

pub type Admin<C> = CatalogAdmin<
    SurrealUserRepository<C>,
    SurrealRoleRepository<C>,
    SurrealPermissionRepository<C>,
>;

pub struct AppState<C: Connection> {
    pub admin: Arc<Admin<C>>,
    pub identity_header: HeaderName,
}

impl<C: Connection> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            admin: Arc::clone(&self.admin),
            identity_header: self.identity_header.clone(),
        }
    }
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, identity_header: HeaderName) -> Self {
        let admin = CatalogAdmin::new(
            SurrealUserRepository::new(db.clone()),
            SurrealRoleRepository::new(db.clone()),
            SurrealPermissionRepository::new(db),
        );
        Self {
            admin: Arc::new(admin),
            identity_header,
        }
    }

    /// The caller as described by the identity header. A header that is
    /// not valid UTF-8 counts as absent.
    pub fn request_context(&self, headers: &HeaderMap) -> RequestContext {
        headers
            .get(&self.identity_header)
            .and_then(|value| value.to_str().ok())
            .map(RequestContext::with_subject)
            .unwrap_or_default()
    }

    /// Resolves the caller before a handler inspects its path or body, so
    /// a missing or unmapped identity is reported ahead of malformed input.
    pub async fn caller(&self, headers: &HeaderMap) -> Result<RequestContext, ApiError> {
        let request = self.request_context(headers);
        self.admin.guard().require_context(&request).await?;
        Ok(request)
    }
}

pub fn build_router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route(
            "/api/roles",
            get(api::roles::list_roles::<C>).post(api::roles::create_role::<C>),
        )
        .route(
            "/api/roles/{id}",
            get(api::roles::get_role::<C>)
                .patch(api::roles::update_role::<C>)
                .delete(api::roles::delete_role::<C>),
        )
        .route(
            "/api/roles/{id}/permissions",
            post(api::roles::assign_permission::<C>),
        )
        .route(
            "/api/roles/{id}/permissions/bulk",
            post(api::roles::bulk_assign_permissions::<C>),
        )
        .route(
            "/api/roles/{id}/permissions/bulk-remove",
            post(api::roles::bulk_remove_permissions::<C>),
        )
        .route(
            "/api/roles/{id}/permissions/{permission_id}",
            delete(api::roles::remove_permission::<C>),
        )
        .route(
            "/api/permissions",
            get(api::permissions::list_permissions::<C>)
                .post(api::permissions::create_permission::<C>),
        )
        .route(
            "/api/permissions/{id}",
            get(api::permissions::get_permission::<C>)
                .patch(api::permissions::update_permission::<C>)
                .delete(api::permissions::delete_permission::<C>),
        )
        .route(
            "/api/users/{id}/roles",
            get(api::users::list_assignments::<C>).post(api::users::assign_role::<C>),
        )
        .route(
            "/api/users/{id}/roles/{role_id}",
            delete(api::users::remove_role::<C>),
        )
        .route(
            "/api/users/{id}/permissions",
            get(api::users::effective_permissions::<C>),
        )
        .route("/api/rbac/matrix", get(api::rbac::matrix::<C>))
        .route("/api/rbac/seed", post(api::rbac::seed::<C>))
        .with_state(state)
}
