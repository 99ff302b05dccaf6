//! Shared setup for authz integration tests: an in-memory SurrealDB with
//! migrations applied and the catalog optionally seeded.

#![allow(dead_code)]

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tollgate_authz::{CatalogAdmin, RequestContext};
use tollgate_core::models::user::{CreateUser, User};
use tollgate_core::repository::{RoleRepository, UserRepository};
use tollgate_db::repository::{
    SurrealPermissionRepository, SurrealRoleRepository, SurrealUserRepository,
};
use uuid::Uuid;

pub type Admin = CatalogAdmin<
    SurrealUserRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealPermissionRepository<Db>,
>;

pub struct Harness {
    pub users: SurrealUserRepository<Db>,
    pub roles: SurrealRoleRepository<Db>,
    pub permissions: SurrealPermissionRepository<Db>,
    pub admin: Admin,
}

pub async fn setup() -> Harness {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tollgate_db::run_migrations(&db).await.unwrap();

    let users = SurrealUserRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db);
    let admin = CatalogAdmin::new(users.clone(), roles.clone(), permissions.clone());

    Harness {
        users,
        roles,
        permissions,
        admin,
    }
}

/// [`setup`] plus the default catalog.
pub async fn seeded() -> Harness {
    let h = setup().await;
    h.admin.seeder().seed_rbac_data().await.unwrap();
    h
}

impl Harness {
    /// Create a user whose subject is `external_id` and whose default role
    /// is `default_role` (GUEST when `None`).
    pub async fn user(&self, external_id: &str, default_role: Option<&str>) -> User {
        self.users
            .create(CreateUser {
                external_id: external_id.into(),
                email: format!("{}@example.com", external_id.replace('|', ".")),
                display_name: external_id.into(),
                default_role: default_role.map(Into::into),
            })
            .await
            .unwrap()
    }

    pub async fn role_id(&self, name: &str) -> Uuid {
        self.roles.get_by_name(name).await.unwrap().id
    }

    /// A user holding `role` through an explicit assignment.
    pub async fn user_with_role(&self, external_id: &str, role: &str) -> User {
        let user = self.user(external_id, None).await;
        let role_id = self.role_id(role).await;
        self.roles
            .assign_to_user(user.id, role_id, None)
            .await
            .unwrap();
        user
    }
}

pub fn as_subject(user: &User) -> RequestContext {
    RequestContext::with_subject(user.external_id.clone())
}
