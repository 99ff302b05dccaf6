#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tollgate_core::models::user::{CreateUser, User};
use tollgate_core::repository::{RoleRepository, UserRepository};
use tollgate_db::repository::{SurrealRoleRepository, SurrealUserRepository};
use tollgate_server::{AppState, build_router};

pub const SUBJECT_HEADER: &str = "x-authenticated-subject";

pub struct TestApp {
    pub router: Router,
    pub users: SurrealUserRepository<Db>,
    pub roles: SurrealRoleRepository<Db>,
}

pub async fn seeded_app() -> TestApp {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tollgate_db::run_migrations(&db).await.unwrap();

    let state = AppState::new(db.clone(), HeaderName::from_static(SUBJECT_HEADER));
    state.admin.seeder().seed_rbac_data().await.unwrap();

    TestApp {
        router: build_router(state),
        users: SurrealUserRepository::new(db.clone()),
        roles: SurrealRoleRepository::new(db),
    }
}

impl TestApp {
    pub async fn user(&self, subject: &str) -> User {
        self.users
            .create(CreateUser {
                external_id: subject.into(),
                email: format!("{}@example.com", subject.replace('|', ".")),
                display_name: subject.into(),
                default_role: None,
            })
            .await
            .unwrap()
    }

    pub async fn role_id(&self, name: &str) -> uuid::Uuid {
        self.roles.get_by_name(name).await.unwrap().id
    }

    pub async fn user_with_role(&self, subject: &str, role: &str) -> User {
        let user = self.user(subject).await;
        let role = self.roles.get_by_name(role).await.unwrap();
        self.roles
            .assign_to_user(user.id, role.id, None)
            .await
            .unwrap();
        user
    }
}

pub fn request(
    method: &str,
    uri: &str,
    subject: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(subject) = subject {
        builder = builder.header(SUBJECT_HEADER, subject);
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
