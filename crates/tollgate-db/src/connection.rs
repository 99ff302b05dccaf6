//! Catalog store connection.
//!
//! The server reaches SurrealDB over WebSocket with root credentials and
//! works inside a single namespace/database pair. Tests bypass this module
//! and use the in-memory engine directly.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

#[derive(Debug, Clone)]
pub struct DbConfig {
    /// `host:port` of the SurrealDB WebSocket listener.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "tollgate".into(),
            database: "catalog".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    fn root_credentials(&self) -> Root {
        Root {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

/// Owns the client every repository is built from.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Sign in and select the catalog database. The schema is left as is.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to catalog store"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(config.root_credentials()).await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        Ok(Self { db })
    }

    /// Connect and migrate; the server's startup path.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        let manager = Self::connect(config).await?;
        run_migrations(&manager.db).await?;
        info!("Catalog store ready");
        Ok(manager)
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
