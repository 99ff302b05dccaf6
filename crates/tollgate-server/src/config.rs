//! Server configuration sourced from environment variables.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::HeaderName;
use tollgate_db::DbConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_IDENTITY_HEADER: &str = "x-authenticated-subject";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Header carrying the subject id set by the upstream identity provider.
    pub identity_header: HeaderName,
    /// Run the catalog seeder before accepting requests.
    pub seed_on_startup: bool,
    pub db: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            identity_header: HeaderName::from_static(DEFAULT_IDENTITY_HEADER),
            seed_on_startup: true,
            db: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = DbConfig::default();

        let bind_addr = lookup("TOLLGATE_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .with_context(|| "parse TOLLGATE_BIND")?;
        let identity_header = lookup("TOLLGATE_IDENTITY_HEADER")
            .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string());
        let identity_header = HeaderName::from_bytes(identity_header.to_ascii_lowercase().as_bytes())
            .with_context(|| format!("parse TOLLGATE_IDENTITY_HEADER: {identity_header}"))?;
        let seed_on_startup = match lookup("TOLLGATE_SEED_ON_STARTUP") {
            Some(value) => parse_bool(&value)
                .with_context(|| format!("parse TOLLGATE_SEED_ON_STARTUP: {value}"))?,
            None => true,
        };

        let db = DbConfig {
            url: lookup("TOLLGATE_DB_URL").unwrap_or(defaults.url),
            namespace: lookup("TOLLGATE_DB_NAMESPACE").unwrap_or(defaults.namespace),
            database: lookup("TOLLGATE_DB_DATABASE").unwrap_or(defaults.database),
            username: lookup("TOLLGATE_DB_USERNAME").unwrap_or(defaults.username),
            password: lookup("TOLLGATE_DB_PASSWORD").unwrap_or(defaults.password),
        };

        Ok(Self {
            bind_addr,
            identity_header,
            seed_on_startup,
            db,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
