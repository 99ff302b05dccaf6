//! Tollgate Server: HTTP administration surface over the RBAC engine.

pub mod api;
pub mod app;
pub mod config;

pub use app::{AppState, build_router};
pub use config::ServerConfig;
