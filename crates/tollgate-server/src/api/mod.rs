//! HTTP API handlers.
//!
//! Handlers translate HTTP into [`CatalogAdmin`](tollgate_authz::CatalogAdmin)
//! calls; authorization, validation and store access all happen there.

pub mod error;
pub mod permissions;
pub mod rbac;
pub mod roles;
pub mod types;
pub mod users;
