//! Tollgate Core: domain models, error taxonomy and repository traits
//! shared by the store, the authorization layer and the HTTP surface.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TollgateError, TollgateResult};
