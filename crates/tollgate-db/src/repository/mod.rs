//! SurrealDB repository implementations.

mod permission;
mod role;
mod user;

pub use permission::SurrealPermissionRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;

use uuid::Uuid;

use crate::error::DbError;

/// Parse a UUID stored as a string column or record id.
fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::InvalidRow(format!("invalid UUID {s}: {e}")))
}
