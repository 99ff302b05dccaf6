//! Role domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SUPER_ADMIN: &str = "SUPER_ADMIN";
pub const ADMIN: &str = "ADMIN";
pub const GUEST: &str = "GUEST";

/// Role names that can never be deleted, whatever their `is_core` flag says.
pub const CORE_ROLE_NAMES: [&str; 3] = [SUPER_ADMIN, ADMIN, GUEST];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_active: bool,
    /// Marks additional roles as undeletable.
    pub is_core: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_protected(&self) -> bool {
        self.is_core || is_core_role_name(&self.name)
    }
}

pub fn is_core_role_name(name: &str) -> bool {
    CORE_ROLE_NAMES.contains(&name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: String,
    pub is_core: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
