//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};
use tollgate_authz::SeedReport;
use tollgate_core::models::permission::Permission;
use tollgate_core::models::role::Role;
use tollgate_core::models::user_role::UserRole;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<Role>,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RoleCreatedResponse {
    pub role_id: Uuid,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PermissionListResponse {
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub permission: Permission,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignPermissionRequest {
    #[serde(default)]
    pub permission_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionIdsRequest {
    #[serde(default)]
    pub permission_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignRoleRequest {
    #[serde(default)]
    pub role_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<UserRole>,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub report: SeedReport,
}
