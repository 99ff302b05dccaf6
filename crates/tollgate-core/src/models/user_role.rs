//! User-to-role assignment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deriving assignment ids from the `(user, role)` pair.
const ASSIGNMENT_NAMESPACE: Uuid = Uuid::from_u128(0x6a1f_0c2e_9b4d_4e57_a3c8_51d2_7f90_e41b);

/// One row per `(user_id, role_id)` pair for its whole lifetime; removal
/// flips `is_active` instead of deleting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    /// Local id of the administrator who made the latest assignment.
    pub assigned_by: Option<Uuid>,
    pub assigned_at: DateTime<Utc>,
    pub is_active: bool,
}

impl UserRole {
    /// Deterministic row id for a `(user, role)` pair.
    pub fn assignment_id(user_id: Uuid, role_id: Uuid) -> Uuid {
        let mut key = [0u8; 32];
        key[..16].copy_from_slice(user_id.as_bytes());
        key[16..].copy_from_slice(role_id.as_bytes());
        Uuid::new_v5(&ASSIGNMENT_NAMESPACE, &key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_id_is_stable_and_ordered() {
        let user = Uuid::new_v4();
        let role = Uuid::new_v4();
        assert_eq!(
            UserRole::assignment_id(user, role),
            UserRole::assignment_id(user, role)
        );
        assert_ne!(
            UserRole::assignment_id(user, role),
            UserRole::assignment_id(role, user)
        );
    }
}
