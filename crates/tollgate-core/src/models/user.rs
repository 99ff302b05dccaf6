//! User domain model.
//!
//! Only the fields the authorization core reads are modelled here; profile
//! data lives with the surrounding application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::GUEST;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Subject identifier issued by the external identity provider.
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    /// Role name consulted only when the user has no active assignment.
    pub default_role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub external_id: String,
    pub email: String,
    pub display_name: String,
    /// Falls back to [`GUEST`] when absent.
    pub default_role: Option<String>,
}

impl CreateUser {
    pub fn default_role_or_guest(&self) -> String {
        self.default_role.clone().unwrap_or_else(|| GUEST.into())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub default_role: Option<String>,
}
