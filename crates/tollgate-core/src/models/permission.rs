//! Permission domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::Action;
use super::resource::Resource;

/// A concrete `(resource, action)` grant.
///
/// The pair is the identity of the grant; `name` is only a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub resource: Resource,
    pub action: Action,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Whether this grant satisfies a check for `action` on `resource`.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.resource == resource && self.action.satisfies(action)
    }
}

/// Canonical label for a seeded permission, e.g. `COURSE_READ`.
pub fn permission_name(resource: Resource, action: Action) -> String {
    format!("{resource}_{action}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePermission {
    pub name: String,
    pub resource: Resource,
    pub action: Action,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePermission {
    pub name: Option<String>,
    pub resource: Option<Resource>,
    pub action: Option<Action>,
    pub description: Option<String>,
}
