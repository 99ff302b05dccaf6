//! The closed vocabulary of protectable resources.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TollgateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resource {
    User,
    Role,
    Permission,
    Course,
    Enrollment,
    Payment,
    PaymentAccount,
    MonthlyFee,
    Gallery,
    Blog,
    Dashboard,
    Settings,
}

impl Resource {
    /// Every resource, in catalog order.
    pub const ALL: [Resource; 12] = [
        Resource::User,
        Resource::Role,
        Resource::Permission,
        Resource::Course,
        Resource::Enrollment,
        Resource::Payment,
        Resource::PaymentAccount,
        Resource::MonthlyFee,
        Resource::Gallery,
        Resource::Blog,
        Resource::Dashboard,
        Resource::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resource::User => "USER",
            Resource::Role => "ROLE",
            Resource::Permission => "PERMISSION",
            Resource::Course => "COURSE",
            Resource::Enrollment => "ENROLLMENT",
            Resource::Payment => "PAYMENT",
            Resource::PaymentAccount => "PAYMENT_ACCOUNT",
            Resource::MonthlyFee => "MONTHLY_FEE",
            Resource::Gallery => "GALLERY",
            Resource::Blog => "BLOG",
            Resource::Dashboard => "DASHBOARD",
            Resource::Settings => "SETTINGS",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = TollgateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| TollgateError::validation(format!("unknown resource: {value}")))
    }
}
