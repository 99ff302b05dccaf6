//! Operation classes that can be granted on a resource.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TollgateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    /// Wildcard: satisfies every other action on the same resource.
    Manage,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Manage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Read => "READ",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::Manage => "MANAGE",
        }
    }

    /// Whether a grant of `self` satisfies a check for `required`.
    ///
    /// A grant matches its own action, and `Manage` matches everything.
    pub fn satisfies(self, required: Action) -> bool {
        self == required || self == Action::Manage
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = TollgateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| TollgateError::validation(format!("unknown action: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manage_satisfies_every_action() {
        for required in Action::ALL {
            assert!(Action::Manage.satisfies(required));
        }
    }

    #[test]
    fn concrete_actions_only_satisfy_themselves() {
        assert!(Action::Read.satisfies(Action::Read));
        assert!(!Action::Read.satisfies(Action::Create));
        assert!(!Action::Delete.satisfies(Action::Manage));
    }

    #[test]
    fn action_from_str_invalid() {
        assert!("WRITE".parse::<Action>().is_err());
        assert_eq!("MANAGE".parse::<Action>().unwrap(), Action::Manage);
    }
}
