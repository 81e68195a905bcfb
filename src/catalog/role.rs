//! Actor roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role an actor acts under. Determines which operations it may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Issuing financial institution.
    Institution,
    /// Election authority.
    Authority,
    /// Bond beneficiary (e.g. a political party).
    Beneficiary,
    /// Auditor with read-through access.
    Auditor,
    /// Regular user purchasing bonds.
    User,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Institution,
        Role::Authority,
        Role::Beneficiary,
        Role::Auditor,
        Role::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Institution => "institution",
            Role::Authority => "authority",
            Role::Beneficiary => "beneficiary",
            Role::Auditor => "auditor",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
