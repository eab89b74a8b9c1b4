use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PermissionsError;

/// Privilege tier of a caller.
///
/// The set is closed: every permission declaration and every query names one
/// of these variants. Ordering follows privilege, lowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Anonymous caller.
    Public,
    /// Any authenticated caller, regardless of ownership.
    Users,
    /// Authenticated caller acting on its own records.
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Every role, in privilege order.
    pub const ALL: [Role; 5] = [
        Role::Public,
        Role::Users,
        Role::User,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Canonical lowercase name, as used in configuration and declarations.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Public => "public",
            Role::Users => "users",
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PermissionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PermissionsError::UnknownRole(s.to_owned()))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!("SuperAdmin".parse::<Role>(), Ok(Role::SuperAdmin));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "root".parse::<Role>(),
            Err(PermissionsError::UnknownRole("root".to_owned()))
        );
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"superadmin\"");
        let role: Role = serde_json::from_str("\"users\"").unwrap();
        assert_eq!(role, Role::Users);
    }
}
