use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The five account roles, ordered from least to most privileged.
///
/// `Student` and `Vendor` are the two sides of the carnival economy;
/// the three admin tiers form a strict ladder: SubAdmin < Admin < SuperAdmin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Student,
    Vendor,
    SubAdmin,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Vendor,
        Role::SubAdmin,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// True for the three administrative tiers.
    pub fn is_admin_tier(&self) -> bool {
        matches!(self, Role::SubAdmin | Role::Admin | Role::SuperAdmin)
    }

    /// True if this role sits at or above `other` on the admin ladder.
    ///
    /// Student and Vendor are outside the ladder and only satisfy
    /// themselves.
    pub fn at_least(&self, other: Role) -> bool {
        match (self.is_admin_tier(), other.is_admin_tier()) {
            (true, true) => self >= &other,
            _ => self == &other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Vendor => "Vendor",
            Role::SubAdmin => "SubAdmin",
            Role::Admin => "Admin",
            Role::SuperAdmin => "SuperAdmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Student" => Ok(Role::Student),
            "Vendor" => Ok(Role::Vendor),
            "SubAdmin" => Ok(Role::SubAdmin),
            "Admin" => Ok(Role::Admin),
            "SuperAdmin" => Ok(Role::SuperAdmin),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn admin_ladder_ordering() {
        assert!(Role::SuperAdmin.at_least(Role::Admin));
        assert!(Role::SuperAdmin.at_least(Role::SubAdmin));
        assert!(Role::Admin.at_least(Role::SubAdmin));
        assert!(!Role::SubAdmin.at_least(Role::Admin));
        assert!(!Role::Admin.at_least(Role::SuperAdmin));
    }

    #[test]
    fn student_and_vendor_are_outside_the_ladder() {
        assert!(!Role::Vendor.at_least(Role::SubAdmin));
        assert!(!Role::SuperAdmin.at_least(Role::Vendor));
        assert!(Role::Student.at_least(Role::Student));
    }

    #[test]
    fn admin_tier_membership() {
        assert!(!Role::Student.is_admin_tier());
        assert!(!Role::Vendor.is_admin_tier());
        assert!(Role::SubAdmin.is_admin_tier());
        assert!(Role::Admin.is_admin_tier());
        assert!(Role::SuperAdmin.is_admin_tier());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "Janitor".parse::<Role>().unwrap_err();
        assert_eq!(err, TypeError::UnknownRole("Janitor".to_string()));
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(index in 0usize..Role::ALL.len()) {
            let role = Role::ALL[index];
            let parsed: Role = role.as_str().parse().unwrap();
            prop_assert_eq!(role, parsed);
        }
    }
}
