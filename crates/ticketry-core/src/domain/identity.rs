//! Identity value objects
//!
//! Every aggregate is identified by a positive 64-bit integer assigned by the
//! store on first save. An aggregate that has not been saved yet carries no
//! identity at all (`Option::None`), so a constructed id is always valid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Validate and create a new id; the value must be positive
            pub fn new(value: i64) -> Result<Self> {
                if value <= 0 {
                    return Err(Error::validation(format!(
                        "{} must be a positive integer, got {}",
                        $label, value
                    )));
                }
                Ok(Self(value))
            }

            /// Get the underlying numeric value
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = Error;

            fn try_from(value: i64) -> Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let value = s.trim().parse::<i64>().map_err(|_| {
                    Error::validation(format!("{} must be a positive integer, got '{}'", $label, s))
                })?;
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identity of an issue
    IssueId,
    "Issue ID"
);
define_id!(
    /// Identity of a team
    TeamId,
    "Team ID"
);
define_id!(
    /// Identity of a user
    UserId,
    "User ID"
);
define_id!(
    /// Identity of a membership row owned by a team
    TeamMemberId,
    "Team member ID"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_non_positive_values_rejected() {
        for value in [0, -1, -42, i64::MIN] {
            let err = IssueId::new(value).unwrap_err();
            assert!(err.is_validation(), "{} should be rejected", value);
        }
        assert!(TeamId::try_from(0).is_err());
        assert!(UserId::try_from(-5).is_err());
    }

    #[test]
    fn test_string_round_trip() {
        for value in [1, 7, 999_999, i64::MAX] {
            let id = UserId::new(value).unwrap();
            let parsed: UserId = id.to_string().parse().unwrap();
            assert_eq!(parsed, id);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<TeamId>().unwrap_err().is_validation());
        assert!("".parse::<TeamId>().is_err());
        assert!("0".parse::<TeamId>().is_err());
        assert!("-3".parse::<TeamId>().is_err());
        assert!("1.5".parse::<TeamId>().is_err());
    }

    #[test]
    fn test_usable_as_map_key_and_raw_value() {
        let mut map = HashMap::new();
        map.insert(IssueId::new(3).unwrap(), "three");
        assert_eq!(map.get(&IssueId::new(3).unwrap()), Some(&"three"));

        let raw: i64 = IssueId::new(3).unwrap().into();
        assert_eq!(raw, 3);
    }

    #[test]
    fn test_serde_is_transparent_integer() {
        let id = TeamId::new(12).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
        let back: TeamId = serde_json::from_str("12").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<TeamId>("0").is_err());
    }
}
