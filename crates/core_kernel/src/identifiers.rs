//! Strongly-typed identifiers for domain entities
//!
//! Rows are keyed by database-generated 64-bit integers. Wrapping them in
//! newtypes keeps an owner id from being passed where a property id is
//! expected, while serializing as a plain number on the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $entity:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw database key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns true when the key can refer to a stored row
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }

            /// Returns the entity name used in error messages
            pub fn entity() -> &'static str {
                $entity
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// Catalog identifiers
define_id!(OwnerId, "Owner");
define_id!(PropertyId, "Property");
define_id!(PropertyImageId, "PropertyImage");
define_id!(PropertyTraceId, "PropertyTrace");

// Identity identifiers
define_id!(UserId, "User");
define_id!(RoleId, "Role");
define_id!(RefreshTokenId, "RefreshToken");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_display() {
        let id = OwnerId::new(42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_parsing() {
        let parsed: PropertyId = " 17 ".parse().unwrap();
        assert_eq!(parsed, PropertyId::new(17));
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&OwnerId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
