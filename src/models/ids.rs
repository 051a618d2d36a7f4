//! Strongly-typed ID wrappers for all entity types
//!
//! Ids are integer surrogates assigned by the store on insert. Using newtype
//! wrappers prevents accidentally mixing up IDs from different tables.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the raw integer
            pub const fn get(&self) -> i64 {
                self.0
            }

            /// True until the store assigns an id
            pub const fn is_unassigned(&self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }
    };
}

define_id!(CategoryId, "cat-");
define_id!(IncomeId, "inc-");
define_id!(ExpenseId, "exp-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unassigned() {
        assert!(CategoryId::default().is_unassigned());
        assert!(!CategoryId::new(1).is_unassigned());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(IncomeId::new(42).to_string(), "inc-42");
        assert_eq!(ExpenseId::new(7).to_string(), "exp-7");
    }

    #[test]
    fn test_id_parse() {
        assert_eq!("cat-3".parse::<CategoryId>().unwrap(), CategoryId::new(3));
        assert_eq!("3".parse::<CategoryId>().unwrap(), CategoryId::new(3));
        assert!("cat-x".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_id_serialization() {
        let id = ExpenseId::new(12);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "12");
        let back: ExpenseId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
