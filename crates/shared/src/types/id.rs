//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `ClientId` where an `AccountId` is expected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Macro to generate typed ID wrappers around database sequence values.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wraps a raw sequence value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw sequence value.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

typed_id!(ClientId, "Unique identifier for a client.");
typed_id!(AccountId, "Internal identifier for an account row.");
typed_id!(MovementId, "Monotonically assigned identifier for a movement.");

/// Error returned when a value is not a valid six-digit account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("account number must be a six-digit number, got {0}")]
pub struct InvalidAccountNumber(pub i64);

/// Public six-digit account number (100000..=999999).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AccountNumber(u32);

impl AccountNumber {
    /// Smallest valid account number.
    pub const MIN: u32 = 100_000;
    /// Largest valid account number.
    pub const MAX: u32 = 999_999;

    /// Creates an account number, checking the six-digit range.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAccountNumber` if the value is outside 100000..=999999.
    pub fn new(value: u32) -> Result<Self, InvalidAccountNumber> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidAccountNumber(i64::from(value)))
        }
    }

    /// Creates an account number, clamping the value into range.
    #[must_use]
    pub const fn clamped(value: u32) -> Self {
        if value < Self::MIN {
            Self(Self::MIN)
        } else if value > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(value)
        }
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the value as stored in an `INTEGER` column.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_i32(self) -> i32 {
        // MAX fits comfortably in i32
        self.0 as i32
    }
}

impl TryFrom<i64> for AccountNumber {
    type Error = InvalidAccountNumber;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| InvalidAccountNumber(value))
            .and_then(Self::new)
    }
}

impl TryFrom<i32> for AccountNumber {
    type Error = InvalidAccountNumber;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<AccountNumber> for i64 {
    fn from(number: AccountNumber) -> Self {
        i64::from(number.0)
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountNumber {
    type Err = InvalidAccountNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.trim().parse().map_err(|_| InvalidAccountNumber(-1))?;
        Self::try_from(value)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
