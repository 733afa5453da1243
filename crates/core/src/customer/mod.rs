//! Client and account rules.
//!
//! - Domain types and partial updates for clients and accounts
//! - The status gate shared with the posting engine
//! - Account number generation
//! - Client password hashing

pub mod error;
pub mod gate;
pub mod numbering;
pub mod password;
pub mod types;

pub use error::CustomerError;
pub use numbering::{AccountNumberGenerator, MAX_NUMBER_ATTEMPTS};
pub use password::{PasswordError, hash_password, verify_password};
pub use types::{AccountChanges, AccountType, ClientChanges, NewClient, validate_opening_balance};
