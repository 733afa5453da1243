//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::clients::Entity as Clients;
pub use super::movements::Entity as Movements;
