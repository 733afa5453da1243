//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod client;
pub mod movement;
pub mod posting;
pub mod report;

pub use account::{AccountError, AccountFilter, AccountRepository, AccountWithBalance, CreateAccountInput};
pub use client::{ClientError, ClientFilter, ClientRepository};
pub use movement::{MovementError, MovementFilter, MovementRepository, MovementWithAccount};
pub use posting::{PgLedgerStore, PgLedgerTx, to_movement};
pub use report::{ReportRepository, StatementError};
