//! Movement ledger and posting logic.
//!
//! This module implements the core of the system:
//! - Movement and account snapshot types
//! - Running balance resolution and chain auditing
//! - Business day windows and the daily debit limit
//! - The storage seam (`LedgerStore` / `LedgerTx`) and an in-memory store
//! - The posting engine

pub mod balance;
pub mod clock;
pub mod engine;
pub mod error;
pub mod limit;
pub mod memory;
pub mod store;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use balance::{ChainError, RunningBalance, current_balance, verify_chain};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{AMOUNT_SCALE, MAX_AMOUNT, PostingEngine, PostingRules};
pub use error::LedgerError;
pub use limit::{BusinessDay, DailyLimit, DayWindow};
pub use memory::InMemoryLedger;
pub use store::{LedgerStore, LedgerTx, LockMode};
pub use types::{AccountSnapshot, BalanceSummary, Movement, MovementKind, NewMovement};
