//! Core business logic for Bankdesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached through the traits in [`ledger::store`], which the `db`
//! crate implements for PostgreSQL and [`ledger::memory`] implements in memory.
//!
//! # Modules
//!
//! - `ledger` - Movement posting, running balances and the daily debit limit
//! - `customer` - Client and account rules (status gate, numbering, passwords)
//! - `reports` - Account statement aggregation

pub mod customer;
pub mod ledger;
pub mod reports;
