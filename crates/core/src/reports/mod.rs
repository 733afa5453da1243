//! Account statement reports.
//!
//! Pure aggregation over movements already loaded by the `db` crate. Date
//! ranges are inclusive business days in the configured timezone.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::StatementBuilder;
pub use types::*;
