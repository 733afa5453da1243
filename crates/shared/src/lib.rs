//! Shared types, errors, and configuration for Bankdesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs and account numbers for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, BusinessRulesConfig};
pub use error::{AppError, AppResult};
