//! # portal-types
//!
//! Shared domain types for the portal scheduler:
//! - Job records: durable pairings of a cron expression and an action identifier
//! - Settings: layered configuration for the portal daemon
//! - Errors: unified error type for configuration and validation

pub mod config;
pub mod error;
pub mod job;

pub use config::Settings;
pub use error::PortalError;
pub use job::JobRecord;
