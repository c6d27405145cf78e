//! Portal daemon library exports.
//!
//! This crate provides the CLI daemon binary for the portal scheduler.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (start, stop, status, jobs)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, JobsCommands};
pub use commands::{handle_jobs, show_status, start_daemon, stop_daemon};
