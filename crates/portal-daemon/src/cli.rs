//! CLI argument parsing for the portal daemon.
//!
//! CLI flags have the highest precedence and override values from the
//! config file and environment.

use clap::{Parser, Subcommand};

/// Portal Scheduler Daemon
///
/// Recurring maintenance-task scheduler for the services portal.
#[derive(Parser, Debug)]
#[command(name = "portal-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/portal-scheduler/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the scheduler daemon
    Start {
        /// Run in foreground (don't daemonize)
        #[arg(short, long)]
        foreground: bool,

        /// Override the data directory
        #[arg(long)]
        data_dir: Option<String>,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status
    Status,

    /// Inspect or cancel scheduled jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommands,
    },
}

/// Job management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum JobsCommands {
    /// List all persisted jobs
    List,

    /// Cancel a job by id
    Cancel {
        /// Job id to cancel
        job_id: String,
    },
}
