//! Portal Scheduler Daemon
//!
//! Recurring maintenance-task scheduler for the services portal.
//!
//! # Usage
//!
//! ```bash
//! portal-daemon start [--foreground] [--data-dir PATH]
//! portal-daemon stop
//! portal-daemon status
//! portal-daemon jobs list
//! portal-daemon jobs cancel <JOB_ID>
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/portal-scheduler/config.toml)
//! 3. Environment variables (PORTAL_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use portal_daemon::{handle_jobs, show_status, start_daemon, stop_daemon, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            foreground,
            data_dir,
        } => {
            start_daemon(
                cli.config.as_deref(),
                foreground,
                data_dir.as_deref(),
                cli.log_level.as_deref(),
            )
            .await?;
        }
        Commands::Stop => {
            stop_daemon()?;
        }
        Commands::Status => {
            show_status()?;
        }
        Commands::Jobs { command } => {
            handle_jobs(cli.config.as_deref(), command).await?;
        }
    }

    Ok(())
}
