//! Command implementations for the portal daemon.
//!
//! Handles:
//! - start: load config, open the job store, run the scheduler
//! - stop: signal a running daemon via its PID file
//! - status: check whether a daemon is running
//! - jobs: list or cancel persisted jobs directly on the store

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};
use uuid::Uuid;

use portal_scheduler::{Scheduler, SchedulerConfig, TaskCatalog};
use portal_store::{FileJobStore, JobStore};
use portal_tasks::{MaintenanceCatalog, MaintenanceConfig};
use portal_types::Settings;

use crate::cli::JobsCommands;

/// Get the PID file path
fn pid_file_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| {
            #[cfg(unix)]
            {
                dirs.runtime_dir()
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| dirs.cache_dir().to_path_buf())
            }
            #[cfg(not(unix))]
            {
                dirs.cache_dir().to_path_buf()
            }
        })
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("portal-scheduler")
        .join("daemon.pid")
}

/// Write PID to file
fn write_pid_file() -> Result<()> {
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&pid_path, std::process::id().to_string())?;
    info!("Wrote PID file: {:?}", pid_path);
    Ok(())
}

/// Remove PID file
fn remove_pid_file() {
    let pid_path = pid_file_path();
    if pid_path.exists() {
        if let Err(e) = fs::remove_file(&pid_path) {
            warn!("Failed to remove PID file: {}", e);
        } else {
            info!("Removed PID file");
        }
    }
}

/// Read PID from file
fn read_pid_file() -> Option<u32> {
    fs::read_to_string(pid_file_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process is running
#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    // Signal 0 checks process existence without delivering anything
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    // Without a portable check, assume running if the PID file exists
    true
}

/// Load settings and apply CLI overrides.
fn load_settings(
    config_path: Option<&str>,
    data_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(data_dir) = data_dir_override {
        settings.data_dir = data_dir.to_string();
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }
    Ok(settings)
}

/// Start the scheduler daemon.
///
/// 1. Load configuration (defaults -> file -> env -> CLI)
/// 2. Open the file-backed job store
/// 3. Register the maintenance catalog and start the scheduler
/// 4. Shut down gracefully on SIGINT/SIGTERM
pub async fn start_daemon(
    config_path: Option<&str>,
    foreground: bool,
    data_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = load_settings(config_path, data_dir_override, log_level_override)?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Portal daemon starting...");
    info!("Configuration:");
    info!("  Data directory: {}", settings.data_dir);
    info!("  Catalog cron: {}", settings.catalog_cron);
    info!("  Log level: {}", settings.log_level);

    if !foreground {
        warn!("Background mode not yet implemented, running in foreground");
        warn!("Use a process manager (systemd, launchd) for background operation");
    }

    let store = Arc::new(
        FileJobStore::new(settings.jobs_dir())
            .await
            .context("Failed to open job store")?,
    );
    let catalog = Arc::new(MaintenanceCatalog::new(
        &settings.data_dir,
        MaintenanceConfig::default(),
    ));

    let scheduler_config = SchedulerConfig {
        poll_interval_secs: settings.poll_interval_secs,
        shutdown_timeout_secs: settings.shutdown_timeout_secs,
        catalog_jitter_secs: settings.catalog_jitter_secs,
    };
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        catalog.clone(),
        scheduler_config,
    ));

    register_catalog_once(&scheduler, store.as_ref(), catalog.as_ref(), &settings)
        .await
        .context("Failed to register maintenance catalog")?;

    write_pid_file()?;

    scheduler
        .start()
        .await
        .context("Failed to start scheduler")?;

    wait_for_shutdown_signal().await;

    if let Err(e) = scheduler.shutdown().await {
        warn!("Scheduler shutdown error: {}", e);
    }

    remove_pid_file();
    info!("Portal daemon stopped");
    Ok(())
}

/// Register catalog entries not already present among persisted jobs.
///
/// A restart finds the previous process's records in the store, so
/// re-registering every entry would duplicate them. Dedupe by action id.
async fn register_catalog_once(
    scheduler: &Scheduler,
    store: &dyn JobStore,
    catalog: &dyn TaskCatalog,
    settings: &Settings,
) -> Result<()> {
    let existing: std::collections::HashSet<String> = store
        .load_all()
        .await?
        .into_iter()
        .map(|record| record.action_id)
        .collect();

    let new_entries: Vec<_> = catalog
        .entries()
        .into_iter()
        .filter(|entry| !existing.contains(entry.name()))
        .collect();

    if new_entries.is_empty() {
        info!("All catalog tasks already registered");
        return Ok(());
    }

    scheduler
        .register_catalog(new_entries, &settings.catalog_cron)
        .await?;
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Stop the running daemon by sending SIGTERM.
pub fn stop_daemon() -> Result<()> {
    let pid = read_pid_file().context("No PID file found - daemon may not be running")?;

    if !is_process_running(pid) {
        remove_pid_file();
        anyhow::bail!("Daemon not running (stale PID file removed)");
    }

    info!("Stopping daemon (PID {})", pid);

    #[cfg(unix)]
    {
        unsafe {
            if libc::kill(pid as i32, libc::SIGTERM) != 0 {
                anyhow::bail!("Failed to send SIGTERM to daemon");
            }
        }
        println!("Sent SIGTERM to daemon (PID {})", pid);
    }

    #[cfg(not(unix))]
    {
        anyhow::bail!("Stop command not yet implemented on this platform");
    }

    Ok(())
}

/// Show daemon status.
pub fn show_status() -> Result<()> {
    let pid_path = pid_file_path();

    match read_pid_file() {
        Some(pid) if is_process_running(pid) => {
            println!("Portal daemon is running (PID {})", pid);
            println!("PID file: {:?}", pid_path);
            Ok(())
        }
        Some(pid) => {
            println!(
                "Portal daemon is NOT running (stale PID {} in {:?})",
                pid, pid_path
            );
            Ok(())
        }
        None => {
            println!("Portal daemon is NOT running (no PID file)");
            Ok(())
        }
    }
}

/// List or cancel jobs directly on the store.
///
/// Operates on durable records only. A running daemon keeps executing its
/// in-memory schedule until restart, at which point it reloads from here.
pub async fn handle_jobs(config_path: Option<&str>, command: JobsCommands) -> Result<()> {
    let settings = load_settings(config_path, None, None)?;
    let store = FileJobStore::new(settings.jobs_dir())
        .await
        .context("Failed to open job store")?;

    match command {
        JobsCommands::List => {
            let mut records = store.load_all().await?;
            if records.is_empty() {
                println!("No jobs scheduled");
                return Ok(());
            }

            records.sort_by(|a, b| a.action_id.cmp(&b.action_id));
            println!(
                "{:<38} {:<28} {:<18} LAST EXECUTED",
                "ID", "ACTION", "SCHEDULE"
            );
            for record in records {
                let last = record
                    .last_executed_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:<38} {:<28} {:<18} {}",
                    record.id, record.action_id, record.cron_expression, last
                );
            }
        }
        JobsCommands::Cancel { job_id } => {
            let id: Uuid = job_id
                .parse()
                .with_context(|| format!("Invalid job id '{}'", job_id))?;

            match store.load(id).await? {
                Some(record) => {
                    store.delete(id).await?;
                    println!("Cancelled job {} ({})", id, record.action_id);
                }
                None => println!("No job with id {}", id),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_types::JobRecord;

    #[test]
    fn test_pid_file_path() {
        let path = pid_file_path();
        assert!(path.ends_with("daemon.pid"));
        assert!(path
            .parent()
            .unwrap()
            .to_string_lossy()
            .contains("portal-scheduler"));
    }

    #[tokio::test]
    async fn test_catalog_registration_dedupes_on_restart() {
        let data_dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: data_dir.path().to_string_lossy().to_string(),
            ..Settings::default()
        };

        let store = Arc::new(FileJobStore::new(settings.jobs_dir()).await.unwrap());
        let catalog = Arc::new(MaintenanceCatalog::new(
            &settings.data_dir,
            MaintenanceConfig::default(),
        ));

        // One catalog entry survives from a previous process
        let record = JobRecord::new(&settings.catalog_cron, "purge_expired_drafts");
        store.save(&record).await.unwrap();

        let scheduler = Scheduler::new(
            store.clone(),
            catalog.clone(),
            SchedulerConfig::default(),
        );
        register_catalog_once(&scheduler, store.as_ref(), catalog.as_ref(), &settings)
            .await
            .unwrap();

        let records = store.load_all().await.unwrap();
        assert_eq!(records.len(), 3);

        let mut names: Vec<_> = records.iter().map(|r| r.action_id.as_str()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            [
                "purge_expired_drafts",
                "refresh_report_aggregates",
                "sweep_stale_sessions"
            ]
        );

        // A second pass registers nothing new
        register_catalog_once(&scheduler, store.as_ref(), catalog.as_ref(), &settings)
            .await
            .unwrap();
        assert_eq!(store.load_all().await.unwrap().len(), 3);
    }
}
