//! Configuration loading for the portal daemon.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The config file lives at ~/.config/portal-scheduler/config.toml and
//! environment variables use the PORTAL_ prefix.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PortalError;

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Root data directory (job records and maintenance-task data)
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Cron expression used when self-registering the maintenance catalog
    #[serde(default = "default_catalog_cron")]
    pub catalog_cron: String,

    /// Fallback polling interval when no job has a future occurrence
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Grace period for in-flight jobs during shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Max random delay applied to catalog jobs sharing one schedule
    #[serde(default)]
    pub catalog_jitter_secs: u64,
}

fn default_data_dir() -> String {
    ProjectDirs::from("", "", "portal-scheduler")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_catalog_cron() -> String {
    // 3 AM daily, the maintenance window
    "0 3 * * *".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            catalog_cron: default_catalog_cron(),
            poll_interval_secs: default_poll_interval(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            catalog_jitter_secs: 0,
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/portal-scheduler/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (PORTAL_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, PortalError> {
        let config_dir = ProjectDirs::from("", "", "portal-scheduler")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("data_dir", default_data_dir())
            .map_err(|e| PortalError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| PortalError::Config(e.to_string()))?
            .set_default("catalog_cron", default_catalog_cron())
            .map_err(|e| PortalError::Config(e.to_string()))?
            .set_default("poll_interval_secs", default_poll_interval() as i64)
            .map_err(|e| PortalError::Config(e.to_string()))?
            .set_default("shutdown_timeout_secs", default_shutdown_timeout() as i64)
            .map_err(|e| PortalError::Config(e.to_string()))?
            .set_default("catalog_jitter_secs", 0_i64)
            .map_err(|e| PortalError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: PORTAL_DATA_DIR, PORTAL_LOG_LEVEL, PORTAL_CATALOG_CRON, ...
        builder = builder.add_source(
            Environment::with_prefix("PORTAL")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| PortalError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| PortalError::Config(e.to_string()))
    }

    /// Directory holding the durable job records.
    pub fn jobs_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("jobs")
    }
}
