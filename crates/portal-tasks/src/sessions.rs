//! Stale session sweep.
//!
//! Session files outlive their browser sessions when users abandon the
//! portal without signing out. This task removes session files past the
//! configured idle window.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use portal_scheduler::{CatalogEntry, TaskArgs};

use crate::{office_dir, sweep::sweep_older_than, MaintenanceConfig};

pub(crate) const NAME: &str = "sweep_stale_sessions";

pub(crate) fn entry(data_dir: PathBuf, config: MaintenanceConfig) -> CatalogEntry {
    CatalogEntry::new(NAME, move |args: TaskArgs| {
        let data_dir = data_dir.clone();
        let config = config.clone();
        async move { sweep(&data_dir, &config, &args).await }
    })
}

/// Sweep sessions idle past the configured window for one office.
pub async fn sweep(
    data_dir: &Path,
    config: &MaintenanceConfig,
    args: &TaskArgs,
) -> Result<(), String> {
    let sessions_dir = office_dir(data_dir, args).join("sessions");
    let ttl = Duration::from_secs(config.session_ttl_secs);

    let removed = sweep_older_than(&sessions_dir, ttl, args).await?;
    if removed > 0 {
        info!(office = %args.reference, removed, "Swept stale sessions");
    }
    Ok(())
}
