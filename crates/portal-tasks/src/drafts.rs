//! Expired application-draft purge.
//!
//! Drafts are applications a citizen started but never submitted; they sit
//! as JSON files under the office's `drafts/` directory until this task
//! removes the ones past their retention window.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use portal_scheduler::{CatalogEntry, TaskArgs};

use crate::{office_dir, sweep::sweep_older_than, MaintenanceConfig};

pub(crate) const NAME: &str = "purge_expired_drafts";

pub(crate) fn entry(data_dir: PathBuf, config: MaintenanceConfig) -> CatalogEntry {
    CatalogEntry::new(NAME, move |args: TaskArgs| {
        let data_dir = data_dir.clone();
        let config = config.clone();
        async move { purge(&data_dir, &config, &args).await }
    })
}

/// Purge drafts older than the configured retention for one office.
pub async fn purge(
    data_dir: &Path,
    config: &MaintenanceConfig,
    args: &TaskArgs,
) -> Result<(), String> {
    let drafts_dir = office_dir(data_dir, args).join("drafts");
    let ttl = Duration::from_secs(config.draft_ttl_secs);

    let removed = sweep_older_than(&drafts_dir, ttl, args).await?;
    if removed > 0 {
        info!(office = %args.reference, removed, "Purged expired drafts");
    }
    Ok(())
}
