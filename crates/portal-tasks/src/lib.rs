//! Concrete maintenance tasks for the portal.
//!
//! This crate publishes the portal's recurring maintenance operations as a
//! [`TaskCatalog`]: report-aggregate refresh, expired-draft purge, and
//! stale-session sweep. The daemon registers the catalog with the scheduler
//! at startup; after a restart, persisted jobs re-resolve against these
//! same entries by name.
//!
//! Every task operates on one office partition, a `office-<reference>`
//! directory under the portal data directory. The reference comes from the
//! task's arguments; the scheduler's default binding supplies `"1"`.

mod config;
mod drafts;
mod reports;
mod sessions;
mod sweep;

use std::path::{Path, PathBuf};

use portal_scheduler::{CatalogEntry, TaskArgs, TaskCatalog};

pub use config::MaintenanceConfig;
pub use reports::ReportAggregates;

/// Path of the office partition a task run operates on.
pub(crate) fn office_dir(data_dir: &Path, args: &TaskArgs) -> PathBuf {
    data_dir.join(format!("office-{}", args.reference))
}

/// The portal's maintenance-task catalog.
pub struct MaintenanceCatalog {
    data_dir: PathBuf,
    config: MaintenanceConfig,
}

impl MaintenanceCatalog {
    /// Create a catalog rooted at the portal data directory.
    pub fn new(data_dir: impl Into<PathBuf>, config: MaintenanceConfig) -> Self {
        Self {
            data_dir: data_dir.into(),
            config,
        }
    }
}

impl TaskCatalog for MaintenanceCatalog {
    fn entries(&self) -> Vec<CatalogEntry> {
        vec![
            reports::entry(self.data_dir.clone()),
            drafts::entry(self.data_dir.clone(), self.config.clone()),
            sessions::entry(self.data_dir.clone(), self.config.clone()),
        ]
    }
}
