//! Catalog self-registration.
//!
//! Installs every operation a [`TaskCatalog`](crate::TaskCatalog) publishes
//! as a recurring job under one shared cron expression, the way a portal
//! instance signs its maintenance sweeps up at deploy time.

use tracing::info;
use uuid::Uuid;

use crate::{action_fn, with_jitter, CatalogEntry, Scheduler, SchedulerError, TaskArgs};

impl Scheduler {
    /// Schedule every catalog entry under `cron_expression`.
    ///
    /// Arguments are synthesized per entry exactly as the resolver's
    /// fallback does: the placeholder reference plus the loop's cancellation
    /// token. When `catalog_jitter_secs` is configured, each execution gets
    /// a random pre-run delay so entries sharing the expression do not all
    /// fire at the same instant.
    ///
    /// Returns the new job ids, in catalog order.
    ///
    /// # Errors
    ///
    /// `InvalidCron` if the expression does not parse; no entry is
    /// registered in that case.
    pub async fn register_catalog(
        &self,
        entries: Vec<CatalogEntry>,
        cron_expression: &str,
    ) -> Result<Vec<Uuid>, SchedulerError> {
        crate::validate_cron_expression(cron_expression)?;

        let jitter_secs = self.config().catalog_jitter_secs;
        let mut job_ids = Vec::with_capacity(entries.len());

        for entry in entries {
            let operation = entry.operation();
            let action = action_fn(move |cancel| {
                let operation = operation.clone();
                async move {
                    with_jitter(jitter_secs, operation(TaskArgs::with_defaults(cancel))).await
                }
            });

            let job_id = self
                .schedule_task(cron_expression, entry.name(), action)
                .await?;
            job_ids.push(job_id);
        }

        info!(
            count = job_ids.len(),
            cron = %cron_expression,
            "Registered catalog tasks"
        );
        Ok(job_ids)
    }
}
