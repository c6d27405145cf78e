//! The coordination loop.
//!
//! One scheduler instance owns the in-memory schedule map, the action
//! registry, and the background loop that repeatedly computes which jobs are
//! due, dispatches them, and sleeps until the earliest upcoming occurrence.
//!
//! Dispatch is fire-and-forget: executions run as tracked tasks so a slow
//! job never delays the due-check for other jobs, and graceful shutdown can
//! wait on whatever is still in flight.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use portal_store::JobStore;
use portal_types::JobRecord;

use crate::{
    ActionFn, ActionRegistry, ActionResolver, Clock, CronSchedule, OverlapGuard, OverlapPolicy,
    SchedulerConfig, SchedulerError, SystemClock, TaskCatalog,
};

/// In-memory schedule state for one job.
struct ScheduleEntry {
    action_id: String,
    schedule: CronSchedule,
    /// Earliest upcoming occurrence. `None` means the schedule has no future
    /// occurrence and the job is effectively dormant.
    next_at: Option<DateTime<Utc>>,
    guard: Arc<OverlapGuard>,
}

/// Result of one due-check cycle.
pub(crate) struct CycleOutcome {
    /// Number of executions dispatched this cycle.
    pub dispatched: usize,
    /// Time until the next cycle should run.
    pub sleep: Duration,
}

/// Recurring-task scheduler.
///
/// Registration and cancellation may happen at any time, before or after
/// [`start`](Self::start). The loop picks up changes on its next cycle.
pub struct Scheduler {
    store: Arc<dyn JobStore>,
    registry: Arc<ActionRegistry>,
    resolver: ActionResolver,
    entries: RwLock<HashMap<Uuid, ScheduleEntry>>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    shutdown_token: CancellationToken,
    tracker: TaskTracker,
    is_running: AtomicBool,
    loop_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    /// Create a scheduler over a job store and a task catalog.
    pub fn new(
        store: Arc<dyn JobStore>,
        catalog: Arc<dyn TaskCatalog>,
        config: SchedulerConfig,
    ) -> Self {
        Self::with_clock(store, catalog, config, Arc::new(SystemClock))
    }

    /// Create a scheduler with an explicit time source.
    pub fn with_clock(
        store: Arc<dyn JobStore>,
        catalog: Arc<dyn TaskCatalog>,
        config: SchedulerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let registry = Arc::new(ActionRegistry::new());
        let resolver = ActionResolver::new(registry.clone(), catalog);
        Self {
            store,
            registry,
            resolver,
            entries: RwLock::new(HashMap::new()),
            clock,
            config,
            shutdown_token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            is_running: AtomicBool::new(false),
            loop_handle: Mutex::new(None),
        }
    }

    /// The shared action registry.
    pub fn registry(&self) -> Arc<ActionRegistry> {
        self.registry.clone()
    }

    /// Clone of the shutdown signal handed to every execution.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Whether the background loop is active.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// The scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register a recurring task with the default overlap policy.
    ///
    /// Validates the cron expression, persists a [`JobRecord`], registers
    /// the action, and installs the job in the schedule map. Returns the new
    /// job's id.
    ///
    /// # Errors
    ///
    /// `InvalidCron` for a malformed expression and `InvalidArgument` for an
    /// empty expression or action id; in both cases nothing is persisted or
    /// registered.
    pub async fn schedule_task(
        &self,
        cron_expression: &str,
        action_id: &str,
        action: ActionFn,
    ) -> Result<Uuid, SchedulerError> {
        self.schedule_task_with_policy(cron_expression, action_id, OverlapPolicy::Concurrent, action)
            .await
    }

    /// Register a recurring task with an explicit overlap policy.
    pub async fn schedule_task_with_policy(
        &self,
        cron_expression: &str,
        action_id: &str,
        policy: OverlapPolicy,
        action: ActionFn,
    ) -> Result<Uuid, SchedulerError> {
        if cron_expression.trim().is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "cron expression is empty".to_string(),
            ));
        }
        if action_id.trim().is_empty() {
            return Err(SchedulerError::InvalidArgument(
                "action_id is empty".to_string(),
            ));
        }

        let schedule = CronSchedule::parse(cron_expression)?;

        let record = JobRecord::new(cron_expression, action_id);
        let job_id = record.id;

        // The in-memory schedule is authoritative for this process; a failed
        // write costs durability across restarts, not the registration.
        if let Err(e) = self.store.save(&record).await {
            warn!(job = %job_id, error = %e, "Failed to persist job record");
        }

        self.registry.insert_if_absent(action_id, action);

        let next_at = schedule.next_after(&self.clock.now());
        let entry = ScheduleEntry {
            action_id: action_id.to_string(),
            schedule,
            next_at,
            guard: Arc::new(OverlapGuard::new(policy)),
        };
        self.entries.write().unwrap().insert(job_id, entry);

        info!(
            job = %job_id,
            action = %action_id,
            cron = %cron_expression,
            "Scheduled recurring task"
        );
        Ok(job_id)
    }

    /// Remove a job from the schedule and the store.
    ///
    /// A no-op for unknown ids. An execution already in flight is not
    /// interrupted; the job simply never becomes due again.
    pub async fn unschedule_task(&self, job_id: Uuid) -> Result<(), SchedulerError> {
        let removed = self.entries.write().unwrap().remove(&job_id);

        if let Err(e) = self.store.delete(job_id).await {
            warn!(job = %job_id, error = %e, "Failed to delete job record");
        }

        match removed {
            Some(entry) => info!(job = %job_id, action = %entry.action_id, "Unscheduled task"),
            None => debug!(job = %job_id, "Unschedule for unknown job, ignoring"),
        }
        Ok(())
    }

    /// All persisted job records.
    pub async fn get_all_jobs(&self) -> Result<Vec<JobRecord>, SchedulerError> {
        Ok(self.store.load_all().await?)
    }

    /// Start the background loop.
    ///
    /// Reloads persisted jobs into the schedule map first, so registrations
    /// made before `start` are preserved and records from a previous process
    /// resume ticking.
    ///
    /// The lifecycle is one-shot: once [`shutdown`](Self::shutdown) has run,
    /// the cancellation token and tracker are spent and the instance cannot
    /// be started again.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if the loop is already active, `Terminated` if the
    /// scheduler was shut down.
    pub async fn start(self: &Arc<Self>) -> Result<(), SchedulerError> {
        if self.shutdown_token.is_cancelled() {
            return Err(SchedulerError::Terminated);
        }
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.load_persisted().await;

        let scheduler = self.clone();
        let handle = tokio::spawn(async move { scheduler.run().await });
        *self.loop_handle.lock().unwrap() = Some(handle);

        info!("Scheduler started");
        Ok(())
    }

    /// Stop the loop and wait for in-flight executions.
    ///
    /// Cancels the shutdown token, then waits up to the configured grace
    /// period for tracked executions to finish.
    ///
    /// # Errors
    ///
    /// `NotRunning` if the loop is not active.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        if self
            .is_running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SchedulerError::NotRunning);
        }

        info!("Scheduler shutting down");
        self.shutdown_token.cancel();

        let handle = self.loop_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduler loop task failed");
            }
        }

        self.tracker.close();
        let grace = Duration::from_secs(self.config.shutdown_timeout_secs);
        if tokio::time::timeout(grace, self.tracker.wait()).await.is_err() {
            warn!(
                timeout_secs = self.config.shutdown_timeout_secs,
                "Shutdown grace period elapsed with executions still in flight"
            );
        }

        info!("Scheduler stopped");
        Ok(())
    }

    /// Rebuild the schedule map from the store.
    ///
    /// Records that fail to load or parse are skipped with a warning; they
    /// stay in the store untouched. Jobs already installed in memory (eager
    /// registrations before `start`) are not clobbered.
    async fn load_persisted(&self) {
        let records = match self.store.load_all().await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Failed to load persisted jobs, starting empty");
                return;
            }
        };

        let now = self.clock.now();
        let mut restored = 0usize;
        let mut entries = self.entries.write().unwrap();
        for record in records {
            let schedule = match CronSchedule::parse(&record.cron_expression) {
                Ok(schedule) => schedule,
                Err(e) => {
                    warn!(job = %record.id, error = %e, "Skipping job with unparseable schedule");
                    continue;
                }
            };
            entries.entry(record.id).or_insert_with(|| {
                restored += 1;
                ScheduleEntry {
                    action_id: record.action_id.clone(),
                    next_at: schedule.next_after(&now),
                    schedule,
                    guard: Arc::new(OverlapGuard::new(OverlapPolicy::Concurrent)),
                }
            });
        }
        drop(entries);

        if restored > 0 {
            info!(count = restored, "Restored persisted jobs");
        }
    }

    async fn run(self: Arc<Self>) {
        info!("Coordination loop running");
        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            let outcome = self.run_cycle();
            if outcome.dispatched > 0 {
                debug!(dispatched = outcome.dispatched, "Cycle dispatched executions");
            }

            tokio::select! {
                _ = tokio::time::sleep(outcome.sleep) => {}
                _ = self.shutdown_token.cancelled() => break,
            }
        }
        info!("Coordination loop exited");
    }

    /// Run one due-check cycle: dispatch every due job and compute how long
    /// to sleep until the next occurrence.
    pub(crate) fn run_cycle(&self) -> CycleOutcome {
        let now = self.clock.now();

        let due: Vec<(Uuid, String, Arc<OverlapGuard>)> = {
            let mut entries = self.entries.write().unwrap();
            entries
                .iter_mut()
                .filter(|(_, entry)| matches!(entry.next_at, Some(at) if at <= now))
                .map(|(id, entry)| {
                    // Advance from now, not from the stored occurrence: a
                    // loop that fell behind fires once, then resumes cadence.
                    entry.next_at = entry.schedule.next_after(&now);
                    (*id, entry.action_id.clone(), entry.guard.clone())
                })
                .collect()
        };

        let dispatched = due.len();
        for (job_id, action_id, guard) in due {
            self.dispatch(job_id, action_id, guard);
        }

        CycleOutcome {
            dispatched,
            sleep: self.next_sleep(now),
        }
    }

    /// Time until the earliest upcoming occurrence, or the poll fallback if
    /// no job has one.
    fn next_sleep(&self, now: DateTime<Utc>) -> Duration {
        let entries = self.entries.read().unwrap();
        entries
            .values()
            .filter_map(|entry| entry.next_at)
            .min()
            .and_then(|at| (at - now).to_std().ok())
            .unwrap_or(Duration::from_secs(self.config.poll_interval_secs))
    }

    /// Spawn one tracked execution of a due job.
    fn dispatch(&self, job_id: Uuid, action_id: String, guard: Arc<OverlapGuard>) {
        let Some(run_guard) = guard.try_acquire() else {
            info!(job = %job_id, action = %action_id, "Previous run still active, skipping");
            return;
        };

        let resolver = self.resolver.clone();
        let store = self.store.clone();
        let clock = self.clock.clone();
        let cancel = self.shutdown_token.clone();

        self.tracker.spawn(async move {
            let _run_guard = run_guard;

            let action = match resolver.resolve(&action_id) {
                Ok(action) => action,
                Err(e) => {
                    warn!(job = %job_id, action = %action_id, error = %e, "Skipping execution");
                    return;
                }
            };

            let started = std::time::Instant::now();
            match action(cancel).await {
                Ok(()) => {
                    let completed_at = clock.now();
                    if let Err(e) = store.mark_executed(job_id, completed_at).await {
                        warn!(job = %job_id, error = %e, "Failed to record execution time");
                    }
                    info!(
                        job = %job_id,
                        action = %action_id,
                        duration_ms = started.elapsed().as_millis() as u64,
                        "Job completed"
                    );
                }
                Err(e) => {
                    error!(job = %job_id, action = %action_id, error = %e, "Job failed");
                }
            }
        });
    }
}
