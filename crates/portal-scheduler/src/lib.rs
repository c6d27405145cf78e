//! Recurring-task scheduler for the portal daemon.
//!
//! This crate provides the coordination loop that decides which persisted
//! jobs are due, dispatches each one as an independent task, and reconciles
//! completion state back into the job store. Jobs are defined by a 5-field
//! cron expression and an action identifier; after a restart, the action
//! body is re-resolved by name against a statically registered task catalog.
//!
//! # Features
//!
//! - Cron-based scheduling with standard 5-field expression syntax
//! - Durable job records that survive process restarts
//! - Name-based action resolution against a task catalog
//! - Graceful shutdown via CancellationToken with a bounded grace period
//! - Overlap policy (skip/concurrent) for job execution
//! - Jitter support for catalog jobs sharing one schedule
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use portal_scheduler::{action_fn, Scheduler, SchedulerConfig};
//! use portal_store::FileJobStore;
//!
//! let store = Arc::new(FileJobStore::new("/var/lib/portal/jobs").await?);
//! let scheduler = Arc::new(Scheduler::new(store, catalog, SchedulerConfig::default()));
//!
//! scheduler
//!     .schedule_task(
//!         "0 3 * * *",
//!         "purge_expired_drafts",
//!         action_fn(|_cancel| async { Ok(()) }),
//!     )
//!     .await?;
//!
//! scheduler.start().await?;
//! ```

mod action;
mod catalog;
mod clock;
mod config;
mod cron;
mod error;
mod jitter;
mod overlap;
mod registry;
mod resolver;
mod scheduler;
mod selfreg;

pub use action::{action_fn, ActionFn, ActionFuture};
pub use catalog::{CatalogEntry, CatalogOp, StaticCatalog, TaskArgs, TaskCatalog};
pub use clock::{Clock, SystemClock};
pub use config::SchedulerConfig;
pub use cron::{validate_cron_expression, CronSchedule};
pub use error::SchedulerError;
pub use jitter::{with_jitter, JitterConfig};
pub use overlap::{OverlapGuard, OverlapPolicy, RunGuard};
pub use registry::ActionRegistry;
pub use resolver::{ActionResolver, ResolveError};
pub use scheduler::Scheduler;
