//! Cron expression parsing and occurrence computation.
//!
//! Wraps `croner` behind a small schedule type. Expressions use the 5-field
//! minute-granularity form: minute(0-59) hour(0-23) day-of-month(1-31)
//! month(1-12) day-of-week(0-6), with standard wildcard/range/step syntax.
//! A seconds field is not supported.

use chrono::{DateTime, Utc};
use croner::Cron;

use crate::SchedulerError;

/// Validate a cron expression.
///
/// # Errors
///
/// Returns `SchedulerError::InvalidCron` if the expression is not a valid
/// 5-field cron expression.
///
/// # Example
///
/// ```
/// use portal_scheduler::validate_cron_expression;
///
/// assert!(validate_cron_expression("0 3 * * *").is_ok());   // 3 AM daily
/// assert!(validate_cron_expression("*/5 * * * *").is_ok()); // Every 5 minutes
///
/// assert!(validate_cron_expression("99 * * * *").is_err()); // Minute out of range
/// assert!(validate_cron_expression("* * * *").is_err());    // Too few fields
/// ```
pub fn validate_cron_expression(expr: &str) -> Result<(), SchedulerError> {
    CronSchedule::parse(expr).map(|_| ())
}

/// A parsed cron schedule.
///
/// Immutable once created; computing occurrences is a pure function of the
/// expression and the reference time.
pub struct CronSchedule {
    inner: Cron,
    expression: String,
}

impl CronSchedule {
    /// Parse a 5-field cron expression.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::InvalidCron` for malformed or out-of-range
    /// fields, including expressions carrying a seconds field.
    pub fn parse(expression: &str) -> Result<Self, SchedulerError> {
        let inner = Cron::new(expression)
            .parse()
            .map_err(|e| SchedulerError::InvalidCron(format!("'{}': {}", expression, e)))?;
        Ok(Self {
            inner,
            expression: expression.to_string(),
        })
    }

    /// The earliest occurrence strictly greater than `after`, or `None` if
    /// the schedule has no future occurrence from that point.
    pub fn next_after(&self, after: &DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.inner.find_next_occurrence(after, false).ok()
    }

    /// The original expression string.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl std::fmt::Debug for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronSchedule")
            .field("expression", &self.expression)
            .finish()
    }
}
