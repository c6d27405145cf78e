//! Report aggregate refresh.
//!
//! Recomputes per-office submission counts by status and writes them to
//! `reports/aggregates.json` inside the office partition. Dashboards read
//! the aggregate file instead of scanning raw submissions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use portal_scheduler::{CatalogEntry, TaskArgs};

use crate::office_dir;

pub(crate) const NAME: &str = "refresh_report_aggregates";

/// One raw submission record, as written by the intake service.
#[derive(Debug, Deserialize)]
struct Submission {
    status: String,
}

/// The recomputed aggregate file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportAggregates {
    /// RFC 3339 timestamp of the refresh that produced this file.
    pub generated_at: String,

    /// Submission counts keyed by status.
    pub counts: BTreeMap<String, u64>,
}

pub(crate) fn entry(data_dir: PathBuf) -> CatalogEntry {
    CatalogEntry::new(NAME, move |args: TaskArgs| {
        let data_dir = data_dir.clone();
        async move { refresh(&data_dir, &args).await }
    })
}

/// Recompute the aggregate file for the office named by `args.reference`.
pub async fn refresh(data_dir: &Path, args: &TaskArgs) -> Result<(), String> {
    let office = office_dir(data_dir, args);
    let submissions_dir = office.join("submissions");

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut scanned = 0usize;

    let mut entries = match fs::read_dir(&submissions_dir).await {
        Ok(entries) => Some(entries),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(format!("reading {}: {}", submissions_dir.display(), e)),
    };

    if let Some(entries) = entries.as_mut() {
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => return Err(format!("reading {}: {}", submissions_dir.display(), e)),
            };

            if args.cancel.is_cancelled() {
                info!(office = %args.reference, "Refresh cancelled, aggregates left unchanged");
                return Ok(());
            }

            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let content = match fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping unreadable submission");
                    continue;
                }
            };
            match serde_json::from_str::<Submission>(&content) {
                Ok(submission) => {
                    *counts.entry(submission.status).or_insert(0) += 1;
                    scanned += 1;
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping malformed submission");
                }
            }
        }
    }

    let aggregates = ReportAggregates {
        generated_at: Utc::now().to_rfc3339(),
        counts,
    };

    let reports_dir = office.join("reports");
    fs::create_dir_all(&reports_dir)
        .await
        .map_err(|e| format!("creating {}: {}", reports_dir.display(), e))?;
    let out_path = reports_dir.join("aggregates.json");
    let content = serde_json::to_string_pretty(&aggregates).map_err(|e| e.to_string())?;
    fs::write(&out_path, content)
        .await
        .map_err(|e| format!("writing {}: {}", out_path.display(), e))?;

    info!(office = %args.reference, scanned, "Refreshed report aggregates");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn args() -> TaskArgs {
        TaskArgs::with_defaults(CancellationToken::new())
    }

    async fn write_submission(dir: &Path, name: &str, status: &str) {
        fs::create_dir_all(dir).await.unwrap();
        fs::write(
            dir.join(name),
            format!(r#"{{"status":"{status}"}}"#),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_counts_submissions_by_status() {
        let data_dir = tempfile::tempdir().unwrap();
        let submissions = data_dir.path().join("office-1/submissions");
        write_submission(&submissions, "a.json", "approved").await;
        write_submission(&submissions, "b.json", "approved").await;
        write_submission(&submissions, "c.json", "pending").await;

        refresh(data_dir.path(), &args()).await.unwrap();

        let content =
            fs::read_to_string(data_dir.path().join("office-1/reports/aggregates.json"))
                .await
                .unwrap();
        let aggregates: ReportAggregates = serde_json::from_str(&content).unwrap();
        assert_eq!(aggregates.counts["approved"], 2);
        assert_eq!(aggregates.counts["pending"], 1);
    }

    #[tokio::test]
    async fn test_malformed_submission_is_skipped() {
        let data_dir = tempfile::tempdir().unwrap();
        let submissions = data_dir.path().join("office-1/submissions");
        write_submission(&submissions, "good.json", "approved").await;
        fs::write(submissions.join("bad.json"), "not json")
            .await
            .unwrap();
        fs::write(submissions.join("notes.txt"), "ignored")
            .await
            .unwrap();

        refresh(data_dir.path(), &args()).await.unwrap();

        let content =
            fs::read_to_string(data_dir.path().join("office-1/reports/aggregates.json"))
                .await
                .unwrap();
        let aggregates: ReportAggregates = serde_json::from_str(&content).unwrap();
        assert_eq!(aggregates.counts.len(), 1);
        assert_eq!(aggregates.counts["approved"], 1);
    }

    #[tokio::test]
    async fn test_empty_office_writes_empty_aggregates() {
        let data_dir = tempfile::tempdir().unwrap();

        refresh(data_dir.path(), &args()).await.unwrap();

        let content =
            fs::read_to_string(data_dir.path().join("office-1/reports/aggregates.json"))
                .await
                .unwrap();
        let aggregates: ReportAggregates = serde_json::from_str(&content).unwrap();
        assert!(aggregates.counts.is_empty());
        assert!(!aggregates.generated_at.is_empty());
    }

    #[tokio::test]
    async fn test_cancellation_preserves_previous_aggregates() {
        let data_dir = tempfile::tempdir().unwrap();
        let submissions = data_dir.path().join("office-1/submissions");
        write_submission(&submissions, "a.json", "approved").await;

        let token = CancellationToken::new();
        token.cancel();
        let cancelled = TaskArgs::with_defaults(token);

        refresh(data_dir.path(), &cancelled).await.unwrap();
        assert!(!data_dir
            .path()
            .join("office-1/reports/aggregates.json")
            .exists());
    }
}
