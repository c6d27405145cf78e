//! Age-based file sweeping shared by the purge and session tasks.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, warn};

use portal_scheduler::TaskArgs;

/// Remove regular files in `dir` last modified more than `ttl` ago.
///
/// A missing directory is treated as empty. The sweep checks the
/// cancellation token between files and stops early when it fires; files
/// already removed stay removed. Files that cannot be inspected or removed
/// are logged and left for the next run.
pub(crate) async fn sweep_older_than(
    dir: &Path,
    ttl: Duration,
    args: &TaskArgs,
) -> Result<usize, String> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(format!("reading {}: {}", dir.display(), e)),
    };

    let cutoff = SystemTime::now()
        .checked_sub(ttl)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    let mut removed = 0usize;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Sweep aborted mid-directory");
                break;
            }
        };

        if args.cancel.is_cancelled() {
            debug!(dir = %dir.display(), removed, "Sweep cancelled, stopping early");
            break;
        }

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let stale = metadata
            .modified()
            .map(|modified| modified < cutoff)
            .unwrap_or(false);
        if !stale {
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to remove stale file"),
        }
    }

    Ok(removed)
}
