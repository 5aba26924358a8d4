//! Blob reclamation for deleted log files.
//!
//! Deleting a log file commits the soft delete first and reclaims the blob
//! afterwards. This module holds that second step and the periodic sweep
//! that retries it and removes blobs no row refers to.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::config::ReclaimSettings;
use crate::db::DbPool;
use crate::entity::log_file;
use crate::error::AppResult;
use crate::services::storage::BlobStore;

/// Deleted rows handled per sweep.
const RECLAIM_BATCH_SIZE: u64 = 500;

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Deleted rows whose blob was reclaimed.
    pub reclaimed: usize,
    /// Unreferenced blobs removed.
    pub orphans_removed: usize,
    pub errors: usize,
}

/// Start the reclamation background task.
///
/// Returns `None` when the sweep is disabled (`interval_secs == 0`).
pub fn start_reclaim_task(
    pool: DbPool,
    store: BlobStore,
    settings: ReclaimSettings,
) -> Option<JoinHandle<()>> {
    if settings.interval_secs == 0 {
        info!("Blob reclamation sweep disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        info!(
            "Starting blob reclamation sweep (interval: {} seconds, orphan grace: {} seconds)",
            settings.interval_secs, settings.orphan_grace_secs
        );

        let grace = Duration::from_secs(settings.orphan_grace_secs);
        let mut ticker = interval(Duration::from_secs(settings.interval_secs));

        loop {
            ticker.tick().await;

            match run_reclaim_cycle(&pool, &store, grace).await {
                Ok(report) if report != ReclaimReport::default() => info!(
                    "Blob reclamation: {} reclaimed, {} orphans removed, {} errors",
                    report.reclaimed, report.orphans_removed, report.errors
                ),
                Ok(_) => debug!("Blob reclamation: nothing to do"),
                Err(e) => error!("Blob reclamation error: {}", e),
            }
        }
    }))
}

/// Remove the blob of a deleted row and stamp the row.
///
/// A blob that is already gone counts as reclaimed, so this can be retried.
pub async fn reclaim_blob(
    pool: &DbPool,
    store: &BlobStore,
    record: &log_file::Model,
) -> AppResult<()> {
    let removed = store.remove(Path::new(&record.file_path)).await?;
    if !removed {
        debug!(
            "Blob of log file {} was already gone: {}",
            record.id, record.file_path
        );
    }

    pool.mark_blob_removed(record.id).await
}

/// Run a single sweep.
pub async fn run_reclaim_cycle(
    pool: &DbPool,
    store: &BlobStore,
    orphan_grace: Duration,
) -> AppResult<ReclaimReport> {
    let mut report = ReclaimReport::default();

    reclaim_deleted(pool, store, RECLAIM_BATCH_SIZE, &mut report).await?;
    remove_orphans(pool, store, orphan_grace, &mut report).await?;

    Ok(report)
}

/// Retry reclamation for deleted rows that still hold a blob.
///
/// Walks every pending row in id order, so rows that keep failing never
/// starve the ones after them.
async fn reclaim_deleted(
    pool: &DbPool,
    store: &BlobStore,
    batch_size: u64,
    report: &mut ReclaimReport,
) -> AppResult<()> {
    let mut after_id = 0;

    loop {
        let pending = pool.get_unreclaimed_deleted(after_id, batch_size).await?;
        let Some(last) = pending.last() else {
            break;
        };
        after_id = last.id;
        let exhausted = (pending.len() as u64) < batch_size;

        for record in pending {
            match reclaim_blob(pool, store, &record).await {
                Ok(()) => report.reclaimed += 1,
                Err(e) => {
                    warn!("Failed to reclaim blob of log file {}: {}", record.id, e);
                    report.errors += 1;
                }
            }
        }

        if exhausted {
            break;
        }
    }

    Ok(())
}

/// Remove blobs that no row refers to and that are older than the grace period.
async fn remove_orphans(
    pool: &DbPool,
    store: &BlobStore,
    orphan_grace: Duration,
    report: &mut ReclaimReport,
) -> AppResult<()> {
    let blobs = store.list().await?;
    if blobs.is_empty() {
        return Ok(());
    }

    // Listed before the names are read, so a blob recorded in between is seen as known
    let known = pool.get_known_blob_names().await?;
    let cutoff = SystemTime::now()
        .checked_sub(orphan_grace)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    for blob in blobs {
        if known.contains(&blob.name) || blob.modified > cutoff {
            continue;
        }

        match store.remove(&blob.path).await {
            Ok(_) => {
                info!("Removed orphaned blob {}", blob.name);
                report.orphans_removed += 1;
            }
            Err(e) => {
                warn!("Failed to remove orphaned blob {}: {}", blob.name, e);
                report.errors += 1;
            }
        }
    }

    Ok(())
}
