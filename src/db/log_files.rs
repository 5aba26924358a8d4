//! Database queries for uploaded log files.
//!
//! Every read filters on `is_deleted = false`; soft-deleted rows are only
//! visible to the blob reclamation queries at the bottom of this file.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::debug;

use crate::entity::log_file::{self, ActiveModel, Entity as LogFile};
use crate::error::{AppError, AppResult};
use crate::models::ListLogsQuery;

use super::DbPool;

/// Inserts tried before a vanishing fingerprint conflict is an error.
const INSERT_ATTEMPTS: usize = 2;

/// Metadata of a freshly written blob, ready to be recorded.
#[derive(Debug, Clone)]
pub struct NewLogFile {
    pub filename: String,
    pub original_filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_hash: String,
    pub client_info: String,
}

/// Result of recording an upload.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// A new row was inserted.
    Created(log_file::Model),
    /// An active row with the same fingerprint already exists; nothing was inserted.
    Duplicate(log_file::Model),
}

/// Aggregates over active rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileStats {
    pub total_files: u64,
    pub total_size: i64,
    /// The most recent days, in ascending date order.
    pub daily: Vec<DailyStat>,
}

/// Uploads grouped by calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub count: u64,
    pub size: i64,
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl DbPool {
    /// Record an uploaded blob.
    ///
    /// The partial unique index on `file_hash` makes this an atomic
    /// insert-if-absent: a conflict resolves to the active row holding the
    /// fingerprint.
    pub async fn insert_log_file(&self, entry: NewLogFile) -> AppResult<InsertOutcome> {
        let hash = entry.file_hash.clone();

        let model = ActiveModel {
            id: NotSet,
            filename: Set(entry.filename),
            original_filename: Set(entry.original_filename),
            file_path: Set(entry.file_path),
            file_size: Set(entry.file_size),
            file_hash: Set(Some(entry.file_hash)),
            upload_time: Set(Utc::now()),
            client_info: Set(Some(entry.client_info)),
            is_deleted: Set(false),
            blob_removed_at: Set(None),
        };

        // The holder of a conflicting fingerprint can be deleted before it is
        // looked up; the slot is then free again and the insert is retried.
        for _ in 0..INSERT_ATTEMPTS {
            match model.clone().insert(self.connection()).await {
                Ok(inserted) => return Ok(InsertOutcome::Created(inserted)),
                Err(err) if is_unique_violation(&err) => {
                    if let Some(existing) = self.find_active_by_hash(&hash).await? {
                        return Ok(InsertOutcome::Duplicate(existing));
                    }
                    debug!("Holder of fingerprint {} was deleted, retrying insert", hash);
                }
                Err(err) => {
                    return Err(AppError::Database(format!(
                        "Failed to insert log file: {}",
                        err
                    )));
                }
            }
        }

        Err(AppError::Database(format!(
            "Fingerprint {} kept conflicting but no active record holds it",
            hash
        )))
    }

    /// Find the active row with the given fingerprint.
    pub async fn find_active_by_hash(&self, hash: &str) -> AppResult<Option<log_file::Model>> {
        let result = LogFile::find()
            .filter(log_file::Column::FileHash.eq(hash))
            .filter(log_file::Column::IsDeleted.eq(false))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up fingerprint: {}", e)))?;

        Ok(result)
    }

    /// Get an active log file by ID.
    pub async fn get_active_log_file(&self, id: i32) -> AppResult<Option<log_file::Model>> {
        let result = LogFile::find_by_id(id)
            .filter(log_file::Column::IsDeleted.eq(false))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get log file: {}", e)))?;

        Ok(result)
    }

    /// List active log files, newest first.
    ///
    /// Returns the requested page and the total number of matching rows.
    pub async fn list_log_files(
        &self,
        query: &ListLogsQuery,
    ) -> AppResult<(Vec<log_file::Model>, u64)> {
        let mut select = LogFile::find().filter(log_file::Column::IsDeleted.eq(false));

        if let Some(ref search) = query.search {
            select = select.filter(log_file::Column::OriginalFilename.contains(search.as_str()));
        }

        let total = select
            .clone()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count log files: {}", e)))?;

        let files = select
            .order_by_desc(log_file::Column::UploadTime)
            .order_by_desc(log_file::Column::Id)
            .offset(query.offset())
            .limit(query.per_page)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list log files: {}", e)))?;

        Ok((files, total))
    }

    /// Flip the soft-delete flag of an active row.
    ///
    /// Returns false when the row does not exist or was already deleted.
    pub async fn soft_delete_log_file(&self, id: i32) -> AppResult<bool> {
        let result = LogFile::update_many()
            .col_expr(log_file::Column::IsDeleted, Expr::value(true))
            .filter(log_file::Column::Id.eq(id))
            .filter(log_file::Column::IsDeleted.eq(false))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete log file: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// Stamp a deleted row as having had its blob reclaimed.
    pub async fn mark_blob_removed(&self, id: i32) -> AppResult<()> {
        LogFile::update_many()
            .col_expr(log_file::Column::BlobRemovedAt, Expr::value(Utc::now()))
            .filter(log_file::Column::Id.eq(id))
            .filter(log_file::Column::IsDeleted.eq(true))
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to mark blob removed: {}", e)))?;

        Ok(())
    }

    /// Deleted rows whose blob has not been reclaimed yet, in id order,
    /// starting after `after_id`.
    pub async fn get_unreclaimed_deleted(
        &self,
        after_id: i32,
        limit: u64,
    ) -> AppResult<Vec<log_file::Model>> {
        let result = LogFile::find()
            .filter(log_file::Column::Id.gt(after_id))
            .filter(log_file::Column::IsDeleted.eq(true))
            .filter(log_file::Column::BlobRemovedAt.is_null())
            .order_by_asc(log_file::Column::Id)
            .limit(limit)
            .all(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to get unreclaimed log files: {}", e))
            })?;

        Ok(result)
    }

    /// Storage names of every row, deleted or not.
    pub async fn get_known_blob_names(&self) -> AppResult<HashSet<String>> {
        let names: Vec<String> = LogFile::find()
            .select_only()
            .column(log_file::Column::Filename)
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list blob names: {}", e)))?;

        Ok(names.into_iter().collect())
    }

    /// Totals and per-day breakdown over active rows.
    pub async fn get_log_file_stats(&self, max_days: usize) -> AppResult<LogFileStats> {
        let rows: Vec<(DateTimeUtc, i64)> = LogFile::find()
            .select_only()
            .column(log_file::Column::UploadTime)
            .column(log_file::Column::FileSize)
            .filter(log_file::Column::IsDeleted.eq(false))
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get log file stats: {}", e)))?;

        Ok(summarize(rows, max_days))
    }
}

type DateTimeUtc = chrono::DateTime<Utc>;

/// Fold `(upload_time, file_size)` pairs into totals and daily buckets.
fn summarize(rows: Vec<(DateTimeUtc, i64)>, max_days: usize) -> LogFileStats {
    let mut total_size: i64 = 0;
    let mut days: BTreeMap<NaiveDate, (u64, i64)> = BTreeMap::new();
    let total_files = rows.len() as u64;

    for (upload_time, size) in rows {
        total_size = total_size.saturating_add(size);
        let bucket = days.entry(upload_time.date_naive()).or_insert((0, 0));
        bucket.0 += 1;
        bucket.1 = bucket.1.saturating_add(size);
    }

    let mut daily: Vec<DailyStat> = days
        .into_iter()
        .rev()
        .take(max_days)
        .map(|(date, (count, size))| DailyStat { date, count, size })
        .collect();
    daily.reverse();

    LogFileStats {
        total_files,
        total_size,
        daily,
    }
}
