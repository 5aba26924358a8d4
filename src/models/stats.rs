//! Aggregate statistics models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::{DailyStat, LogFileStats};
use crate::utils::format_file_size;

/// Number of distinct upload days reported by the stats endpoint.
pub const STATS_MAX_DAYS: usize = 30;

/// Uploads for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyStatsEntry {
    /// Date in `YYYY-MM-DD` form.
    pub date: String,
    pub count: u64,
    pub size: i64,
}

impl From<DailyStat> for DailyStatsEntry {
    fn from(stat: DailyStat) -> Self {
        DailyStatsEntry {
            date: stat.date.format("%Y-%m-%d").to_string(),
            count: stat.count,
            size: stat.size,
        }
    }
}

/// Response for the stats endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_files: u64,
    pub total_size: i64,
    /// `total_size` rendered with a binary unit, e.g. `1.5 KB`.
    pub total_size_formatted: String,
    pub daily_stats: Vec<DailyStatsEntry>,
}

impl From<LogFileStats> for StatsResponse {
    fn from(stats: LogFileStats) -> Self {
        StatsResponse {
            total_files: stats.total_files,
            total_size: stats.total_size,
            total_size_formatted: format_file_size(stats.total_size.max(0) as u64),
            daily_stats: stats.daily.into_iter().map(DailyStatsEntry::from).collect(),
        }
    }
}
