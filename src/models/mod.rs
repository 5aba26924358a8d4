//! Request and response models for the log vault API.

pub mod log_content;
pub mod log_file;
pub mod stats;

pub use log_content::{ContentParams, ContentQuery, LogContentResponse};
pub use log_file::{
    DeleteResponse, DuplicateUploadResponse, ListLogsParams, ListLogsQuery, LogFileListResponse,
    LogFileSummary, UploadForm, UploadResponse, UploadResult,
};
pub use stats::{DailyStatsEntry, StatsResponse};

/// Parse an optional query string value, falling back to `default` when it is
/// absent or malformed.
pub(crate) fn parse_or<T: std::str::FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

/// Normalise an optional search term: trimmed, `None` when empty.
pub(crate) fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
}
