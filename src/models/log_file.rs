//! Log file listing, metadata and upload models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entity::log_file;

use super::{normalize_search, parse_or};

/// Default page size for listings.
pub const DEFAULT_PER_PAGE: u64 = 20;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u64 = 100;

/// Public view of a stored log file.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogFileSummary {
    pub id: i32,
    /// Name supplied by the uploader.
    pub filename: String,
    pub file_size: i64,
    pub upload_time: DateTime<Utc>,
    /// Declared user agent of the uploader.
    pub client_info: Option<String>,
}

impl From<log_file::Model> for LogFileSummary {
    fn from(model: log_file::Model) -> Self {
        LogFileSummary {
            id: model.id,
            filename: model.original_filename,
            file_size: model.file_size,
            upload_time: model.upload_time,
            client_info: model.client_info,
        }
    }
}

/// Raw listing query string. Values are kept as strings so malformed numbers
/// fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLogsParams {
    /// Page number, starting at 1 (default 1).
    pub page: Option<String>,
    /// Page size (default 20, max 100).
    pub per_page: Option<String>,
    /// Substring to match against the original filename.
    pub search: Option<String>,
}

/// Validated listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLogsQuery {
    pub page: u64,
    pub per_page: u64,
    pub search: Option<String>,
}

impl ListLogsQuery {
    /// Row offset of the first record on this page.
    ///
    /// Saturates at the largest offset the database accepts, so a huge page
    /// number reads as past the end.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.per_page)
            .min(i64::MAX as u64)
    }

    /// Number of pages needed for `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page)
    }
}

impl From<ListLogsParams> for ListLogsQuery {
    fn from(params: ListLogsParams) -> Self {
        let page = parse_or::<i64>(params.page.as_deref(), 1).max(1) as u64;
        let per_page = parse_or::<i64>(params.per_page.as_deref(), DEFAULT_PER_PAGE as i64)
            .clamp(1, MAX_PER_PAGE as i64) as u64;

        ListLogsQuery {
            page,
            per_page,
            search: normalize_search(params.search.as_deref()),
        }
    }
}

/// Paginated listing response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogFileListResponse {
    pub files: Vec<LogFileSummary>,
    /// Number of records matching the filter.
    pub total: u64,
    pub pages: u64,
    pub current_page: u64,
    pub per_page: u64,
}

/// Multipart upload body, for the API document only.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// Text or log file.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Response for a newly stored upload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub file_id: i32,
    pub filename: String,
    pub file_size: i64,
}

/// Response when the uploaded content is already stored.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DuplicateUploadResponse {
    pub message: String,
    /// ID of the record that already holds this content.
    pub file_id: i32,
    pub existing_filename: String,
}

/// Body of a successful upload. Serialised without a tag, so each variant
/// reads exactly like its inner response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UploadResult {
    Created(UploadResponse),
    Duplicate(DuplicateUploadResponse),
}

/// Response for a soft delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}
