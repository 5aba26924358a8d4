//! Models for the windowed content viewer.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{normalize_search, parse_or};

/// Default number of lines per window.
pub const DEFAULT_LINES: usize = 100;

/// Largest window a caller may request.
pub const MAX_LINES: usize = 1000;

/// Raw content query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentParams {
    /// Zero-based offset into the (possibly filtered) lines (default 0).
    pub start: Option<String>,
    /// Number of lines to return (default 100, max 1000).
    pub lines: Option<String>,
    /// Case-insensitive substring; only matching lines are returned.
    pub search: Option<String>,
}

/// Validated content window request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub start: usize,
    pub lines: usize,
    pub search: Option<String>,
}

impl ContentQuery {
    /// Exclusive end of the requested window.
    pub fn window_end(&self) -> usize {
        self.start.saturating_add(self.lines)
    }
}

impl From<ContentParams> for ContentQuery {
    fn from(params: ContentParams) -> Self {
        let start = parse_or::<i64>(params.start.as_deref(), 0).max(0) as usize;
        let lines = parse_or::<i64>(params.lines.as_deref(), DEFAULT_LINES as i64)
            .clamp(1, MAX_LINES as i64) as usize;

        ContentQuery {
            start,
            lines,
            search: normalize_search(params.search.as_deref()),
        }
    }
}

/// A window of lines from a stored log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LogContentResponse {
    /// Lines with their original terminators.
    pub content: Vec<String>,
    /// 1-based position of each returned line in the original file.
    pub line_numbers: Vec<usize>,
    /// Line count after search filtering.
    pub total_lines: usize,
    /// Line count of the whole file.
    pub original_total_lines: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub has_search: bool,
}
