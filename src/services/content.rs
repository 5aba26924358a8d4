//! Line-windowed reading of stored log files.
//!
//! The blob is streamed line by line and only the lines inside the requested
//! window are kept, so memory follows the window size rather than the file.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::{ContentQuery, LogContentResponse};

/// Select a window of lines from `reader`.
///
/// Lines keep their `\n` terminator and are decoded lossily. With a search
/// term the window applies to the matching lines only (case-insensitive) and
/// `line_numbers` carries each line's 1-based position in the whole file.
pub fn read_window<R: BufRead>(
    mut reader: R,
    query: &ContentQuery,
) -> io::Result<LogContentResponse> {
    let needle = query.search.as_ref().map(|term| term.to_lowercase());
    let window_end = query.window_end();

    let mut content = Vec::new();
    let mut line_numbers = Vec::new();
    let mut original_total = 0usize;
    let mut matched = 0usize;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        original_total += 1;

        let line = String::from_utf8_lossy(&buf);
        let index = match needle {
            Some(ref needle) => {
                if !line.to_lowercase().contains(needle.as_str()) {
                    continue;
                }
                matched += 1;
                matched - 1
            }
            None => original_total - 1,
        };

        if index >= query.start && index < window_end {
            content.push(line.into_owned());
            line_numbers.push(original_total);
        }
    }

    let total_lines = if needle.is_some() {
        matched
    } else {
        original_total
    };
    let end_line = (query.start + content.len()).min(total_lines);

    Ok(LogContentResponse {
        content,
        line_numbers,
        total_lines,
        original_total_lines: original_total,
        start_line: query.start,
        end_line,
        has_search: needle.is_some(),
    })
}

/// Read a window from a blob on disk without blocking the async runtime.
pub async fn load_window(path: PathBuf, query: ContentQuery) -> AppResult<LogContentResponse> {
    let result = tokio::task::spawn_blocking(move || {
        let file = File::open(&path)?;
        read_window(BufReader::new(file), &query)
    })
    .await?;

    result.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound("File not found on disk".to_string()),
        _ => AppError::Storage(format!("Failed to read log content: {}", e)),
    })
}
