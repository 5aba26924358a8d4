//! Filename sanitising and extension checks for uploads.

/// Name used when nothing safe is left after sanitising.
const FALLBACK_NAME: &str = "upload";

/// Reduce a user-supplied filename to a safe, flat ASCII name.
///
/// Path separators become whitespace, whitespace runs become `_`, every
/// character outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.` and
/// `_` are stripped. The result never contains a path component.
pub fn sanitize_filename(name: &str) -> String {
    let flattened = name.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Check the text after the last dot against the allowed extensions.
///
/// `allowed` must hold lowercase extensions without the dot.
pub fn has_allowed_extension(name: &str, allowed: &[String]) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            allowed.iter().any(|candidate| *candidate == ext)
        }
        None => false,
    }
}
