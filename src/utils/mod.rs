//! Small helpers shared by the upload, content and stats paths.

pub mod filename;
pub mod hash;
pub mod size;

pub use filename::{has_allowed_extension, sanitize_filename};
pub use hash::{hash_file, hash_reader};
pub use size::format_file_size;
