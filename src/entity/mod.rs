//! SeaORM entity definitions.

pub mod log_file;
