//! Business logic services.

pub mod cleanup;
pub mod content;
pub mod storage;
pub mod upload;

pub use cleanup::{ReclaimReport, reclaim_blob, run_reclaim_cycle, start_reclaim_task};
pub use storage::BlobStore;
