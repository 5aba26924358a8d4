//! Local blob storage for uploaded log files.
//!
//! Blobs live flat in one directory, named `<timestamp>_<sanitised-name>`.
//! Creation is exclusive so two uploads never share a blob; removal is
//! idempotent so reclamation can be retried.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tokio::fs::{File, OpenOptions};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::utils::sanitize_filename;

/// Timestamp prefix of storage names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Collision retries before giving up on a storage name.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Longest sanitised name kept in a storage name. The tail is kept so the
/// extension survives.
const MAX_SAFE_NAME_LEN: usize = 200;

/// Handle to the blob directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

/// A freshly created, still empty blob.
#[derive(Debug)]
pub struct NewBlob {
    /// Storage name (file name within the blob directory).
    pub name: String,
    /// Absolute path of the blob.
    pub path: PathBuf,
    pub file: File,
}

/// A blob found while scanning the directory.
#[derive(Debug, Clone)]
pub struct BlobEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl BlobStore {
    /// Open the blob directory, creating it if necessary.
    pub async fn new(root: &Path) -> AppResult<Self> {
        tokio::fs::create_dir_all(root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let root = tokio::fs::canonicalize(root).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to resolve storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        info!("Blob storage initialized: {}", root.display());

        Ok(Self { root })
    }

    /// Absolute path of the blob directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build the storage name for an upload.
    ///
    /// `attempt` disambiguates uploads of the same name within one second.
    pub fn storage_name(original: &str, timestamp: &str, attempt: u32) -> String {
        let safe = sanitize_filename(original);
        // Sanitised names are ASCII, so byte offsets are char boundaries.
        let safe = &safe[safe.len().saturating_sub(MAX_SAFE_NAME_LEN)..];
        if attempt == 0 {
            format!("{}_{}", timestamp, safe)
        } else {
            format!("{}-{}_{}", timestamp, attempt, safe)
        }
    }

    /// Create a new, empty blob for an upload named `original`.
    pub async fn create(&self, original: &str) -> AppResult<NewBlob> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let name = Self::storage_name(original, &timestamp, attempt);
            let path = self.root.join(&name);

            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    debug!("Created blob {}", path.display());
                    return Ok(NewBlob { name, path, file });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(AppError::Storage(format!(
                        "Failed to create blob {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(AppError::Storage(format!(
            "No free storage name for '{}' after {} attempts",
            original, MAX_NAME_ATTEMPTS
        )))
    }

    /// Remove a blob.
    ///
    /// Returns `Ok(false)` when the blob was already gone.
    pub async fn remove(&self, path: &Path) -> AppResult<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed blob {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove blob {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// List the regular files in the blob directory.
    pub async fn list(&self) -> AppResult<Vec<BlobEntry>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            AppError::Storage(format!("Failed to read storage directory: {}", e))
        })?;

        let mut blobs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read storage directory: {}", e)))?
        {
            let meta = match entry.metadata().await {
                Ok(meta) if meta.is_file() => meta,
                _ => continue,
            };
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            blobs.push(BlobEntry {
                name,
                path: entry.path(),
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            });
        }

        Ok(blobs)
    }
}
