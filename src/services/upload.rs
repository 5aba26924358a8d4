//! Log file upload service.
//!
//! POST /api/upload
//! Content-Type: multipart/form-data (file part named `file`)
//!
//! The part is streamed straight into a fresh blob. Size and fingerprint are
//! taken from the written file, then the row is inserted; the partial unique
//! index on the fingerprint turns a concurrent duplicate into a conflict that
//! resolves to the existing record.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, post, web};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{DbPool, InsertOutcome, NewLogFile};
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{DuplicateUploadResponse, UploadForm, UploadResponse, UploadResult};
use crate::services::storage::{BlobStore, NewBlob};
use crate::utils::{has_allowed_extension, hash_file};

/// Name of the multipart part carrying the file.
const FILE_FIELD: &str = "file";

/// Column width of `original_filename`.
const MAX_ORIGINAL_FILENAME_LEN: usize = 255;

/// Column width of `client_info`.
const MAX_CLIENT_INFO_LEN: usize = 500;

/// A file part that has been written to the blob store.
#[derive(Debug)]
struct ReceivedFile {
    original_filename: String,
    name: String,
    path: PathBuf,
}

/// Configure upload routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_log_file);
}

/// Upload a log file.
///
/// Identical content that is already stored is not written twice; the
/// response then names the existing record.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "Logs",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored, or the record already holding this content", body = UploadResult),
        (status = 400, description = "Missing file or disallowed extension", body = ErrorResponse),
        (status = 413, description = "Body exceeds the upload limit", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[post("/upload")]
pub async fn upload_log_file(
    req: HttpRequest,
    mut payload: Multipart,
    pool: web::Data<DbPool>,
    store: web::Data<BlobStore>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    check_declared_length(&req, config.max_upload_size)?;

    if !req.content_type().eq_ignore_ascii_case("multipart/form-data") {
        return Err(AppError::InvalidInput("No file provided".to_string()));
    }

    let client_info = client_info(&req);
    let received = receive_file(&mut payload, &store, &config).await?;

    let (file_hash, file_size) = match fingerprint(&received.path).await {
        Ok(measured) => measured,
        Err(e) => {
            discard_blob(&store, &received.path).await;
            return Err(e);
        }
    };

    let entry = NewLogFile {
        filename: received.name.clone(),
        original_filename: received.original_filename.clone(),
        file_path: received.path.to_string_lossy().into_owned(),
        file_size,
        file_hash,
        client_info,
    };

    match pool.insert_log_file(entry).await {
        Ok(InsertOutcome::Created(record)) => {
            info!(
                "Stored log file {} as {} ({} bytes)",
                record.id, record.filename, record.file_size
            );

            Ok(HttpResponse::Ok().json(UploadResult::Created(UploadResponse {
                message: "File uploaded successfully".to_string(),
                file_id: record.id,
                filename: record.original_filename,
                file_size: record.file_size,
            })))
        }
        Ok(InsertOutcome::Duplicate(existing)) => {
            info!(
                "Upload of '{}' duplicates log file {}",
                received.original_filename, existing.id
            );
            discard_blob(&store, &received.path).await;

            Ok(HttpResponse::Ok().json(UploadResult::Duplicate(DuplicateUploadResponse {
                message: "File already exists".to_string(),
                file_id: existing.id,
                existing_filename: existing.original_filename,
            })))
        }
        Err(e) => {
            discard_blob(&store, &received.path).await;
            Err(e)
        }
    }
}

/// Reject bodies whose declared length is already over the limit.
fn check_declared_length(req: &HttpRequest, max_upload_size: usize) -> AppResult<()> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    match declared {
        Some(length) if length > max_upload_size as u64 => {
            warn!(
                "Upload rejected: declared length {} exceeds limit of {} bytes",
                length, max_upload_size
            );
            Err(AppError::PayloadTooLarge)
        }
        _ => Ok(()),
    }
}

/// Uploader user agent, truncated to the column width.
fn client_info(req: &HttpRequest) -> String {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|agent| truncate_chars(agent, MAX_CLIENT_INFO_LEN))
        .unwrap_or_default()
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Stream the `file` part into a new blob.
///
/// Any failure after the blob was created removes it again.
async fn receive_file(
    payload: &mut Multipart,
    store: &BlobStore,
    config: &Config,
) -> AppResult<ReceivedFile> {
    let mut received = None;
    let result = read_parts(payload, store, config, &mut received).await;

    match (result, received) {
        (Ok(()), Some(file)) => Ok(file),
        (Ok(()), None) => Err(AppError::InvalidInput("No file provided".to_string())),
        (Err(e), Some(file)) => {
            discard_blob(store, &file.path).await;
            Err(e)
        }
        (Err(e), None) => Err(e),
    }
}

async fn read_parts(
    payload: &mut Multipart,
    store: &BlobStore,
    config: &Config,
    received: &mut Option<ReceivedFile>,
) -> AppResult<()> {
    let max_upload_size = config.max_upload_size;
    let mut body_size: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let (part_name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };

        // Only the first `file` part that carries a filename is stored
        let filename = match filename {
            Some(filename) if received.is_none() && part_name.as_deref() == Some(FILE_FIELD) => {
                filename
            }
            _ => {
                body_size = drain_field(&mut field, body_size, max_upload_size).await?;
                continue;
            }
        };

        if filename.is_empty() {
            return Err(AppError::InvalidInput("No file selected".to_string()));
        }

        if !has_allowed_extension(&filename, &config.allowed_extensions) {
            return Err(AppError::InvalidInput(format!(
                "Invalid file type. Only {} files are allowed",
                config.allowed_extensions_display()
            )));
        }

        let NewBlob {
            name,
            path,
            mut file,
        } = store.create(&filename).await?;

        *received = Some(ReceivedFile {
            original_filename: truncate_chars(&filename, MAX_ORIGINAL_FILENAME_LEN),
            name,
            path,
        });

        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            body_size += data.len();
            if body_size > max_upload_size {
                warn!(
                    "Upload of '{}' exceeded limit of {} bytes",
                    filename, max_upload_size
                );
                return Err(AppError::PayloadTooLarge);
            }
            file.write_all(&data)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to write blob: {}", e)))?;
        }

        file.flush()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush blob: {}", e)))?;
    }

    Ok(())
}

/// Drain a multipart field without saving, still counting it against the limit.
async fn drain_field(
    field: &mut actix_multipart::Field,
    mut body_size: usize,
    max_upload_size: usize,
) -> AppResult<usize> {
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        body_size += data.len();
        if body_size > max_upload_size {
            return Err(AppError::PayloadTooLarge);
        }
    }
    Ok(body_size)
}

/// SHA-256 and byte length of a written blob.
async fn fingerprint(path: &Path) -> AppResult<(String, i64)> {
    let owned = path.to_path_buf();
    let hash = tokio::task::spawn_blocking(move || hash_file(&owned))
        .await?
        .map_err(|e| AppError::Storage(format!("Failed to hash blob: {}", e)))?;

    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| AppError::Storage(format!("Failed to stat blob: {}", e)))?
        .len();

    Ok((hash, size as i64))
}

/// Best-effort removal of a blob that will not be recorded.
async fn discard_blob(store: &BlobStore, path: &Path) {
    match store.remove(path).await {
        Ok(_) => debug!("Discarded blob {}", path.display()),
        Err(e) => warn!("Failed to discard blob {}: {}", path.display(), e),
    }
}
