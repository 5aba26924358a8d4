//! Log file API handlers.
//!
//! Listing, metadata, windowed content, download and soft delete. Every
//! handler only sees active rows; a soft-deleted file answers 404.

use std::path::PathBuf;

use actix_files::NamedFile;
use actix_web::http::header::{
    self, Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::{HttpRequest, HttpResponse, delete, get, web};
use tracing::{info, warn};

use crate::db::DbPool;
use crate::entity::log_file;
use crate::error::{AppError, AppResult, ErrorResponse};
use crate::models::{
    ContentParams, ContentQuery, DeleteResponse, ListLogsParams, ListLogsQuery,
    LogContentResponse, LogFileListResponse, LogFileSummary,
};
use crate::services::content::load_window;
use crate::services::{BlobStore, reclaim_blob};

/// Configure log file routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_logs)
        .service(get_log_content)
        .service(download_log)
        .service(get_log)
        .service(delete_log);
}

/// Parse a path id. Anything that is not an integer is an unknown route.
fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse::<i32>()
        .map_err(|_| AppError::NotFound("Not found".to_string()))
}

/// Load an active record or answer 404.
async fn find_active(pool: &DbPool, raw_id: &str) -> AppResult<log_file::Model> {
    let id = parse_id(raw_id)?;
    pool.get_active_log_file(id)
        .await?
        .ok_or_else(|| AppError::NotFound("File not found".to_string()))
}

/// List stored log files, newest first.
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(ListLogsParams),
    responses(
        (status = 200, description = "Page of log files", body = LogFileListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[get("/logs")]
pub async fn list_logs(
    pool: web::Data<DbPool>,
    params: web::Query<ListLogsParams>,
) -> AppResult<HttpResponse> {
    let query = ListLogsQuery::from(params.into_inner());
    let (files, total) = pool.list_log_files(&query).await?;

    Ok(HttpResponse::Ok().json(LogFileListResponse {
        files: files.into_iter().map(LogFileSummary::from).collect(),
        total,
        pages: query.total_pages(total),
        current_page: query.page,
        per_page: query.per_page,
    }))
}

/// Get the metadata of one log file.
#[utoipa::path(
    get,
    path = "/api/logs/{id}",
    tag = "Logs",
    params(("id" = i32, Path, description = "Log file ID")),
    responses(
        (status = 200, description = "Log file metadata", body = LogFileSummary),
        (status = 404, description = "Log file not found", body = ErrorResponse)
    )
)]
#[get("/logs/{id}")]
pub async fn get_log(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let record = find_active(&pool, &path).await?;
    Ok(HttpResponse::Ok().json(LogFileSummary::from(record)))
}

/// Read a window of lines, optionally filtered by a search term.
#[utoipa::path(
    get,
    path = "/api/logs/{id}/content",
    tag = "Logs",
    params(("id" = i32, Path, description = "Log file ID"), ContentParams),
    responses(
        (status = 200, description = "Window of lines", body = LogContentResponse),
        (status = 404, description = "Log file or its blob not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[get("/logs/{id}/content")]
pub async fn get_log_content(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    params: web::Query<ContentParams>,
) -> AppResult<HttpResponse> {
    let record = find_active(&pool, &path).await?;
    let query = ContentQuery::from(params.into_inner());

    let window = load_window(PathBuf::from(record.file_path), query).await?;

    Ok(HttpResponse::Ok().json(window))
}

/// Download the stored file as an attachment.
#[utoipa::path(
    get,
    path = "/api/logs/{id}/download",
    tag = "Logs",
    params(("id" = i32, Path, description = "Log file ID")),
    responses(
        (status = 200, description = "Raw file contents", content_type = "text/plain"),
        (status = 404, description = "Log file or its blob not found", body = ErrorResponse)
    )
)]
#[get("/logs/{id}/download")]
pub async fn download_log(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let record = find_active(&pool, &path).await?;

    let file = NamedFile::open_async(&record.file_path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound("File not found on disk".to_string())
            }
            _ => AppError::Storage(format!("Failed to open blob {}: {}", record.file_path, e)),
        })?;

    let file = file
        .set_content_type(header::ContentType::plaintext().0)
        .set_content_disposition(attachment(record.original_filename));

    Ok(file.into_response(&req))
}

/// Attachment disposition for `name`, with an RFC 5987 `filename*` when the
/// name is not plain ASCII.
fn attachment(name: String) -> ContentDisposition {
    let mut parameters = vec![DispositionParam::Filename(name.clone())];
    if !name.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_owned()),
            language_tag: None,
            value: name.into_bytes(),
        }));
    }

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

/// Soft-delete a log file and reclaim its blob.
///
/// Reclaiming is best effort; the periodic sweep retries failures.
#[utoipa::path(
    delete,
    path = "/api/logs/{id}",
    tag = "Logs",
    params(("id" = i32, Path, description = "Log file ID")),
    responses(
        (status = 200, description = "Log file deleted", body = DeleteResponse),
        (status = 404, description = "Log file not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[delete("/logs/{id}")]
pub async fn delete_log(
    pool: web::Data<DbPool>,
    store: web::Data<BlobStore>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let record = find_active(&pool, &path).await?;

    // A concurrent delete may have won between the lookup and the update
    if !pool.soft_delete_log_file(record.id).await? {
        return Err(AppError::NotFound("File not found".to_string()));
    }

    info!("Deleted log file {} ({})", record.id, record.original_filename);

    if let Err(e) = reclaim_blob(&pool, &store, &record).await {
        warn!(
            "Log file {} deleted but its blob was not reclaimed: {}",
            record.id, e
        );
    }

    Ok(HttpResponse::Ok().json(DeleteResponse {
        message: "File deleted successfully".to_string(),
    }))
}
