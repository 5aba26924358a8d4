//! UI shell and fallback handlers.

use actix_files::NamedFile;
use actix_web::{HttpResponse, get, web};

use crate::config::Config;
use crate::error::{AppError, AppResult, ErrorResponse};

/// Serve the UI shell.
#[get("/")]
pub async fn index(config: web::Data<Config>) -> AppResult<NamedFile> {
    let path = config.static_dir.join("index.html");

    NamedFile::open_async(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AppError::NotFound("Not found".to_string()),
        _ => AppError::Storage(format!("Failed to open {}: {}", path.display(), e)),
    })
}

/// JSON 404 for unmatched routes.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new("Not found"))
}
