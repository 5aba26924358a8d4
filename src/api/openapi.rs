//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Log Vault Server",
        version = "0.1.0",
        description = "API server for uploading, browsing and searching text log files"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // Log endpoints
        services::upload::upload_log_file,
        api::logs::list_logs,
        api::logs::get_log,
        api::logs::get_log_content,
        api::logs::download_log,
        api::logs::delete_log,
        // Stats
        api::stats::get_stats,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            api::health::ReadyResponse,
            models::UploadForm,
            models::UploadResponse,
            models::DuplicateUploadResponse,
            models::UploadResult,
            models::LogFileSummary,
            models::LogFileListResponse,
            models::LogContentResponse,
            models::DeleteResponse,
            models::DailyStatsEntry,
            models::StatsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Logs", description = "Log file upload, browsing and deletion"),
        (name = "Stats", description = "Aggregate upload statistics")
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/api/docs/`, serving the document at `/api/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", ApiDoc::openapi())
}
