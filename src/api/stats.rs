//! Aggregate statistics endpoint.

use actix_web::{HttpResponse, get, web};

use crate::db::DbPool;
use crate::error::{AppResult, ErrorResponse};
use crate::models::StatsResponse;
use crate::models::stats::STATS_MAX_DAYS;

/// Totals and per-day upload counts over stored log files.
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[get("/stats")]
pub async fn get_stats(pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let stats = pool.get_log_file_stats(STATS_MAX_DAYS).await?;
    Ok(HttpResponse::Ok().json(StatsResponse::from(stats)))
}

/// Configure stats routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_stats);
}
