//! API endpoint modules.

pub mod health;
pub mod index;
pub mod logs;
pub mod openapi;
pub mod stats;

use actix_web::web;

pub use index::not_found;
pub use openapi::ApiDoc;

use crate::services;

/// Register the API docs, the `/api` scope and the UI shell.
///
/// The docs come first: a matched `/api` scope does not fall through to
/// later services.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi::swagger_ui())
        .service(
            web::scope("/api")
                .configure(services::upload::configure_routes)
                .configure(logs::configure_routes)
                .configure(stats::configure_routes)
                .configure(health::configure_routes)
                .default_service(web::to(not_found)),
        )
        .service(index::index);
}
