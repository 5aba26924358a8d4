//! Log Vault Server - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.
//! `--init-db` applies the database migrations and exits.

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use log_vault::api;
use log_vault::config::Config;
use log_vault::db::DbPool;
use log_vault::middleware::RequestLogger;
use log_vault::services::{self, BlobStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let init_db_only = std::env::args().any(|arg| arg == "--init-db");

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must not be the development default");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Log Vault Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations complete");

    if init_db_only {
        info!("Database initialized");
        return Ok(());
    }

    let store = match BlobStore::new(&config.storage_dir).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to initialize blob storage: {}", e);
            std::process::exit(1);
        }
    };

    services::start_reclaim_task(pool.clone(), store.clone(), config.reclaim.clone());

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let static_dir = config.static_dir.clone();

    info!(
        "Upload limit: {}MB, allowed extensions: {}",
        config.max_upload_size / 1024 / 1024,
        config.allowed_extensions_display()
    );
    info!("Serving UI shell from {}", static_dir.display());

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let pool = web::Data::new(pool);
    let store = web::Data::new(store);
    let config = web::Data::new(config);

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::permissive()
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(pool.clone())
            .app_data(store.clone())
            .app_data(config.clone())
            .configure(api::configure_routes)
            .service(Files::new("/static", static_dir.clone()).prefer_utf8(true))
            .default_service(web::to(api::not_found))
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
