//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "sqlite://data/logs.db?mode=rwc";
    pub const DEV_HOST: &str = "0.0.0.0";
    pub const DEV_PORT: u16 = 50000;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 10;
    pub const DEV_DB_MIN_CONNECTIONS: u32 = 1;
    pub const DEV_STORAGE_DIR: &str = "storage/logs";
    pub const DEV_STATIC_DIR: &str = "static";
    pub const DEV_MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024; // 100MB per request body
    pub const DEV_ALLOWED_EXTENSIONS: &str = "txt,log";
    pub const DEV_RECLAIM_INTERVAL_SECS: u64 = 3600;
    pub const DEV_ORPHAN_GRACE_SECS: u64 = 3600;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// SQLite (`sqlite://...`) or PostgreSQL (`postgres://...`) connection string
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Settings for the blob reclamation sweep.
#[derive(Debug, Clone)]
pub struct ReclaimSettings {
    /// How often the sweep runs, in seconds. Zero disables the sweep.
    pub interval_secs: u64,
    /// Minimum age of an unreferenced blob before it counts as orphaned.
    pub orphan_grace_secs: u64,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database settings
    pub database: DatabaseSettings,
    /// Directory where uploaded blobs are written
    pub storage_dir: PathBuf,
    /// Directory holding the UI shell (index.html and assets)
    pub static_dir: PathBuf,
    /// Maximum request body size for uploads in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Lowercase file extensions accepted by the upload endpoint
    pub allowed_extensions: Vec<String>,
    /// Blob reclamation sweep settings
    pub reclaim: ReclaimSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default.
    /// In production mode the server refuses to start with the development
    /// database.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `LV_HOST`: Server host (default: 0.0.0.0)
    /// - `LV_PORT`: Server port (default: 50000)
    /// - `DATABASE_URL`: SQLite or PostgreSQL connection string
    /// - `LV_DB_MAX_CONNECTIONS` / `LV_DB_MIN_CONNECTIONS`: pool bounds (default: 10 / 1)
    /// - `LV_STORAGE_DIR`: Blob directory (default: storage/logs)
    /// - `LV_STATIC_DIR`: UI shell directory (default: static)
    /// - `LV_MAX_UPLOAD_SIZE`: Max upload body in bytes (default: 100MB)
    /// - `LV_ALLOWED_EXTENSIONS`: Comma separated extensions (default: txt,log)
    /// - `LV_RECLAIM_INTERVAL_SECS`: Blob sweep interval, 0 disables (default: 3600)
    /// - `LV_ORPHAN_GRACE_SECS`: Orphaned blob grace period (default: 3600)
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("LV_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("LV_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("LV_PORT must be a valid port number"))?;

        let database = DatabaseSettings {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string()),
            max_connections: env::var("LV_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MAX_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("LV_DB_MAX_CONNECTIONS must be a valid number")
                })?,
            min_connections: env::var("LV_DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MIN_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("LV_DB_MIN_CONNECTIONS must be a valid number")
                })?,
        };

        let storage_dir = PathBuf::from(
            env::var("LV_STORAGE_DIR").unwrap_or_else(|_| defaults::DEV_STORAGE_DIR.to_string()),
        );

        let static_dir = PathBuf::from(
            env::var("LV_STATIC_DIR").unwrap_or_else(|_| defaults::DEV_STATIC_DIR.to_string()),
        );

        let max_upload_size = env::var("LV_MAX_UPLOAD_SIZE")
            .unwrap_or_else(|_| defaults::DEV_MAX_UPLOAD_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| ConfigError::InvalidValue("LV_MAX_UPLOAD_SIZE must be a valid number"))?;

        let allowed_extensions = parse_extensions(
            &env::var("LV_ALLOWED_EXTENSIONS")
                .unwrap_or_else(|_| defaults::DEV_ALLOWED_EXTENSIONS.to_string()),
        );
        if allowed_extensions.is_empty() {
            return Err(ConfigError::InvalidValue(
                "LV_ALLOWED_EXTENSIONS must list at least one extension",
            ));
        }

        let reclaim = ReclaimSettings {
            interval_secs: env::var("LV_RECLAIM_INTERVAL_SECS")
                .unwrap_or_else(|_| defaults::DEV_RECLAIM_INTERVAL_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::InvalidValue("LV_RECLAIM_INTERVAL_SECS must be a valid number")
                })?,
            orphan_grace_secs: env::var("LV_ORPHAN_GRACE_SECS")
                .unwrap_or_else(|_| defaults::DEV_ORPHAN_GRACE_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::InvalidValue("LV_ORPHAN_GRACE_SECS must be a valid number")
                })?,
        };

        let config = Config {
            environment,
            host,
            port,
            database,
            storage_dir,
            static_dir,
            max_upload_size,
            allowed_extensions,
            reclaim,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "DATABASE_URL is using development default '{}'. Set a production database URL.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            errors.push(
                "LV_DB_MIN_CONNECTIONS must not exceed LV_DB_MAX_CONNECTIONS".to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }

    /// Human readable list of accepted extensions, e.g. ".txt and .log".
    pub fn allowed_extensions_display(&self) -> String {
        let dotted: Vec<String> = self
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect();

        match dotted.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => String::new(),
        }
    }
}

/// Split a comma separated extension list into normalised lowercase entries.
fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
