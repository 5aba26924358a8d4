//! Log vault server library.
//!
//! Upload, deduplicate, browse and search text log files over HTTP. The
//! binary in `main.rs` wires these modules into an actix-web server.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod utils;
