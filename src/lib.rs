//! Hospital management backend: a workflow engine for appointment,
//! prescription and payment lifecycles plus a read-only analytics
//! aggregator, served over HTTP+JSON.

pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
pub mod workflow;

use tracing_subscriber::EnvFilter;

use crate::api::server::{start_server, ApiServer};
use crate::api::types::ApiContext;

/// Initialize tracing from RUST_LOG, falling back to the app default.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Open the database, seed the department catalog and start serving.
pub async fn run() -> Result<ApiServer, String> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let data_dir = config::app_data_dir();
    std::fs::create_dir_all(&data_dir)
        .map_err(|e| format!("Cannot create data directory: {e}"))?;

    let conn = db::sqlite::open_database(&config::database_path())
        .map_err(|e| format!("Cannot open database: {e}"))?;
    seed::seed_departments(&conn).map_err(|e| format!("Cannot seed departments: {e}"))?;

    start_server(ApiContext::new(conn), config::bind_addr()).await
}
