//! Catalog server entry point.
//!
//! Bootstrap order: `.env` -> config -> logging -> store (+ bootstrap
//! category) -> listener.

use log::{error, info};
use scan_catalog_core::db::open_db;
use scan_catalog_core::{init_logging, LogSettings};
use scan_catalog_server::{build_router, AppState, ServerConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("scan-catalog-server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), String> {
    let _ = dotenvy::dotenv();
    let config = ServerConfig::from_env().map_err(|err| err.to_string())?;

    let log_settings =
        LogSettings::new(config.log_level.as_str(), &config.log_dir).with_stderr(true);
    init_logging(&log_settings)?;

    let conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let state = AppState::bootstrap(conn)
        .map_err(|err| format!("failed to ensure bootstrap category: {err}"))?;

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| format!("failed to bind {bind_addr}: {err}"))?;

    info!(
        "event=server_start module=server status=ok addr={} db_path={}",
        bind_addr,
        config.db_path.display()
    );

    axum::serve(listener, build_router(state))
        .await
        .map_err(|err| format!("server error: {err}"))
}
