//! sync-server: bulk catalog ingestion API
//!
//! Long-running service that:
//! - Receives catalog, product, price, stock and unit-of-measure batches from the ERP
//! - Validates and upserts every record with per-record error reporting
//! - Keeps an audit trail of every record in `sync_logs`
//! - Notifies operators of partially or fully failed batches

mod api;
mod auth;
mod batch;
mod config;
mod db;
mod error;
mod notify;
mod sanitize;
mod state;
mod sync;
mod util;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env()?;

    tracing::info!("Starting sync-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::router(state, config.max_body_bytes);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!(
        batch_size = config.batch_size,
        "sync-server HTTP listening on {http_addr}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sync-server stopped");
    Ok(())
}

/// `RUST_LOG` filter, `LOG_FORMAT=json` for JSON lines
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sync_server=info,tower_http=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
