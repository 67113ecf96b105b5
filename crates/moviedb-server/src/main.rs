//! moviedb-server - read API over the movie catalog

use anyhow::{Context, Result};
use moviedb_common::logging::{init_logging, LogConfig};
use moviedb_server::{app, AppState, Config};
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // LOG_* variables win over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("moviedb-server")
        .filter_directives("moviedb_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let config = Config::load().context("Failed to load server configuration")?;
    let addr = config.server.bind_addr()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Database ready, migrations applied");

    let app = app(AppState::new(pool, config.server.default_limit), &config);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "moviedb-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then allows in-flight requests a short drain
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    let drain = Duration::from_secs(timeout_secs.min(5));
    info!(drain_secs = drain.as_secs(), "Shutdown requested");
    tokio::time::sleep(drain).await;
}
