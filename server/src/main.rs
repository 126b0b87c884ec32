mod api;
mod casing;
mod config;
mod db;
mod error;
mod models;
mod reconcile;
mod schema;
mod store;
mod telemetry;
mod validate;

use anyhow::Context;
use config::ServerConfig;
use std::env;
use std::sync::Arc;
use store::{PgStore, RecipeStore};
use tokio::signal;

/// Application state shared across all handlers
pub type AppState = Arc<dyn RecipeStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Check for --openapi flag to dump spec and exit
    if env::args().any(|arg| arg == "--openapi") {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }
    let migrate_only = env::args().any(|arg| arg == "--migrate");

    dotenvy::dotenv().ok();
    telemetry::init_telemetry();

    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url, config.pool_max_size)?;

    if config.run_migrations || migrate_only {
        let migration_pool = pool.clone();
        let applied = tokio::task::spawn_blocking(move || db::run_migrations(&migration_pool))
            .await?
            .context("Unable to run migration. Are your database credentials correct?")?;

        if applied.is_empty() {
            tracing::info!("Database schema is up to date");
        } else {
            tracing::info!("Applied migrations: {}", applied.join(", "));
        }
    }

    if migrate_only {
        return Ok(());
    }

    let state: AppState = Arc::new(PgStore::new(pool));
    let app = api::app(state, config.track_query_count);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Server listening on {}", local_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", local_addr);
    tracing::info!(
        "OpenAPI spec available at http://{}/api-docs/openapi.json",
        local_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
