//! Libris backend - library management over GraphQL
//!
//! All operations are exposed via GraphQL at /graphql.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris::AppState;
use libris::app::build_app;
use libris::config::Config;
use libris::db::Database;
use libris::graphql::build_schema;
use libris::services::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "libris=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Libris backend");

    let config = Arc::new(Config::from_env()?);
    if config.secret_key_generated {
        tracing::warn!(
            "SECRET_KEY is not set; using a random per-process secret. Sessions will not survive a restart"
        );
    }
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url, config.database_max_connections).await?;
    db.migrate().await.context("Failed to run database migrations")?;
    tracing::info!(database_url = %config.database_url, "Database connected");

    let services = Services::new(db.clone(), &config)?;

    if let Some(admin) = &config.admin {
        services
            .auth
            .ensure_superuser(admin)
            .await
            .context("Failed to bootstrap superuser")?;
    }

    let schema = build_schema(db.clone(), services);
    tracing::info!("GraphQL schema built");

    let state = AppState {
        config: config.clone(),
        db,
        schema,
    };
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("GraphQL playground: http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
