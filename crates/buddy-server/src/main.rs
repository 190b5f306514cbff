//! SportsBuddy Server
//!
//! Serves the backend function endpoints over HTTP from an in-memory store.

use buddy_server::{
    AppState, ServerConfig,
    config::DEV_JWT_SECRET,
    handler::jwt::JwtManager,
    router,
    service::database::Database,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::parse();
    if config.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("Using the built-in development JWT secret");
    }

    let database = Database::new();
    if !config.no_demo_accounts
        && let Err(err) = database.seed_demo_accounts()
    {
        tracing::error!("Error initializing demo accounts: {err}");
    }
    let state = AppState::new(
        database,
        JwtManager::new(config.jwt_secret.clone(), config.token_expiry_hours),
    );

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {addr}");
    tracing::info!("  - Health: http://{addr}/health");
    tracing::info!("  - Login: http://{addr}/auth/login");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
