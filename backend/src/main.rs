//! Fair Weather Friend - Backend Server

use std::{net::SocketAddr, time::Duration};

use fair_weather_friend_backend::{create_app, services::GrowthRefreshJob, AppState, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fwf_server=debug,fair_weather_friend_backend=debug,tower_http=debug,sqlx=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Fair Weather Friend server");
    tracing::info!("Environment: {}", config.environment);
    if let Some(hours) = config.growth.growth_hours_override {
        tracing::info!("Growth duration overridden to {} hours", hours);
    }
    if !config.weather.is_enabled() {
        tracing::warn!("No weather API key configured; gardens use cached weather only");
    }

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let refresh_interval = config.growth.refresh_interval();

    // Create application state
    let state = AppState::new(db_pool, config);

    GrowthRefreshJob::new(state.db.clone(), state.growth, refresh_interval).spawn();

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
