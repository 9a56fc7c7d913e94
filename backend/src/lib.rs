//! Fair Weather Friend backend
//!
//! Serves gardens whose plants grow faster or slower depending on the
//! owner's real-world weather, and keeps cached growth stages fresh.

use std::sync::Arc;

use axum::{routing::get, Router};
use shared::GrowthCalculator;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub growth: GrowthCalculator,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let growth = GrowthCalculator::new(config.growth.settings());
        Self {
            db,
            config: Arc::new(config),
            growth,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Fair Weather Friend API v1.0"
}
