//! Route definitions for the Fair Weather Friend API

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Everything under `/api/v1` needs a signed-in user.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/plants", plant_routes())
        .nest("/gardens", garden_routes())
        .nest("/planted", planted_routes())
        .nest("/weather", weather_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Seed catalog routes
fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plants))
        .route("/:plant_id", get(handlers::get_plant))
}

/// Garden routes
fn garden_routes() -> Router<AppState> {
    Router::new()
        .route("/:owner_id", get(handlers::get_garden))
        .route("/:owner_id/plant", post(handlers::plant_seed))
}

/// Planted seed routes
fn planted_routes() -> Router<AppState> {
    Router::new().route("/:planted_id/harvest", post(handlers::harvest_plant))
}

/// Weather routes
fn weather_routes() -> Router<AppState> {
    Router::new().route(
        "/me",
        get(handlers::get_my_weather).post(handlers::update_my_location),
    )
}
