//! HTTP handlers for the seed catalog

use axum::{
    extract::{Path, State},
    Json,
};
use shared::PlantType;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::PlantService;
use crate::AppState;

/// List all plant types
pub async fn list_plants(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<PlantType>>> {
    let service = PlantService::new(state.db);
    let plants = service.list_plants().await?;
    Ok(Json(plants))
}

/// Get a plant type by ID
pub async fn get_plant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(plant_id): Path<Uuid>,
) -> AppResult<Json<PlantType>> {
    let service = PlantService::new(state.db);
    let plant = service.get_plant(plant_id).await?;
    Ok(Json(plant))
}
