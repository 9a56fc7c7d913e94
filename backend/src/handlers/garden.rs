//! HTTP handlers for gardens, planting and harvesting

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{validate_slot_index, PlantedInstance};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::garden::{GardenView, HarvestOutcome};
use crate::services::{GardenService, WeatherService};
use crate::AppState;

/// Request body for planting a seed
#[derive(Debug, Deserialize, Validate)]
pub struct PlantSeedInput {
    pub plant_id: Uuid,
    #[validate(range(min = 0, max = 2))]
    pub slot: i32,
}

/// Get a garden with live growth for each slot
pub async fn get_garden(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(owner_id): Path<Uuid>,
) -> AppResult<Json<GardenView>> {
    let weather = match WeatherService::from_config(state.db.clone(), &state.config.weather)
        .get_or_refresh(owner_id)
        .await
    {
        Ok(reading) => reading,
        Err(e) => {
            tracing::warn!("No weather for garden {}, using default: {}", owner_id, e);
            None
        }
    };

    let service = GardenService::new(state.db, state.growth);
    let garden = service.get_garden(owner_id, weather.as_ref()).await?;
    Ok(Json(garden))
}

/// Plant a seed in one of the garden's slots
pub async fn plant_seed(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(owner_id): Path<Uuid>,
    Json(input): Json<PlantSeedInput>,
) -> AppResult<(StatusCode, Json<PlantedInstance>)> {
    input.validate()?;
    let slot = validate_slot_index(input.slot)?;

    let service = GardenService::new(state.db, state.growth);
    let planted = service
        .plant_seed(current_user.0.user_id, owner_id, input.plant_id, slot)
        .await?;
    Ok((StatusCode::CREATED, Json(planted)))
}

/// Harvest a mature plant
pub async fn harvest_plant(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(planted_id): Path<Uuid>,
) -> AppResult<Json<HarvestOutcome>> {
    let service = GardenService::new(state.db, state.growth);
    let outcome = service.harvest(current_user.0.user_id, planted_id).await?;
    Ok(Json(outcome))
}
