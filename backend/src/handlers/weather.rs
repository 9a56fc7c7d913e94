//! HTTP handlers for the caller's weather

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{GpsCoordinates, WeatherCategory, WeatherReading};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::WeatherService;
use crate::AppState;

/// A reading plus how the app shows it
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    #[serde(flatten)]
    pub reading: WeatherReading,
    pub category: WeatherCategory,
    pub display_name: &'static str,
    pub icon: &'static str,
}

impl From<WeatherReading> for WeatherResponse {
    fn from(reading: WeatherReading) -> Self {
        let display = reading.display();
        Self {
            category: reading.category(),
            display_name: display.display_name,
            icon: display.icon,
            reading,
        }
    }
}

/// Request body for saving the caller's location
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLocationInput {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl UpdateLocationInput {
    fn coordinates(&self) -> AppResult<GpsCoordinates> {
        let latitude = Decimal::from_f64_retain(self.latitude).ok_or_else(|| AppError::Validation {
            field: "latitude".to_string(),
            message: "Latitude is not a number".to_string(),
        })?;
        let longitude =
            Decimal::from_f64_retain(self.longitude).ok_or_else(|| AppError::Validation {
                field: "longitude".to_string(),
                message: "Longitude is not a number".to_string(),
            })?;

        Ok(GpsCoordinates::new(latitude.round_dp(6), longitude.round_dp(6)))
    }
}

/// Get the caller's last-known weather, refreshing it when stale
pub async fn get_my_weather(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Option<WeatherResponse>>> {
    let service = WeatherService::from_config(state.db, &state.config.weather);
    let reading = service.get_or_refresh(current_user.0.user_id).await?;
    Ok(Json(reading.map(WeatherResponse::from)))
}

/// Save the caller's location and fetch its weather
pub async fn update_my_location(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<WeatherResponse>> {
    input.validate()?;
    let location = input.coordinates()?;

    let service = WeatherService::from_config(state.db, &state.config.weather);
    let reading = service
        .update_location(current_user.0.user_id, location)
        .await?;
    Ok(Json(reading.into()))
}
