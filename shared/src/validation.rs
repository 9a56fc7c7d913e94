//! Validation utilities for Fair Weather Friend
//!
//! The growth calculators never validate their input (a broken bonus table
//! has to stay visible). These checks are for writes: seeding plant types and
//! planting seeds.

use thiserror::Error;

use crate::models::{GardenSlot, PlantType, WeatherCategory};

/// Validation failures for garden data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("growth stage must be between 1 and 5, got {0}")]
    StageOutOfRange(i64),

    #[error("garden slot must be between 0 and 2, got {0}")]
    SlotOutOfRange(i64),

    #[error("plant name cannot be empty")]
    EmptyName,

    #[error("growth time must be a positive number of hours")]
    InvalidGrowthTime,

    #[error("weather bonus for {0} is missing")]
    MissingWeatherBonus(WeatherCategory),

    #[error("weather bonus for {0} must be a positive number")]
    InvalidWeatherBonus(WeatherCategory),

    #[error("points cannot be negative")]
    NegativePoints,

    #[error("not enough points: need {cost}, have {available}")]
    InsufficientPoints { cost: i32, available: i32 },
}

impl ValidationError {
    /// Name of the offending field, for API error responses
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::StageOutOfRange(_) => "current_stage",
            ValidationError::SlotOutOfRange(_) => "slot",
            ValidationError::EmptyName => "name",
            ValidationError::InvalidGrowthTime => "growth_time_hours",
            ValidationError::MissingWeatherBonus(_) | ValidationError::InvalidWeatherBonus(_) => {
                "weather_bonus"
            }
            ValidationError::NegativePoints => "points",
            ValidationError::InsufficientPoints { .. } => "points",
        }
    }
}

/// Validate a plant type row before it is used for planting
pub fn validate_plant_type(plant: &PlantType) -> Result<(), ValidationError> {
    if plant.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if !(plant.growth_time_hours.is_finite() && plant.growth_time_hours > 0.0) {
        return Err(ValidationError::InvalidGrowthTime);
    }
    for category in [
        WeatherCategory::Sunny,
        WeatherCategory::Cloudy,
        WeatherCategory::Rainy,
    ] {
        match plant.weather_bonus.get(category) {
            None => return Err(ValidationError::MissingWeatherBonus(category)),
            Some(m) if !(m.is_finite() && m > 0.0) => {
                return Err(ValidationError::InvalidWeatherBonus(category))
            }
            Some(_) => {}
        }
    }
    if plant.harvest_points < 0 || plant.planting_cost < 0 {
        return Err(ValidationError::NegativePoints);
    }
    Ok(())
}

/// Validate a raw slot index from a request
pub fn validate_slot_index(index: i32) -> Result<GardenSlot, ValidationError> {
    GardenSlot::try_from(index)
}

/// Check that a planter can pay for a seed
pub fn validate_planting(available_points: i32, cost: i32) -> Result<(), ValidationError> {
    if cost < 0 {
        return Err(ValidationError::NegativePoints);
    }
    if available_points < cost {
        return Err(ValidationError::InsufficientPoints {
            cost,
            available: available_points,
        });
    }
    Ok(())
}
