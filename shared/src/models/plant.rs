//! Plant type reference data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WeatherCategory;

/// A kind of seed users can plant. Seeded and administered outside the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlantType {
    pub id: Uuid,
    pub name: String,
    /// Real-time hours to maturity under a 1.0 multiplier
    pub growth_time_hours: f64,
    pub weather_bonus: WeatherBonus,
    pub harvest_points: i32,
    pub planting_cost: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Growth speed multipliers per weather category.
///
/// Stored as a JSON object (`{"sunny": 1.5, "cloudy": 1.0, "rainy": 2.0}`).
/// Keys may be missing in malformed rows; see [`WeatherBonus::multiplier`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherBonus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunny: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rainy: Option<f64>,
}

impl WeatherBonus {
    pub fn new(sunny: f64, cloudy: f64, rainy: f64) -> Self {
        Self {
            sunny: Some(sunny),
            cloudy: Some(cloudy),
            rainy: Some(rainy),
        }
    }

    /// Same multiplier for every category
    pub fn uniform(multiplier: f64) -> Self {
        Self::new(multiplier, multiplier, multiplier)
    }

    pub fn get(&self, category: WeatherCategory) -> Option<f64> {
        match category {
            WeatherCategory::Sunny => self.sunny,
            WeatherCategory::Cloudy => self.cloudy,
            WeatherCategory::Rainy => self.rainy,
        }
    }

    /// Multiplier for `category`, or NaN when the table has no entry.
    ///
    /// NaN is returned on purpose so a corrupt row shows up as a broken
    /// number downstream instead of a plausible-looking default.
    pub fn multiplier(&self, category: WeatherCategory) -> f64 {
        self.get(category).unwrap_or(f64::NAN)
    }
}
