//! Weather data models and the condition normalization table

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::GpsCoordinates;

/// Normalized weather category used by the growth rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
}

impl WeatherCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rainy => "rainy",
        }
    }
}

impl std::fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the condition table
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WeatherCondition {
    /// Raw provider condition, matched case-insensitively
    pub raw: &'static str,
    pub category: WeatherCategory,
    pub display_name: &'static str,
    /// Icon key understood by the client icon set
    pub icon: &'static str,
}

const fn condition(
    raw: &'static str,
    category: WeatherCategory,
    display_name: &'static str,
    icon: &'static str,
) -> WeatherCondition {
    WeatherCondition {
        raw,
        category,
        display_name,
        icon,
    }
}

/// Every raw condition the app knows about.
///
/// Category names are listed too, so normalizing an already-normalized
/// value is a no-op.
pub static WEATHER_CONDITIONS: &[WeatherCondition] = &[
    condition("sunny", WeatherCategory::Sunny, "Sunny", "sun"),
    condition("cloudy", WeatherCategory::Cloudy, "Cloudy", "cloud"),
    condition("rainy", WeatherCategory::Rainy, "Rainy", "cloud-rain"),
    condition("clear", WeatherCategory::Sunny, "Sunny", "sun"),
    condition("clouds", WeatherCategory::Cloudy, "Cloudy", "cloud"),
    condition("mist", WeatherCategory::Cloudy, "Misty", "cloud-fog"),
    condition("fog", WeatherCategory::Cloudy, "Foggy", "cloud-fog"),
    condition("haze", WeatherCategory::Cloudy, "Hazy", "cloud-fog"),
    condition("smoke", WeatherCategory::Cloudy, "Smoky", "cloud-fog"),
    condition("dust", WeatherCategory::Cloudy, "Dusty", "cloud-fog"),
    condition("rain", WeatherCategory::Rainy, "Rainy", "cloud-rain"),
    condition("drizzle", WeatherCategory::Rainy, "Drizzle", "cloud-drizzle"),
    condition("thunderstorm", WeatherCategory::Rainy, "Stormy", "cloud-lightning"),
    condition("snow", WeatherCategory::Rainy, "Snowy", "cloud-snow"),
];

/// Returned for any raw condition missing from [`WEATHER_CONDITIONS`]
pub static DEFAULT_WEATHER_CONDITION: WeatherCondition =
    condition("clear", WeatherCategory::Sunny, "Sunny", "sun");

/// Look up a raw provider condition. Unknown input falls back to sunny.
pub fn lookup_weather(raw: &str) -> &'static WeatherCondition {
    let raw = raw.trim();
    WEATHER_CONDITIONS
        .iter()
        .find(|c| c.raw.eq_ignore_ascii_case(raw))
        .unwrap_or(&DEFAULT_WEATHER_CONDITION)
}

/// Normalize a raw provider condition onto a [`WeatherCategory`]
pub fn normalize_weather(raw: &str) -> WeatherCategory {
    lookup_weather(raw).category
}

/// Last-known weather for a user, as cached in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReading {
    pub user_id: Uuid,
    pub location: GpsCoordinates,
    /// Raw provider condition, e.g. "Clouds"
    pub condition: String,
    pub description: Option<String>,
    pub temperature_celsius: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherReading {
    pub fn category(&self) -> WeatherCategory {
        normalize_weather(&self.condition)
    }

    pub fn display(&self) -> &'static WeatherCondition {
        lookup_weather(&self.condition)
    }

    /// Whether the reading is older than `ttl` at `now`
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.fetched_at > ttl
    }
}
