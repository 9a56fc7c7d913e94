//! Weather API client for fetching weather data
//!
//! Integrates with the OpenWeatherMap current conditions API

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// Current weather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature_celsius: Decimal,
    /// Provider condition group, e.g. "Clouds"
    pub weather_condition: String,
    pub weather_description: String,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    weather: Vec<OWMWeather>,
    main: OWMMain,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
}

impl WeatherClient {
    /// Create a WeatherClient for the configured endpoint
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current_weather(
        &self,
        latitude: Decimal,
        longitude: Decimal,
    ) -> AppResult<CurrentWeather> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, latitude, longitude, self.api_key
        );

        tracing::debug!("Fetching current weather for {}, {}", latitude, longitude);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OWMCurrentResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse weather response: {}", e))
        })?;

        Ok(convert_current_response(data))
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> CurrentWeather {
    let weather = data.weather.first();

    CurrentWeather {
        temperature_celsius: Decimal::from_f64_retain(data.main.temp)
            .unwrap_or_default()
            .round_dp(1),
        weather_condition: weather.map(|w| w.main.clone()).unwrap_or_default(),
        weather_description: weather.map(|w| w.description.clone()).unwrap_or_default(),
    }
}
