//! Weather service for storing and retrieving each user's last-known weather

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use shared::{GpsCoordinates, WeatherReading};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::profile::ProfileService;
use crate::error::{AppError, AppResult};
use crate::external::weather::{CurrentWeather, WeatherClient};

/// Weather service for managing cached weather readings
#[derive(Clone)]
pub struct WeatherService {
    db: PgPool,
    weather_client: Option<WeatherClient>,
    cache_ttl: Duration,
}

/// Database row for a cached reading
#[derive(Debug, Clone, FromRow)]
struct WeatherRow {
    pub user_id: Uuid,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub condition: String,
    pub description: Option<String>,
    pub temperature_celsius: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl From<WeatherRow> for WeatherReading {
    fn from(row: WeatherRow) -> Self {
        Self {
            user_id: row.user_id,
            location: GpsCoordinates::new(row.latitude, row.longitude),
            condition: row.condition,
            description: row.description,
            temperature_celsius: row.temperature_celsius,
            fetched_at: row.fetched_at,
        }
    }
}

/// Whether a cached reading should be replaced by a fresh fetch
pub fn needs_refresh(cached: Option<&WeatherReading>, now: DateTime<Utc>, ttl: Duration) -> bool {
    cached.map_or(true, |reading| reading.is_stale(now, ttl))
}

impl WeatherService {
    /// Create a new WeatherService instance without provider access
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            weather_client: None,
            cache_ttl: Duration::minutes(30),
        }
    }

    /// Create a new WeatherService with weather API client
    pub fn with_client(db: PgPool, client: WeatherClient, cache_ttl: Duration) -> Self {
        Self {
            db,
            weather_client: Some(client),
            cache_ttl,
        }
    }

    /// Build from configuration; fetching stays off without an API key
    pub fn from_config(db: PgPool, config: &crate::config::WeatherConfig) -> Self {
        if config.is_enabled() {
            let client =
                WeatherClient::with_base_url(config.api_key.clone(), config.api_endpoint.clone());
            Self::with_client(db, client, config.cache_ttl())
        } else {
            Self {
                cache_ttl: config.cache_ttl(),
                ..Self::new(db)
            }
        }
    }

    /// Last stored reading for a user
    pub async fn latest_for_user(&self, user_id: Uuid) -> AppResult<Option<WeatherReading>> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            SELECT user_id, latitude, longitude, condition, description,
                   temperature_celsius, fetched_at
            FROM weather_data
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(WeatherReading::from))
    }

    /// Last stored readings for many users, keyed by user ID
    pub async fn latest_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> AppResult<HashMap<Uuid, WeatherReading>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, WeatherRow>(
            r#"
            SELECT user_id, latitude, longitude, condition, description,
                   temperature_celsius, fetched_at
            FROM weather_data
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.user_id, WeatherReading::from(row)))
            .collect())
    }

    /// Store a provider reading as the user's latest weather
    pub async fn store_reading(
        &self,
        user_id: Uuid,
        location: GpsCoordinates,
        weather: &CurrentWeather,
    ) -> AppResult<WeatherReading> {
        let row = sqlx::query_as::<_, WeatherRow>(
            r#"
            INSERT INTO weather_data (
                user_id, latitude, longitude, condition, description,
                temperature_celsius, fetched_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO UPDATE SET
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                condition = EXCLUDED.condition,
                description = EXCLUDED.description,
                temperature_celsius = EXCLUDED.temperature_celsius,
                fetched_at = EXCLUDED.fetched_at
            RETURNING user_id, latitude, longitude, condition, description,
                      temperature_celsius, fetched_at
            "#,
        )
        .bind(user_id)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&weather.weather_condition)
        .bind(&weather.weather_description)
        .bind(weather.temperature_celsius)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Fetch from the provider and store as the user's latest weather
    pub async fn fetch_and_store(
        &self,
        user_id: Uuid,
        location: GpsCoordinates,
    ) -> AppResult<WeatherReading> {
        let client = self
            .weather_client
            .as_ref()
            .ok_or_else(|| AppError::Configuration("Weather API key not configured".to_string()))?;

        let weather = client
            .get_current_weather(location.latitude, location.longitude)
            .await?;

        tracing::info!(
            "Fetched weather for user {}: {} ({}°C)",
            user_id,
            weather.weather_condition,
            weather.temperature_celsius
        );

        self.store_reading(user_id, location, &weather).await
    }

    /// Latest weather for a user, refetched when the cache is stale.
    ///
    /// A failed fetch falls back to the stale reading when there is one.
    pub async fn get_or_refresh(&self, user_id: Uuid) -> AppResult<Option<WeatherReading>> {
        let cached = self.latest_for_user(user_id).await?;

        if self.weather_client.is_none() || !needs_refresh(cached.as_ref(), Utc::now(), self.cache_ttl) {
            return Ok(cached);
        }

        let location = match ProfileService::new(self.db.clone())
            .get_profile(user_id)
            .await?
            .location
        {
            Some(location) => location,
            None => return Ok(cached),
        };

        match self.fetch_and_store(user_id, location).await {
            Ok(reading) => Ok(Some(reading)),
            Err(e) if cached.is_some() => {
                tracing::warn!("Weather refresh failed for user {}, serving cached: {}", user_id, e);
                Ok(cached)
            }
            Err(e) => {
                tracing::warn!("Weather fetch failed for user {}: {}", user_id, e);
                Err(AppError::WeatherServiceUnavailable)
            }
        }
    }

    /// Save a new location for the user and fetch its weather right away
    pub async fn update_location(
        &self,
        user_id: Uuid,
        location: GpsCoordinates,
    ) -> AppResult<WeatherReading> {
        ProfileService::new(self.db.clone())
            .set_location(user_id, location)
            .await?;

        self.fetch_and_store(user_id, location).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(fetched_at: DateTime<Utc>) -> WeatherReading {
        WeatherReading {
            user_id: Uuid::new_v4(),
            location: GpsCoordinates::new(Decimal::new(4071, 2), Decimal::new(-7401, 2)),
            condition: "Clouds".to_string(),
            description: None,
            temperature_celsius: Decimal::new(18, 0),
            fetched_at,
        }
    }

    #[test]
    fn test_needs_refresh_without_cache() {
        assert!(needs_refresh(None, Utc::now(), Duration::minutes(30)));
    }

    #[test]
    fn test_needs_refresh_respects_ttl() {
        let now = Utc::now();
        let fresh = reading(now - Duration::minutes(5));
        let stale = reading(now - Duration::minutes(45));

        assert!(!needs_refresh(Some(&fresh), now, Duration::minutes(30)));
        assert!(needs_refresh(Some(&stale), now, Duration::minutes(30)));
    }
}
