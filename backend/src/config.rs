//! Configuration management for the Fair Weather Friend backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FWF_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::GrowthSettings;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Access token verification
    pub jwt: JwtConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Plant growth tuning
    pub growth: GrowthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret the auth provider signs access tokens with
    pub secret: String,

    /// Expected `aud` claim
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key. Fetching is disabled when empty.
    pub api_key: String,

    /// How long a stored reading is served before refetching
    pub cache_ttl_minutes: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GrowthConfig {
    /// Overrides every plant's growth time (hours) when set
    pub growth_hours_override: Option<f64>,

    /// Seconds between growth refresh runs
    pub refresh_interval_secs: u64,
}

impl GrowthConfig {
    pub fn settings(&self) -> GrowthSettings {
        GrowthSettings {
            growth_hours_override: self.growth_hours_override,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }
}

impl WeatherConfig {
    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_ttl_minutes)
    }

    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("FWF_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FWF_ prefix)
            .add_source(
                Environment::with_prefix("FWF")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Builder preloaded with every default
    pub fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.audience", "authenticated")?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.api_key", "")?
            .set_default("weather.cache_ttl_minutes", 30)?
            .set_default("growth.refresh_interval_secs", 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_with(overrides: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let mut builder = Config::builder("test")?
            .set_override("database.url", "postgres://localhost/fwf_test")?
            .set_override("jwt.secret", "test-secret")?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.environment, "test");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jwt.audience, "authenticated");
        assert_eq!(config.weather.cache_ttl_minutes, 30);
        assert!(!config.weather.is_enabled());
        assert_eq!(config.growth.growth_hours_override, None);
        assert_eq!(config.growth.settings(), GrowthSettings::default());
        assert_eq!(config.growth.refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_growth_override() {
        let config = load_with(&[("growth.growth_hours_override", "0.083")]).unwrap();
        assert_eq!(config.growth.growth_hours_override, Some(0.083));
        assert_eq!(config.growth.settings(), GrowthSettings::with_override(0.083));
    }

    #[test]
    fn test_refresh_interval_never_zero() {
        let config = load_with(&[("growth.refresh_interval_secs", "0")]).unwrap();
        assert_eq!(config.growth.refresh_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_missing_database_url_fails() {
        let result: Result<Config, ConfigError> = Config::builder("test")
            .and_then(|b| b.set_override("jwt.secret", "s"))
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize());
        assert!(result.is_err());
    }
}
