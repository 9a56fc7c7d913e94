//! Plant catalog service (read-only reference data)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{PlantType, WeatherBonus};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Plant service for reading the seed catalog
#[derive(Clone)]
pub struct PlantService {
    db: PgPool,
}

/// Database row for a plant type
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PlantRow {
    pub id: Uuid,
    pub name: String,
    pub growth_time_hours: f64,
    pub weather_bonus: Json<WeatherBonus>,
    pub harvest_points: i32,
    pub planting_cost: i32,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<PlantRow> for PlantType {
    fn from(row: PlantRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            growth_time_hours: row.growth_time_hours,
            weather_bonus: row.weather_bonus.0,
            harvest_points: row.harvest_points,
            planting_cost: row.planting_cost,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

impl PlantService {
    /// Create a new PlantService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List every plant type, cheapest first
    pub async fn list_plants(&self) -> AppResult<Vec<PlantType>> {
        let rows = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, growth_time_hours, weather_bonus, harvest_points,
                   planting_cost, image_url, created_at
            FROM plants
            ORDER BY planting_cost, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PlantType::from).collect())
    }

    /// Get a plant type by ID
    pub async fn get_plant(&self, plant_id: Uuid) -> AppResult<PlantType> {
        let row = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, growth_time_hours, weather_bonus, harvest_points,
                   planting_cost, image_url, created_at
            FROM plants
            WHERE id = $1
            "#,
        )
        .bind(plant_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant".to_string()))?;

        Ok(row.into())
    }

    /// Load the given plant types, keyed by ID. Unknown IDs are left out.
    pub async fn get_plants_by_ids(&self, plant_ids: &[Uuid]) -> AppResult<HashMap<Uuid, PlantType>> {
        if plant_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, growth_time_hours, weather_bonus, harvest_points,
                   planting_cost, image_url, created_at
            FROM plants
            WHERE id = ANY($1)
            "#,
        )
        .bind(plant_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, PlantType::from(row)))
            .collect())
    }
}
