//! Garden service: live growth views, planting and harvesting

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{
    format_time_elapsed, format_time_remaining, validate_plant_type, validate_planting, GardenSlot,
    GrowthCalculator, GrowthProgress, GrowthStage, PlantType, PlantedInstance, WeatherCategory,
    WeatherReading, DEFAULT_WEATHER_CONDITION,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::plant::{PlantRow, PlantService};
use super::weather::WeatherService;
use crate::error::{AppError, AppResult};

/// Garden service for planting, growth views and harvests
#[derive(Clone)]
pub struct GardenService {
    db: PgPool,
    calculator: GrowthCalculator,
}

/// Database row for a planted seed
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PlantedRow {
    pub id: Uuid,
    pub garden_owner_id: Uuid,
    pub planter_id: Uuid,
    pub plant_id: Uuid,
    pub planted_at: DateTime<Utc>,
    pub current_stage: i32,
    pub is_mature: bool,
    pub harvested_at: Option<DateTime<Utc>>,
    pub harvester_id: Option<Uuid>,
    pub slot: i32,
}

impl TryFrom<PlantedRow> for PlantedInstance {
    type Error = shared::ValidationError;

    fn try_from(row: PlantedRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            garden_owner_id: row.garden_owner_id,
            planter_id: row.planter_id,
            plant_id: row.plant_id,
            planted_at: row.planted_at,
            current_stage: GrowthStage::try_from(row.current_stage)?,
            is_mature: row.is_mature,
            harvested_at: row.harvested_at,
            harvester_id: row.harvester_id,
            slot: GardenSlot::try_from(row.slot)?,
        })
    }
}

/// Locks the garden owner and the planter in id order, so two plantings
/// across each other's gardens cannot deadlock.
const LOCK_PROFILES_SQL: &str =
    "SELECT id, points FROM profiles WHERE id = ANY($1) ORDER BY id FOR UPDATE";

pub(crate) const PLANTED_COLUMNS: &str = "id, garden_owner_id, planter_id, plant_id, planted_at, \
     current_stage, is_mature, harvested_at, harvester_id, slot";

/// Weather shown above a garden
#[derive(Debug, Clone, Serialize)]
pub struct WeatherSummary {
    pub condition: String,
    pub category: WeatherCategory,
    pub display_name: &'static str,
    pub icon: &'static str,
    pub temperature_celsius: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl From<&WeatherReading> for WeatherSummary {
    fn from(reading: &WeatherReading) -> Self {
        let display = reading.display();
        Self {
            condition: reading.condition.clone(),
            category: display.category,
            display_name: display.display_name,
            icon: display.icon,
            temperature_celsius: reading.temperature_celsius,
            fetched_at: reading.fetched_at,
        }
    }
}

/// Live growth of one planted seed
#[derive(Debug, Clone, Serialize)]
pub struct GrowthView {
    pub plant_name: String,
    pub image_url: Option<String>,
    pub harvest_points: i32,
    /// Rounded; null when the plant's bonus table is broken
    pub progress_percent: f64,
    pub hours_remaining: f64,
    pub time_remaining: String,
    pub time_elapsed: String,
}

/// One of the three garden slots
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub slot: GardenSlot,
    pub stage: GrowthStage,
    pub planted: Option<PlantedInstance>,
    pub growth: Option<GrowthView>,
}

/// A user's garden as the client renders it
#[derive(Debug, Clone, Serialize)]
pub struct GardenView {
    pub owner_id: Uuid,
    pub weather: Option<WeatherSummary>,
    pub slots: Vec<SlotView>,
}

/// Result of a successful harvest
#[derive(Debug, Clone, Serialize)]
pub struct HarvestOutcome {
    pub planted: PlantedInstance,
    pub points_awarded: i32,
    pub points_balance: i32,
}

/// Raw condition used when a garden owner has no stored weather
pub fn weather_condition_or_default(weather: Option<&WeatherReading>) -> &str {
    weather
        .map(|w| w.condition.as_str())
        .unwrap_or(DEFAULT_WEATHER_CONDITION.raw)
}

/// Assemble the slot-by-slot view of a garden at `now`
pub fn build_garden_view(
    owner_id: Uuid,
    instances: Vec<PlantedInstance>,
    plants: &HashMap<Uuid, PlantType>,
    weather: Option<&WeatherReading>,
    calculator: &GrowthCalculator,
    now: DateTime<Utc>,
) -> GardenView {
    let condition = weather_condition_or_default(weather);
    let mut by_slot: HashMap<GardenSlot, PlantedInstance> = HashMap::new();
    for instance in instances.into_iter().filter(|i| !i.is_harvested()) {
        // The earliest seed in a slot wins
        if let Some(kept) = by_slot.get(&instance.slot) {
            tracing::warn!(
                "Garden {} has seeds {} and {} in slot {}",
                owner_id,
                kept.id,
                instance.id,
                instance.slot.index()
            );
            if kept.planted_at <= instance.planted_at {
                continue;
            }
        }
        by_slot.insert(instance.slot, instance);
    }

    let slots = GardenSlot::all()
        .map(|slot| match by_slot.remove(&slot) {
            None => SlotView {
                slot,
                stage: GrowthStage::EmptyPot,
                planted: None,
                growth: None,
            },
            Some(instance) => match plants.get(&instance.plant_id) {
                Some(plant) => {
                    let timeline =
                        calculator.timeline(instance.planted_at, plant, condition, now);
                    let progress = timeline.progress();
                    let hours_remaining = timeline.hours_remaining();
                    SlotView {
                        slot,
                        stage: progress.stage,
                        growth: Some(GrowthView {
                            plant_name: plant.name.clone(),
                            image_url: plant.image_url.clone(),
                            harvest_points: plant.harvest_points,
                            progress_percent: progress.rounded_percent(),
                            hours_remaining,
                            time_remaining: format_time_remaining(hours_remaining),
                            time_elapsed: format_time_elapsed(timeline.hours_elapsed),
                        }),
                        planted: Some(instance),
                    }
                }
                None => {
                    tracing::warn!(
                        "Planted seed {} refers to unknown plant {}",
                        instance.id,
                        instance.plant_id
                    );
                    SlotView {
                        slot,
                        stage: instance.current_stage,
                        planted: Some(instance),
                        growth: None,
                    }
                }
            },
        })
        .collect();

    GardenView {
        owner_id,
        weather: weather.map(WeatherSummary::from),
        slots,
    }
}

/// Planter's balance from the locked profile rows.
///
/// The owner missing means the garden does not exist.
pub fn planter_balance(
    locked: &[(Uuid, i32)],
    owner_id: Uuid,
    planter_id: Uuid,
) -> AppResult<i32> {
    if !locked.iter().any(|(id, _)| *id == owner_id) {
        return Err(AppError::NotFound("Garden".to_string()));
    }
    locked
        .iter()
        .find(|(id, _)| *id == planter_id)
        .map(|(_, points)| *points)
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))
}

/// Check whether a seed can go into a slot
pub fn check_planting(
    slot_occupied: bool,
    slot: GardenSlot,
    available_points: i32,
    cost: i32,
) -> AppResult<()> {
    if slot_occupied {
        return Err(AppError::SlotOccupied(slot.index()));
    }
    validate_planting(available_points, cost)?;
    Ok(())
}

/// Check whether `harvester_id` may harvest `instance` given its live progress
pub fn check_harvest(
    instance: &PlantedInstance,
    harvester_id: Uuid,
    progress: &GrowthProgress,
) -> AppResult<()> {
    if instance.is_harvested() {
        return Err(AppError::AlreadyHarvested);
    }
    if harvester_id != instance.garden_owner_id && harvester_id != instance.planter_id {
        return Err(AppError::Forbidden(
            "Only the garden owner or the planter can harvest this plant".to_string(),
        ));
    }
    if !progress.is_mature() {
        return Err(AppError::NotMature);
    }
    Ok(())
}

impl GardenService {
    /// Create a new GardenService instance
    pub fn new(db: PgPool, calculator: GrowthCalculator) -> Self {
        Self { db, calculator }
    }

    /// Unharvested seeds in a garden
    pub async fn get_active_plants(&self, owner_id: Uuid) -> AppResult<Vec<PlantedInstance>> {
        let rows = sqlx::query_as::<_, PlantedRow>(&format!(
            r#"
            SELECT {PLANTED_COLUMNS}
            FROM planted_plants
            WHERE garden_owner_id = $1 AND harvested_at IS NULL
            ORDER BY slot
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| PlantedInstance::try_from(row).map_err(AppError::from))
            .collect()
    }

    /// Garden view for `owner_id` under the given weather
    pub async fn get_garden(
        &self,
        owner_id: Uuid,
        weather: Option<&WeatherReading>,
    ) -> AppResult<GardenView> {
        let instances = self.get_active_plants(owner_id).await?;
        let plant_ids: Vec<Uuid> = instances.iter().map(|i| i.plant_id).collect();
        let plants = PlantService::new(self.db.clone())
            .get_plants_by_ids(&plant_ids)
            .await?;

        Ok(build_garden_view(
            owner_id,
            instances,
            &plants,
            weather,
            &self.calculator,
            Utc::now(),
        ))
    }

    /// Spend the planter's points to put a seed into an empty slot
    pub async fn plant_seed(
        &self,
        planter_id: Uuid,
        owner_id: Uuid,
        plant_id: Uuid,
        slot: GardenSlot,
    ) -> AppResult<PlantedInstance> {
        let mut tx = self.db.begin().await?;

        // The owner's row serializes every planting into this garden
        let locked = sqlx::query_as::<_, (Uuid, i32)>(LOCK_PROFILES_SQL)
            .bind(vec![owner_id, planter_id])
            .fetch_all(&mut *tx)
            .await?;
        let points = planter_balance(&locked, owner_id, planter_id)?;

        let plant: PlantType = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, name, growth_time_hours, weather_bonus, harvest_points,
                   planting_cost, image_url, created_at
            FROM plants
            WHERE id = $1
            "#,
        )
        .bind(plant_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Plant".to_string()))?
        .into();
        validate_plant_type(&plant)?;

        let occupied = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM planted_plants
                WHERE garden_owner_id = $1 AND slot = $2 AND harvested_at IS NULL
            )
            "#,
        )
        .bind(owner_id)
        .bind(i32::from(slot.index()))
        .fetch_one(&mut *tx)
        .await?;

        check_planting(occupied, slot, points, plant.planting_cost)?;

        sqlx::query("UPDATE profiles SET points = points - $2 WHERE id = $1")
            .bind(planter_id)
            .bind(plant.planting_cost)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, PlantedRow>(&format!(
            r#"
            INSERT INTO planted_plants (
                garden_owner_id, planter_id, plant_id, planted_at,
                current_stage, is_mature, slot
            )
            VALUES ($1, $2, $3, $4, $5, false, $6)
            RETURNING {PLANTED_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(planter_id)
        .bind(plant.id)
        .bind(Utc::now())
        .bind(i32::from(GrowthStage::Dirt.as_u8()))
        .bind(i32::from(slot.index()))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            "User {} planted {} in slot {} of garden {}",
            planter_id,
            plant.name,
            slot.index(),
            owner_id
        );

        Ok(PlantedInstance::try_from(row)?)
    }

    /// Harvest a mature plant and credit its points to the harvester
    pub async fn harvest(&self, harvester_id: Uuid, planted_id: Uuid) -> AppResult<HarvestOutcome> {
        let mut tx = self.db.begin().await?;

        let instance: PlantedInstance = sqlx::query_as::<_, PlantedRow>(&format!(
            "SELECT {PLANTED_COLUMNS} FROM planted_plants WHERE id = $1 FOR UPDATE"
        ))
        .bind(planted_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Planted seed".to_string()))?
        .try_into()?;

        let plant = PlantService::new(self.db.clone())
            .get_plant(instance.plant_id)
            .await?;
        let weather = WeatherService::new(self.db.clone())
            .latest_for_user(instance.garden_owner_id)
            .await?;

        let progress = self.calculator.progress_at(
            instance.planted_at,
            &plant,
            weather_condition_or_default(weather.as_ref()),
            Utc::now(),
        );
        check_harvest(&instance, harvester_id, &progress)?;

        let row = sqlx::query_as::<_, PlantedRow>(&format!(
            r#"
            UPDATE planted_plants
            SET harvested_at = $2, harvester_id = $3, current_stage = $4, is_mature = true
            WHERE id = $1
            RETURNING {PLANTED_COLUMNS}
            "#
        ))
        .bind(planted_id)
        .bind(Utc::now())
        .bind(harvester_id)
        .bind(i32::from(GrowthStage::Mature.as_u8()))
        .fetch_one(&mut *tx)
        .await?;

        let points_balance = sqlx::query_scalar::<_, i32>(
            "UPDATE profiles SET points = points + $2 WHERE id = $1 RETURNING points",
        )
        .bind(harvester_id)
        .bind(plant.harvest_points)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile".to_string()))?;

        tx.commit().await?;

        tracing::info!(
            "User {} harvested {} for {} points",
            harvester_id,
            plant.name,
            plant.harvest_points
        );

        Ok(HarvestOutcome {
            planted: PlantedInstance::try_from(row)?,
            points_awarded: plant.harvest_points,
            points_balance,
        })
    }
}
