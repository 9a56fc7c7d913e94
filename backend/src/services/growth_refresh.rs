//! Periodic job that keeps cached growth stages in step with the calculator

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{GrowthCalculator, GrowthStage, PlantType, PlantedInstance, WeatherReading};
use sqlx::PgPool;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::garden::{weather_condition_or_default, PlantedRow, PLANTED_COLUMNS};
use super::plant::PlantService;
use super::weather::WeatherService;
use crate::error::AppResult;

/// Only touches rows that are still growing, so a harvest that commits
/// between the read and the write is never overwritten.
const APPLY_STAGE_UPDATE_SQL: &str = r#"
    UPDATE planted_plants
    SET current_stage = $2, is_mature = $3
    WHERE id = $1 AND harvested_at IS NULL AND is_mature = false
"#;

/// A stage change to persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageUpdate {
    pub planted_id: Uuid,
    pub stage: GrowthStage,
    pub is_mature: bool,
}

/// What one refresh pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RefreshSummary {
    pub checked: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Work out which cached stages are out of date.
///
/// Seeds whose plant type is missing, or whose progress is NaN because of a
/// broken bonus table, are skipped rather than written with a made-up stage.
pub fn plan_stage_updates(
    instances: &[PlantedInstance],
    plants: &HashMap<Uuid, PlantType>,
    weather: &HashMap<Uuid, WeatherReading>,
    calculator: &GrowthCalculator,
    now: DateTime<Utc>,
) -> (Vec<StageUpdate>, usize) {
    let mut updates = Vec::new();
    let mut skipped = 0;

    for instance in instances.iter().filter(|i| !i.is_harvested()) {
        let Some(plant) = plants.get(&instance.plant_id) else {
            tracing::warn!(
                "Skipping seed {}: unknown plant {}",
                instance.id,
                instance.plant_id
            );
            skipped += 1;
            continue;
        };

        let condition = weather_condition_or_default(weather.get(&instance.garden_owner_id));
        let progress = calculator.progress_at(instance.planted_at, plant, condition, now);

        if progress.progress_percent.is_nan() {
            tracing::warn!(
                "Skipping seed {}: plant {} has no weather bonus for {}",
                instance.id,
                plant.name,
                condition
            );
            skipped += 1;
            continue;
        }

        if instance.needs_update(progress.stage) {
            tracing::debug!(
                "Seed {} moves from stage {} to {}",
                instance.id,
                instance.current_stage,
                progress.stage
            );
            updates.push(StageUpdate {
                planted_id: instance.id,
                stage: progress.stage,
                is_mature: progress.is_mature(),
            });
        }
    }

    (updates, skipped)
}

/// Refreshes `current_stage` / `is_mature` for every growing seed
#[derive(Clone)]
pub struct GrowthRefreshJob {
    db: PgPool,
    calculator: GrowthCalculator,
    interval: Duration,
}

impl GrowthRefreshJob {
    pub fn new(db: PgPool, calculator: GrowthCalculator, interval: Duration) -> Self {
        Self {
            db,
            calculator,
            interval,
        }
    }

    /// Run forever on the configured interval
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!("Growth refresh running every {:?}", self.interval);

            loop {
                ticker.tick().await;
                match self.run_once(Utc::now()).await {
                    Ok(summary) if summary.updated > 0 || summary.skipped > 0 => {
                        tracing::info!(
                            "Growth refresh: checked {}, updated {}, skipped {}",
                            summary.checked,
                            summary.updated,
                            summary.skipped
                        );
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!("Growth refresh failed: {}", e),
                }
            }
        })
    }

    /// One pass over all growing seeds
    pub async fn run_once(&self, now: DateTime<Utc>) -> AppResult<RefreshSummary> {
        let rows = sqlx::query_as::<_, PlantedRow>(&format!(
            r#"
            SELECT {PLANTED_COLUMNS}
            FROM planted_plants
            WHERE harvested_at IS NULL AND is_mature = false
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        let mut skipped = 0;
        let instances: Vec<PlantedInstance> = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match PlantedInstance::try_from(row) {
                    Ok(instance) => Some(instance),
                    Err(e) => {
                        tracing::warn!("Skipping corrupt seed {}: {}", id, e);
                        skipped += 1;
                        None
                    }
                }
            })
            .collect();

        if instances.is_empty() {
            return Ok(RefreshSummary {
                skipped,
                ..Default::default()
            });
        }

        let mut plant_ids: Vec<Uuid> = instances.iter().map(|i| i.plant_id).collect();
        plant_ids.sort_unstable();
        plant_ids.dedup();
        let mut owner_ids: Vec<Uuid> = instances.iter().map(|i| i.garden_owner_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let plants = PlantService::new(self.db.clone())
            .get_plants_by_ids(&plant_ids)
            .await?;
        let weather = WeatherService::new(self.db.clone())
            .latest_for_users(&owner_ids)
            .await?;

        let (updates, planning_skipped) =
            plan_stage_updates(&instances, &plants, &weather, &self.calculator, now);

        let mut updated = 0;
        let mut tx = self.db.begin().await?;
        for update in &updates {
            let result = sqlx::query(APPLY_STAGE_UPDATE_SQL)
                .bind(update.planted_id)
                .bind(i32::from(update.stage.as_u8()))
                .bind(update.is_mature)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                tracing::debug!("Seed {} was harvested during refresh", update.planted_id);
            }
            updated += result.rows_affected() as usize;
        }
        tx.commit().await?;

        Ok(RefreshSummary {
            checked: instances.len(),
            updated,
            skipped: skipped + planning_skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_clause(sql: &str) -> String {
        let start = sql.find("WHERE").unwrap();
        sql[start..].split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_stage_update_skips_finished_rows() {
        assert_eq!(
            where_clause(APPLY_STAGE_UPDATE_SQL),
            "WHERE id = $1 AND harvested_at IS NULL AND is_mature = false"
        );
    }
}
