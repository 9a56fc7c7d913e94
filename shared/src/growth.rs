//! Growth stage and time-to-maturity calculations
//!
//! Both calculators are pure functions of (planting time, plant type, weather,
//! now). They share a single [`GrowthTimeline`] so the "multiply elapsed time"
//! and "divide remaining time" views of the weather bonus stay in step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{normalize_weather, GrowthStage, PlantType, WeatherCategory};

/// Progress percent at which a plant becomes a sprout
pub const SPROUT_THRESHOLD: f64 = 20.0;
/// Progress percent at which a plant becomes adolescent
pub const ADOLESCENT_THRESHOLD: f64 = 40.0;
/// Progress percent at which a plant is mature
pub const MATURE_THRESHOLD: f64 = 100.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Tunables for the growth calculators
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GrowthSettings {
    /// Replaces every plant's own growth time when set.
    /// `None` uses [`PlantType::growth_time_hours`].
    #[serde(default)]
    pub growth_hours_override: Option<f64>,
}

impl GrowthSettings {
    pub fn with_override(hours: f64) -> Self {
        Self {
            growth_hours_override: Some(hours),
        }
    }

    /// Hours a plant needs to mature under a 1.0 multiplier
    pub fn total_growth_hours(&self, plant: &PlantType) -> f64 {
        self.growth_hours_override
            .unwrap_or(plant.growth_time_hours)
    }
}

/// Result of the growth calculator
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GrowthProgress {
    pub stage: GrowthStage,
    /// Unrounded percent complete, capped at 100
    pub progress_percent: f64,
}

impl GrowthProgress {
    /// Percent rounded to the nearest whole number, for display
    pub fn rounded_percent(&self) -> f64 {
        self.progress_percent.round()
    }

    pub fn is_mature(&self) -> bool {
        self.stage.is_mature()
    }
}

/// Elapsed and total hours for one planted seed at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthTimeline {
    /// Real hours since planting; negative if planted in the future
    pub hours_elapsed: f64,
    /// Weather speed-up factor (NaN for a malformed bonus table)
    pub multiplier: f64,
    pub total_growth_hours: f64,
}

impl GrowthTimeline {
    pub fn new(
        planted_at: DateTime<Utc>,
        now: DateTime<Utc>,
        multiplier: f64,
        total_growth_hours: f64,
    ) -> Self {
        Self {
            hours_elapsed: hours_between(planted_at, now),
            multiplier,
            total_growth_hours,
        }
    }

    /// Elapsed hours scaled by the weather multiplier
    pub fn adjusted_hours(&self) -> f64 {
        self.hours_elapsed * self.multiplier
    }

    /// Percent complete, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        let percent = self.adjusted_hours() * 100.0 / self.total_growth_hours;
        // NOTE: only the upper bound is enforced here, so a future planting
        // time gives negative progress, while hours_remaining floors at zero.
        // The mobile client has always behaved this way; keep both as is.
        if percent > MATURE_THRESHOLD {
            MATURE_THRESHOLD
        } else {
            percent
        }
    }

    /// Real hours left until maturity, never below zero
    pub fn hours_remaining(&self) -> f64 {
        let remaining = self.total_growth_hours / self.multiplier - self.hours_elapsed;
        // NaN must survive, so no f64::max here.
        if remaining < 0.0 {
            0.0
        } else {
            remaining
        }
    }

    pub fn progress(&self) -> GrowthProgress {
        let progress_percent = self.progress_percent();
        GrowthProgress {
            stage: stage_for_progress(progress_percent),
            progress_percent,
        }
    }
}

/// Map a progress percent onto a stage. Never returns [`GrowthStage::EmptyPot`].
pub fn stage_for_progress(percent: f64) -> GrowthStage {
    if percent >= MATURE_THRESHOLD {
        GrowthStage::Mature
    } else if percent >= ADOLESCENT_THRESHOLD {
        GrowthStage::Adolescent
    } else if percent >= SPROUT_THRESHOLD {
        GrowthStage::Sprout
    } else {
        GrowthStage::Dirt
    }
}

/// Fractional hours from `from` to `to`
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Growth calculator bound to a set of [`GrowthSettings`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthCalculator {
    settings: GrowthSettings,
}

impl GrowthCalculator {
    pub fn new(settings: GrowthSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GrowthSettings {
        &self.settings
    }

    pub fn timeline(
        &self,
        planted_at: DateTime<Utc>,
        plant: &PlantType,
        weather_raw: &str,
        now: DateTime<Utc>,
    ) -> GrowthTimeline {
        self.timeline_for_category(planted_at, plant, normalize_weather(weather_raw), now)
    }

    pub fn timeline_for_category(
        &self,
        planted_at: DateTime<Utc>,
        plant: &PlantType,
        category: WeatherCategory,
        now: DateTime<Utc>,
    ) -> GrowthTimeline {
        GrowthTimeline::new(
            planted_at,
            now,
            plant.weather_bonus.multiplier(category),
            self.settings.total_growth_hours(plant),
        )
    }

    /// Stage and percent complete at `now`
    pub fn progress_at(
        &self,
        planted_at: DateTime<Utc>,
        plant: &PlantType,
        weather_raw: &str,
        now: DateTime<Utc>,
    ) -> GrowthProgress {
        self.timeline(planted_at, plant, weather_raw, now).progress()
    }

    /// Hours until maturity at `now`
    pub fn time_to_maturity_at(
        &self,
        planted_at: DateTime<Utc>,
        plant: &PlantType,
        weather_raw: &str,
        now: DateTime<Utc>,
    ) -> f64 {
        self.timeline(planted_at, plant, weather_raw, now)
            .hours_remaining()
    }
}

/// Growth stage of a seed right now, using each plant's own growth time
pub fn calculate_growth_stage(
    planted_at: DateTime<Utc>,
    plant: &PlantType,
    weather_raw: &str,
) -> GrowthProgress {
    GrowthCalculator::default().progress_at(planted_at, plant, weather_raw, Utc::now())
}

/// Hours until a seed matures, from right now
pub fn time_to_maturity(planted_at: DateTime<Utc>, plant: &PlantType, weather_raw: &str) -> f64 {
    GrowthCalculator::default().time_to_maturity_at(planted_at, plant, weather_raw, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeatherBonus;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn plant(growth_time_hours: f64, weather_bonus: WeatherBonus) -> PlantType {
        PlantType {
            id: Uuid::new_v4(),
            name: "Sunflower".to_string(),
            growth_time_hours,
            weather_bonus,
            harvest_points: 20,
            planting_cost: 10,
            image_url: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_twenty_percent_is_sprout() {
        let plant = plant(24.0, WeatherBonus::uniform(1.0));
        let calc = GrowthCalculator::default();

        let at = t0() + Duration::minutes(288); // 4.8h
        let progress = calc.progress_at(t0(), &plant, "Clear", at);
        assert_eq!(progress.progress_percent, 20.0);
        assert_eq!(progress.rounded_percent(), 20.0);
        assert_eq!(progress.stage, GrowthStage::Sprout);
    }

    #[test]
    fn test_full_growth_is_mature() {
        let plant = plant(24.0, WeatherBonus::uniform(1.0));
        let calc = GrowthCalculator::default();

        let progress = calc.progress_at(t0(), &plant, "Clear", t0() + Duration::hours(24));
        assert_eq!(progress.progress_percent, 100.0);
        assert_eq!(progress.stage, GrowthStage::Mature);
        assert_eq!(
            calc.time_to_maturity_at(t0(), &plant, "Clear", t0() + Duration::hours(24)),
            0.0
        );
    }

    #[test]
    fn test_sunny_bonus_speeds_growth() {
        let plant = plant(10.0, WeatherBonus::new(2.0, 1.0, 1.0));
        let calc = GrowthCalculator::default();

        let timeline = calc.timeline(t0(), &plant, "Clear", t0() + Duration::hours(3));
        assert_eq!(timeline.adjusted_hours(), 6.0);

        let progress = timeline.progress();
        assert_eq!(progress.progress_percent, 60.0);
        assert_eq!(progress.stage, GrowthStage::Adolescent);
        // 10h / 2.0 = 5h needed, 3h elapsed
        assert_eq!(timeline.hours_remaining(), 2.0);
    }

    #[test]
    fn test_progress_capped_at_hundred() {
        let plant = plant(1.0, WeatherBonus::uniform(3.0));
        let calc = GrowthCalculator::default();

        let progress = calc.progress_at(t0(), &plant, "Rain", t0() + Duration::days(10));
        assert_eq!(progress.progress_percent, 100.0);
        assert!(progress.is_mature());
    }

    #[test]
    fn test_future_planting_gives_negative_progress() {
        let plant = plant(10.0, WeatherBonus::uniform(1.0));
        let calc = GrowthCalculator::default();

        let planted_at = t0() + Duration::hours(2);
        let progress = calc.progress_at(planted_at, &plant, "Clear", t0());
        assert_eq!(progress.progress_percent, -20.0);
        assert_eq!(progress.stage, GrowthStage::Dirt);

        let remaining = calc.time_to_maturity_at(planted_at, &plant, "Clear", t0());
        assert_eq!(remaining, 12.0);
    }

    #[test]
    fn test_time_to_maturity_floors_at_zero() {
        let plant = plant(5.0, WeatherBonus::uniform(1.0));
        let calc = GrowthCalculator::default();

        let remaining = calc.time_to_maturity_at(t0(), &plant, "Clear", t0() + Duration::days(30));
        assert_eq!(remaining, 0.0);
    }

    #[test]
    fn test_missing_bonus_propagates_nan() {
        let bonus = WeatherBonus {
            sunny: Some(1.0),
            cloudy: None,
            rainy: Some(1.0),
        };
        let plant = plant(10.0, bonus);
        let calc = GrowthCalculator::default();
        let now = t0() + Duration::hours(4);

        let progress = calc.progress_at(t0(), &plant, "Clouds", now);
        assert!(progress.progress_percent.is_nan());
        assert!(progress.rounded_percent().is_nan());
        assert_eq!(progress.stage, GrowthStage::Dirt);
        assert!(calc.time_to_maturity_at(t0(), &plant, "Clouds", now).is_nan());
    }

    #[test]
    fn test_unknown_weather_matches_clear() {
        let plant = plant(10.0, WeatherBonus::new(1.5, 0.5, 2.0));
        let calc = GrowthCalculator::default();
        let now = t0() + Duration::minutes(150);

        assert_eq!(
            calc.progress_at(t0(), &plant, "Tornado", now),
            calc.progress_at(t0(), &plant, "Clear", now)
        );
        assert_eq!(
            calc.time_to_maturity_at(t0(), &plant, "Tornado", now),
            calc.time_to_maturity_at(t0(), &plant, "Clear", now)
        );
    }

    #[test]
    fn test_growth_hours_override() {
        let plant = plant(48.0, WeatherBonus::uniform(1.0));
        let calc = GrowthCalculator::new(GrowthSettings::with_override(0.5));

        let progress = calc.progress_at(t0(), &plant, "Clear", t0() + Duration::minutes(15));
        assert_eq!(progress.progress_percent, 50.0);
        assert_eq!(calc.settings().total_growth_hours(&plant), 0.5);
        assert_eq!(GrowthSettings::default().total_growth_hours(&plant), 48.0);
    }

    #[test]
    fn test_stage_thresholds() {
        assert_eq!(stage_for_progress(-5.0), GrowthStage::Dirt);
        assert_eq!(stage_for_progress(0.0), GrowthStage::Dirt);
        assert_eq!(stage_for_progress(19.99), GrowthStage::Dirt);
        assert_eq!(stage_for_progress(20.0), GrowthStage::Sprout);
        assert_eq!(stage_for_progress(39.99), GrowthStage::Sprout);
        assert_eq!(stage_for_progress(40.0), GrowthStage::Adolescent);
        assert_eq!(stage_for_progress(99.99), GrowthStage::Adolescent);
        assert_eq!(stage_for_progress(100.0), GrowthStage::Mature);
    }

    #[test]
    fn test_system_clock_helpers() {
        let plant = plant(24.0, WeatherBonus::uniform(1.0));
        let planted_at = Utc::now() - Duration::hours(48);

        assert!(calculate_growth_stage(planted_at, &plant, "Clear").is_mature());
        assert_eq!(time_to_maturity(planted_at, &plant, "Clear"), 0.0);
    }
}
