//! Garden view and garden rule tests
//!
//! Covers slot assembly, live growth under the owner's weather, and the
//! planting/harvesting checks that guard the database transactions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use fair_weather_friend_backend::error::AppError;
use fair_weather_friend_backend::services::garden::{
    build_garden_view, check_harvest, check_planting, planter_balance,
    weather_condition_or_default,
};
use rust_decimal::Decimal;
use shared::{
    GardenSlot, GpsCoordinates, GrowthCalculator, GrowthProgress, GrowthSettings, GrowthStage,
    PlantType, PlantedInstance, WeatherBonus, WeatherCategory, WeatherReading,
};
use uuid::Uuid;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn plant(hours: f64, bonus: WeatherBonus) -> PlantType {
    PlantType {
        id: Uuid::new_v4(),
        name: "Sunflower".to_string(),
        growth_time_hours: hours,
        weather_bonus: bonus,
        harvest_points: 15,
        planting_cost: 5,
        image_url: None,
        created_at: now() - Duration::days(30),
    }
}

fn planted(owner: Uuid, plant: &PlantType, slot: u8, planted_at: DateTime<Utc>) -> PlantedInstance {
    PlantedInstance {
        id: Uuid::new_v4(),
        garden_owner_id: owner,
        planter_id: owner,
        plant_id: plant.id,
        planted_at,
        current_stage: GrowthStage::Dirt,
        is_mature: false,
        harvested_at: None,
        harvester_id: None,
        slot: GardenSlot::new(slot).unwrap(),
    }
}

fn reading(owner: Uuid, condition: &str) -> WeatherReading {
    WeatherReading {
        user_id: owner,
        location: GpsCoordinates::new(Decimal::new(5150, 2), Decimal::new(-12, 2)),
        condition: condition.to_string(),
        description: None,
        temperature_celsius: Decimal::new(21, 0),
        fetched_at: now() - Duration::minutes(5),
    }
}

fn progress(stage: GrowthStage, percent: f64) -> GrowthProgress {
    GrowthProgress {
        stage,
        progress_percent: percent,
    }
}

#[test]
fn test_empty_garden_has_three_empty_pots() {
    let owner = Uuid::new_v4();
    let view = build_garden_view(
        owner,
        Vec::new(),
        &HashMap::new(),
        None,
        &GrowthCalculator::default(),
        now(),
    );

    assert_eq!(view.owner_id, owner);
    assert!(view.weather.is_none());
    assert_eq!(view.slots.len(), 3);
    for (index, slot) in view.slots.iter().enumerate() {
        assert_eq!(slot.slot.index() as usize, index);
        assert_eq!(slot.stage, GrowthStage::EmptyPot);
        assert!(slot.planted.is_none());
        assert!(slot.growth.is_none());
    }
}

#[test]
fn test_garden_view_uses_owner_weather() {
    let owner = Uuid::new_v4();
    let rainy_lover = plant(10.0, WeatherBonus::new(0.5, 1.0, 2.0));
    let instance = planted(owner, &rainy_lover, 1, now() - Duration::hours(3));
    let plants = HashMap::from([(rainy_lover.id, rainy_lover.clone())]);
    let weather = reading(owner, "Drizzle");

    let view = build_garden_view(
        owner,
        vec![instance],
        &plants,
        Some(&weather),
        &GrowthCalculator::default(),
        now(),
    );

    let summary = view.weather.as_ref().unwrap();
    assert_eq!(summary.category, WeatherCategory::Rainy);

    assert_eq!(view.slots[0].stage, GrowthStage::EmptyPot);
    assert_eq!(view.slots[2].stage, GrowthStage::EmptyPot);

    let slot = &view.slots[1];
    assert_eq!(slot.stage, GrowthStage::Adolescent);
    let growth = slot.growth.as_ref().unwrap();
    assert_eq!(growth.progress_percent, 60.0);
    assert!((growth.hours_remaining - 2.0).abs() < 1e-9);
    assert_eq!(growth.time_remaining, "2 hours");
    assert_eq!(growth.time_elapsed, "3 hours");
}

#[test]
fn test_garden_view_defaults_to_clear_weather() {
    let owner = Uuid::new_v4();
    let sun_lover = plant(10.0, WeatherBonus::new(2.0, 1.0, 0.5));
    let instance = planted(owner, &sun_lover, 0, now() - Duration::hours(5));
    let plants = HashMap::from([(sun_lover.id, sun_lover.clone())]);

    let view = build_garden_view(
        owner,
        vec![instance],
        &plants,
        None,
        &GrowthCalculator::default(),
        now(),
    );

    let slot = &view.slots[0];
    assert_eq!(slot.stage, GrowthStage::Mature);
    let growth = slot.growth.as_ref().unwrap();
    assert_eq!(growth.progress_percent, 100.0);
    assert_eq!(growth.time_remaining, "Ready to harvest!");
}

#[test]
fn test_garden_view_honours_growth_override() {
    let owner = Uuid::new_v4();
    let slow = plant(240.0, WeatherBonus::uniform(1.0));
    let instance = planted(owner, &slow, 2, now() - Duration::hours(1));
    let plants = HashMap::from([(slow.id, slow.clone())]);
    let calculator = GrowthCalculator::new(GrowthSettings::with_override(1.0));

    let view = build_garden_view(owner, vec![instance], &plants, None, &calculator, now());

    assert_eq!(view.slots[2].stage, GrowthStage::Mature);
}

#[test]
fn test_garden_view_unknown_plant_keeps_cached_stage() {
    let owner = Uuid::new_v4();
    let missing = plant(24.0, WeatherBonus::uniform(1.0));
    let mut instance = planted(owner, &missing, 0, now() - Duration::hours(12));
    instance.current_stage = GrowthStage::Sprout;

    let view = build_garden_view(
        owner,
        vec![instance],
        &HashMap::new(),
        None,
        &GrowthCalculator::default(),
        now(),
    );

    assert_eq!(view.slots[0].stage, GrowthStage::Sprout);
    assert!(view.slots[0].planted.is_some());
    assert!(view.slots[0].growth.is_none());
}

#[test]
fn test_garden_view_skips_harvested_seeds() {
    let owner = Uuid::new_v4();
    let done = plant(1.0, WeatherBonus::uniform(1.0));
    let mut instance = planted(owner, &done, 0, now() - Duration::hours(2));
    instance.harvested_at = Some(now() - Duration::minutes(10));
    let plants = HashMap::from([(done.id, done.clone())]);

    let view = build_garden_view(
        owner,
        vec![instance],
        &plants,
        None,
        &GrowthCalculator::default(),
        now(),
    );

    assert_eq!(view.slots[0].stage, GrowthStage::EmptyPot);
}

#[test]
fn test_weather_condition_default() {
    let owner = Uuid::new_v4();
    assert_eq!(weather_condition_or_default(None), "clear");
    let weather = reading(owner, "Thunderstorm");
    assert_eq!(weather_condition_or_default(Some(&weather)), "Thunderstorm");
}

#[test]
fn test_check_planting_rules() {
    let slot = GardenSlot::new(1).unwrap();

    assert!(check_planting(false, slot, 10, 5).is_ok());
    assert!(check_planting(false, slot, 5, 5).is_ok());
    assert!(matches!(
        check_planting(true, slot, 10, 5),
        Err(AppError::SlotOccupied(1))
    ));
    assert!(matches!(
        check_planting(false, slot, 3, 5),
        Err(AppError::InsufficientPoints {
            cost: 5,
            available: 3
        })
    ));
}

#[test]
fn test_check_harvest_rules() {
    let owner = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let seed = plant(24.0, WeatherBonus::uniform(1.0));
    let mut instance = planted(owner, &seed, 0, now() - Duration::hours(30));
    instance.planter_id = friend;

    let mature = progress(GrowthStage::Mature, 100.0);
    let growing = progress(GrowthStage::Adolescent, 80.0);

    assert!(check_harvest(&instance, owner, &mature).is_ok());
    assert!(check_harvest(&instance, friend, &mature).is_ok());
    assert!(matches!(
        check_harvest(&instance, stranger, &mature),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        check_harvest(&instance, owner, &growing),
        Err(AppError::NotMature)
    ));

    instance.harvested_at = Some(now());
    assert!(matches!(
        check_harvest(&instance, owner, &mature),
        Err(AppError::AlreadyHarvested)
    ));
}

#[test]
fn test_planter_balance_from_locked_profiles() {
    let owner = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let locked = vec![(owner, 40), (friend, 12)];

    assert_eq!(planter_balance(&locked, owner, friend).unwrap(), 12);
    assert_eq!(planter_balance(&locked, owner, owner).unwrap(), 40);
    assert_eq!(planter_balance(&[(owner, 7)], owner, owner).unwrap(), 7);
}

#[test]
fn test_planter_balance_missing_rows() {
    let owner = Uuid::new_v4();
    let friend = Uuid::new_v4();

    assert!(matches!(
        planter_balance(&[(friend, 12)], owner, friend),
        Err(AppError::NotFound(ref what)) if what == "Garden"
    ));
    assert!(matches!(
        planter_balance(&[(owner, 40)], owner, friend),
        Err(AppError::NotFound(ref what)) if what == "Profile"
    ));
}

#[test]
fn test_doubled_slot_shows_earliest_seed() {
    let owner = Uuid::new_v4();
    let seed = plant(24.0, WeatherBonus::uniform(1.0));
    let first = planted(owner, &seed, 1, now() - Duration::hours(12));
    let second = planted(owner, &seed, 1, now() - Duration::hours(1));
    let first_id = first.id;
    let plants = HashMap::from([(seed.id, seed.clone())]);

    for order in [vec![first.clone(), second.clone()], vec![second, first]] {
        let view = build_garden_view(
            owner,
            order,
            &plants,
            None,
            &GrowthCalculator::default(),
            now(),
        );
        assert_eq!(view.slots[1].planted.as_ref().unwrap().id, first_id);
        assert_eq!(view.slots[1].stage, GrowthStage::Adolescent);
    }
}
