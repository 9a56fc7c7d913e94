//! WebAssembly module for Fair Weather Friend
//!
//! Lets the mobile client run the same growth rules as the backend:
//! - Live growth stage and percent
//! - Time to maturity and its display text
//! - Weather normalization and icons

use chrono::{DateTime, Utc};
use shared::{format_time_elapsed, format_time_remaining, lookup_weather, GrowthCalculator, PlantType};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str(concat!(
        "fair-weather-friend-wasm ",
        env!("CARGO_PKG_VERSION")
    )));
}

fn to_js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

fn parse_plant(plant_type_json: &str) -> Result<PlantType, String> {
    serde_json::from_str(plant_type_json).map_err(|e| format!("Invalid plant JSON: {}", e))
}

fn timestamp(millis: f64) -> Result<DateTime<Utc>, String> {
    if !millis.is_finite() {
        return Err(format!("Invalid timestamp: {}", millis));
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .ok_or_else(|| format!("Timestamp out of range: {}", millis))
}

fn progress_json(
    planted_at_ms: f64,
    plant_type_json: &str,
    weather: &str,
    now_ms: f64,
) -> Result<String, String> {
    let plant = parse_plant(plant_type_json)?;
    let progress = GrowthCalculator::default().progress_at(
        timestamp(planted_at_ms)?,
        &plant,
        weather,
        timestamp(now_ms)?,
    );
    serde_json::to_string(&progress).map_err(|e| e.to_string())
}

fn remaining_hours(
    planted_at_ms: f64,
    plant_type_json: &str,
    weather: &str,
    now_ms: f64,
) -> Result<f64, String> {
    let plant = parse_plant(plant_type_json)?;
    Ok(GrowthCalculator::default().time_to_maturity_at(
        timestamp(planted_at_ms)?,
        &plant,
        weather,
        timestamp(now_ms)?,
    ))
}

/// Growth of a planted seed as `{"stage": 1-5, "progress_percent": n}`
#[wasm_bindgen]
pub fn growth_progress(
    planted_at_ms: f64,
    plant_type_json: &str,
    weather: &str,
    now_ms: f64,
) -> Result<String, JsValue> {
    progress_json(planted_at_ms, plant_type_json, weather, now_ms).map_err(to_js_error)
}

/// Growth of a planted seed as of the device clock
#[wasm_bindgen]
pub fn growth_progress_now(
    planted_at_ms: f64,
    plant_type_json: &str,
    weather: &str,
) -> Result<String, JsValue> {
    growth_progress(planted_at_ms, plant_type_json, weather, js_sys::Date::now())
}

/// Real hours until a planted seed matures, never negative
#[wasm_bindgen]
pub fn hours_to_maturity(
    planted_at_ms: f64,
    plant_type_json: &str,
    weather: &str,
    now_ms: f64,
) -> Result<f64, JsValue> {
    remaining_hours(planted_at_ms, plant_type_json, weather, now_ms).map_err(to_js_error)
}

/// "Ready to harvest!", "N hours" or "N days"
#[wasm_bindgen]
pub fn format_remaining(hours: f64) -> String {
    format_time_remaining(hours)
}

/// How long ago a seed was planted, e.g. "3 hours" or "2 days"
#[wasm_bindgen]
pub fn format_elapsed(hours: f64) -> String {
    format_time_elapsed(hours)
}

/// Weather category ("sunny", "cloudy" or "rainy") for a raw condition
#[wasm_bindgen]
pub fn normalize_weather(raw: &str) -> String {
    shared::normalize_weather(raw).as_str().to_string()
}

/// Icon name for a raw condition
#[wasm_bindgen]
pub fn weather_icon(raw: &str) -> String {
    lookup_weather(raw).icon.to_string()
}

/// Display name for a raw condition
#[wasm_bindgen]
pub fn weather_display_name(raw: &str) -> String {
    lookup_weather(raw).display_name.to_string()
}
