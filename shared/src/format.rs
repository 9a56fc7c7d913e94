//! Human-readable durations for the garden screens

const HOURS_PER_DAY: f64 = 24.0;

/// Shown when nothing is left to wait for
pub const READY_TO_HARVEST: &str = "Ready to harvest!";

/// Shown when the remaining time is NaN or infinite (a zero or missing
/// weather multiplier)
pub const NOT_GROWING: &str = "Not growing";

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Render the time left until maturity.
///
/// `0` or less is "Ready to harvest!", a full day or more counts whole days
/// (rounded down), anything shorter counts hours rounded up.
pub fn format_time_remaining(hours: f64) -> String {
    if hours.is_nan() || hours == f64::INFINITY {
        return NOT_GROWING.to_string();
    }
    if hours <= 0.0 {
        return READY_TO_HARVEST.to_string();
    }
    if hours >= HOURS_PER_DAY {
        return plural((hours / HOURS_PER_DAY).floor() as i64, "day");
    }
    plural(hours.ceil() as i64, "hour")
}

/// Render how long ago a seed was planted. Both units round down.
pub fn format_time_elapsed(hours: f64) -> String {
    if hours >= HOURS_PER_DAY {
        return plural((hours / HOURS_PER_DAY).floor() as i64, "day");
    }
    plural(hours.max(0.0).floor() as i64, "hour")
}
