//! Record normalizer: trait snapshot + outdoor reading → [`ReadingRecord`]
//!
//! Pure apart from a warning log for unmapped HVAC states. Everything that
//! depends on the host (clock, local timezone) comes in as arguments.

use crate::config::{Config, TemperatureScale};
use crate::logging::get_logger;
use crate::record::{HvacStatus, ReadingRecord};
use crate::sdm::types::{ThermostatMode, TraitSnapshot};
use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use chrono_tz::Tz;

pub fn celsius_to_fahrenheit(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Celsius reading in the display unit, unrounded
pub fn celsius_to_scale(c: f64, scale: TemperatureScale) -> f64 {
    match scale {
        TemperatureScale::Celsius => c,
        TemperatureScale::Fahrenheit => celsius_to_fahrenheit(c),
    }
}

/// Fahrenheit reading in the display unit, unrounded
pub fn fahrenheit_to_scale(f: f64, scale: TemperatureScale) -> f64 {
    match scale {
        TemperatureScale::Celsius => fahrenheit_to_celsius(f),
        TemperatureScale::Fahrenheit => f,
    }
}

/// Setpoint in the display unit, rounded to a whole degree
pub fn setpoint_to_scale(c: f64, scale: TemperatureScale) -> i64 {
    celsius_to_scale(c, scale).round() as i64
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Heat/cool setpoints relevant to the current mode, in Celsius.
///
/// Without a recognised mode the device's reported setpoints are kept.
pub fn relevant_setpoints(snapshot: &TraitSnapshot) -> (Option<f64>, Option<f64>) {
    let heat = snapshot.heat_celsius;
    let cool = snapshot.cool_celsius;
    match snapshot.mode {
        Some(ThermostatMode::Heat) => (heat, None),
        Some(ThermostatMode::Cool) => (None, cool),
        Some(ThermostatMode::HeatCool) => (heat, cool),
        Some(ThermostatMode::Off) => (None, None),
        Some(ThermostatMode::Other(_)) | None => (heat, cool),
    }
}

/// Map a raw `ThermostatHvac.status`; anything unrecognised is `OFF`
pub fn map_hvac_status(raw: &str) -> HvacStatus {
    HvacStatus::from_label(raw).unwrap_or_else(|| {
        get_logger("normalize").warn(&format!(
            "Unrecognized HVAC status '{}', recording OFF",
            raw
        ));
        HvacStatus::Off
    })
}

/// Split a UTC instant into local date and whole-second time in `tz`
pub fn local_date_time(instant: DateTime<Utc>, tz: Tz) -> (NaiveDate, NaiveTime) {
    let local = instant.trunc_subsecs(0).with_timezone(&tz);
    (local.date_naive(), local.time())
}

/// Build the persisted row for one device.
///
/// `outdoor_temp_f` is the weather reading in °F as returned by the
/// weather lookup; device temperatures arrive in °C.
pub fn normalize(
    snapshot: &TraitSnapshot,
    outdoor_temp_f: Option<f64>,
    poll_instant: DateTime<Utc>,
    config: &Config,
) -> ReadingRecord {
    let scale = config.temperature_scale;
    let (date, time) = local_date_time(poll_instant, config.timezone);
    let (heat, cool) = relevant_setpoints(snapshot);

    ReadingRecord {
        date,
        time,
        ambient_temp: round_tenth(celsius_to_scale(snapshot.ambient_celsius, scale)),
        humidity: snapshot.humidity_percent,
        heat_setpoint: heat.map(|c| setpoint_to_scale(c, scale)),
        cool_setpoint: cool.map(|c| setpoint_to_scale(c, scale)),
        outdoor_temp: outdoor_temp_f.map(|f| round_tenth(fahrenheit_to_scale(f, scale))),
        hvac_status: map_hvac_status(&snapshot.hvac_status),
    }
}
