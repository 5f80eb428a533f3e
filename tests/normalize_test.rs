use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::io::Write;
use std::sync::{Arc, Mutex};
use thermolog::config::{Config, TemperatureScale};
use thermolog::normalize::{
    celsius_to_fahrenheit, fahrenheit_to_celsius, local_date_time, map_hvac_status, normalize,
};
use thermolog::record::HvacStatus;
use thermolog::sdm::{ThermostatMode, TraitSnapshot};

fn snapshot(mode: ThermostatMode, hvac: &str) -> TraitSnapshot {
    TraitSnapshot {
        ambient_celsius: 21.5,
        humidity_percent: Some(45.0),
        heat_celsius: Some(20.0),
        cool_celsius: Some(24.0),
        mode: Some(mode),
        hvac_status: hvac.to_string(),
    }
}

#[test]
fn poll_instant_is_split_in_configured_timezone() {
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap();
    let (date, time) = local_date_time(instant, chrono_tz::America::New_York);
    assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    assert_eq!(time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());

    let (date, time) = local_date_time(instant, chrono_tz::America::Los_Angeles);
    assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    assert_eq!(time, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
}

#[test]
fn sub_second_precision_is_dropped() {
    let instant = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 15).unwrap()
        + chrono::Duration::milliseconds(987);
    let (_, time) = local_date_time(instant, chrono_tz::UTC);
    assert_eq!(time, NaiveTime::from_hms_opt(12, 30, 15).unwrap());
}

#[test]
fn heat_mode_keeps_only_heat_setpoint() {
    let cfg = Config::default();
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap();
    let row = normalize(&snapshot(ThermostatMode::Heat, "HEATING"), None, instant, &cfg);

    assert_eq!(row.heat_setpoint, Some(68));
    assert_eq!(row.cool_setpoint, None);
    assert_eq!(row.ambient_temp, 70.7);
    assert_eq!(row.humidity, Some(45.0));
    assert_eq!(row.outdoor_temp, None);
    assert_eq!(row.hvac_status, HvacStatus::Heating);
}

#[test]
fn celsius_scale_keeps_device_units() {
    let mut cfg = Config::default();
    cfg.temperature_scale = TemperatureScale::Celsius;
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap();
    let row = normalize(
        &snapshot(ThermostatMode::HeatCool, "COOLING"),
        Some(50.0),
        instant,
        &cfg,
    );

    assert_eq!(row.ambient_temp, 21.5);
    assert_eq!(row.heat_setpoint, Some(20));
    assert_eq!(row.cool_setpoint, Some(24));
    assert_eq!(row.outdoor_temp, Some(10.0));
    assert_eq!(row.hvac_status, HvacStatus::Cooling);
}

#[test]
fn off_mode_and_unknown_hvac_status() {
    let cfg = Config::default();
    let instant = Utc.with_ymd_and_hms(2024, 1, 15, 5, 0, 0).unwrap();
    let row = normalize(&snapshot(ThermostatMode::Off, "FAN_RUNNING"), None, instant, &cfg);

    assert_eq!(row.heat_setpoint, None);
    assert_eq!(row.cool_setpoint, None);
    assert_eq!(row.hvac_status, HvacStatus::Off);
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn with_captured_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.text())
}

#[test]
fn unknown_hvac_status_logs_a_warning() {
    let (status, logs) = with_captured_warnings(|| map_hvac_status("FAN_RUNNING"));
    assert_eq!(status, HvacStatus::Off);
    assert!(logs.contains("WARN"), "{}", logs);
    assert!(logs.contains("Unrecognized HVAC status 'FAN_RUNNING'"), "{}", logs);
    assert!(logs.contains("component=normalize"), "{}", logs);

    let (status, logs) = with_captured_warnings(|| map_hvac_status("cooling"));
    assert_eq!(status, HvacStatus::Cooling);
    assert!(logs.is_empty(), "{}", logs);
}

#[test]
fn fahrenheit_round_trip_within_half_degree() {
    let mut c = -40.0;
    while c <= 50.0 {
        let back = fahrenheit_to_celsius(celsius_to_fahrenheit(c).round());
        assert!((back - c).abs() <= 0.5, "{} -> {}", c, back);
        c += 0.25;
    }
}
