use std::fs;
use thermolog::config::{Config, TemperatureScale, WeatherConfig};
use thermolog::error::PollerError;

const MINIMAL: &str = r#"{
    "project_id": "proj-1",
    "client_id": "cid.apps.googleusercontent.com",
    "client_secret": "shh",
    "refresh_token": "1//refresh"
}"#;

#[test]
fn save_and_load_json_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("config.json");

    let mut cfg = Config::default();
    cfg.output_dir = tmp_dir.path().join("logs");
    cfg.temperature_scale = TemperatureScale::Celsius;
    cfg.timezone = chrono_tz::Europe::Amsterdam;
    cfg.weather = Some(WeatherConfig {
        latitude: 52.37,
        longitude: 4.89,
        user_agent: "thermolog (ops@example.com)".to_string(),
    });

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::load(&path).unwrap();

    assert_eq!(loaded.output_dir, cfg.output_dir);
    assert_eq!(loaded.temperature_scale, TemperatureScale::Celsius);
    assert_eq!(loaded.timezone, chrono_tz::Europe::Amsterdam);
    assert_eq!(loaded.weather, cfg.weather);
}

#[test]
fn defaults_and_relative_output_dir() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("thermolog.json");
    fs::write(&path, MINIMAL).unwrap();

    let cfg = Config::load(&path).unwrap();
    assert_eq!(cfg.output_dir, tmp_dir.path().join("logs"));
    assert_eq!(cfg.temperature_scale, TemperatureScale::Fahrenheit);
    assert_eq!(cfg.timezone, chrono_tz::America::New_York);
    assert!(cfg.weather.is_none());
}

#[test]
fn scale_is_case_insensitive_and_checked() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let with_scale = MINIMAL.replace("\"proj-1\"", "\"proj-1\", \"temperature_scale\": \"Celsius\"");
    fs::write(tmp.path(), &with_scale).unwrap();
    assert_eq!(
        Config::from_file(tmp.path()).unwrap().temperature_scale,
        TemperatureScale::Celsius
    );

    let bad = MINIMAL.replace("\"proj-1\"", "\"proj-1\", \"temperature_scale\": \"kelvin\"");
    fs::write(tmp.path(), &bad).unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    assert!(format!("{}", err).contains("temperature_scale"));
}

#[test]
fn unknown_timezone_is_rejected() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    let bad = MINIMAL.replace("\"proj-1\"", "\"proj-1\", \"timezone\": \"Mars/Olympus\"");
    fs::write(tmp.path(), &bad).unwrap();
    assert!(Config::from_file(tmp.path()).is_err());
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();
    cfg.refresh_token = "  ".to_string();
    let err = cfg.validate().unwrap_err();
    assert!(matches!(err, PollerError::Validation { ref field, .. } if field == "refresh_token"));

    cfg = Config::default();
    cfg.weather = Some(WeatherConfig {
        latitude: 123.0,
        longitude: 0.0,
        user_agent: "ua".to_string(),
    });
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.weather = Some(WeatherConfig {
        latitude: 40.0,
        longitude: -74.0,
        user_agent: String::new(),
    });
    assert!(cfg.validate().is_err());

    assert!(Config::default().validate().is_ok());
}

#[test]
fn from_file_with_invalid_json_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"{\"project_id\": [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    assert!(matches!(err, PollerError::Config { .. }));
    assert!(format!("{}", err).contains("Invalid JSON"));
}

#[test]
fn missing_file_is_config_error() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let err = Config::load(tmp_dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, PollerError::Config { .. }));
}

#[test]
fn missing_required_fields_are_named() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(
        tmp.path(),
        r#"{"project_id": "proj-1", "client_secret": "shh", "refresh_token": null}"#,
    )
    .unwrap();

    let err = Config::from_file(tmp.path()).unwrap_err();
    assert!(matches!(err, PollerError::Config { .. }));
    let msg = format!("{}", err);
    assert!(msg.contains("Config missing required fields"));
    assert!(msg.contains("client_id, refresh_token"));
    assert!(!msg.contains("Invalid JSON"));
}

#[test]
fn non_object_config_is_rejected() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), "[1, 2, 3]").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    assert!(format!("{}", err).contains("must contain a JSON object"));
}
