//! Configuration management for Thermolog
//!
//! This module handles loading and validation of the poller configuration
//! from a JSON file. The configuration is loaded once per run and passed by
//! reference to everything that needs credentials, timezone or unit context.

use crate::error::{PollerError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Keys that must be present in every config file
const REQUIRED_FIELDS: [&str; 4] = ["project_id", "client_id", "client_secret", "refresh_token"];

/// Timezone used when the config does not name one
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

fn default_output_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_timezone() -> Tz {
    chrono_tz::America::New_York
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SDM project identifier (the `enterprises/{project_id}` segment)
    pub project_id: String,

    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Long-lived OAuth refresh token
    pub refresh_token: String,

    /// Directory holding one CSV file per thermostat
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Display unit for every temperature column
    #[serde(default)]
    pub temperature_scale: TemperatureScale,

    /// IANA timezone used to split the poll instant into date and time
    #[serde(
        default = "default_timezone",
        deserialize_with = "deserialize_timezone",
        serialize_with = "serialize_timezone"
    )]
    pub timezone: Tz,

    /// Optional outdoor temperature enrichment
    #[serde(default)]
    pub weather: Option<WeatherConfig>,
}

/// Temperature display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureScale {
    #[default]
    Fahrenheit,
    Celsius,
}

impl TemperatureScale {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "fahrenheit" => Some(Self::Fahrenheit),
            "celsius" => Some(Self::Celsius),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "fahrenheit",
            Self::Celsius => "celsius",
        }
    }

    /// Unit suffix used in log and report output
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
            Self::Celsius => "°C",
        }
    }
}

impl<'de> Deserialize<'de> for TemperatureScale {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "temperature_scale must be either 'fahrenheit' or 'celsius', got '{}'",
                raw
            ))
        })
    }
}

/// Weather.gov enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// Contact-identifying User-Agent required by api.weather.gov
    pub user_agent: String,
}

fn deserialize_timezone<'de, D>(deserializer: D) -> std::result::Result<Tz, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    parse_timezone(&name).map_err(serde::de::Error::custom)
}

fn serialize_timezone<S>(tz: &Tz, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(tz.name())
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| PollerError::validation("timezone", &format!("Invalid timezone: {}", name)))
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            project_id: "test-project".to_string(),
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            refresh_token: "test_refresh_token".to_string(),
            output_dir: default_output_dir(),
            temperature_scale: TemperatureScale::default(),
            timezone: default_timezone(),
            weather: None,
        }
    }
}

impl Config {
    /// Parse configuration from a JSON file without resolving paths or validating
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PollerError::config(format!("Config file not readable: {}: {}", path.display(), e))
        })?;
        let value: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
            PollerError::config(format!("Invalid JSON config file {}: {}", path.display(), e))
        })?;
        let Some(object) = value.as_object() else {
            return Err(PollerError::config(format!(
                "Config file {} must contain a JSON object",
                path.display()
            )));
        };

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| object.get(*field).is_none_or(serde_json::Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(PollerError::config(format!(
                "Config missing required fields in {}: {}",
                path.display(),
                missing.join(", ")
            )));
        }

        serde_json::from_value(value).map_err(|e| {
            PollerError::config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Load, resolve and validate the configuration at `path`.
    ///
    /// A relative `output_dir` is resolved against the directory holding the
    /// config file, so the scheduler's working directory does not matter.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;
        if config.output_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            config.output_dir = base.join(&config.output_dir);
        }
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("project_id", &self.project_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(PollerError::validation(field, "Must not be empty"));
            }
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(PollerError::validation(
                "output_dir",
                "Output directory cannot be empty",
            ));
        }

        if let Some(weather) = &self.weather {
            if !weather.latitude.is_finite() || !(-90.0..=90.0).contains(&weather.latitude) {
                return Err(PollerError::validation(
                    "weather.latitude",
                    "Must be between -90 and 90",
                ));
            }
            if !weather.longitude.is_finite() || !(-180.0..=180.0).contains(&weather.longitude) {
                return Err(PollerError::validation(
                    "weather.longitude",
                    "Must be between -180 and 180",
                ));
            }
            if weather.user_agent.trim().is_empty() {
                return Err(PollerError::validation(
                    "weather.user_agent",
                    "A contact-identifying User-Agent is required",
                ));
            }
        }

        Ok(())
    }
}
