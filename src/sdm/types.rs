//! Wire types for the Smart Device Management API and the typed views the
//! rest of the crate works with.
//!
//! The device listing is read through a lenient view ([`ListedDevice`]) that
//! only looks at identity and naming, so one thermostat with odd trait
//! payloads cannot fail the listing for every other device. Single-device
//! payloads go through [`RawDevice`] and are validated into
//! [`TraitSnapshot`]; a thermostat missing a required trait is rejected
//! there rather than producing an empty cell later on.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Device type suffix for everything we poll
pub const THERMOSTAT_TYPE_SUFFIX: &str = "THERMOSTAT";

/// Short-lived OAuth bearer token, valid for the current run only
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: String, fetched_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret,
            fetched_at,
            expires_at,
        }
    }

    /// Bearer value for the `Authorization` header
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("fetched_at", &self.fetched_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// OAuth token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// `GET enterprises/{project}/devices` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub devices: Vec<ListedDevice>,
}

/// One entry of the device listing. Traits other than `Info` are skipped
/// and `Info` is kept untyped; trait validation happens per device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedDevice {
    pub name: String,
    #[serde(rename = "type", default)]
    pub device_type: String,
    #[serde(default)]
    pub traits: ListedTraits,
    #[serde(default)]
    pub parent_relations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedTraits {
    #[serde(rename = "sdm.devices.traits.Info", default)]
    pub info: Option<serde_json::Value>,
}

/// A single device as returned by `GET enterprises/{project}/devices/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub traits: RawTraits,
}

/// The subset of SDM traits the poller reads. Unknown traits are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTraits {
    #[serde(rename = "sdm.devices.traits.Temperature")]
    pub temperature: Option<TemperatureTrait>,
    #[serde(rename = "sdm.devices.traits.Humidity")]
    pub humidity: Option<HumidityTrait>,
    #[serde(rename = "sdm.devices.traits.ThermostatMode")]
    pub mode: Option<ThermostatModeTrait>,
    #[serde(rename = "sdm.devices.traits.ThermostatHvac")]
    pub hvac: Option<ThermostatHvacTrait>,
    #[serde(rename = "sdm.devices.traits.ThermostatTemperatureSetpoint")]
    pub setpoint: Option<SetpointTrait>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureTrait {
    pub ambient_temperature_celsius: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumidityTrait {
    pub ambient_humidity_percent: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThermostatModeTrait {
    pub mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThermostatHvacTrait {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetpointTrait {
    #[serde(default)]
    pub heat_celsius: Option<f64>,
    #[serde(default)]
    pub cool_celsius: Option<f64>,
}

/// Thermostat operating mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThermostatMode {
    Heat,
    Cool,
    HeatCool,
    Off,
    Other(String),
}

impl ThermostatMode {
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "HEAT" => Self::Heat,
            "COOL" => Self::Cool,
            "HEATCOOL" | "AUTO" => Self::HeatCool,
            "OFF" => Self::Off,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A thermostat selected for polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Full resource name, `enterprises/{project}/devices/{id}`
    pub id: String,
    pub display_name: String,
    pub device_type: String,
}

impl Device {
    pub fn is_thermostat(device_type: &str) -> bool {
        device_type.ends_with(THERMOSTAT_TYPE_SUFFIX)
    }

    /// Last path segment of the resource name
    pub fn short_id(&self) -> &str {
        last_segment(&self.id)
    }
}

impl From<&ListedDevice> for Device {
    fn from(listed: &ListedDevice) -> Self {
        Self {
            id: listed.name.clone(),
            display_name: listed.display_name(),
            device_type: listed.device_type.clone(),
        }
    }
}

fn non_empty_str(value: Option<&serde_json::Value>) -> Option<&str> {
    value
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl ListedDevice {
    /// Human name: custom label, then room (parent relation), then the id
    pub fn display_name(&self) -> String {
        let custom = non_empty_str(self.traits.info.as_ref().and_then(|i| i.get("customName")));
        if let Some(name) = custom {
            return name.to_string();
        }

        let room = self
            .parent_relations
            .iter()
            .find_map(|r| non_empty_str(r.get("displayName")));
        if let Some(name) = room {
            return name.to_string();
        }

        let id = last_segment(&self.name);
        if id.is_empty() {
            "thermostat".to_string()
        } else {
            id.to_string()
        }
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or_default()
}

/// Current trait values of one thermostat
#[derive(Debug, Clone, PartialEq)]
pub struct TraitSnapshot {
    pub ambient_celsius: f64,
    pub humidity_percent: Option<f64>,
    pub heat_celsius: Option<f64>,
    pub cool_celsius: Option<f64>,
    pub mode: Option<ThermostatMode>,
    /// Unmapped `ThermostatHvac.status`; mapping happens in the normalizer
    pub hvac_status: String,
}

impl TryFrom<&RawDevice> for TraitSnapshot {
    type Error = String;

    fn try_from(raw: &RawDevice) -> std::result::Result<Self, Self::Error> {
        let traits = &raw.traits;
        let ambient_celsius = traits
            .temperature
            .as_ref()
            .map(|t| t.ambient_temperature_celsius)
            .ok_or_else(|| "missing trait sdm.devices.traits.Temperature".to_string())?;
        let hvac_status = traits
            .hvac
            .as_ref()
            .map(|h| h.status.clone())
            .ok_or_else(|| "missing trait sdm.devices.traits.ThermostatHvac".to_string())?;
        let setpoint = traits.setpoint.clone().unwrap_or_default();

        Ok(Self {
            ambient_celsius,
            humidity_percent: traits.humidity.as_ref().map(|h| h.ambient_humidity_percent),
            heat_celsius: setpoint.heat_celsius,
            cool_celsius: setpoint.cool_celsius,
            mode: traits
                .mode
                .as_ref()
                .map(|m| ThermostatMode::from_label(&m.mode)),
            hvac_status,
        })
    }
}
