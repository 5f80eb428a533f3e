//! The persisted reading row and its HVAC status column.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Column order of every device log. Written once when a file is created.
pub const CSV_HEADER: [&str; 8] = [
    "date",
    "time",
    "ambient_temp",
    "humidity",
    "heat_setpoint",
    "cool_setpoint",
    "outdoor_temp",
    "hvac_status",
];

/// HVAC activity as written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HvacStatus {
    Heating,
    Cooling,
    Off,
}

impl HvacStatus {
    /// Map a raw SDM `ThermostatHvac.status` value.
    ///
    /// Returns `None` for anything that is not cleanly heating, cooling or
    /// off; the caller decides how to report it.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "HEATING" => Some(Self::Heating),
            "COOLING" => Some(Self::Cooling),
            "OFF" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heating => "HEATING",
            Self::Cooling => "COOLING",
            Self::Off => "OFF",
        }
    }

    /// Whether the system is actively conditioning air
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Heating | Self::Cooling)
    }
}

/// One row of a device log.
///
/// Temperatures are already in the configured display unit; `None` fields
/// serialize as empty cells. Field order matches [`CSV_HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingRecord {
    pub date: NaiveDate,
    #[serde(with = "hms")]
    pub time: NaiveTime,
    pub ambient_temp: f64,
    pub humidity: Option<f64>,
    pub heat_setpoint: Option<i64>,
    pub cool_setpoint: Option<i64>,
    pub outdoor_temp: Option<f64>,
    pub hvac_status: HvacStatus,
}

mod hms {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M:%S";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
