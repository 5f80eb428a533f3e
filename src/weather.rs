//! Outdoor temperature enrichment from api.weather.gov
//!
//! The NWS API has no "temperature at a coordinate" call. The lookup is
//! three requests: the grid point for the coordinates names its list of
//! observation stations, the first station is taken, and its latest
//! observation carries the temperature. Every failure degrades to "no
//! outdoor reading" because the field is only an enrichment.

use crate::config::WeatherConfig;
use crate::error::{PollerError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::normalize::celsius_to_fahrenheit;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

/// api.weather.gov root
pub const NWS_BASE_URL: &str = "https://api.weather.gov";

/// Per-request timeout for weather calls
pub const NWS_TIMEOUT_SECS: u64 = 12;

/// Source of outdoor temperature observations
#[async_trait::async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Latest observed temperature in °F at the configured coordinates.
    ///
    /// `Ok(None)` means the station reported no value.
    async fn latest_temperature_f(&self, coords: &WeatherConfig) -> Result<Option<f64>>;
}

/// Outdoor temperature for this run, or `None` when weather is not
/// configured or the lookup fails (failures are logged, never returned).
pub async fn get_outdoor_temperature(
    provider: &dyn WeatherProvider,
    coords: Option<&WeatherConfig>,
) -> Option<f64> {
    let coords = coords?;
    let logger = get_logger("weather");
    match provider.latest_temperature_f(coords).await {
        Ok(Some(temp)) => {
            logger.debug(&format!("Outdoor temperature {:.1}°F", temp));
            Some(temp)
        }
        Ok(None) => {
            logger.warn("Latest observation has no temperature value");
            None
        }
        Err(e) => {
            logger.warn(&format!("Failed to fetch outdoor temperature: {}", e));
            None
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointResponse {
    pub properties: PointProperties,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointProperties {
    pub observation_stations: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationCollection {
    #[serde(default)]
    pub features: Vec<StationFeature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationFeature {
    /// Station URL, e.g. `https://api.weather.gov/stations/KDCA`
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationResponse {
    pub properties: ObservationProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationProperties {
    pub temperature: QuantitativeValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantitativeValue {
    pub value: Option<f64>,
    #[serde(default)]
    pub unit_code: Option<String>,
}

impl QuantitativeValue {
    /// Value in °F rounded to one decimal. NWS reports `wmoUnit:degC`.
    pub fn fahrenheit(&self) -> Option<f64> {
        let value = self.value?;
        let is_f = self
            .unit_code
            .as_deref()
            .is_some_and(|u| u.ends_with("degF"));
        let f = if is_f {
            value
        } else {
            celsius_to_fahrenheit(value)
        };
        Some((f * 10.0).round() / 10.0)
    }
}

/// api.weather.gov client
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
    logger: StructuredLogger,
}

impl NwsClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(NWS_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(NWS_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            logger: get_logger("weather"),
        })
    }

    fn points_url(&self, coords: &WeatherConfig) -> String {
        format!(
            "{}/points/{:.4},{:.4}",
            self.base_url, coords.latitude, coords.longitude
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str, user_agent: &str) -> Result<T> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, "application/geo+json")
            .send()
            .await
            .map_err(|e| PollerError::weather(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PollerError::weather(format!(
                "{} returned HTTP {}: {}",
                url,
                status,
                crate::sdm::truncate_body(&body)
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PollerError::weather(format!("{}: JSON parse error: {}", url, e)))
    }

    /// Observation station URL nearest to the coordinates
    pub async fn resolve_station(&self, coords: &WeatherConfig) -> Result<String> {
        let point: PointResponse = self
            .get_json(&self.points_url(coords), &coords.user_agent)
            .await?;
        let stations: StationCollection = self
            .get_json(&point.properties.observation_stations, &coords.user_agent)
            .await?;
        let station = stations.features.into_iter().next().ok_or_else(|| {
            PollerError::weather("No observation stations returned for coordinates")
        })?;
        self.logger
            .debug(&format!("Resolved observation station {}", station.id));
        Ok(station.id)
    }
}

#[async_trait::async_trait]
impl WeatherProvider for NwsClient {
    async fn latest_temperature_f(&self, coords: &WeatherConfig) -> Result<Option<f64>> {
        let station = self.resolve_station(coords).await?;
        let url = format!("{}/observations/latest", station.trim_end_matches('/'));
        let observation: ObservationResponse = self.get_json(&url, &coords.user_agent).await?;
        Ok(observation.properties.temperature.fahrenheit())
    }
}
