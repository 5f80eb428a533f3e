use crate::error::{PollerError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::sdm::types::{AccessToken, Device, DeviceListResponse, RawDevice, TraitSnapshot};
use crate::sdm::{DeviceApi, REQUEST_TIMEOUT_SECS, SDM_BASE_URL, truncate_body};

/// SDM REST client for one project
pub struct SdmClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    logger: StructuredLogger,
}

impl SdmClient {
    /// Create a new client for `project_id`
    pub fn new(project_id: &str) -> Result<Self> {
        Self::with_base_url(project_id, SDM_BASE_URL)
    }

    /// Same as [`SdmClient::new`] against a different API root
    pub fn with_base_url(project_id: &str, base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            logger: get_logger("sdm"),
        })
    }

    fn devices_url(&self) -> String {
        format!("{}/enterprises/{}/devices", self.base_url, self.project_id)
    }

    fn device_url(&self, device_id: &str) -> String {
        format!("{}/{}", self.base_url, device_id.trim_start_matches('/'))
    }

    /// GET `url` and return the body; the error carries status and body excerpt
    async fn get_text(&self, url: &str, token: &AccessToken) -> std::result::Result<String, String> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(format!("HTTP {}: {}", status, truncate_body(&body)));
        }
        Ok(body)
    }
}

/// Select the thermostats from a device listing body
pub fn parse_device_list(body: &str) -> Result<Vec<Device>> {
    let parsed: DeviceListResponse = serde_json::from_str(body)
        .map_err(|e| PollerError::device_list(format!("Malformed device list: {}", e)))?;
    Ok(parsed
        .devices
        .iter()
        .filter(|d| Device::is_thermostat(&d.device_type))
        .map(Device::from)
        .collect())
}

/// Build a [`TraitSnapshot`] from a single-device body
pub fn parse_device_traits(device_id: &str, body: &str) -> Result<TraitSnapshot> {
    let raw: RawDevice = serde_json::from_str(body).map_err(|e| {
        PollerError::device_fetch(device_id, format!("Malformed device payload: {}", e))
    })?;
    TraitSnapshot::try_from(&raw).map_err(|msg| PollerError::device_fetch(device_id, msg))
}

#[async_trait::async_trait]
impl DeviceApi for SdmClient {
    async fn list_devices(&self, token: &AccessToken) -> Result<Vec<Device>> {
        let body = self
            .get_text(&self.devices_url(), token)
            .await
            .map_err(|msg| PollerError::device_list(format!("Failed to fetch devices: {}", msg)))?;
        let devices = parse_device_list(&body)?;
        self.logger.debug(&format!(
            "Fetched {} thermostat(s) from SDM API",
            devices.len()
        ));
        Ok(devices)
    }

    async fn get_traits(&self, token: &AccessToken, device_id: &str) -> Result<TraitSnapshot> {
        let body = self
            .get_text(&self.device_url(device_id), token)
            .await
            .map_err(|msg| PollerError::device_fetch(device_id, msg))?;
        parse_device_traits(device_id, &body)
    }
}
