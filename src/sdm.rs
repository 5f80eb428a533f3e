//! Google Smart Device Management (SDM) API integration
//!
//! Split into the OAuth refresh-token exchange (`auth`), the device REST
//! client (`client`) and the wire/view types (`types`). The poller talks to
//! both halves through the [`TokenProvider`] and [`DeviceApi`] traits.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::OAuthClient;
pub use client::SdmClient;
pub use types::{AccessToken, Device, ThermostatMode, TraitSnapshot};

use crate::error::Result;

/// Google OAuth token endpoint
pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// SDM REST API root
pub const SDM_BASE_URL: &str = "https://smartdevicemanagement.googleapis.com/v1";

/// Per-request timeout for OAuth and SDM calls
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Source of access tokens
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange the stored refresh token for a fresh access token
    async fn get_access_token(&self) -> Result<AccessToken>;
}

/// Thermostat listing and trait reads
#[async_trait::async_trait]
pub trait DeviceApi: Send + Sync {
    /// List the thermostats of the configured project
    async fn list_devices(&self, token: &AccessToken) -> Result<Vec<Device>>;

    /// Read the current traits of one device
    async fn get_traits(&self, token: &AccessToken, device_id: &str) -> Result<TraitSnapshot>;
}

/// Shorten an error body for log and error messages
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
