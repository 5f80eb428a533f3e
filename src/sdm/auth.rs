use crate::config::Config;
use crate::error::{PollerError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::sdm::types::{AccessToken, TokenResponse};
use crate::sdm::{REQUEST_TIMEOUT_SECS, TOKEN_URL, TokenProvider, truncate_body};
use chrono::{Duration, Utc};

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// OAuth refresh-token client
pub struct OAuthClient {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    logger: StructuredLogger,
}

impl OAuthClient {
    /// Create a new OAuth client with the credentials from the config
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_token_url(config, TOKEN_URL)
    }

    /// Same as [`OAuthClient::new`] against a different token endpoint
    pub fn with_token_url(config: &Config, token_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            token_url: token_url.to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
            logger: get_logger("auth"),
        })
    }
}

/// Turn a token endpoint body into an [`AccessToken`]
pub fn parse_token_response(body: &str) -> Result<AccessToken> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| PollerError::auth(format!("Malformed token response: {}", e)))?;
    let secret = parsed
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| PollerError::auth("Missing access_token in refresh response"))?;
    let fetched_at = Utc::now();
    let expires_in = parsed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    Ok(AccessToken::new(
        secret,
        fetched_at,
        fetched_at + Duration::seconds(expires_in),
    ))
}

#[async_trait::async_trait]
impl TokenProvider for OAuthClient {
    async fn get_access_token(&self) -> Result<AccessToken> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| PollerError::auth(format!("Token refresh request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(PollerError::auth(format!(
                "Failed to refresh access token: HTTP {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let token = parse_token_response(&body)?;
        self.logger.debug(&format!(
            "Access token refreshed, expires at {}",
            token.expires_at
        ));
        Ok(token)
    }
}
