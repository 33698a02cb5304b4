//! HTTP client for the turnstile check-in API.
//!
//! Wraps `reqwest::Client` with URL construction, the `Authorization`
//! header and envelope unwrapping for the three turnstile operations.
//!
//! # Architecture
//!
//! ```text
//! CheckInService
//!     │
//!     └─> CheckInClient ───(HTTPS/JSON)───> /v2/turnstiles/{checkIn, checkAvailable, doConsume}
//! ```
//!
//! # Response Handling
//!
//! Every operation goes through the same steps:
//!
//! 1. Transport failure → [`ApiError::Network`]
//! 2. HTTP 401 → [`ApiError::Unauthorized`], body not read
//! 3. Other non-2xx → error envelope decoded into [`ApiError::Business`],
//!    or [`ApiError::Decode`] if it is not one
//! 4. 2xx → operation envelope decoded; a non-zero `error.code` is still an
//!    [`ApiError::Business`]
//!
//! # Design Principles
//!
//! - **No automatic retry**: each call is made exactly once
//! - **Transport timeout only**: a hung call ends as `Network` when the
//!   configured timeout expires

use crate::error::{ApiError, Result};
use crate::models::{
    ApiResponse, Availability, CheckAvailableRequest, ConsumeRequest, ConsumeResult,
    ErrorResponse, SiteInfo,
};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use turngate_core::constants::{ENDPOINT_CHECK_AVAILABLE, ENDPOINT_CHECK_IN, ENDPOINT_DO_CONSUME};
use turngate_core::{AccessDirection, Config, TicketCode};
use url::Url;

/// Configuration for [`CheckInClient`].
///
/// # Example
///
/// ```
/// use turngate_network::CheckInClientConfig;
/// use turngate_core::Config;
///
/// let config = CheckInClientConfig::from_config(&Config::default()).unwrap();
/// assert!(config.base_url.as_str().ends_with("/v2/turnstiles/"));
/// assert!(config.api_key.is_none());
/// ```
#[derive(Clone)]
pub struct CheckInClientConfig {
    /// Base URL the endpoint names are appended to.
    pub base_url: Url,

    /// Value sent verbatim in the `Authorization` header, if any.
    pub api_key: Option<String>,

    /// Direction used for `accessDir` and the guid suffix.
    pub direction: AccessDirection,

    /// Transport timeout for every request.
    pub timeout: Duration,
}

impl CheckInClientConfig {
    /// Derive the client configuration from the persisted record.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the base URL does not parse.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Url::parse(config.api_base_url())
            .map_err(|e| ApiError::Configuration(format!("invalid base URL: {e}")))?;

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            direction: config.access_direction(),
            timeout: config.request_timeout(),
        })
    }

    /// Replace the base URL (staging hosts, test servers).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

impl std::fmt::Debug for CheckInClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("direction", &self.direction)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Client for the turnstile check-in API.
///
/// # Example
///
/// ```no_run
/// use turngate_core::{Config, TicketCode};
/// use turngate_network::CheckInClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = CheckInClient::from_config(&Config::default())?;
///
/// let site = client.check_in().await?;
/// println!("Registered at {}", site.site_name);
///
/// let ticket = TicketCode::parse("SU_ABC123")?;
/// let result = client.consume(&ticket).await?;
/// println!("{}", result.verbose_result);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CheckInClient {
    http: reqwest::Client,
    base_url: Url,
    direction: AccessDirection,
}

impl CheckInClient {
    /// Build a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the API key is not a valid header value or
    /// the HTTP client cannot be built.
    pub fn new(config: CheckInClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::Configuration(format!("invalid API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            direction: config.direction,
        })
    }

    /// Build a client straight from the persisted record.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(CheckInClientConfig::from_config(config)?)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Direction sent with every pre-check and consume.
    pub fn direction(&self) -> AccessDirection {
        self.direction
    }

    /// Connectivity check: confirm the gate is registered and return its site.
    pub async fn check_in(&self) -> Result<SiteInfo> {
        self.get(ENDPOINT_CHECK_IN).await
    }

    /// Availability pre-check for `code` in the configured direction.
    pub async fn check_available(&self, code: &TicketCode) -> Result<Availability> {
        let body = CheckAvailableRequest {
            unique_code: code.as_str(),
            access_dir: self.direction.code(),
        };
        self.post(ENDPOINT_CHECK_AVAILABLE, &body).await
    }

    /// Consume `code`. The guid gets the direction suffix unless the code
    /// already carries one.
    pub async fn consume(&self, code: &TicketCode) -> Result<ConsumeResult> {
        let guid = code.guid(self.direction);
        debug!(guid = %guid, "Consuming ticket");
        self.post(ENDPOINT_DO_CONSUME, &ConsumeRequest { guid: &guid })
            .await
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .map_err(|e| ApiError::Configuration(format!("invalid endpoint {endpoint}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        debug!("GET {}", url);
        let response = self.http.get(url).send().await?;
        Self::handle_response(endpoint, response).await
    }

    async fn post<T: DeserializeOwned>(&self, endpoint: &str, body: &impl Serialize) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        debug!("POST {}", url);
        let response = self.http.post(url).json(body).send().await?;
        Self::handle_response(endpoint, response).await
    }

    /// Apply the status and envelope checks, returning `data` on success.
    async fn handle_response<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "Response received");

        if status == StatusCode::UNAUTHORIZED {
            warn!(endpoint, "Backend rejected the API key");
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            let envelope: ErrorResponse = serde_json::from_str(&body)
                .map_err(|e| ApiError::decode(e.to_string(), body.clone()))?;
            let message = if envelope.error.message.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                envelope.error.message
            };
            return Err(ApiError::business(message));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ApiError::decode(e.to_string(), body.clone()))?;

        if envelope.error.code != 0 {
            let message = if envelope.error.message.is_empty() {
                format!("error code {}", envelope.error.code)
            } else {
                envelope.error.message
            };
            return Err(ApiError::business(message));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::decode("response carries no data", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_follows_demo_mode() {
        let demo = CheckInClientConfig::from_config(&Config::default()).unwrap();
        assert!(demo.base_url.as_str().contains("beta-backend-dev"));

        let production = CheckInClientConfig::from_config(&Config {
            demo_mode: false,
            ..Config::default()
        })
        .unwrap();
        assert_eq!(
            production.base_url.as_str(),
            "https://api.sendmoregetbeta.com/v2/turnstiles/"
        );
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = CheckInClientConfig::from_config(&Config {
            api_key: Some("secret-key".to_string()),
            ..Config::default()
        })
        .unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = CheckInClientConfig::from_config(&Config::default())
            .unwrap()
            .with_base_url(Url::parse("http://127.0.0.1:9000/v2/turnstiles").unwrap());
        let client = CheckInClient::new(config).unwrap();

        assert_eq!(
            client.endpoint_url("doConsume").unwrap().as_str(),
            "http://127.0.0.1:9000/v2/turnstiles/doConsume"
        );
    }

    #[test]
    fn test_invalid_api_key_is_configuration_error() {
        let config = CheckInClientConfig::from_config(&Config {
            api_key: Some("bad\nkey".to_string()),
            ..Config::default()
        })
        .unwrap();

        let result = CheckInClient::new(config);
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }
}
