// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the My Leviton cloud API.
//!
//! Every operation is a single request/response round trip; nothing is
//! retried here. Retry policy, if any, belongs to the caller.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::api::types::{
    Account, LoginRequest, LoginResponse, Permission, RawSwitch, Residence, Session,
    SwitchState, SwitchUpdate,
};
use crate::error::ApiError;

/// Header carrying the session token on all calls except login.
const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

// ============================================================================
// ApiConfig - Configuration for the cloud API client
// ============================================================================

/// Configuration for the cloud API client.
///
/// # Examples
///
/// ```
/// use decora_bridge::api::ApiConfig;
/// use std::time::Duration;
///
/// // Production endpoint with defaults
/// let config = ApiConfig::new();
///
/// // Pointed at a test server, with a shorter timeout
/// let config = ApiConfig::new()
///     .with_base_url("http://127.0.0.1:8080/api")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: String,
    timeout: Duration,
}

impl ApiConfig {
    /// Production API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://my.leviton.com/api";
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a configuration for the production endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom base URL (primarily for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the request timeout. Bounds every call; a hung remote never
    /// blocks the process indefinitely.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Creates an [`ApiClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn into_client(self) -> Result<ApiClient, ApiError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(ApiClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ApiClient
// ============================================================================

/// Typed client for the vendor REST endpoints.
///
/// # Examples
///
/// ```no_run
/// use decora_bridge::api::{ApiClient, ApiConfig};
///
/// # async fn example() -> decora_bridge::Result<()> {
/// let client = ApiConfig::new().into_client()?;
/// let session = client.login("user@example.com", "hunter2").await?;
/// let permissions = client.person_permissions(session.person_id(), session.token()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Returns the base URL this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticates and returns a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` on any non-success status or a response
    /// body missing `id`/`userId`. Never retried.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let url = format!("{}/Person/login?include=user", self.base_url);

        tracing::debug!("Logging in");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest::new(email, password))
            .send()
            .await
            .map_err(ApiError::Http)?;

        if !response.status().is_success() {
            return Err(ApiError::Auth(format!(
                "login rejected with HTTP {}",
                response.status().as_u16()
            )));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("malformed login response: {e}")))?;

        Ok(Session::new(body.id, body.user_id))
    }

    /// Lists residential permissions for a person.
    ///
    /// An empty list is a valid result; the resolution pipeline decides
    /// what to do with it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upstream` on a non-success status.
    pub async fn person_permissions(
        &self,
        person_id: &str,
        token: &str,
    ) -> Result<Vec<Permission>, ApiError> {
        let url = format!(
            "{}/Person/{}/residentialPermissions",
            self.base_url,
            urlencoding::encode(person_id)
        );
        self.get_json(&url, token, "person_permissions").await
    }

    /// Fetches a residential account, including its primary residence id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upstream` on a non-success status.
    pub async fn account(&self, account_id: &str, token: &str) -> Result<Account, ApiError> {
        let url = format!(
            "{}/ResidentialAccounts/{}",
            self.base_url,
            urlencoding::encode(account_id)
        );
        self.get_json(&url, token, "account").await
    }

    /// Lists all residences of an account. Fallback lookup used when the
    /// primary residence has no devices.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upstream` on a non-success status.
    pub async fn account_residences(
        &self,
        account_id: &str,
        token: &str,
    ) -> Result<Vec<Residence>, ApiError> {
        let url = format!(
            "{}/ResidentialAccounts/{}/residences",
            self.base_url,
            urlencoding::encode(account_id)
        );
        self.get_json(&url, token, "account_residences").await
    }

    /// Lists the controllable devices of a residence.
    ///
    /// An empty list is a valid, non-error result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Upstream` on a non-success status.
    pub async fn residence_switches(
        &self,
        residence_id: &str,
        token: &str,
    ) -> Result<Vec<RawSwitch>, ApiError> {
        let url = format!(
            "{}/Residences/{}/iotSwitches",
            self.base_url,
            urlencoding::encode(residence_id)
        );
        self.get_json(&url, token, "residence_switches").await
    }

    /// Reads the current state of a device.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the device was removed remotely,
    /// `ApiError::Upstream` on other non-success statuses.
    pub async fn switch_state(
        &self,
        device_id: u64,
        token: &str,
    ) -> Result<SwitchState, ApiError> {
        let url = format!("{}/IotSwitches/{device_id}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(ACCESS_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(ApiError::Http)?;

        let response = Self::check_device_status(response, device_id, "switch_state")?;
        response.json().await.map_err(ApiError::Http)
    }

    /// Writes a partial state update and returns the post-write state.
    ///
    /// The update omits unset fields from the wire payload; omission is
    /// semantically "unchanged".
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the device was removed remotely,
    /// `ApiError::Upstream` on other non-success statuses. No implicit
    /// retry.
    pub async fn set_switch_state(
        &self,
        device_id: u64,
        token: &str,
        update: &SwitchUpdate,
    ) -> Result<SwitchState, ApiError> {
        let url = format!("{}/IotSwitches/{device_id}", self.base_url);

        tracing::debug!(device_id, ?update, "Writing switch state");

        let response = self
            .client
            .put(&url)
            .header(ACCESS_TOKEN_HEADER, token)
            .json(update)
            .send()
            .await
            .map_err(ApiError::Http)?;

        let response = Self::check_device_status(response, device_id, "set_switch_state")?;
        response.json().await.map_err(ApiError::Http)
    }

    /// GET a JSON body with the access token header.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
        operation: &'static str,
    ) -> Result<T, ApiError> {
        tracing::debug!(url = %url, operation, "Sending API request");

        let response = self
            .client
            .get(url)
            .header(ACCESS_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(ApiError::Http)?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream {
                status: response.status().as_u16(),
                operation,
            });
        }

        response.json().await.map_err(ApiError::Http)
    }

    /// Maps per-device endpoint statuses, distinguishing removed devices.
    fn check_device_status(
        response: Response,
        device_id: u64,
        operation: &'static str,
    ) -> Result<Response, ApiError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { device_id });
        }
        if !response.status().is_success() {
            return Err(ApiError::Upstream {
                status: response.status().as_u16(),
                operation,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = ApiConfig::new();
        assert_eq!(config.base_url(), "https://my.leviton.com/api");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn config_with_overrides() {
        let config = ApiConfig::new()
            .with_base_url("http://localhost:9000/api")
            .with_timeout(Duration::from_secs(3));
        assert_eq!(config.base_url(), "http://localhost:9000/api");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn into_client_strips_trailing_slash() {
        let client = ApiConfig::new()
            .with_base_url("http://localhost:9000/api/")
            .into_client()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/api");
    }
}
