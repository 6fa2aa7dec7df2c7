// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge configuration.

use std::fmt;

use crate::api::ApiConfig;
use crate::push::PushConfig;

/// Configuration for a [`Bridge`](crate::Bridge).
///
/// Credentials are supplied once at startup, held only for the login
/// call, and never logged; the `Debug` output redacts the password.
///
/// # Examples
///
/// ```
/// use decora_bridge::BridgeConfig;
///
/// let config = BridgeConfig::new("user@example.com", "hunter2");
/// assert!(!format!("{config:?}").contains("hunter2"));
/// ```
#[derive(Clone)]
pub struct BridgeConfig {
    email: String,
    password: String,
    api: ApiConfig,
    push: PushConfig,
}

impl BridgeConfig {
    /// Creates a configuration for the production endpoints.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            api: ApiConfig::new(),
            push: PushConfig::new(),
        }
    }

    /// Overrides the REST API configuration.
    #[must_use]
    pub fn with_api(mut self, api: ApiConfig) -> Self {
        self.api = api;
        self
    }

    /// Overrides the push endpoint configuration.
    #[must_use]
    pub fn with_push(mut self, push: PushConfig) -> Self {
        self.push = push;
        self
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the account password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the REST API configuration.
    #[must_use]
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Returns the push endpoint configuration.
    #[must_use]
    pub fn push(&self) -> &PushConfig {
        &self.push
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("api", &self.api)
            .field("push", &self.push)
            .finish()
    }
}
