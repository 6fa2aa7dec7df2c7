// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Request/response contracts for the My Leviton cloud API.
//!
//! These types mirror the vendor's JSON bodies field for field; everything
//! the bridge does not consume is left out and ignored during decoding.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::types::{Brightness, PowerState};

/// Login request body for `POST /Person/login?include=user`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    /// Fixed client identifier the vendor expects on every login.
    pub logged_in_via: &'static str,
    pub remember_me: bool,
}

impl<'a> LoginRequest<'a> {
    pub fn new(email: &'a str, password: &'a str) -> Self {
        Self {
            email,
            password,
            logged_in_via: "myLeviton",
            remember_me: true,
        }
    }
}

/// Raw login response body. `id` is the access token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub id: String,
    pub user_id: String,
}

/// An authenticated session with the vendor cloud.
///
/// Created once by a successful login and valid for the process lifetime;
/// a restart must re-derive it. The token is never logged.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    person_id: String,
}

impl Session {
    pub(crate) fn new(token: String, person_id: String) -> Self {
        Self { token, person_id }
    }

    /// The opaque token sent as `X-Access-Token` on every call.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The person identifier the token belongs to.
    #[must_use]
    pub fn person_id(&self) -> &str {
        &self.person_id
    }
}

/// One entry of `GET /Person/{personID}/residentialPermissions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    /// The residential account this person has access to.
    pub residential_account_id: String,
}

/// Response body of `GET /ResidentialAccounts/{accountID}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// The account's primary residence.
    pub primary_residence_id: String,
}

/// One entry of `GET /ResidentialAccounts/{id}/residences`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residence {
    /// Residence identifier usable for device listing.
    pub id: String,
}

/// One device record from `GET /Residences/{residenceID}/iotSwitches`.
///
/// `id` is the transient remote identifier used for read/write/subscribe
/// calls; `serial` is the durable hardware identifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSwitch {
    /// Remote numeric identifier. May be reassigned across sessions.
    pub id: u64,
    /// Stable hardware serial number.
    pub serial: String,
    /// Display name.
    pub name: String,
    /// Model string, e.g. `"DW6HD"`.
    pub model: String,
    /// Manufacturer name, if reported.
    #[serde(default)]
    pub manufacturer: Option<String>,
    /// Firmware version, if reported.
    #[serde(default)]
    pub version: Option<String>,
    /// Last known power state, if reported in the listing.
    #[serde(default)]
    pub power: Option<PowerState>,
    /// Last known brightness, if reported in the listing.
    #[serde(default)]
    pub brightness: Option<Brightness>,
    /// Device-reported lower level bound, if present in the listing.
    #[serde(default)]
    pub min_level: Option<u8>,
    /// Device-reported upper level bound, if present in the listing.
    #[serde(default)]
    pub max_level: Option<u8>,
}

/// Response body of `GET`/`PUT /IotSwitches/{switchID}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchState {
    /// Current power state.
    pub power: Option<PowerState>,
    /// Current brightness/speed level.
    #[serde(default)]
    pub brightness: Option<Brightness>,
    /// Device-reported lower level bound.
    #[serde(default)]
    pub min_level: Option<u8>,
    /// Device-reported upper level bound.
    #[serde(default)]
    pub max_level: Option<u8>,
}

/// Partial write body for `PUT /IotSwitches/{switchID}`.
///
/// Absent fields are omitted from the wire payload entirely; omission means
/// "unchanged" to the vendor, so `null` must never be sent. Construction
/// guarantees at least one field is set.
///
/// # Examples
///
/// ```
/// use decora_bridge::api::SwitchUpdate;
/// use decora_bridge::types::PowerState;
///
/// let update = SwitchUpdate::power(PowerState::On);
/// assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"power":"ON"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    power: Option<PowerState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    brightness: Option<Brightness>,
}

impl SwitchUpdate {
    /// Creates an update from optional fields.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyUpdate` if both fields are `None`.
    pub fn new(
        power: Option<PowerState>,
        brightness: Option<Brightness>,
    ) -> Result<Self, ValueError> {
        if power.is_none() && brightness.is_none() {
            return Err(ValueError::EmptyUpdate);
        }
        Ok(Self { power, brightness })
    }

    /// Creates a power-only update.
    #[must_use]
    pub fn power(state: PowerState) -> Self {
        Self {
            power: Some(state),
            brightness: None,
        }
    }

    /// Creates a brightness-only update.
    #[must_use]
    pub fn brightness(level: Brightness) -> Self {
        Self {
            power: None,
            brightness: Some(level),
        }
    }
}
