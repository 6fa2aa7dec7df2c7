// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the Decora bridge.
//!
//! This module provides an error hierarchy for failures across the library:
//! remote API calls, identity resolution, the push channel, and value
//! validation.

use thiserror::Error;

/// The main error type for this library.
///
/// This enum encompasses all possible errors that can occur when bridging
/// Decora Smart devices.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during a remote API call.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Error occurred while resolving the identity chain at startup.
    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Error occurred on the push channel.
    #[error("push error: {0}")]
    Push(#[from] PushError),

    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Device is not known to the registry.
    #[error("device not found: serial {0}")]
    UnknownDevice(String),
}

/// Errors returned by the remote vendor API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login was rejected or returned a malformed session.
    ///
    /// This is fatal to startup; bad credentials are never retried.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote returned a non-success status.
    #[error("upstream returned HTTP {status} for {operation}")]
    Upstream {
        /// HTTP status code returned by the remote.
        status: u16,
        /// The API operation that failed.
        operation: &'static str,
    },

    /// The device no longer exists remotely.
    #[error("device {device_id} not found upstream")]
    NotFound {
        /// The remote numeric device identifier.
        device_id: u64,
    },

    /// The HTTP request itself failed (transport, timeout, or a response
    /// body that would not decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors from the startup identity resolution pipeline.
///
/// The pipeline is atomic: any step failure aborts it and no partial
/// device list is produced.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A pipeline step failed; carries the step name and the cause.
    #[error("pipeline step {step} failed: {source}")]
    Step {
        /// Name of the failed step.
        step: &'static str,
        /// The underlying API failure.
        source: ApiError,
    },

    /// The person has no residential permissions.
    #[error("no residential permissions for this account")]
    NoPermissions,

    /// No devices were found on any attempted residence.
    #[error("no devices in residence {primary} (fallback: {fallback:?})")]
    NoDevices {
        /// The primary residence that was tried first.
        primary: String,
        /// The fallback residence, if the fallback lookup produced one.
        fallback: Option<String>,
    },
}

/// Errors from the push notification channel.
#[derive(Debug, Error)]
pub enum PushError {
    /// WebSocket connection or transport failed.
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be serialized for sending.
    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },

    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// A state write carried neither power nor brightness.
    #[error("update must set at least one of power or brightness")]
    EmptyUpdate,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
