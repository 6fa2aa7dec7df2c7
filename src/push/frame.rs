// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire frames of the push protocol.

use serde::{Deserialize, Serialize};

use crate::types::{Brightness, PowerState};

/// Frames sent to the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundFrame {
    /// Token handshake, sent on connect and in answer to every challenge.
    Auth {
        /// The session token.
        token: String,
    },
    /// Per-device subscription request.
    Subscribe {
        /// Always `"subscribe"`.
        #[serde(rename = "type")]
        kind: &'static str,
        /// The model being subscribed to.
        subscription: Subscription,
    },
}

impl OutboundFrame {
    /// Creates a token handshake frame.
    #[must_use]
    pub fn auth(token: impl Into<String>) -> Self {
        Self::Auth {
            token: token.into(),
        }
    }

    /// Creates a subscription frame for one device.
    #[must_use]
    pub fn subscribe(device_id: u64) -> Self {
        Self::Subscribe {
            kind: "subscribe",
            subscription: Subscription {
                model_name: "IotSwitch",
                model_id: device_id,
            },
        }
    }
}

/// Subscription target inside an [`OutboundFrame::Subscribe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Vendor model class; always `"IotSwitch"`.
    pub model_name: &'static str,
    /// Remote numeric device identifier.
    pub model_id: u64,
}

/// Frames received from the notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InboundFrame {
    /// The endpoint demands a token resend.
    Challenge,
    /// Connection status report.
    Status {
        /// Status value; `"ready"` unlocks subscriptions.
        status: String,
    },
    /// A device state notification.
    Notification {
        /// The notification payload.
        notification: Notification,
    },
}

/// Payload of a notification frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Remote numeric device identifier.
    pub model_id: u64,
    /// The state fields that changed.
    pub data: NotificationData,
}

/// State fields carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationData {
    /// New power state, if the frame carries one.
    #[serde(default)]
    pub power: Option<PowerState>,
    /// New brightness, if the frame carries one.
    #[serde(default)]
    pub brightness: Option<Brightness>,
}
