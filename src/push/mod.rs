// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push notification channel.
//!
//! The vendor delivers asynchronous device state updates as JSON text
//! frames over a persistent WebSocket connection. This module implements
//! the single message protocol the vendor speaks: a token handshake,
//! per-device subscriptions, and notification decoding.

mod channel;
mod frame;

pub use channel::{ChannelPhase, Handshake, PushChannel, PushConfig};
pub use frame::{InboundFrame, Notification, NotificationData, OutboundFrame};

use crate::types::{Brightness, PowerState};

/// A decoded state-delta event from a notification frame.
///
/// Keyed by the transient remote id; the reconciliation engine routes it
/// to the owning device via the registry's id index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushNotification {
    /// Remote numeric device identifier.
    pub device_id: u64,
    /// New power state.
    pub power: PowerState,
    /// New brightness, when the frame carried one.
    pub brightness: Option<Brightness>,
}
