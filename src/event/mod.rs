// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bridge events for the accessory host.

mod event_bus;

pub use event_bus::EventBus;

use crate::registry::{DeviceDescriptor, DeviceState};

/// Events emitted toward the accessory host.
///
/// State change events are notifications, not requests: they describe
/// registry state that has already been committed, and the host renders
/// them rather than accepting or rejecting them.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    /// A device was registered.
    DeviceAdded {
        /// The new device's descriptor.
        descriptor: DeviceDescriptor,
    },

    /// A device was pruned, e.g. after the remote reported it gone.
    DeviceRemoved {
        /// Serial of the removed device.
        serial: String,
    },

    /// A device's state changed.
    ///
    /// Emitted after every committed update, whether it came from a
    /// command result or a push notification.
    StateChanged {
        /// Serial of the device.
        serial: String,
        /// The complete new state.
        state: DeviceState,
    },
}

impl BridgeEvent {
    /// Returns the serial of the device this event concerns.
    #[must_use]
    pub fn serial(&self) -> &str {
        match self {
            Self::DeviceAdded { descriptor } => &descriptor.serial,
            Self::DeviceRemoved { serial } | Self::StateChanged { serial, .. } => serial,
        }
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Returns `true` if this is a lifecycle event (added/removed).
    #[must_use]
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Self::DeviceAdded { .. } | Self::DeviceRemoved { .. })
    }
}
