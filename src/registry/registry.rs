// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The serial-keyed device registry.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::registry::{DeviceDescriptor, DeviceState, StateDelta};

/// One registered device: its descriptor plus last known state.
#[derive(Debug, Clone)]
struct Entry {
    descriptor: DeviceDescriptor,
    state: DeviceState,
}

#[derive(Debug, Default)]
struct Inner {
    /// Devices keyed by durable serial.
    devices: HashMap<String, Entry>,
    /// Transient remote id to serial, for routing push notifications.
    by_remote_id: HashMap<u64, String>,
}

/// In-memory registry mapping device identity to descriptor and state.
///
/// All mutation goes through the interior write lock, so updates to the
/// same device are strictly ordered; readers never observe a partial
/// merge.
///
/// # Examples
///
/// ```
/// use decora_bridge::registry::{DeviceRegistry, DeviceDescriptor, StateDelta};
/// use decora_bridge::types::{CapabilityProfile, PowerState};
///
/// let registry = DeviceRegistry::new();
/// registry.upsert(DeviceDescriptor {
///     remote_id: 5,
///     serial: "S5".to_string(),
///     name: "Hallway".to_string(),
///     model: "DW15S".to_string(),
///     manufacturer: None,
///     firmware_version: None,
///     profile: CapabilityProfile::Switch,
/// });
///
/// let state = registry
///     .apply_state("S5", &StateDelta { power: Some(PowerState::On), ..Default::default() })
///     .unwrap();
/// assert_eq!(state.power, Some(PowerState::On));
/// ```
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    inner: RwLock<Inner>,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device if its serial is unseen.
    ///
    /// If the serial is already present this is a no-op and the existing
    /// record wins, which makes re-registration across restarts safe.
    ///
    /// Returns `true` if the device was inserted.
    pub fn upsert(&self, descriptor: DeviceDescriptor) -> bool {
        let mut inner = self.inner.write();
        if inner.devices.contains_key(&descriptor.serial) {
            tracing::debug!(serial = %descriptor.serial, "Device already registered");
            return false;
        }

        inner
            .by_remote_id
            .insert(descriptor.remote_id, descriptor.serial.clone());
        inner.devices.insert(
            descriptor.serial.clone(),
            Entry {
                descriptor,
                state: DeviceState::new(),
            },
        );
        true
    }

    /// Looks a device up by its durable serial.
    #[must_use]
    pub fn find(&self, serial: &str) -> Option<DeviceDescriptor> {
        self.inner
            .read()
            .devices
            .get(serial)
            .map(|entry| entry.descriptor.clone())
    }

    /// Looks a device up by its transient remote id.
    ///
    /// Used to route inbound push notifications, which are keyed by id.
    #[must_use]
    pub fn find_by_remote_id(&self, remote_id: u64) -> Option<DeviceDescriptor> {
        let inner = self.inner.read();
        let serial = inner.by_remote_id.get(&remote_id)?;
        inner
            .devices
            .get(serial)
            .map(|entry| entry.descriptor.clone())
    }

    /// Returns the last known state of a device.
    #[must_use]
    pub fn state(&self, serial: &str) -> Option<DeviceState> {
        self.inner
            .read()
            .devices
            .get(serial)
            .map(|entry| entry.state.clone())
    }

    /// Merges a partial delta into a device's state.
    ///
    /// Fields absent from the delta are left unchanged. Returns the
    /// resulting full state, or `None` if the serial is unknown.
    pub fn apply_state(&self, serial: &str, delta: &StateDelta) -> Option<DeviceState> {
        self.apply_state_notify(serial, delta, |_| {})
    }

    /// Merges a partial delta and invokes `notify` with the result while
    /// the write lock is still held.
    ///
    /// Observers driven from `notify` therefore see updates to the same
    /// device in commit order; two racing updates can never publish their
    /// results inverted. `notify` must not block or re-enter the registry.
    pub fn apply_state_notify<F>(
        &self,
        serial: &str,
        delta: &StateDelta,
        notify: F,
    ) -> Option<DeviceState>
    where
        F: FnOnce(&DeviceState),
    {
        let mut inner = self.inner.write();
        let entry = inner.devices.get_mut(serial)?;
        entry.state.apply(delta);
        notify(&entry.state);
        Some(entry.state.clone())
    }

    /// Removes a device, e.g. after the remote reports it gone.
    ///
    /// Returns `true` if the device was present.
    pub fn remove(&self, serial: &str) -> bool {
        let mut inner = self.inner.write();
        let Some(entry) = inner.devices.remove(serial) else {
            return false;
        };
        inner.by_remote_id.remove(&entry.descriptor.remote_id);
        true
    }

    /// Returns all known serials.
    #[must_use]
    pub fn serials(&self) -> Vec<String> {
        self.inner.read().devices.keys().cloned().collect()
    }

    /// Returns all known remote ids, for push subscription setup.
    #[must_use]
    pub fn remote_ids(&self) -> Vec<u64> {
        self.inner
            .read()
            .devices
            .values()
            .map(|entry| entry.descriptor.remote_id)
            .collect()
    }

    /// Returns all registered descriptors.
    #[must_use]
    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        self.inner
            .read()
            .devices
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Returns the number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    /// Returns `true` if no devices are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().devices.is_empty()
    }
}
