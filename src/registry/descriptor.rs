// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device descriptors and tracked state.

use serde::{Deserialize, Serialize};

use crate::api::{RawSwitch, SwitchState};
use crate::push::PushNotification;
use crate::types::{Brightness, CapabilityProfile, LevelBounds, PowerState};

/// Identity and static metadata of one remote device.
///
/// `serial` is the durable identity key; `remote_id` is the vendor's
/// session-scoped numeric identifier used for read/write/subscribe calls
/// and may be reassigned across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Transient remote identifier.
    pub remote_id: u64,
    /// Stable hardware serial number.
    pub serial: String,
    /// Display name.
    pub name: String,
    /// Vendor model string.
    pub model: String,
    /// Manufacturer, if reported.
    pub manufacturer: Option<String>,
    /// Firmware version, if reported.
    pub firmware_version: Option<String>,
    /// Capability profile derived from the model string. Fixed after
    /// creation.
    pub profile: CapabilityProfile,
}

impl From<&RawSwitch> for DeviceDescriptor {
    fn from(raw: &RawSwitch) -> Self {
        Self {
            remote_id: raw.id,
            serial: raw.serial.clone(),
            name: raw.name.clone(),
            model: raw.model.clone(),
            manufacturer: raw.manufacturer.clone(),
            firmware_version: raw.version.clone(),
            profile: CapabilityProfile::classify(&raw.model),
        }
    }
}

/// Last known state of one device.
///
/// All fields are optional because state may not be known until the
/// remote reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Power state.
    pub power: Option<PowerState>,
    /// Brightness/speed level.
    pub brightness: Option<Brightness>,
    /// Device-reported lower level bound.
    pub min_level: Option<u8>,
    /// Device-reported upper level bound.
    pub max_level: Option<u8>,
}

impl DeviceState {
    /// Creates an empty (unknown) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a partial delta into this state.
    ///
    /// Fields absent in the delta are left unchanged. Applying the same
    /// delta twice yields the same state as applying it once.
    pub fn apply(&mut self, delta: &StateDelta) {
        if let Some(power) = delta.power {
            self.power = Some(power);
        }
        if let Some(brightness) = delta.brightness {
            self.brightness = Some(brightness);
        }
        if let Some(min) = delta.min_level {
            self.min_level = Some(min);
        }
        if let Some(max) = delta.max_level {
            self.max_level = Some(max);
        }
    }

    /// Derives the operable level bounds for a profile from this state.
    ///
    /// Unknown device bounds default to the full 0-100 range.
    #[must_use]
    pub fn level_bounds(&self, profile: CapabilityProfile) -> Option<LevelBounds> {
        profile.level_bounds(self.min_level.unwrap_or(0), self.max_level.unwrap_or(100))
    }
}

/// A partial state update from either update path.
///
/// Produced from write-command responses, device reads, and push
/// notifications alike, so both paths funnel through the same merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    /// New power state, if changed.
    pub power: Option<PowerState>,
    /// New brightness, if changed.
    pub brightness: Option<Brightness>,
    /// New lower level bound, if reported.
    pub min_level: Option<u8>,
    /// New upper level bound, if reported.
    pub max_level: Option<u8>,
}

impl From<&SwitchState> for StateDelta {
    fn from(state: &SwitchState) -> Self {
        Self {
            power: state.power,
            brightness: state.brightness,
            min_level: state.min_level,
            max_level: state.max_level,
        }
    }
}

impl From<&PushNotification> for StateDelta {
    fn from(event: &PushNotification) -> Self {
        Self {
            power: Some(event.power),
            brightness: event.brightness,
            min_level: None,
            max_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_switch(model: &str) -> RawSwitch {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "serial": "S5",
            "name": "Hallway",
            "model": model,
            "manufacturer": "Leviton",
            "version": "1.2.3"
        }))
        .unwrap()
    }

    #[test]
    fn descriptor_classifies_model() {
        let descriptor = DeviceDescriptor::from(&raw_switch("DW4SF"));
        assert_eq!(descriptor.profile, CapabilityProfile::Fan);
        assert_eq!(descriptor.remote_id, 5);
        assert_eq!(descriptor.serial, "S5");

        let descriptor = DeviceDescriptor::from(&raw_switch("DW15S"));
        assert_eq!(descriptor.profile, CapabilityProfile::Switch);
    }

    #[test]
    fn apply_merges_partial_delta() {
        let mut state = DeviceState::new();
        state.apply(&StateDelta {
            power: Some(PowerState::On),
            brightness: Some(Brightness::new(40).unwrap()),
            min_level: Some(1),
            max_level: Some(100),
        });

        // Power-only delta leaves brightness and bounds untouched.
        state.apply(&StateDelta {
            power: Some(PowerState::Off),
            ..StateDelta::default()
        });

        assert_eq!(state.power, Some(PowerState::Off));
        assert_eq!(state.brightness, Some(Brightness::new(40).unwrap()));
        assert_eq!(state.min_level, Some(1));
        assert_eq!(state.max_level, Some(100));
    }

    #[test]
    fn apply_is_idempotent() {
        let delta = StateDelta {
            power: Some(PowerState::On),
            ..StateDelta::default()
        };

        let mut once = DeviceState::new();
        once.apply(&delta);

        let mut twice = DeviceState::new();
        twice.apply(&delta);
        twice.apply(&delta);

        assert_eq!(once, twice);
    }

    #[test]
    fn delta_from_push_notification() {
        let event = PushNotification {
            device_id: 5,
            power: PowerState::Off,
            brightness: None,
        };
        let delta = StateDelta::from(&event);
        assert_eq!(delta.power, Some(PowerState::Off));
        assert!(delta.brightness.is_none());
        assert!(delta.min_level.is_none());
    }

    #[test]
    fn fan_bounds_from_reported_state() {
        let mut state = DeviceState::new();
        state.apply(&StateDelta {
            power: Some(PowerState::On),
            brightness: Some(Brightness::new(40).unwrap()),
            min_level: Some(1),
            max_level: Some(100),
        });

        let bounds = state.level_bounds(CapabilityProfile::Fan).unwrap();
        assert_eq!(bounds, LevelBounds { min: 0, max: 100, step: 1 });
    }

    #[test]
    fn unknown_bounds_default_to_full_range() {
        let state = DeviceState::new();
        let bounds = state.level_bounds(CapabilityProfile::Lightbulb).unwrap();
        assert_eq!(bounds, LevelBounds { min: 0, max: 100, step: 1 });
    }
}
