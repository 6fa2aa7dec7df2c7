// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from capability profiles to accessory shapes.
//!
//! The accessory host renders each device as a service with
//! characteristics. This module is the explicit profile-to-shape table:
//! it takes a profile and the device's reported state and returns the
//! service kind plus the optional level dimension with its bounds,
//! without any global service/characteristic registry.

use uuid::Uuid;

use crate::registry::DeviceState;
use crate::types::{CapabilityProfile, LevelBounds};

/// The service an accessory exposes for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// Plain on/off switch service.
    Switch,
    /// Outlet service.
    Outlet,
    /// Lightbulb service.
    Lightbulb,
    /// Fan service.
    Fan,
}

/// Which characteristic renders the level dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelCharacteristic {
    /// Brightness percentage on a lightbulb.
    Brightness,
    /// Rotation speed on a fan.
    RotationSpeed,
}

/// The level dimension of an accessory, if the profile has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDimension {
    /// The characteristic to render the level as.
    pub characteristic: LevelCharacteristic,
    /// Operable bounds derived from device-reported metadata.
    pub bounds: LevelBounds,
}

/// The full renderable shape of one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessoryShape {
    /// The service kind.
    pub service: ServiceKind,
    /// The level dimension, for profiles that carry one.
    pub level: Option<LevelDimension>,
}

impl AccessoryShape {
    /// Derives the accessory shape for a profile and reported state.
    #[must_use]
    pub fn for_profile(profile: CapabilityProfile, state: &DeviceState) -> Self {
        let service = match profile {
            CapabilityProfile::Switch => ServiceKind::Switch,
            CapabilityProfile::Outlet => ServiceKind::Outlet,
            CapabilityProfile::Lightbulb => ServiceKind::Lightbulb,
            CapabilityProfile::Fan => ServiceKind::Fan,
        };

        let level = state.level_bounds(profile).map(|bounds| LevelDimension {
            characteristic: match profile {
                CapabilityProfile::Fan => LevelCharacteristic::RotationSpeed,
                _ => LevelCharacteristic::Brightness,
            },
            bounds,
        });

        Self { service, level }
    }
}

/// Derives a stable accessory UUID from the durable serial.
///
/// The same serial always yields the same UUID, so accessory records
/// survive restarts even when the vendor reassigns remote ids.
#[must_use]
pub fn accessory_uuid(serial: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, serial.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StateDelta;
    use crate::types::{Brightness, PowerState};

    fn reported_state(min_level: u8, max_level: u8) -> DeviceState {
        let mut state = DeviceState::new();
        state.apply(&StateDelta {
            power: Some(PowerState::On),
            brightness: Some(Brightness::new(40).unwrap()),
            min_level: Some(min_level),
            max_level: Some(max_level),
        });
        state
    }

    #[test]
    fn switch_shape_has_no_level() {
        let shape = AccessoryShape::for_profile(CapabilityProfile::Switch, &DeviceState::new());
        assert_eq!(shape.service, ServiceKind::Switch);
        assert!(shape.level.is_none());
    }

    #[test]
    fn outlet_shape_has_no_level() {
        let shape = AccessoryShape::for_profile(CapabilityProfile::Outlet, &DeviceState::new());
        assert_eq!(shape.service, ServiceKind::Outlet);
        assert!(shape.level.is_none());
    }

    #[test]
    fn lightbulb_maps_level_to_brightness() {
        let shape = AccessoryShape::for_profile(CapabilityProfile::Lightbulb, &reported_state(10, 90));
        assert_eq!(shape.service, ServiceKind::Lightbulb);
        let level = shape.level.unwrap();
        assert_eq!(level.characteristic, LevelCharacteristic::Brightness);
        assert_eq!(level.bounds, LevelBounds { min: 10, max: 90, step: 1 });
    }

    #[test]
    fn fan_maps_level_to_rotation_speed() {
        let shape = AccessoryShape::for_profile(CapabilityProfile::Fan, &reported_state(1, 100));
        assert_eq!(shape.service, ServiceKind::Fan);
        let level = shape.level.unwrap();
        assert_eq!(level.characteristic, LevelCharacteristic::RotationSpeed);
        assert_eq!(level.bounds, LevelBounds { min: 0, max: 100, step: 1 });
    }

    #[test]
    fn accessory_uuid_is_stable_per_serial() {
        assert_eq!(accessory_uuid("S5"), accessory_uuid("S5"));
        assert_ne!(accessory_uuid("S5"), accessory_uuid("S7"));
    }
}
