// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capability profiles for Decora Smart device models.
//!
//! Every remote device is mapped onto exactly one of four fixed profiles
//! based on its model string. Unrecognized models fall back to the plain
//! switch profile so that every device remains representable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Model strings that classify as fan speed controls.
const FAN_MODELS: &[&str] = &[
    // DW4SF: Fan Speed Control
    "DW4SF",
];

/// Model strings that classify as dimmable lights.
const LIGHTBULB_MODELS: &[&str] = &[
    // DWVAA: Voice Dimmer with Amazon Alexa
    "DWVAA",
    // DW1KD: 1000W Dimmer
    "DW1KD",
    // DW6HD: 600W Dimmer
    "DW6HD",
    // D26HD: 600W Dimmer (2nd Gen)
    "D26HD",
    // DW3HL: Plug-In Dimmer
    "DW3HL",
];

/// Model strings that classify as outlets.
const OUTLET_MODELS: &[&str] = &[
    // DW15R: Tamper Resistant Outlet
    "DW15R",
    // DW15A: Plug-in Outlet (1/2 HP)
    "DW15A",
    // DW15P: Plug-in Outlet (3/4 HP)
    "DW15P",
];

/// The fixed local representation a device is mapped to for control.
///
/// # Examples
///
/// ```
/// use decora_bridge::types::CapabilityProfile;
///
/// assert_eq!(CapabilityProfile::classify("DW4SF"), CapabilityProfile::Fan);
/// assert_eq!(CapabilityProfile::classify("DW6HD"), CapabilityProfile::Lightbulb);
/// assert_eq!(CapabilityProfile::classify("DW15R"), CapabilityProfile::Outlet);
/// // Unknown models are always plain switches.
/// assert_eq!(CapabilityProfile::classify("DW15S"), CapabilityProfile::Switch);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityProfile {
    /// On/off wall switch. Default for unrecognized models.
    Switch,
    /// On/off receptacle outlet.
    Outlet,
    /// Dimmable light with a brightness dimension.
    Lightbulb,
    /// Fan speed control with a speed dimension.
    Fan,
}

impl CapabilityProfile {
    /// Classifies a model string into a capability profile.
    ///
    /// Total function: any string not in the fixed tables maps to
    /// [`CapabilityProfile::Switch`].
    #[must_use]
    pub fn classify(model: &str) -> Self {
        if FAN_MODELS.contains(&model) {
            Self::Fan
        } else if LIGHTBULB_MODELS.contains(&model) {
            Self::Lightbulb
        } else if OUTLET_MODELS.contains(&model) {
            Self::Outlet
        } else {
            Self::Switch
        }
    }

    /// Returns `true` if this profile carries a brightness/speed dimension.
    #[must_use]
    pub const fn has_level(&self) -> bool {
        matches!(self, Self::Lightbulb | Self::Fan)
    }

    /// Derives the operable level bounds for this profile.
    ///
    /// `min_level` and `max_level` are the device-reported bounds:
    /// - Lightbulb: brightness ranges over `min_level..=max_level`, step 1.
    /// - Fan: speed ranges over `0..=max_level`; `min_level` is the step
    ///   size between supported speeds.
    /// - Switch and Outlet have no level dimension.
    #[must_use]
    pub const fn level_bounds(&self, min_level: u8, max_level: u8) -> Option<LevelBounds> {
        match self {
            Self::Lightbulb => Some(LevelBounds {
                min: min_level,
                max: max_level,
                step: 1,
            }),
            Self::Fan => Some(LevelBounds {
                min: 0,
                max: max_level,
                step: min_level,
            }),
            Self::Switch | Self::Outlet => None,
        }
    }
}

impl fmt::Display for CapabilityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Switch => "switch",
            Self::Outlet => "outlet",
            Self::Lightbulb => "lightbulb",
            Self::Fan => "fan",
        };
        write!(f, "{name}")
    }
}

/// Operable range for a profile's brightness/speed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBounds {
    /// Lowest settable level.
    pub min: u8,
    /// Highest settable level.
    pub max: u8,
    /// Granularity between settable levels.
    pub step: u8,
}
