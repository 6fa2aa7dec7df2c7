// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types for Decora Smart devices.

mod brightness;
mod capability;
mod power;

pub use brightness::Brightness;
pub use capability::{CapabilityProfile, LevelBounds};
pub use power::PowerState;
