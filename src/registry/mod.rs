// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory device registry.
//!
//! The registry exclusively owns every descriptor and state record for the
//! process lifetime. Devices are keyed by their durable hardware serial;
//! the transient remote id is only a secondary index used to route push
//! notifications.

mod descriptor;
#[allow(clippy::module_inception)]
mod registry;

pub use descriptor::{DeviceDescriptor, DeviceState, StateDelta};
pub use registry::DeviceRegistry;
