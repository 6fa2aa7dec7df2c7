// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed client for the My Leviton cloud API.

mod client;
mod types;

pub use client::{ApiClient, ApiConfig};
pub use types::{
    Account, Permission, RawSwitch, Residence, Session, SwitchState, SwitchUpdate,
};
