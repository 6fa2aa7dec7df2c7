// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decora Bridge - a Rust library to bridge Leviton Decora Smart cloud
//! devices to local accessory hosts.
//!
//! This library keeps a local registry of cloud-controlled switches,
//! dimmers, fans, and outlets in sync with the vendor's remote state,
//! without polling.
//!
//! # How it works
//!
//! - **Identity resolution**: credentials are exchanged once at startup
//!   for a session token, and a chain of dependent lookups (person ->
//!   account -> residence) discovers the controllable devices.
//! - **Push channel**: a persistent WebSocket connection delivers state
//!   notifications for every subscribed device, so changes made by other
//!   apps show up locally.
//! - **Reconciliation**: push notifications and direct command results
//!   both funnel through one engine that updates the registry and
//!   broadcasts change events.
//! - **Capability profiles**: each device model maps onto one of four
//!   fixed profiles (switch, outlet, lightbulb, fan) with consistent
//!   level-bounds semantics.
//!
//! # Quick Start
//!
//! ```no_run
//! use decora_bridge::{Bridge, BridgeConfig, BridgeEvent};
//! use decora_bridge::types::PowerState;
//!
//! #[tokio::main]
//! async fn main() -> decora_bridge::Result<()> {
//!     let bridge = Bridge::connect(BridgeConfig::new("user@example.com", "secret")).await?;
//!
//!     // React to remote state changes
//!     let mut events = bridge.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let BridgeEvent::StateChanged { serial, state } = event {
//!                 println!("{serial}: {:?}", state.power);
//!             }
//!         }
//!     });
//!
//!     // Control a device; local state updates once the cloud confirms
//!     for serial in bridge.known_serials() {
//!         bridge.set_power(&serial, PowerState::On).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod accessory;
pub mod api;
mod bridge;
mod config;
pub mod error;
pub mod event;
pub mod push;
pub mod reconcile;
pub mod registry;
pub mod resolve;
pub mod types;

pub use accessory::{accessory_uuid, AccessoryShape, LevelCharacteristic, ServiceKind};
pub use api::{ApiClient, ApiConfig, Session, SwitchUpdate};
pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{ApiError, Error, PushError, ResolveError, Result, ValueError};
pub use event::{BridgeEvent, EventBus};
pub use push::{ChannelPhase, PushChannel, PushConfig, PushNotification};
pub use reconcile::Reconciler;
pub use registry::{DeviceDescriptor, DeviceRegistry, DeviceState, StateDelta};
pub use resolve::{ResidenceContext, Resolution};
pub use types::{Brightness, CapabilityProfile, LevelBounds, PowerState};
