// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bridge façade tying all components together.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::accessory::AccessoryShape;
use crate::api::{ApiClient, Session, SwitchUpdate};
use crate::config::BridgeConfig;
use crate::error::{ApiError, Error, Result};
use crate::event::{BridgeEvent, EventBus};
use crate::push::{ChannelPhase, PushChannel};
use crate::reconcile::Reconciler;
use crate::registry::{DeviceDescriptor, DeviceRegistry, DeviceState, StateDelta};
use crate::resolve::{self, ResidenceContext};
use crate::types::{Brightness, PowerState};

/// A connected bridge between the vendor cloud and an accessory host.
///
/// [`Bridge::connect`] resolves the identity chain once, seeds the device
/// registry, fetches each device's initial state, and opens the push
/// channel subscribed to every known device. From then on push
/// notifications and command results both flow through the reconciliation
/// engine, and every committed update is broadcast as a
/// [`BridgeEvent::StateChanged`].
///
/// Writes round-trip through the remote: the local state only updates
/// after the remote confirms the write, never optimistically.
///
/// # Examples
///
/// ```no_run
/// use decora_bridge::{Bridge, BridgeConfig};
/// use decora_bridge::types::PowerState;
///
/// # async fn example() -> decora_bridge::Result<()> {
/// let bridge = Bridge::connect(BridgeConfig::new("user@example.com", "hunter2")).await?;
///
/// let mut events = bridge.subscribe();
/// for serial in bridge.known_serials() {
///     println!("device: {serial}");
/// }
///
/// let serial = bridge.known_serials().remove(0);
/// bridge.set_power(&serial, PowerState::On).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bridge {
    api: ApiClient,
    session: Session,
    context: ResidenceContext,
    registry: Arc<DeviceRegistry>,
    events: EventBus,
    reconciler: Reconciler,
    push: Option<PushChannel>,
    reconcile_task: Option<JoinHandle<()>>,
}

impl Bridge {
    /// Connects to the vendor cloud and brings the bridge live.
    ///
    /// A device whose initial state read fails is kept with unknown
    /// state; the failure is logged and does not abort startup.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolve` if the identity chain cannot be resolved
    /// (bad credentials, no permissions, no devices), `Error::Push` if
    /// the push channel cannot be opened.
    pub async fn connect(config: BridgeConfig) -> Result<Self> {
        let api = config.api().clone().into_client()?;
        let resolution = resolve::resolve(&api, config.email(), config.password()).await?;

        let registry = Arc::new(DeviceRegistry::new());
        let events = EventBus::new();
        let reconciler = Reconciler::new(Arc::clone(&registry), events.clone());

        for raw in &resolution.devices {
            let descriptor = DeviceDescriptor::from(raw);
            let serial = descriptor.serial.clone();
            if registry.upsert(descriptor.clone()) {
                events.publish(BridgeEvent::DeviceAdded { descriptor });
            }

            // Listings may already carry state fields; take them as the
            // baseline before the per-device read.
            let seed = StateDelta {
                power: raw.power,
                brightness: raw.brightness,
                min_level: raw.min_level,
                max_level: raw.max_level,
            };
            if seed != StateDelta::default() {
                registry.apply_state(&serial, &seed);
            }

            match api.switch_state(raw.id, resolution.session.token()).await {
                Ok(state) => {
                    reconciler.apply_command_result(&serial, &state);
                }
                // Listed but already gone remotely: prune before the push
                // subscriptions are built.
                Err(ApiError::NotFound { .. }) => {
                    tracing::warn!(serial = %serial, "Device removed remotely, pruning");
                    if registry.remove(&serial) {
                        events.publish(BridgeEvent::DeviceRemoved { serial });
                    }
                }
                Err(e) => {
                    tracing::warn!(serial = %serial, error = %e, "Initial state read failed");
                }
            }
        }

        let (push, notifications) = PushChannel::connect(
            config.push(),
            resolution.session.token(),
            registry.remote_ids(),
        )
        .await?;
        let reconcile_task = tokio::spawn(reconciler.clone().run(notifications));

        tracing::info!(
            devices = registry.len(),
            residence_id = %resolution.context.residence_id,
            "Bridge connected"
        );

        Ok(Self {
            api,
            session: resolution.session,
            context: resolution.context,
            registry,
            events,
            reconciler,
            push: Some(push),
            reconcile_task: Some(reconcile_task),
        })
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Subscribes to bridge events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    /// Returns the serials of all known devices.
    #[must_use]
    pub fn known_serials(&self) -> Vec<String> {
        self.registry.serials()
    }

    /// Returns all registered device descriptors.
    #[must_use]
    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        self.registry.descriptors()
    }

    /// Looks a device up by serial.
    #[must_use]
    pub fn descriptor(&self, serial: &str) -> Option<DeviceDescriptor> {
        self.registry.find(serial)
    }

    /// Returns the last known state of a device.
    ///
    /// The registry is the single owner of device state; hosts should
    /// query it rather than caching independently.
    #[must_use]
    pub fn state(&self, serial: &str) -> Option<DeviceState> {
        self.registry.state(serial)
    }

    /// Derives the renderable accessory shape for a device.
    #[must_use]
    pub fn accessory_shape(&self, serial: &str) -> Option<AccessoryShape> {
        let descriptor = self.registry.find(serial)?;
        let state = self.registry.state(serial)?;
        Some(AccessoryShape::for_profile(descriptor.profile, &state))
    }

    /// Returns the account/residence context resolved at startup.
    #[must_use]
    pub fn context(&self) -> &ResidenceContext {
        &self.context
    }

    /// Returns the push channel phase, or `None` after shutdown.
    #[must_use]
    pub fn push_phase(&self) -> Option<ChannelPhase> {
        self.push.as_ref().map(PushChannel::phase)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Sets a device's power state.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` for an unknown serial, or the
    /// underlying API failure. A remote 404 prunes the device.
    pub async fn set_power(&self, serial: &str, state: PowerState) -> Result<DeviceState> {
        self.write(serial, SwitchUpdate::power(state)).await
    }

    /// Sets a device's brightness or fan speed.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` for an unknown serial, or the
    /// underlying API failure. A remote 404 prunes the device.
    pub async fn set_brightness(&self, serial: &str, level: Brightness) -> Result<DeviceState> {
        self.write(serial, SwitchUpdate::brightness(level)).await
    }

    /// Applies an arbitrary partial update to a device.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` for an unknown serial, or the
    /// underlying API failure. A remote 404 prunes the device.
    pub async fn set_state(&self, serial: &str, update: SwitchUpdate) -> Result<DeviceState> {
        self.write(serial, update).await
    }

    /// Re-reads a device's state from the remote and commits it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` for an unknown serial, or the
    /// underlying API failure. A remote 404 prunes the device.
    pub async fn refresh(&self, serial: &str) -> Result<DeviceState> {
        let descriptor = self.lookup(serial)?;

        let state = match self
            .api
            .switch_state(descriptor.remote_id, self.session.token())
            .await
        {
            Ok(state) => state,
            Err(e) => return Err(self.map_device_error(serial, e)),
        };

        self.reconciler
            .apply_command_result(serial, &state)
            .ok_or_else(|| Error::UnknownDevice(serial.to_string()))
    }

    async fn write(&self, serial: &str, update: SwitchUpdate) -> Result<DeviceState> {
        let descriptor = self.lookup(serial)?;

        let result = match self
            .api
            .set_switch_state(descriptor.remote_id, self.session.token(), &update)
            .await
        {
            Ok(result) => result,
            Err(e) => return Err(self.map_device_error(serial, e)),
        };

        // The remote confirmed the write; only now does local state move.
        self.reconciler
            .apply_command_result(serial, &result)
            .ok_or_else(|| Error::UnknownDevice(serial.to_string()))
    }

    fn lookup(&self, serial: &str) -> Result<DeviceDescriptor> {
        self.registry
            .find(serial)
            .ok_or_else(|| Error::UnknownDevice(serial.to_string()))
    }

    /// Prunes devices the remote reports gone; passes other errors through.
    fn map_device_error(&self, serial: &str, error: ApiError) -> Error {
        if matches!(error, ApiError::NotFound { .. }) {
            tracing::warn!(serial = %serial, "Device removed remotely, pruning");
            if self.registry.remove(serial) {
                self.events.publish(BridgeEvent::DeviceRemoved {
                    serial: serial.to_string(),
                });
            }
        }
        error.into()
    }

    // =========================================================================
    // Shutdown
    // =========================================================================

    /// Shuts the bridge down, closing the push channel and stopping the
    /// reconciliation task. Safe to call at any time.
    pub async fn shutdown(mut self) {
        if let Some(push) = self.push.take() {
            push.close().await;
        }
        // The reconcile task ends once the push loop drops its sender.
        if let Some(task) = self.reconcile_task.take() {
            let _ = task.await;
        }
        tracing::info!("Bridge shut down");
    }
}
