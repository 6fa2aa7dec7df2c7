// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State reconciliation between push notifications and command results.
//!
//! Two independent paths produce state updates: direct write calls the
//! accessory host issues (whose results the remote has already confirmed)
//! and asynchronous push notifications caused by other clients. Both
//! funnel through the [`Reconciler`], which serializes mutations per
//! device via the registry lock and notifies observers after each commit.
//!
//! The policy is last-write-wins by arrival order. The remote is the
//! single source of truth: local writes are round-tripped through it
//! before being applied, never optimistically, so whichever update
//! arrives simply overwrites the fields it carries.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::SwitchState;
use crate::event::{BridgeEvent, EventBus};
use crate::push::PushNotification;
use crate::registry::{DeviceRegistry, DeviceState, StateDelta};

/// Applies state updates to the registry and publishes change events.
#[derive(Debug, Clone)]
pub struct Reconciler {
    registry: Arc<DeviceRegistry>,
    events: EventBus,
}

impl Reconciler {
    /// Creates a reconciler over a registry and event bus.
    #[must_use]
    pub fn new(registry: Arc<DeviceRegistry>, events: EventBus) -> Self {
        Self { registry, events }
    }

    /// Applies an inbound push notification.
    ///
    /// The notification is keyed by the transient remote id; it is routed
    /// to the owning serial through the registry. Notifications for
    /// unknown devices are logged and dropped.
    ///
    /// Returns the resulting full state if the device is known.
    pub fn apply_push(&self, event: &PushNotification) -> Option<DeviceState> {
        let Some(descriptor) = self.registry.find_by_remote_id(event.device_id) else {
            tracing::warn!(
                device_id = event.device_id,
                "Push notification for unknown device"
            );
            return None;
        };

        tracing::debug!(
            serial = %descriptor.serial,
            power = %event.power,
            brightness = ?event.brightness,
            "Applying push notification"
        );

        self.commit(&descriptor.serial, &StateDelta::from(event))
    }

    /// Applies the confirmed result of a direct write or read.
    ///
    /// Returns the resulting full state if the device is known.
    pub fn apply_command_result(&self, serial: &str, result: &SwitchState) -> Option<DeviceState> {
        self.commit(serial, &StateDelta::from(result))
    }

    fn commit(&self, serial: &str, delta: &StateDelta) -> Option<DeviceState> {
        // Publishing while the registry lock is held keeps the event order
        // identical to the commit order; broadcast sends never block.
        self.registry.apply_state_notify(serial, delta, |state| {
            self.events.publish(BridgeEvent::StateChanged {
                serial: serial.to_string(),
                state: state.clone(),
            });
        })
    }

    /// Drains push notifications until the channel closes.
    ///
    /// Intended to run as the single background task consuming the push
    /// channel's receiver.
    pub async fn run(self, mut notifications: mpsc::Receiver<PushNotification>) {
        while let Some(event) = notifications.recv().await {
            self.apply_push(&event);
        }
        tracing::debug!("Push notification stream ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DeviceDescriptor;
    use crate::types::{Brightness, CapabilityProfile, PowerState};

    fn setup() -> (Arc<DeviceRegistry>, EventBus, Reconciler) {
        let registry = Arc::new(DeviceRegistry::new());
        registry.upsert(DeviceDescriptor {
            remote_id: 5,
            serial: "S5".to_string(),
            name: "Hallway".to_string(),
            model: "DW6HD".to_string(),
            manufacturer: None,
            firmware_version: None,
            profile: CapabilityProfile::Lightbulb,
        });
        let events = EventBus::new();
        let reconciler = Reconciler::new(Arc::clone(&registry), events.clone());
        (registry, events, reconciler)
    }

    #[tokio::test]
    async fn push_notification_updates_state_and_notifies() {
        let (_registry, events, reconciler) = setup();
        let mut rx = events.subscribe();

        // Seed brightness via a command result first.
        reconciler.apply_command_result(
            "S5",
            &SwitchState {
                power: Some(PowerState::On),
                brightness: Some(Brightness::new(40).unwrap()),
                min_level: Some(1),
                max_level: Some(100),
            },
        );
        let _ = rx.recv().await.unwrap();

        // Push delta without brightness leaves it unchanged.
        let state = reconciler
            .apply_push(&PushNotification {
                device_id: 5,
                power: PowerState::Off,
                brightness: None,
            })
            .unwrap();
        assert_eq!(state.power, Some(PowerState::Off));
        assert_eq!(state.brightness, Some(Brightness::new(40).unwrap()));

        let event = rx.recv().await.unwrap();
        let BridgeEvent::StateChanged { serial, state } = event else {
            panic!("expected state change event");
        };
        assert_eq!(serial, "S5");
        assert_eq!(state.power, Some(PowerState::Off));
    }

    #[test]
    fn push_for_unknown_device_is_dropped() {
        let (registry, _events, reconciler) = setup();

        let result = reconciler.apply_push(&PushNotification {
            device_id: 99,
            power: PowerState::On,
            brightness: None,
        });
        assert!(result.is_none());
        assert_eq!(registry.state("S5").unwrap(), DeviceState::new());
    }

    #[test]
    fn updates_apply_in_arrival_order() {
        let (_registry, _events, reconciler) = setup();

        // t1: command result, t2: push notification.
        reconciler.apply_command_result(
            "S5",
            &SwitchState {
                power: Some(PowerState::On),
                brightness: Some(Brightness::new(80).unwrap()),
                min_level: None,
                max_level: None,
            },
        );
        let state = reconciler
            .apply_push(&PushNotification {
                device_id: 5,
                power: PowerState::Off,
                brightness: None,
            })
            .unwrap();

        // t2's payload merged onto t1's result, never a reordered mixture.
        assert_eq!(state.power, Some(PowerState::Off));
        assert_eq!(state.brightness, Some(Brightness::new(80).unwrap()));
    }

    #[tokio::test]
    async fn run_drains_notification_channel() {
        let (registry, _events, reconciler) = setup();
        let (tx, rx) = mpsc::channel(8);

        let task = tokio::spawn(reconciler.run(rx));
        tx.send(PushNotification {
            device_id: 5,
            power: PowerState::On,
            brightness: Some(Brightness::new(25).unwrap()),
        })
        .await
        .unwrap();
        drop(tx);
        task.await.unwrap();

        let state = registry.state("S5").unwrap();
        assert_eq!(state.power, Some(PowerState::On));
        assert_eq!(state.brightness, Some(Brightness::new(25).unwrap()));
    }
}
