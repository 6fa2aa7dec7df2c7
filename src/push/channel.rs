// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Push channel connection handling.
//!
//! [`Handshake`] is the pure protocol state machine; [`PushChannel`] wires
//! it to a WebSocket connection and a background read loop. A single bad
//! frame never tears the channel down; a transport close ends the loop and
//! the channel reports `Disconnected`. No automatic reconnect happens here;
//! a supervisor can watch [`PushChannel::closed`] and rebuild the channel.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::PushError;
use crate::push::frame::{InboundFrame, OutboundFrame};
use crate::push::PushNotification;

/// Buffered notifications between the read loop and the reconciler.
const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// PushConfig
// ============================================================================

/// Configuration for the push notification endpoint.
///
/// # Examples
///
/// ```
/// use decora_bridge::push::PushConfig;
///
/// let config = PushConfig::new();
/// assert_eq!(config.url(), "wss://my.leviton.com/socket");
///
/// let local = PushConfig::new().with_url("ws://127.0.0.1:9001/socket");
/// ```
#[derive(Debug, Clone)]
pub struct PushConfig {
    url: String,
}

impl PushConfig {
    /// Production notification endpoint.
    pub const DEFAULT_URL: &'static str = "wss://my.leviton.com/socket";

    /// Creates a configuration for the production endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            url: Self::DEFAULT_URL.to_string(),
        }
    }

    /// Sets a custom endpoint URL (primarily for tests).
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handshake - pure protocol state machine
// ============================================================================

/// Connection phase of the push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPhase {
    /// Not connected (initial, or after a transport close).
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// Token sent, waiting for the ready status.
    AwaitingReady,
    /// Sending per-device subscriptions.
    Subscribing,
    /// All subscriptions sent; notifications flow.
    Live,
    /// Explicitly shut down. Terminal.
    Closed,
}

/// The push protocol state machine, independent of any transport.
///
/// Feeding frames in yields the frames to send back and the decoded
/// notifications, which makes the handshake and challenge semantics
/// testable without a socket.
#[derive(Debug)]
pub struct Handshake {
    token: String,
    device_ids: Vec<u64>,
    phase: ChannelPhase,
}

impl Handshake {
    /// Creates a state machine for a session token and the devices to
    /// subscribe to.
    #[must_use]
    pub fn new(token: impl Into<String>, device_ids: Vec<u64>) -> Self {
        Self {
            token: token.into(),
            device_ids,
            phase: ChannelPhase::Connecting,
        }
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> ChannelPhase {
        self.phase
    }

    /// Called when the transport connection is established.
    ///
    /// Returns the initial token frame to send.
    pub fn connected(&mut self) -> OutboundFrame {
        self.phase = ChannelPhase::AwaitingReady;
        OutboundFrame::auth(self.token.clone())
    }

    /// Processes one inbound text frame.
    ///
    /// Returns the frames to send back and, for notification frames, the
    /// decoded state delta. Malformed JSON and unexpected shapes are
    /// logged and dropped without changing the phase.
    ///
    /// Notification frames without a `power` value are dropped. This
    /// matches the observed vendor client behavior; brightness-only
    /// updates are currently lost on this path.
    pub fn process_frame(
        &mut self,
        text: &str,
    ) -> (Vec<OutboundFrame>, Option<PushNotification>) {
        let frame: InboundFrame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed push frame");
                return (Vec::new(), None);
            }
        };

        match frame {
            // A challenge is valid in any connected state and is answered
            // with exactly one token resend, without a phase change.
            InboundFrame::Challenge => {
                tracing::debug!("Answering push challenge");
                (vec![OutboundFrame::auth(self.token.clone())], None)
            }
            InboundFrame::Status { status } => {
                if status == "ready" && self.phase == ChannelPhase::AwaitingReady {
                    self.phase = ChannelPhase::Subscribing;
                    let frames = self
                        .device_ids
                        .iter()
                        .map(|&id| OutboundFrame::subscribe(id))
                        .collect();
                    self.phase = ChannelPhase::Live;
                    tracing::debug!(
                        devices = self.device_ids.len(),
                        "Push channel ready, subscribing"
                    );
                    (frames, None)
                } else {
                    tracing::debug!(status = %status, phase = ?self.phase, "Ignoring status frame");
                    (Vec::new(), None)
                }
            }
            InboundFrame::Notification { notification } => {
                let Some(power) = notification.data.power else {
                    tracing::debug!(
                        device_id = notification.model_id,
                        "Dropping notification without power value"
                    );
                    return (Vec::new(), None);
                };
                let event = PushNotification {
                    device_id: notification.model_id,
                    power,
                    brightness: notification.data.brightness,
                };
                (Vec::new(), Some(event))
            }
        }
    }

    /// Called when the transport closes unexpectedly.
    pub fn disconnected(&mut self) {
        self.phase = ChannelPhase::Disconnected;
    }

    /// Called on explicit shutdown.
    pub fn close(&mut self) {
        self.phase = ChannelPhase::Closed;
    }
}

// ============================================================================
// PushChannel - transport binding
// ============================================================================

/// A live push channel over a WebSocket connection.
///
/// Decoded notifications arrive on the receiver returned by
/// [`PushChannel::connect`]. Dropping the channel or calling
/// [`close`](PushChannel::close) releases the connection; closing is safe
/// in any state.
#[derive(Debug)]
pub struct PushChannel {
    phase_rx: watch::Receiver<ChannelPhase>,
    close_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PushChannel {
    /// Connects to the notification endpoint, performs the token
    /// handshake, and subscribes to every given device id once the
    /// endpoint reports ready.
    ///
    /// # Errors
    ///
    /// Returns `PushError::Transport` if the connection cannot be
    /// established or the initial token frame cannot be sent.
    pub async fn connect(
        config: &PushConfig,
        token: &str,
        device_ids: Vec<u64>,
    ) -> Result<(Self, mpsc::Receiver<PushNotification>), PushError> {
        tracing::debug!(url = %config.url(), devices = device_ids.len(), "Connecting push channel");

        let (mut ws, _) = connect_async(config.url()).await?;

        let mut handshake = Handshake::new(token, device_ids);
        let auth = handshake.connected();
        let json = serde_json::to_string(&auth)?;
        ws.send(Message::Text(json.into())).await?;

        let (event_tx, event_rx) = mpsc::channel(NOTIFICATION_CHANNEL_CAPACITY);
        let (phase_tx, phase_rx) = watch::channel(handshake.phase());
        let (close_tx, close_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            run_channel(ws, handshake, &phase_tx, &event_tx, close_rx).await;
        });

        Ok((
            Self {
                phase_rx,
                close_tx: Some(close_tx),
                task,
            },
            event_rx,
        ))
    }

    /// Returns the current connection phase.
    #[must_use]
    pub fn phase(&self) -> ChannelPhase {
        *self.phase_rx.borrow()
    }

    /// Returns `true` while the channel is live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.phase() == ChannelPhase::Live
    }

    /// Waits until the channel is disconnected or closed.
    ///
    /// Useful for supervisors that want to rebuild the channel after a
    /// transport loss.
    pub async fn closed(&self) {
        let mut rx = self.phase_rx.clone();
        loop {
            {
                let phase = *rx.borrow_and_update();
                if matches!(phase, ChannelPhase::Disconnected | ChannelPhase::Closed) {
                    return;
                }
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Shuts the channel down and releases the connection.
    pub async fn close(mut self) {
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Drives the push connection until shutdown or transport loss.
async fn run_channel<S>(
    mut ws: S,
    mut handshake: Handshake,
    phase_tx: &watch::Sender<ChannelPhase>,
    event_tx: &mpsc::Sender<PushNotification>,
    mut close_rx: oneshot::Receiver<()>,
) where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>>
        + Sink<Message, Error = tokio_tungstenite::tungstenite::Error>
        + Unpin,
{
    'outer: loop {
        tokio::select! {
            _ = &mut close_rx => {
                let _ = ws.close().await;
                handshake.close();
                break;
            }
            msg = ws.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let (outbound, event) = handshake.process_frame(text.as_str());
                    phase_tx.send_replace(handshake.phase());

                    for frame in outbound {
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::warn!(error = %e, "Failed to encode push frame");
                                continue;
                            }
                        };
                        if let Err(e) = ws.send(Message::Text(json.into())).await {
                            tracing::error!(error = %e, "Push channel send failed");
                            handshake.disconnected();
                            break 'outer;
                        }
                    }

                    if let Some(event) = event {
                        // A full buffer means the reconciler stalled; block
                        // rather than drop the delta.
                        if event_tx.send(event).await.is_err() {
                            tracing::debug!("Notification receiver dropped, closing channel");
                            handshake.close();
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::warn!("Push channel closed by remote");
                    handshake.disconnected();
                    break;
                }
                Some(Ok(_)) => {
                    // Binary/ping/pong frames are not part of the protocol.
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "Push channel transport error");
                    handshake.disconnected();
                    break;
                }
            }
        }
    }

    phase_tx.send_replace(handshake.phase());
}
