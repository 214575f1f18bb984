//! Relay wire messages and the native relay client.
//!
//! The relay forwards every published message to the other peers of the
//! room and hands a [`Snapshot`] to peers that join late.

use crate::channel::{CANVAS_TOPIC, RoomChannel};
use crate::protocol::Action;
use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relay client errors.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid relay URL: {0}")]
    InvalidUrl(String),
    #[error("Already connected")]
    AlreadyConnected,
    #[error("Not connected")]
    NotConnected,
    #[error("Send failed: {0}")]
    Send(String),
}

/// Messages sent to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join a room
    Join { room: String },
    /// Leave current room
    Leave,
    /// Publish a payload on a topic to the rest of the room
    Publish {
        topic: String,
        payload: serde_json::Value,
    },
}

/// Messages received from the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirm room join with the room's drawing so far
    Joined {
        room: String,
        peer_count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snapshot: Option<Snapshot>,
    },
    /// Peer joined the room
    PeerJoined { peer_id: String },
    /// Peer left the room
    PeerLeft { peer_id: String },
    /// A payload published by another peer
    Message {
        from: String,
        topic: String,
        payload: serde_json::Value,
    },
    /// Error message
    Error { message: String },
}

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Events from the relay client
#[derive(Debug, Clone)]
pub enum SyncEvent {
    Connected,
    Disconnected,
    /// Joined a room; `snapshot` is present if the room already has drawing
    Joined {
        room: String,
        peer_count: usize,
        snapshot: Option<Snapshot>,
    },
    PeerJoined { peer_id: String },
    PeerLeft { peer_id: String },
    /// A whiteboard action from another peer
    Action { from: String, action: Action },
    /// A payload on a topic the whiteboard does not handle
    Message {
        from: String,
        topic: String,
        payload: serde_json::Value,
    },
    Error { message: String },
}

impl ServerMessage {
    /// Turn a relay message into a client event.
    ///
    /// Canvas payloads that are not valid actions are dropped.
    pub fn into_event(self) -> Option<SyncEvent> {
        let event = match self {
            ServerMessage::Joined {
                room,
                peer_count,
                snapshot,
            } => SyncEvent::Joined {
                room,
                peer_count,
                snapshot,
            },
            ServerMessage::PeerJoined { peer_id } => SyncEvent::PeerJoined { peer_id },
            ServerMessage::PeerLeft { peer_id } => SyncEvent::PeerLeft { peer_id },
            ServerMessage::Message {
                from,
                topic,
                payload,
            } if topic == CANVAS_TOPIC => match Action::from_value(payload) {
                Ok(action) => SyncEvent::Action { from, action },
                Err(e) => {
                    log::warn!("Dropping canvas message from {}: {}", from, e);
                    return None;
                }
            },
            ServerMessage::Message {
                from,
                topic,
                payload,
            } => SyncEvent::Message {
                from,
                topic,
                payload,
            },
            ServerMessage::Error { message } => SyncEvent::Error { message },
        };
        Some(event)
    }
}

/// Build the `publish` message for an action.
pub fn publish_message(topic: &str, action: &Action) -> Option<String> {
    let payload = match action.to_value() {
        Ok(payload) => payload,
        Err(e) => {
            log::error!("Cannot publish {} action: {}", action.name(), e);
            return None;
        }
    };
    let msg = ClientMessage::Publish {
        topic: topic.to_string(),
        payload,
    };
    serde_json::to_string(&msg).ok()
}

// ============================================================================
// Native relay client
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
mod native_client {
    use super::*;
    use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tungstenite::{Message, connect};
    use url::Url;

    /// Commands sent to the socket thread.
    enum WsCommand {
        Send(String),
        Close,
    }

    /// Relay client for native platforms.
    ///
    /// The socket lives on a background thread; events are collected and
    /// must be polled via `poll_events()` from the UI loop.
    pub struct RelayClient {
        state: ConnectionState,
        events: Vec<SyncEvent>,
        cmd_tx: Option<Sender<WsCommand>>,
        event_rx: Option<Receiver<SyncEvent>>,
        _thread: Option<JoinHandle<()>>,
    }

    impl RelayClient {
        /// Create a new disconnected client.
        pub fn new() -> Self {
            Self {
                state: ConnectionState::Disconnected,
                events: Vec::new(),
                cmd_tx: None,
                event_rx: None,
                _thread: None,
            }
        }

        /// Connect to a relay at a `ws://` or `wss://` URL.
        pub fn connect(&mut self, url: &str) -> Result<(), SyncError> {
            if self.cmd_tx.is_some() {
                return Err(SyncError::AlreadyConnected);
            }

            let parsed_url = Url::parse(url).map_err(|e| SyncError::InvalidUrl(e.to_string()))?;
            if parsed_url.scheme() != "ws" && parsed_url.scheme() != "wss" {
                return Err(SyncError::InvalidUrl(format!(
                    "unsupported scheme {}",
                    parsed_url.scheme()
                )));
            }

            self.state = ConnectionState::Connecting;

            let (cmd_tx, cmd_rx) = channel::<WsCommand>();
            let (event_tx, event_rx) = channel::<SyncEvent>();
            let url = url.to_string();

            let handle = thread::spawn(move || socket_loop(&url, &cmd_rx, &event_tx));

            self.cmd_tx = Some(cmd_tx);
            self.event_rx = Some(event_rx);
            self._thread = Some(handle);
            Ok(())
        }

        /// Disconnect from the relay.
        pub fn disconnect(&mut self) {
            if let Some(tx) = self.cmd_tx.take() {
                let _ = tx.send(WsCommand::Close);
            }
            self.event_rx = None;
            self._thread = None;
            self.state = ConnectionState::Disconnected;
        }

        /// Send a raw text message.
        pub fn send(&self, msg: String) -> Result<(), SyncError> {
            match self.cmd_tx {
                Some(ref tx) => tx
                    .send(WsCommand::Send(msg))
                    .map_err(|e| SyncError::Send(e.to_string())),
                None => Err(SyncError::NotConnected),
            }
        }

        fn send_message(&self, msg: &ClientMessage) -> Result<(), SyncError> {
            let json = serde_json::to_string(msg).map_err(|e| SyncError::Send(e.to_string()))?;
            self.send(json)
        }

        /// Ask the relay to put us in `room`.
        pub fn join(&self, room: &str) -> Result<(), SyncError> {
            self.send_message(&ClientMessage::Join {
                room: room.to_string(),
            })
        }

        pub fn leave(&self) -> Result<(), SyncError> {
            self.send_message(&ClientMessage::Leave)
        }

        /// Poll for pending events (non-blocking).
        pub fn poll_events(&mut self) -> Vec<SyncEvent> {
            if let Some(ref rx) = self.event_rx {
                while let Ok(event) = rx.try_recv() {
                    match &event {
                        SyncEvent::Connected => self.state = ConnectionState::Connected,
                        SyncEvent::Disconnected => self.state = ConnectionState::Disconnected,
                        SyncEvent::Error { .. } => self.state = ConnectionState::Error,
                        _ => {}
                    }
                    self.events.push(event);
                }
            }
            std::mem::take(&mut self.events)
        }

        pub fn state(&self) -> ConnectionState {
            self.state
        }

        pub fn is_connected(&self) -> bool {
            self.state == ConnectionState::Connected
        }
    }

    impl Default for RelayClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Drop for RelayClient {
        fn drop(&mut self) {
            self.disconnect();
        }
    }

    impl RoomChannel for RelayClient {
        fn publish(&mut self, topic: &str, envelope: &Action) {
            let Some(json) = publish_message(topic, envelope) else {
                return;
            };
            if let Err(e) = self.send(json) {
                log::warn!("Dropping {} action: {}", envelope.name(), e);
            }
        }
    }

    fn socket_loop(url: &str, cmd_rx: &Receiver<WsCommand>, event_tx: &Sender<SyncEvent>) {
        log::info!("Relay thread: connecting to {}", url);

        let mut socket = match connect(url) {
            Ok((socket, response)) => {
                log::info!("Relay connected, status: {}", response.status());
                socket
            }
            Err(e) => {
                log::error!("Relay connection failed: {}", e);
                let _ = event_tx.send(SyncEvent::Error {
                    message: format!("Connection failed: {}", e),
                });
                return;
            }
        };
        let _ = event_tx.send(SyncEvent::Connected);

        // A short read timeout keeps the loop responsive to outgoing commands.
        if let tungstenite::stream::MaybeTlsStream::Plain(tcp) = socket.get_mut() {
            let _ = tcp.set_read_timeout(Some(Duration::from_millis(50)));
            let _ = tcp.set_write_timeout(Some(Duration::from_secs(5)));
        }

        'session: loop {
            // Flush every queued command before blocking on a read; a stroke
            // produces one action per pointer move.
            loop {
                match cmd_rx.try_recv() {
                    Ok(WsCommand::Send(msg)) => {
                        if let Err(e) = socket.send(Message::Text(msg)) {
                            log::error!("Relay send error: {}", e);
                            break 'session;
                        }
                    }
                    Ok(WsCommand::Close) => {
                        log::info!("Relay close requested");
                        let _ = socket.close(None);
                        break 'session;
                    }
                    Err(TryRecvError::Disconnected) => break 'session,
                    Err(TryRecvError::Empty) => break,
                }
            }

            match socket.read() {
                Ok(Message::Text(txt)) => match serde_json::from_str::<ServerMessage>(&txt) {
                    Ok(msg) => {
                        if let Some(event) = msg.into_event() {
                            let _ = event_tx.send(event);
                        }
                    }
                    Err(e) => log::warn!("Failed to parse relay message: {}", e),
                },
                Ok(Message::Ping(data)) => {
                    let _ = socket.send(Message::Pong(data));
                }
                Ok(Message::Close(_)) => {
                    log::info!("Relay closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(tungstenite::Error::Io(ref e))
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => {
                    log::error!("Relay read error: {}", e);
                    break;
                }
            }
        }

        log::info!("Relay thread exiting");
        let _ = event_tx.send(SyncEvent::Disconnected);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native_client::RelayClient;
