//! Room registry and per-connection message handling.

use chalkline_core::{
    Action, CANVAS_TOPIC, ClientMessage, ServerMessage, Snapshot, SnapshotRecorder,
};
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// A relayed message and the peer that produced it.
pub type Relayed = (String, ServerMessage);

/// Room state
struct Room {
    /// Broadcast channel for this room
    tx: broadcast::Sender<Relayed>,
    /// Connected peer IDs
    peers: HashSet<String>,
    /// Canvas actions published so far, for late joiners
    recorder: SnapshotRecorder,
}

impl Room {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            peers: HashSet::new(),
            recorder: SnapshotRecorder::default(),
        }
    }
}

/// What a peer gets back from joining.
pub struct Joined {
    pub rx: broadcast::Receiver<Relayed>,
    pub peer_count: usize,
    pub snapshot: Option<Snapshot>,
}

/// Shared application state
pub struct AppState {
    rooms: DashMap<String, Room>,
    channel_capacity: usize,
}

impl AppState {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            channel_capacity,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Add peer to room, creating the room on first join.
    pub fn join_room(&self, room_id: &str, peer_id: &str) -> Joined {
        let mut room = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(self.channel_capacity));
        room.peers.insert(peer_id.to_string());
        Joined {
            rx: room.tx.subscribe(),
            peer_count: room.peers.len(),
            snapshot: (!room.recorder.is_empty()).then(|| room.recorder.snapshot()),
        }
    }

    /// Remove peer from room; the last peer out discards the drawing.
    pub fn leave_room(&self, room_id: &str, peer_id: &str) {
        if let Some(mut room) = self.rooms.get_mut(room_id) {
            room.peers.remove(peer_id);
        }
        // Checked under the shard lock so a concurrent join keeps the room.
        if self
            .rooms
            .remove_if(room_id, |_, room| room.peers.is_empty())
            .is_some()
        {
            debug!("Room {} closed", room_id);
        }
    }

    /// Broadcast message to room
    pub fn broadcast(&self, room_id: &str, from: &str, msg: ServerMessage) {
        if let Some(room) = self.rooms.get(room_id) {
            let _ = room.tx.send((from.to_string(), msg));
        }
    }

    /// Relay a published payload. Canvas payloads must be valid actions and
    /// are recorded before they are broadcast.
    pub fn publish(
        &self,
        room_id: &str,
        from: &str,
        topic: String,
        payload: serde_json::Value,
    ) -> Result<(), String> {
        let action = if topic == CANVAS_TOPIC {
            let action = Action::from_value(payload.clone()).map_err(|e| e.to_string())?;
            Some(action)
        } else {
            None
        };

        let Some(mut room) = self.rooms.get_mut(room_id) else {
            return Err(format!("Room {} does not exist", room_id));
        };
        if let Some(ref action) = action {
            room.recorder.record(action);
        }
        let _ = room.tx.send((
            from.to_string(),
            ServerMessage::Message {
                from: from.to_string(),
                topic,
                payload,
            },
        ));
        Ok(())
    }
}

/// One WebSocket connection's view of the room registry.
pub struct Peer {
    pub id: String,
    room: Option<String>,
    rx: Option<broadcast::Receiver<Relayed>>,
}

impl Peer {
    pub fn new(id: String) -> Self {
        Self {
            id,
            room: None,
            rx: None,
        }
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn receiver(&mut self) -> Option<&mut broadcast::Receiver<Relayed>> {
        self.rx.as_mut()
    }

    /// Apply a client message; returns the direct reply, if any.
    pub fn handle(&mut self, state: &AppState, msg: ClientMessage) -> Option<ServerMessage> {
        match msg {
            ClientMessage::Join { room } => {
                self.leave(state);

                let joined = state.join_room(&room, &self.id);
                self.rx = Some(joined.rx);
                self.room = Some(room.clone());

                state.broadcast(
                    &room,
                    &self.id,
                    ServerMessage::PeerJoined {
                        peer_id: self.id.clone(),
                    },
                );
                info!(
                    "Peer {} joined room {} ({} peers)",
                    self.id, room, joined.peer_count
                );
                Some(ServerMessage::Joined {
                    room,
                    peer_count: joined.peer_count,
                    snapshot: joined.snapshot,
                })
            }
            ClientMessage::Leave => {
                self.leave(state);
                None
            }
            ClientMessage::Publish { topic, payload } => {
                let Some(ref room) = self.room else {
                    return Some(ServerMessage::Error {
                        message: "Not in a room".to_string(),
                    });
                };
                match state.publish(room, &self.id, topic, payload) {
                    Ok(()) => None,
                    Err(e) => {
                        warn!("Rejected publish from {}: {}", self.id, e);
                        Some(ServerMessage::Error {
                            message: format!("Invalid action: {}", e),
                        })
                    }
                }
            }
        }
    }

    /// Leave the current room, if any, and tell the others.
    pub fn leave(&mut self, state: &AppState) {
        if let Some(room) = self.room.take() {
            state.leave_room(&room, &self.id);
            state.broadcast(
                &room,
                &self.id,
                ServerMessage::PeerLeft {
                    peer_id: self.id.clone(),
                },
            );
            info!("Peer {} left room {}", self.id, room);
        }
        self.rx = None;
    }
}
