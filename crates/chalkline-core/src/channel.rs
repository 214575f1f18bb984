//! Room transport boundary.
//!
//! Publishing is one-way: there is no acknowledgement, nothing to await and
//! no error to handle. Delivery is ordered per sender only.

use crate::protocol::Action;

/// Topic whiteboard actions travel on.
pub const CANVAS_TOPIC: &str = "canvas";

/// Fire-and-forget publish to every other participant of a room.
pub trait RoomChannel {
    fn publish(&mut self, topic: &str, envelope: &Action);
}

impl<C: RoomChannel + ?Sized> RoomChannel for &mut C {
    fn publish(&mut self, topic: &str, envelope: &Action) {
        (**self).publish(topic, envelope);
    }
}

impl<C: RoomChannel + ?Sized> RoomChannel for Box<C> {
    fn publish(&mut self, topic: &str, envelope: &Action) {
        (**self).publish(topic, envelope);
    }
}

/// An action waiting in an [`Outbox`].
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub topic: String,
    pub action: Action,
}

/// Queues published actions until a transport loop drains them.
#[derive(Debug, Default)]
pub struct Outbox {
    queued: Vec<Envelope>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take pending envelopes (drains the queue).
    pub fn take(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.queued)
    }

    pub fn pending(&self) -> &[Envelope] {
        &self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }
}

impl RoomChannel for Outbox {
    fn publish(&mut self, topic: &str, envelope: &Action) {
        self.queued.push(Envelope {
            topic: topic.to_string(),
            action: envelope.clone(),
        });
    }
}

/// Drops everything; for clients that never share their drawing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Muted;

impl RoomChannel for Muted {
    fn publish(&mut self, _topic: &str, _envelope: &Action) {}
}
