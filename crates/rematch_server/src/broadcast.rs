//! Addressing outbound messages to connections and rooms.

use crate::{ConnectionId, ConnectionRegistry, Room, RoomId, ServerMessage, StateSnapshot};
use derive_getters::{Dissolve, Getters};
use derive_new::new;
use tracing::trace;

/// One message for one connection.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Dissolve, new)]
pub struct Envelope {
    /// Recipient.
    to: ConnectionId,
    /// Payload.
    message: ServerMessage,
}

/// Ordered batch of messages produced while handling one event.
///
/// The lobby fills an outbox and hands it to whoever owns the sockets;
/// delivery order matches the order of the calls below.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outbox {
    envelopes: Vec<Envelope>,
}

impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `message` for a single connection.
    pub fn notify_one(&mut self, to: ConnectionId, message: ServerMessage) {
        trace!(%to, ?message, "Queued message");
        self.envelopes.push(Envelope::new(to, message));
    }

    /// Queues `message` for every member of `room`.
    pub fn notify_room(
        &mut self,
        registry: &ConnectionRegistry,
        room: &RoomId,
        message: ServerMessage,
    ) {
        for session in registry.members_of(room) {
            self.notify_one(*session.connection(), message.clone());
        }
    }

    /// Queues the full game state for every member of `room`.
    pub fn broadcast_state(&mut self, registry: &ConnectionRegistry, room: &Room) {
        let state = StateSnapshot::from(room.state());
        self.notify_room(registry, room.id(), ServerMessage::State { state });
    }

    /// Queued envelopes in delivery order.
    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    /// Returns true if nothing was queued.
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Messages queued for `to`, in order.
    pub fn messages_for(&self, to: ConnectionId) -> Vec<&ServerMessage> {
        self.envelopes
            .iter()
            .filter(|e| e.to == to)
            .map(|e| &e.message)
            .collect()
    }
}

impl IntoIterator for Outbox {
    type Item = Envelope;
    type IntoIter = std::vec::IntoIter<Envelope>;

    fn into_iter(self) -> Self::IntoIter {
        self.envelopes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use rematch_tictactoe::Symbol;

    #[test]
    fn test_notify_room_reaches_only_members() {
        let mut registry = ConnectionRegistry::new();
        let room = RoomId::from("aaaaaa");
        registry.register(Session::new(ConnectionId::from(1), Symbol::X, room.clone()));
        registry.register(Session::new(ConnectionId::from(2), Symbol::O, room.clone()));
        registry.register(Session::new(
            ConnectionId::from(3),
            Symbol::X,
            RoomId::from("bbbbbb"),
        ));

        let mut outbox = Outbox::new();
        outbox.notify_room(&registry, &room, ServerMessage::GameStart);

        let recipients: Vec<_> = outbox.envelopes().iter().map(|e| *e.to()).collect();
        assert_eq!(recipients, vec![ConnectionId::from(1), ConnectionId::from(2)]);
    }

    #[test]
    fn test_notify_empty_room_sends_nothing() {
        let registry = ConnectionRegistry::new();
        let mut outbox = Outbox::new();
        outbox.notify_room(&registry, &RoomId::from("aaaaaa"), ServerMessage::OpponentLeft);
        assert!(outbox.is_empty());
    }
}
