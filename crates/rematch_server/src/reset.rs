//! Rematch negotiation: a reset needs a request and a confirmation.

use crate::{ConnectionId, RoomId};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Pending reset requests, at most one per room.
///
/// A room with no entry is idle. Requesting while pending replaces the
/// stored requester.
#[derive(Debug, Default)]
pub struct ResetNegotiation {
    pending: HashMap<RoomId, ConnectionId>,
}

impl ResetNegotiation {
    /// Creates a negotiation table with every room idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `requester` as waiting for a reset of `room`.
    ///
    /// Returns the requester it superseded, if any.
    #[instrument(skip(self))]
    pub fn request(&mut self, room: RoomId, requester: ConnectionId) -> Option<ConnectionId> {
        let previous = self.pending.insert(room, requester);
        if let Some(previous) = previous {
            debug!(%previous, "Pending reset request superseded");
        }
        previous
    }

    /// Who is waiting on `room`, if anyone.
    pub fn pending(&self, room: &RoomId) -> Option<ConnectionId> {
        self.pending.get(room).copied()
    }

    /// Returns `room` to idle, yielding the requester it was waiting on.
    #[instrument(skip(self))]
    pub fn resolve(&mut self, room: &RoomId) -> Option<ConnectionId> {
        self.pending.remove(room)
    }

    /// Number of rooms with a pending request.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns true when every room is idle.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_then_resolve() {
        let mut resets = ResetNegotiation::new();
        let room = RoomId::from("abc123");
        assert_eq!(resets.request(room.clone(), ConnectionId::from(1)), None);
        assert_eq!(resets.pending(&room), Some(ConnectionId::from(1)));
        assert_eq!(resets.resolve(&room), Some(ConnectionId::from(1)));
        assert!(resets.is_empty());
    }

    #[test]
    fn test_second_request_overwrites() {
        let mut resets = ResetNegotiation::new();
        let room = RoomId::from("abc123");
        resets.request(room.clone(), ConnectionId::from(1));
        let previous = resets.request(room.clone(), ConnectionId::from(2));
        assert_eq!(previous, Some(ConnectionId::from(1)));
        assert_eq!(resets.pending(&room), Some(ConnectionId::from(2)));
        assert_eq!(resets.len(), 1);
    }

    #[test]
    fn test_resolve_idle_room_is_noop() {
        let mut resets = ResetNegotiation::new();
        assert_eq!(resets.resolve(&RoomId::from("nope00")), None);
    }
}
