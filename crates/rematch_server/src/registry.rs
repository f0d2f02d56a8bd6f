//! Connection registry: which connection plays which symbol in which room.

use crate::{ConnectionId, RoomId};
use derive_getters::Getters;
use derive_new::new;
use rematch_tictactoe::Symbol;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// A seated connection.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Session {
    /// Connection that owns this seat.
    connection: ConnectionId,
    /// Symbol assigned on join.
    symbol: Symbol,
    /// Room the connection plays in.
    room: RoomId,
}

/// Maps live connections to their sessions.
///
/// Keys are ordered, and connection ids are allocated in increasing
/// order, so iteration follows registration order.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    sessions: BTreeMap<ConnectionId, Session>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session. Does nothing if the connection is already seated.
    #[instrument(skip(self, session), fields(connection = %session.connection(), room = %session.room()))]
    pub fn register(&mut self, session: Session) {
        if self.sessions.contains_key(session.connection()) {
            warn!("Connection already registered, keeping existing session");
            return;
        }
        debug!(symbol = %session.symbol(), "Session registered");
        self.sessions.insert(*session.connection(), session);
    }

    /// Looks up a connection's session.
    pub fn lookup(&self, connection: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection)
    }

    /// Removes and returns a connection's session, if any.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, connection: ConnectionId) -> Option<Session> {
        let removed = self.sessions.remove(&connection);
        if removed.is_some() {
            debug!("Session removed");
        }
        removed
    }

    /// All sessions seated in `room`.
    pub fn members_of<'a>(&'a self, room: &'a RoomId) -> impl Iterator<Item = &'a Session> + 'a {
        self.sessions.values().filter(move |s| s.room() == room)
    }

    /// Returns true if `connection` is seated in `room`.
    pub fn is_member(&self, connection: ConnectionId, room: &RoomId) -> bool {
        self.lookup(connection).is_some_and(|s| s.room() == room)
    }

    /// Number of seated connections.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true when nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
