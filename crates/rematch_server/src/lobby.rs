//! The lobby: one owner for every room, session and pending rematch.
//!
//! Each method handles one inbound event to completion and returns the
//! [`Outbox`] of messages it produced. Nothing here does I/O, so the
//! lobby can be driven directly from tests or from the single-writer
//! [`LobbyActor`](crate::LobbyActor).
//!
//! Invalid references (unknown room, a connection acting on a room it is
//! not seated in, out-of-turn moves) are dropped with a `debug!` log and
//! produce an empty outbox.

use crate::{
    ConnectionId, ConnectionRegistry, Departure, InboundEvent, Outbox, ResetNegotiation, Room,
    RoomId, RoomManager, ServerMessage, Session,
};
use rematch_tictactoe::{Outcome, Position};
use tracing::{debug, info, instrument};

/// Process-wide game coordinator.
#[derive(Debug, Default)]
pub struct Lobby {
    registry: ConnectionRegistry,
    rooms: RoomManager,
    resets: ResetNegotiation,
}

impl Lobby {
    /// Creates a lobby with no rooms.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating lobby");
        Self::default()
    }

    /// Dispatches a decoded client event.
    pub fn handle(&mut self, connection: ConnectionId, event: InboundEvent) -> Outbox {
        match event {
            InboundEvent::Join => self.join(connection),
            InboundEvent::Move { room, position } => self.play(connection, &room, position),
            InboundEvent::ResetRequest { room } => self.request_reset(connection, &room),
            InboundEvent::ResetConfirmation { room, affirmative } => {
                self.confirm_reset(connection, &room, affirmative)
            }
        }
    }

    /// Matchmakes `connection` into a room.
    #[instrument(skip(self))]
    pub fn join(&mut self, connection: ConnectionId) -> Outbox {
        let mut out = Outbox::new();
        let Some(seat) = self.rooms.join_or_create(&mut self.registry, connection) else {
            return out;
        };

        out.notify_one(
            connection,
            ServerMessage::RoomJoined {
                room_id: seat.room.clone(),
            },
        );

        if seat.filled
            && let Some(room) = self.rooms.get(&seat.room)
        {
            info!(room = %seat.room, "Room full, game starting");
            out.notify_room(&self.registry, &seat.room, ServerMessage::GameStart);
            out.broadcast_state(&self.registry, room);
        }

        for session in self.registry.members_of(&seat.room) {
            out.notify_one(
                *session.connection(),
                ServerMessage::IdentityAssigned {
                    symbol: *session.symbol(),
                },
            );
        }
        out
    }

    /// Plays `position` for `connection` in `room`.
    #[instrument(skip(self), fields(room = %room))]
    pub fn play(&mut self, connection: ConnectionId, room: &RoomId, position: Position) -> Outbox {
        let mut out = Outbox::new();
        let Some(session) = self.registry.lookup(connection) else {
            debug!("Move from unseated connection ignored");
            return out;
        };
        if session.room() != room {
            debug!(seated_in = %session.room(), "Move for a foreign room ignored");
            return out;
        }
        let symbol = *session.symbol();
        let Some(target) = self.rooms.get_mut(room) else {
            debug!("Move for unknown room ignored");
            return out;
        };

        match target.play(position, symbol) {
            Ok(outcome) => {
                match outcome {
                    Outcome::Won(winner) => info!(%winner, "Game won"),
                    Outcome::Draw => info!("Game drawn"),
                    Outcome::InProgress => debug!(%symbol, %position, "Move accepted"),
                }
                out.broadcast_state(&self.registry, target);
            }
            Err(error) => debug!(%symbol, %position, %error, "Move ignored"),
        }
        out
    }

    /// Asks the other member of `room` for a rematch.
    #[instrument(skip(self), fields(room = %room))]
    pub fn request_reset(&mut self, connection: ConnectionId, room: &RoomId) -> Outbox {
        let mut out = Outbox::new();
        if !self.registry.is_member(connection, room) {
            debug!("Reset request from non-member ignored");
            return out;
        }
        let opponent = self
            .registry
            .members_of(room)
            .map(|s| *s.connection())
            .find(|c| *c != connection);
        let Some(opponent) = opponent else {
            debug!("Nobody to ask for a reset");
            return out;
        };

        self.resets.request(room.clone(), connection);
        info!(%opponent, "Reset requested");
        out.notify_one(
            opponent,
            ServerMessage::ResetRequested {
                room_id: room.clone(),
            },
        );
        out
    }

    /// Answers the pending rematch request for `room`.
    ///
    /// Any member may answer, the requester included.
    #[instrument(skip(self), fields(room = %room))]
    pub fn confirm_reset(
        &mut self,
        connection: ConnectionId,
        room: &RoomId,
        affirmative: bool,
    ) -> Outbox {
        let mut out = Outbox::new();
        if !self.registry.is_member(connection, room) {
            debug!("Reset answer from non-member ignored");
            return out;
        }
        let Some(target) = self.rooms.get_mut(room) else {
            return out;
        };
        let Some(requester) = self.resets.resolve(room) else {
            debug!("No pending reset to answer");
            return out;
        };

        if affirmative {
            if requester == connection {
                debug!("Requester confirmed its own reset");
            }
            target.reset();
            info!("Reset accepted, board cleared");
            out.broadcast_state(&self.registry, target);
        } else {
            info!(%requester, "Reset rejected");
            out.notify_one(requester, ServerMessage::ResetRejected);
        }
        out
    }

    /// Removes a closed connection from its room.
    #[instrument(skip(self))]
    pub fn leave(&mut self, connection: ConnectionId) -> Outbox {
        let mut out = Outbox::new();
        match self.rooms.leave(&mut self.registry, connection) {
            Departure::NotSeated => {}
            Departure::RoomClosed(id) => {
                self.resets.resolve(&id);
            }
            Departure::OpponentRemains(id) => {
                self.resets.resolve(&id);
                out.notify_room(&self.registry, &id, ServerMessage::OpponentLeft);
                if let Some(room) = self.rooms.get(&id) {
                    out.broadcast_state(&self.registry, room);
                }
            }
        }
        out
    }

    /// Looks up a room.
    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// Active rooms in creation order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Looks up a connection's session.
    pub fn session(&self, connection: ConnectionId) -> Option<&Session> {
        self.registry.lookup(connection)
    }

    /// Who is waiting on a reset of `room`, if anyone.
    pub fn pending_reset(&self, room: &RoomId) -> Option<ConnectionId> {
        self.resets.pending(room)
    }
}
