//! Rooms and matchmaking.

use crate::{ConnectionId, ConnectionRegistry, RoomId, Session};
use indexmap::IndexMap;
use rematch_tictactoe::{Game, GameState, MoveError, Outcome, Position, Symbol};
use tracing::{debug, info, instrument};

/// Seats per room.
pub const ROOM_CAPACITY: usize = 2;

/// Two seats and the game played between them.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<Symbol>,
    game: Game,
}

impl Room {
    fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::with_capacity(ROOM_CAPACITY),
            game: Game::new(),
        }
    }

    /// Room identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Seated symbols in join order.
    pub fn members(&self) -> &[Symbol] {
        &self.members
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    /// Returns true while a seat is free.
    pub fn is_open(&self) -> bool {
        self.members.len() < ROOM_CAPACITY
    }

    /// Symbol the next joiner receives.
    ///
    /// X for an empty room or when O holds the turn, O otherwise. Since the
    /// turn always belongs to a seated symbol, this never duplicates one.
    pub fn symbol_for_joiner(&self) -> Symbol {
        if self.members.is_empty() || self.game.state().current_player() == Some(Symbol::O) {
            Symbol::X
        } else {
            Symbol::O
        }
    }

    /// The other seated symbol, if someone else is seated.
    pub fn opponent_of(&self, symbol: Symbol) -> Option<Symbol> {
        self.members.iter().copied().find(|s| *s != symbol)
    }

    fn seat(&mut self, symbol: Symbol) {
        self.members.push(symbol);
        self.game.seat(symbol);
    }

    fn unseat(&mut self, symbol: Symbol) {
        self.members.retain(|s| *s != symbol);
    }

    /// Plays a move for `symbol`; the turn passes to the other seat.
    pub(crate) fn play(&mut self, pos: Position, symbol: Symbol) -> Result<Outcome, MoveError> {
        let next = self.opponent_of(symbol);
        self.game.make_move(pos, symbol, next)
    }

    /// Clears the board; the first seated symbol opens.
    pub(crate) fn reset(&mut self) {
        self.game.reset(self.members.first().copied());
    }
}

/// Where a joining connection ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    /// Room joined.
    pub room: RoomId,
    /// Symbol assigned.
    pub symbol: Symbol,
    /// True if this join filled the room.
    pub filled: bool,
}

/// What a leave did to the room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The connection was not seated anywhere.
    NotSeated,
    /// The last member left and the room was destroyed.
    RoomClosed(RoomId),
    /// Someone is still seated; the game was reset.
    OpponentRemains(RoomId),
}

/// Owns every active room.
///
/// Rooms keep creation order, and matchmaking fills the oldest open room.
#[derive(Debug, Default)]
pub struct RoomManager {
    rooms: IndexMap<RoomId, Room>,
}

impl RoomManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a room.
    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(id)
    }

    /// Number of active rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns true when no room exists.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterates rooms in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    fn first_open(&self) -> Option<RoomId> {
        self.rooms
            .values()
            .find(|room| room.is_open())
            .map(|room| room.id.clone())
    }

    fn create(&mut self) -> RoomId {
        let mut id = RoomId::random();
        while self.rooms.contains_key(&id) {
            debug!(room = %id, "Room id collision, drawing again");
            id = RoomId::random();
        }
        info!(room = %id, "Creating room");
        self.rooms.insert(id.clone(), Room::new(id.clone()));
        id
    }

    /// Seats `connection` in the first open room, creating one if needed.
    ///
    /// Returns `None` if the connection is already seated.
    #[instrument(skip(self, registry))]
    pub(crate) fn join_or_create(
        &mut self,
        registry: &mut ConnectionRegistry,
        connection: ConnectionId,
    ) -> Option<Seat> {
        if let Some(existing) = registry.lookup(connection) {
            debug!(room = %existing.room(), "Connection already seated, ignoring join");
            return None;
        }

        let id = match self.first_open() {
            Some(id) => id,
            None => self.create(),
        };
        let room = self.rooms.get_mut(&id)?;
        let symbol = room.symbol_for_joiner();

        registry.register(Session::new(connection, symbol, id.clone()));
        room.seat(symbol);

        let filled = !room.is_open();
        info!(room = %id, %symbol, filled, "Connection seated");
        Some(Seat {
            room: id,
            symbol,
            filled,
        })
    }

    /// Removes `connection` from its room.
    #[instrument(skip(self, registry))]
    pub(crate) fn leave(
        &mut self,
        registry: &mut ConnectionRegistry,
        connection: ConnectionId,
    ) -> Departure {
        let Some(session) = registry.unregister(connection) else {
            return Departure::NotSeated;
        };
        let id = session.room().clone();
        let Some(room) = self.rooms.get_mut(&id) else {
            return Departure::NotSeated;
        };

        room.unseat(*session.symbol());
        if room.members.is_empty() {
            self.rooms.shift_remove(&id);
            info!(room = %id, "Last member left, room destroyed");
            Departure::RoomClosed(id)
        } else {
            room.reset();
            info!(room = %id, symbol = %session.symbol(), "Member left, game reset");
            Departure::OpponentRemains(id)
        }
    }
}
