//! Rematch: matchmaking and game-state server for two-player tic-tac-toe.
//!
//! Clients connect over a WebSocket, get paired into rooms of two, play,
//! and can agree on a rematch.
//!
//! # Architecture
//!
//! - **Registry**: which connection holds which symbol in which room
//! - **Rooms**: matchmaking and membership
//! - **Reset**: the request/confirm rematch handshake
//! - **Broadcast**: addressing outbound messages
//! - **Lobby**: owns all of the above and handles one event at a time
//! - **Actor / Server**: the single-writer task and the axum transport
//!
//! # Example
//!
//! ```
//! use rematch_server::{InboundEvent, Lobby, ConnectionId};
//!
//! let mut lobby = Lobby::new();
//! let out = lobby.handle(ConnectionId::from(1), InboundEvent::Join);
//! assert_eq!(lobby.room_count(), 1);
//! assert!(!out.is_empty());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actor;
mod broadcast;
mod config;
mod error;
mod ids;
mod lobby;
mod protocol;
mod registry;
mod reset;
mod rooms;
mod server;

pub use actor::{LobbyActor, LobbyCommand, LobbyHandle, OutboundSender};
pub use broadcast::{Envelope, Outbox};
pub use config::{ConfigError, PORT_VARS, ServerConfig};
pub use error::ServerError;
pub use ids::{ConnectionId, ConnectionIds, RoomId};
pub use lobby::Lobby;
pub use protocol::{
    ClientMessage, InboundEvent, ProtocolError, ServerMessage, StateSnapshot, Winner, decode_frame,
};
pub use registry::{ConnectionRegistry, Session};
pub use reset::ResetNegotiation;
pub use rooms::{Departure, ROOM_CAPACITY, Room, RoomManager, Seat};
pub use server::{AppState, GAME_PATH, router, serve};
