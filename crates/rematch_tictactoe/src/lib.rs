//! Pure tic-tac-toe logic for the rematch room server.
//!
//! Everything here is synchronous and free of I/O: a [`Board`] of nine
//! [`Cell`]s, the [`Game`] engine that validates and applies moves, and
//! the [`rules`] that decide wins and draws.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod game;
mod position;
pub mod rules;
mod types;

pub use game::{Game, MoveError};
pub use position::Position;
pub use types::{Board, Cell, GameState, Outcome, Symbol};
