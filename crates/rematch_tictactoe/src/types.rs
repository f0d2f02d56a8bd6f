//! Core domain types for tic-tac-toe.

use crate::Position;
use serde::{Deserialize, Serialize};

/// Marker a player places on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
pub enum Symbol {
    /// Player X.
    X,
    /// Player O.
    O,
}

impl Symbol {
    /// Returns the opposing symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Empty square.
    #[default]
    Empty,
    /// Square claimed by a symbol.
    Occupied(Symbol),
}

impl Cell {
    /// Returns the occupying symbol, if any.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(symbol) => Some(symbol),
        }
    }
}

/// 3x3 tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Cell; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Cell {
        self.squares[pos.to_index()]
    }

    /// Claims a square. Callers validate occupancy first.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        self.squares[pos.to_index()] = cell;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Cell; 9] {
        &self.squares
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// No line complete and at least one empty square.
    #[default]
    InProgress,
    /// Three in a row for this symbol.
    Won(Symbol),
    /// Board full with no line complete.
    Draw,
}

impl Outcome {
    /// Returns true once the game has ended.
    pub fn is_over(self) -> bool {
        self != Outcome::InProgress
    }
}

/// Complete game state for one room.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameState {
    /// The board.
    board: Board,
    /// Symbol expected to move next. Unset until someone is seated.
    current_player: Option<Symbol>,
    /// Win/draw status.
    outcome: Outcome,
}

impl GameState {
    /// Creates an empty game with nobody to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the symbol to move, if any.
    pub fn current_player(&self) -> Option<Symbol> {
        self.current_player
    }

    /// Returns the game outcome.
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn set_current_player(&mut self, symbol: Option<Symbol>) {
        self.current_player = symbol;
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }
}
