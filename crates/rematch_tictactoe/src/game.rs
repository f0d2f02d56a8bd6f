//! Game engine for tic-tac-toe.

use crate::rules;
use crate::types::{Cell, GameState, Outcome, Symbol};
use crate::Position;
use derive_more::{Display, Error};
use tracing::{debug, info, instrument};

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// The game already has a winner or is drawn.
    #[display("game is already over")]
    GameOver,
    /// It is another symbol's turn (or nobody is seated yet).
    #[display("not {_0}'s turn")]
    NotYourTurn(#[error(not(source))] Symbol),
    /// The target square is taken.
    #[display("{_0} is already occupied")]
    CellOccupied(#[error(not(source))] Position),
}

/// Tic-tac-toe game engine.
///
/// All mutation of [`GameState`] goes through this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    state: GameState,
}

impl Game {
    /// Creates a new game with an empty board and nobody to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Sets the first player to move if nobody has been chosen yet.
    #[instrument(skip(self))]
    pub fn seat(&mut self, symbol: Symbol) {
        if self.state.current_player().is_none() {
            debug!(%symbol, "First seat takes the opening move");
            self.state.set_current_player(Some(symbol));
        }
    }

    /// Plays `symbol` at `pos`, then hands the turn to `next`.
    ///
    /// `next` is whoever else sits at the table; when nobody does,
    /// the mover keeps the turn.
    #[instrument(skip(self))]
    pub fn make_move(
        &mut self,
        pos: Position,
        symbol: Symbol,
        next: Option<Symbol>,
    ) -> Result<Outcome, MoveError> {
        if self.state.outcome().is_over() {
            return Err(MoveError::GameOver);
        }
        if self.state.current_player() != Some(symbol) {
            return Err(MoveError::NotYourTurn(symbol));
        }
        if !self.state.board().is_empty(pos) {
            return Err(MoveError::CellOccupied(pos));
        }

        self.state.board_mut().set(pos, Cell::Occupied(symbol));
        self.state.set_current_player(Some(next.unwrap_or(symbol)));

        let outcome = rules::evaluate(self.state.board());
        self.state.set_outcome(outcome);
        if outcome.is_over() {
            info!(?outcome, "Game finished");
        }

        Ok(outcome)
    }

    /// Clears the board and outcome; `first` moves next.
    #[instrument(skip(self))]
    pub fn reset(&mut self, first: Option<Symbol>) {
        self.state = GameState::new();
        self.state.set_current_player(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Game {
        let mut game = Game::new();
        game.seat(Symbol::X);
        game
    }

    #[test]
    fn test_seat_only_sets_first_player_once() {
        let mut game = Game::new();
        game.seat(Symbol::O);
        game.seat(Symbol::X);
        assert_eq!(game.state().current_player(), Some(Symbol::O));
    }

    #[test]
    fn test_move_hands_turn_over() {
        let mut game = started();
        let outcome = game
            .make_move(Position::Center, Symbol::X, Some(Symbol::O))
            .expect("valid move");
        assert_eq!(outcome, Outcome::InProgress);
        assert_eq!(game.state().current_player(), Some(Symbol::O));
        assert_eq!(game.state().board().get(Position::Center), Cell::Occupied(Symbol::X));
    }

    #[test]
    fn test_lone_player_keeps_turn() {
        let mut game = started();
        game.make_move(Position::Center, Symbol::X, None)
            .expect("valid move");
        assert_eq!(game.state().current_player(), Some(Symbol::X));
    }

    #[test]
    fn test_wrong_turn_leaves_state_untouched() {
        let mut game = started();
        let before = game.clone();
        let result = game.make_move(Position::Center, Symbol::O, Some(Symbol::X));
        assert_eq!(result, Err(MoveError::NotYourTurn(Symbol::O)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_unseated_game_rejects_moves() {
        let mut game = Game::new();
        let result = game.make_move(Position::Center, Symbol::X, None);
        assert_eq!(result, Err(MoveError::NotYourTurn(Symbol::X)));
    }

    #[test]
    fn test_occupied_square_rejected() {
        let mut game = started();
        game.make_move(Position::Center, Symbol::X, Some(Symbol::O))
            .expect("valid move");
        let result = game.make_move(Position::Center, Symbol::O, Some(Symbol::X));
        assert_eq!(result, Err(MoveError::CellOccupied(Position::Center)));
        assert_eq!(game.state().current_player(), Some(Symbol::O));
    }

    #[test]
    fn test_reset_restores_empty_board() {
        let mut game = started();
        game.make_move(Position::TopLeft, Symbol::X, Some(Symbol::O))
            .expect("valid move");
        game.reset(Some(Symbol::O));
        assert!(Position::valid_moves(game.state().board()).len() == 9);
        assert_eq!(game.state().outcome(), Outcome::InProgress);
        assert_eq!(game.state().current_player(), Some(Symbol::O));
    }
}
