//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart
//! from board storage so the engine and tests can use them directly.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};

use crate::{Board, Outcome};

/// Evaluates a board: a complete line wins, otherwise a full board draws.
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(symbol) = check_winner(board) {
        Outcome::Won(symbol)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Position, Symbol};

    #[test]
    fn test_draw_detection() {
        // X O X / O X X / O X O
        let layout = [
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::X,
            Symbol::O,
            Symbol::X,
            Symbol::O,
        ];
        let mut board = Board::new();
        for (pos, symbol) in Position::ALL.into_iter().zip(layout) {
            board.set(pos, Cell::Occupied(symbol));
        }
        assert_eq!(evaluate(&board), Outcome::Draw);
    }

    #[test]
    fn test_full_board_with_line_is_a_win() {
        // X X X / O O X / X O O
        let layout = [
            Symbol::X,
            Symbol::X,
            Symbol::X,
            Symbol::O,
            Symbol::O,
            Symbol::X,
            Symbol::X,
            Symbol::O,
            Symbol::O,
        ];
        let mut board = Board::new();
        for (pos, symbol) in Position::ALL.into_iter().zip(layout) {
            board.set(pos, Cell::Occupied(symbol));
        }
        assert_eq!(evaluate(&board), Outcome::Won(Symbol::X));
    }

    #[test]
    fn test_in_progress() {
        let mut board = Board::new();
        board.set(Position::Center, Cell::Occupied(Symbol::O));
        assert_eq!(evaluate(&board), Outcome::InProgress);
    }
}
