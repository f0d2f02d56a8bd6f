//! Wire protocol spoken over the `/game` WebSocket.
//!
//! Frames are JSON objects tagged by a `type` field. Everything the
//! client can send is decoded here into an [`InboundEvent`]; anything
//! that does not decode is dropped before it reaches the lobby.

use crate::RoomId;
use derive_more::{Display, Error, From};
use rematch_tictactoe::{Cell, GameState, Outcome, Position, Symbol};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Raw client frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Ask to be matched into a room.
    Join,
    /// Claim a square.
    Move {
        /// Room the move is for.
        room_id: RoomId,
        /// Square index; only integers 0-8 are accepted.
        index: serde_json::Number,
    },
    /// Ask the opponent for a rematch.
    Reset {
        /// Room to reset.
        room_id: RoomId,
    },
    /// Answer a rematch request.
    ResetConfirmation {
        /// Room being answered for.
        room_id: RoomId,
        /// True to accept.
        wanna: bool,
    },
}

/// A validated client event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// Matchmake into a room.
    Join,
    /// Play at `position` in `room`.
    Move {
        /// Target room.
        room: RoomId,
        /// Square to claim.
        position: Position,
    },
    /// Request a reset of `room`.
    ResetRequest {
        /// Target room.
        room: RoomId,
    },
    /// Accept or decline a pending reset of `room`.
    ResetConfirmation {
        /// Target room.
        room: RoomId,
        /// True to accept.
        affirmative: bool,
    },
}

/// Why a frame was dropped at the boundary.
#[derive(Debug, Display, Error, From)]
pub enum ProtocolError {
    /// Not JSON, unknown `type`, or missing/mistyped fields.
    #[display("malformed frame: {_0}")]
    Malformed(serde_json::Error),
    /// Move index that is not an integer in 0-8.
    #[display("cell index {_0} out of range")]
    #[from(ignore)]
    CellOutOfRange(#[error(not(source))] serde_json::Number),
}

impl TryFrom<ClientMessage> for InboundEvent {
    type Error = ProtocolError;

    fn try_from(message: ClientMessage) -> Result<Self, Self::Error> {
        Ok(match message {
            ClientMessage::Join => InboundEvent::Join,
            ClientMessage::Move { room_id, index } => {
                let position = index
                    .as_u64()
                    .and_then(|i| usize::try_from(i).ok())
                    .and_then(Position::from_index)
                    .ok_or(ProtocolError::CellOutOfRange(index))?;
                InboundEvent::Move {
                    room: room_id,
                    position,
                }
            }
            ClientMessage::Reset { room_id } => InboundEvent::ResetRequest { room: room_id },
            ClientMessage::ResetConfirmation { room_id, wanna } => {
                InboundEvent::ResetConfirmation {
                    room: room_id,
                    affirmative: wanna,
                }
            }
        })
    }
}

/// Decodes one text frame.
#[instrument(level = "trace")]
pub fn decode_frame(text: &str) -> Result<InboundEvent, ProtocolError> {
    let message: ClientMessage = serde_json::from_str(text)?;
    InboundEvent::try_from(message)
}

/// Winner as clients see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Full board, no line.
    #[serde(rename = "draw")]
    Draw,
}

/// Full game snapshot broadcast after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    /// Squares in row-major order; `null` when empty.
    pub board: [Option<Symbol>; 9],
    /// Symbol to move.
    pub current_player: Option<Symbol>,
    /// `null` while the game is running.
    pub winner: Option<Winner>,
}

impl From<&GameState> for StateSnapshot {
    fn from(state: &GameState) -> Self {
        let board = (*state.board().squares()).map(Cell::symbol);
        let winner = match state.outcome() {
            Outcome::InProgress => None,
            Outcome::Won(Symbol::X) => Some(Winner::X),
            Outcome::Won(Symbol::O) => Some(Winner::O),
            Outcome::Draw => Some(Winner::Draw),
        };
        Self {
            board,
            current_player: state.current_player(),
            winner,
        }
    }
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent to a joiner once seated.
    #[serde(rename = "roomJoined")]
    RoomJoined {
        /// Room joined.
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// Tells each member its own symbol.
    #[serde(rename = "user-info")]
    IdentityAssigned {
        /// The member's symbol.
        symbol: Symbol,
    },
    /// Both seats are taken.
    #[serde(rename = "gameStart")]
    GameStart,
    /// Current game snapshot.
    #[serde(rename = "state")]
    State {
        /// Snapshot.
        state: StateSnapshot,
    },
    /// The other member disconnected.
    #[serde(rename = "opponentLeft")]
    OpponentLeft,
    /// The opponent asks for a rematch.
    #[serde(rename = "wanna-reset")]
    ResetRequested {
        /// Room to reset.
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },
    /// The opponent declined a rematch.
    #[serde(rename = "game-reset-rejected")]
    ResetRejected,
}

impl ServerMessage {
    /// Serializes into a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_join() {
        assert_eq!(decode_frame(r#"{"type":"join"}"#).ok(), Some(InboundEvent::Join));
    }

    #[test]
    fn test_decode_move() {
        let event = decode_frame(r#"{"type":"move","roomId":"ab12cd","index":4}"#)
            .expect("valid move");
        assert_eq!(
            event,
            InboundEvent::Move {
                room: RoomId::from("ab12cd"),
                position: Position::Center,
            }
        );
    }

    #[test]
    fn test_decode_rejects_bad_indices() {
        for index in ["9", "-1", "1.5", "\"4\"", "null"] {
            let frame = format!(r#"{{"type":"move","roomId":"ab12cd","index":{index}}}"#);
            assert!(decode_frame(&frame).is_err(), "index {index} should be dropped");
        }
    }

    #[test]
    fn test_decode_requires_integer_index() {
        let result = decode_frame(r#"{"type":"move","roomId":"ab12cd","index":4.0}"#);
        assert!(matches!(result, Err(ProtocolError::CellOutOfRange(_))));
    }

    #[test]
    fn test_decode_reset_messages() {
        assert_eq!(
            decode_frame(r#"{"type":"reset","roomId":"ab12cd"}"#).ok(),
            Some(InboundEvent::ResetRequest {
                room: RoomId::from("ab12cd")
            })
        );
        assert_eq!(
            decode_frame(r#"{"type":"reset-confirmation","roomId":"ab12cd","wanna":false}"#).ok(),
            Some(InboundEvent::ResetConfirmation {
                room: RoomId::from("ab12cd"),
                affirmative: false,
            })
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_frame("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(decode_frame(r#"{"type":"teleport"}"#).is_err());
        assert!(decode_frame(r#"{"type":"reset"}"#).is_err());
        assert!(decode_frame(r#"{"type":"reset-confirmation","roomId":"x","wanna":"yes"}"#).is_err());
    }

    #[test]
    fn test_state_wire_shape() {
        let message = ServerMessage::State {
            state: StateSnapshot::from(&GameState::new()),
        };
        let value = serde_json::to_value(&message).expect("serializable");
        assert_eq!(
            value,
            json!({
                "type": "state",
                "state": {
                    "board": [null, null, null, null, null, null, null, null, null],
                    "currentPlayer": null,
                    "winner": null
                }
            })
        );
    }

    #[test]
    fn test_outbound_tags() {
        let cases = [
            (
                ServerMessage::RoomJoined {
                    room_id: RoomId::from("ab12cd"),
                },
                json!({"type": "roomJoined", "roomId": "ab12cd"}),
            ),
            (
                ServerMessage::IdentityAssigned { symbol: Symbol::O },
                json!({"type": "user-info", "symbol": "O"}),
            ),
            (ServerMessage::GameStart, json!({"type": "gameStart"})),
            (ServerMessage::OpponentLeft, json!({"type": "opponentLeft"})),
            (
                ServerMessage::ResetRequested {
                    room_id: RoomId::from("ab12cd"),
                },
                json!({"type": "wanna-reset", "roomId": "ab12cd"}),
            ),
            (
                ServerMessage::ResetRejected,
                json!({"type": "game-reset-rejected"}),
            ),
        ];
        for (message, expected) in cases {
            assert_eq!(serde_json::to_value(&message).expect("serializable"), expected);
        }
    }

    #[test]
    fn test_draw_winner_is_lowercase() {
        assert_eq!(
            serde_json::to_value(Winner::Draw).expect("serializable"),
            json!("draw")
        );
    }
}
