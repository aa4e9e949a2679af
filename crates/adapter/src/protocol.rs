//! Protocol module - JSON bodies for the start/move endpoints
//!
//! Wire shapes:
//!
//! - board: 20x10 matrix of 0/1, top row first
//! - piece: `{"shape": [[0/1, ...], ...], "x": int, "y": int}`
//! - move request: `{"direction": "left" | "right" | "down" | "rotate"}`
//! - move response: `{"board", "piece"}`, `{"status": "game_over", "board"}`,
//!   or `{"status": "game_over"}`

use serde::{Deserialize, Serialize};

use crate::core::{board_grid, Board, BoardGrid, MoveReply, Piece, PieceSnapshot};
use crate::types::Direction;

// ============== Client -> Server ==============

/// Body of `POST /move`
///
/// `direction` is kept as raw JSON. Strings naming a known direction parse to
/// it; anything else (unknown names, numbers, null, objects, a missing field)
/// is treated as a no-op by the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub direction: Option<serde_json::Value>,
}

impl MoveRequest {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction: Some(serde_json::Value::from(direction.as_str())),
        }
    }

    /// Recognised direction, if any
    pub fn direction(&self) -> Option<Direction> {
        self.direction
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(Direction::from_str)
    }
}

// ============== Server -> Client ==============

/// Piece on the wire: shape matrix plus anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceView {
    pub shape: Vec<Vec<u8>>,
    pub x: i8,
    pub y: i8,
}

impl From<&Piece> for PieceView {
    fn from(value: &Piece) -> Self {
        let snap = PieceSnapshot::from(value);
        Self {
            shape: snap.shape,
            x: snap.x,
            y: snap.y,
        }
    }
}

/// Body of the `POST /start` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub board: BoardGrid,
    pub piece: PieceView,
}

impl StartResponse {
    pub fn new(board: &Board, piece: &Piece) -> Self {
        Self {
            board: board_grid(board),
            piece: PieceView::from(piece),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOverStatus {
    #[serde(rename = "game_over")]
    GameOver,
}

/// Body of the `POST /move` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoveResponse {
    Continue {
        board: BoardGrid,
        piece: PieceView,
    },
    /// The move just ended the game.
    GameOver {
        status: GameOverStatus,
        board: BoardGrid,
    },
    /// The game had already ended; no board or piece is re-sent.
    AlreadyOver {
        status: GameOverStatus,
    },
}

impl MoveResponse {
    pub fn is_game_over(&self) -> bool {
        !matches!(self, MoveResponse::Continue { .. })
    }
}

impl From<&MoveReply> for MoveResponse {
    fn from(value: &MoveReply) -> Self {
        match value {
            MoveReply::Continue { board, piece } => MoveResponse::Continue {
                board: board_grid(board),
                piece: PieceView::from(piece),
            },
            MoveReply::ToppedOut { board } => MoveResponse::GameOver {
                status: GameOverStatus::GameOver,
                board: board_grid(board),
            },
            MoveReply::AlreadyOver => MoveResponse::AlreadyOver {
                status: GameOverStatus::GameOver,
            },
        }
    }
}
