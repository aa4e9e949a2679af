//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! by the simulation core and the web adapter alike.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 is the top)
//! - **Spawn anchor**: (3, 0) for every piece
//!
//! # Examples
//!
//! ```
//! use tetris_session_types::{Direction, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(Direction::from_str("rotate"), Some(Direction::Rotate));
//! assert_eq!(Direction::from_str("hardDrop"), None);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Anchor column for freshly spawned pieces
pub const SPAWN_X: i8 = 3;

/// Anchor row for freshly spawned pieces
pub const SPAWN_Y: i8 = 0;

/// Largest side of any shape matrix (the I piece in either orientation)
pub const MAX_SHAPE_SIDE: usize = 4;

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// Every kind, in canonical order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// ```
    /// use tetris_session_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Position in [`PieceKind::ALL`]
    pub fn index(&self) -> usize {
        match self {
            PieceKind::I => 0,
            PieceKind::O => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::Z => 4,
            PieceKind::J => 5,
            PieceKind::L => 6,
        }
    }
}

/// Move commands accepted by a running session
///
/// These are the only inputs the simulation understands. Each one is a single
/// discrete step; there is no gravity and no timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Shift the piece one column left
    Left,
    /// Shift the piece one column right
    Right,
    /// Drop the piece one row, locking it if it is already resting
    Down,
    /// Rotate the piece 90° clockwise in place
    Rotate,
}

impl Direction {
    /// Parse a direction from its wire name (case-insensitive)
    ///
    /// ```
    /// use tetris_session_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("left"), Some(Direction::Left));
    /// assert_eq!(Direction::from_str("DOWN"), Some(Direction::Down));
    /// assert_eq!(Direction::from_str("up"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "down" => Some(Direction::Down),
            "rotate" => Some(Direction::Rotate),
            _ => None,
        }
    }

    /// Wire name of the direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Rotate => "rotate",
        }
    }
}

/// A cell on the game board: 0 = empty, 1 = filled
pub type Cell = u8;

/// Empty cell value
pub const EMPTY: Cell = 0;

/// Filled cell value
pub const FILLED: Cell = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_anchor_is_near_center() {
        assert_eq!(SPAWN_X, 3);
        assert_eq!(SPAWN_Y, 0);
        assert!((SPAWN_X as u8) < BOARD_WIDTH / 2);
    }

    #[test]
    fn piece_kind_index_matches_all() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn direction_names_roundtrip() {
        for dir in [
            Direction::Left,
            Direction::Right,
            Direction::Down,
            Direction::Rotate,
        ] {
            assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
        }
    }
}
