//! Plain-data snapshots of session state for boundaries that serialize it.

use crate::board::Board;
use crate::pieces::Piece;
use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

/// Board as a 20x10 matrix of 0/1, top row first
pub type BoardGrid = [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];

/// Active piece reduced to its shape matrix and anchor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub shape: Vec<Vec<u8>>,
    pub x: i8,
    pub y: i8,
}

impl From<&Piece> for PieceSnapshot {
    fn from(value: &Piece) -> Self {
        Self {
            kind: value.kind,
            shape: value.shape.to_rows(),
            x: value.x,
            y: value.y,
        }
    }
}

pub fn board_grid(board: &Board) -> BoardGrid {
    let mut out = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
    board.write_u8_grid(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_snapshot_carries_shape_and_anchor() {
        let mut piece = Piece::new(PieceKind::S);
        piece.x = 0;
        piece.y = 4;

        let snap = PieceSnapshot::from(&piece);
        assert_eq!(snap.shape, vec![vec![0, 1, 1], vec![1, 1, 0]]);
        assert_eq!((snap.x, snap.y), (0, 4));
    }

    #[test]
    fn test_empty_board_grid_is_all_zero() {
        let grid = board_grid(&Board::new());
        assert!(grid.iter().flatten().all(|&c| c == 0));
    }
}
