//! Pieces module - tetromino shapes, the falling piece, and rotation
//!
//! A shape is a small rectangular binary matrix (at most 4x4). A piece pairs a
//! shape with the board coordinate of its top-left corner. Rotation is a pure
//! matrix transform with no wall kicks: the anchor never moves.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::rng::ShapeChooser;
use crate::types::{PieceKind, BOARD_HEIGHT, BOARD_WIDTH, MAX_SHAPE_SIDE, SPAWN_X, SPAWN_Y};

/// Absolute board coordinates of a piece's occupied cells
pub type CellList = ArrayVec<(i8, i8), { MAX_SHAPE_SIDE * MAX_SHAPE_SIDE }>;

/// Rectangular binary matrix describing which sub-cells a piece occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    /// Only the top-left `rows x cols` block is meaningful; the rest stays 0.
    cells: [[u8; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
}

impl Shape {
    /// Build a shape from row slices. Returns None for empty, ragged, or
    /// oversized input.
    pub fn from_rows(rows: &[&[u8]]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if height > MAX_SHAPE_SIDE || width == 0 || width > MAX_SHAPE_SIDE {
            return None;
        }
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }

        let mut cells = [[0u8; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                cells[y][x] = u8::from(v != 0);
            }
        }

        Some(Self {
            rows: height as u8,
            cols: width as u8,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Is the sub-cell at (x, y) occupied? Out of range reads as empty.
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.cols() && y < self.rows() && self.cells[y][x] != 0
    }

    /// Offsets (x, y) of all occupied sub-cells, row by row
    pub fn minos(&self) -> CellList {
        let mut out = CellList::new();
        for y in 0..self.rows() {
            for x in 0..self.cols() {
                if self.cells[y][x] != 0 {
                    out.push((x as i8, y as i8));
                }
            }
        }
        out
    }

    /// Rotate 90° clockwise: reverse the row order, then transpose.
    pub fn rotated_cw(&self) -> Self {
        let (rows, cols) = (self.rows(), self.cols());
        let mut cells = [[0u8; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (i, out_row) in cells.iter_mut().enumerate().take(cols) {
            for (j, out) in out_row.iter_mut().enumerate().take(rows) {
                *out = self.cells[rows - 1 - j][i];
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Copy the meaningful block out as nested rows
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells[..self.rows()]
            .iter()
            .map(|row| row[..self.cols()].to_vec())
            .collect()
    }
}

/// Get the rotation-0 shape for a piece kind
pub fn get_shape(kind: PieceKind) -> Shape {
    let (rows, cols, cells) = match kind {
        PieceKind::I => (1, 4, [[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]),
        PieceKind::O => (2, 2, [[1, 1, 0, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
        PieceKind::T => (2, 3, [[0, 1, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
        PieceKind::S => (2, 3, [[0, 1, 1, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
        PieceKind::Z => (2, 3, [[1, 1, 0, 0], [0, 1, 1, 0], [0; 4], [0; 4]]),
        PieceKind::J => (2, 3, [[1, 0, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
        PieceKind::L => (2, 3, [[0, 0, 1, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
    };
    Shape { rows, cols, cells }
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl Piece {
    /// Create a new piece at the spawn anchor in its rotation-0 orientation
    pub fn new(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: get_shape(kind),
            x: SPAWN_X,
            y: SPAWN_Y,
        }
    }

    /// Spawn a piece whose kind comes from the injected chooser
    pub fn spawn(chooser: &mut dyn ShapeChooser) -> Self {
        Self::new(chooser.choose())
    }

    /// Absolute board coordinates of every occupied cell
    pub fn cells(&self) -> CellList {
        self.shape
            .minos()
            .into_iter()
            .map(|(dx, dy)| (self.x + dx, self.y + dy))
            .collect()
    }

    /// Would this piece be legal if shifted by (dx, dy)?
    ///
    /// Columns must stay inside [0, 10) and rows below 20. Rows above the top
    /// edge are allowed and never collide; rows on the board must be empty.
    pub fn is_valid_at(&self, board: &Board, dx: i8, dy: i8) -> bool {
        self.shape.minos().iter().all(|&(mx, my)| {
            let x = self.x + mx + dx;
            let y = self.y + my + dy;
            if x < 0 || x >= BOARD_WIDTH as i8 || y >= BOARD_HEIGHT as i8 {
                return false;
            }
            y < 0 || !board.is_occupied(x, y)
        })
    }

    /// Is the piece legal where it stands?
    pub fn is_valid(&self, board: &Board) -> bool {
        self.is_valid_at(board, 0, 0)
    }

    /// Copy of the piece moved by (dx, dy); legality is not checked
    pub fn translated(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Rotate the shape 90° clockwise in place, keeping the anchor
    pub fn rotate(&mut self) {
        self.shape = self.shape.rotated_cw();
    }

    /// Copy of the piece rotated 90° clockwise
    pub fn rotated(&self) -> Self {
        let mut next = *self;
        next.rotate();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i_rotates_between_row_and_column() {
        let i = get_shape(PieceKind::I);
        assert_eq!((i.rows(), i.cols()), (1, 4));

        let vertical = i.rotated_cw();
        assert_eq!((vertical.rows(), vertical.cols()), (4, 1));
        assert_eq!(vertical.to_rows(), vec![vec![1], vec![1], vec![1], vec![1]]);
    }

    #[test]
    fn test_t_rotation_matches_matrix_rotation() {
        let t = get_shape(PieceKind::T).rotated_cw();
        assert_eq!(t.to_rows(), vec![vec![1, 0], vec![1, 1], vec![1, 0]]);
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert!(Shape::from_rows(&[]).is_none());
        assert!(Shape::from_rows(&[&[1, 1], &[1]]).is_none());
        assert!(Shape::from_rows(&[&[1, 1, 1, 1, 1]]).is_none());
        assert_eq!(
            Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            Some(get_shape(PieceKind::T))
        );
    }

    #[test]
    fn test_every_shape_has_four_minos() {
        for kind in PieceKind::ALL {
            assert_eq!(get_shape(kind).minos().len(), 4, "{:?}", kind);
        }
    }

    #[test]
    fn test_negative_rows_are_tolerated() {
        let board = Board::new();
        let piece = Piece::new(PieceKind::O);
        assert!(piece.is_valid_at(&board, 0, -3));
        assert!(!piece.is_valid_at(&board, -4, 0));
        assert!(!piece.is_valid_at(&board, 0, 19));
    }
}
