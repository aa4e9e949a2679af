//! Board module - manages the game grid
//!
//! The board is a 10x20 grid of binary cells (0 = empty, 1 = filled).
//! Uses a flat array for cache locality and zero allocation.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom)

use crate::pieces::Piece;
use crate::types::{Cell, BOARD_HEIGHT, BOARD_WIDTH, EMPTY, FILLED};

/// Total number of cells on the board
const BOARD_SIZE: usize = (BOARD_WIDTH as usize) * (BOARD_HEIGHT as usize);

/// The game board - 10 columns x 20 rows using flat array storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of cells, row-major order (y * WIDTH + x)
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [EMPTY; BOARD_SIZE],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((y as usize) * (BOARD_WIDTH as usize) + (x as usize))
    }

    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, filled: bool) -> bool {
        match Self::index(x, y) {
            Some(idx) => {
                self.cells[idx] = if filled { FILLED } else { EMPTY };
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(FILLED))
    }

    /// Check if a row has no empty cell
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= BOARD_HEIGHT as usize {
            return false;
        }
        let start = y * BOARD_WIDTH as usize;
        let end = start + BOARD_WIDTH as usize;
        self.cells[start..end].iter().all(|&cell| cell != EMPTY)
    }

    /// Number of filled cells on the whole board
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != EMPTY).count()
    }

    /// Lock a piece into the grid.
    ///
    /// Every occupied shape cell landing inside the board is marked filled.
    /// Cells above the top edge (y < 0) are dropped without error; the caller
    /// detects the loss through the next spawn instead.
    pub fn place_piece(&mut self, piece: &Piece) {
        for (x, y) in piece.cells() {
            if (0..BOARD_HEIGHT as i8).contains(&y) {
                self.set(x, y, true);
            }
        }
    }

    /// Remove all full rows in place and return how many were removed.
    ///
    /// Survivors keep their relative order and settle at the bottom; the top is
    /// refilled with empty rows. Two-pointer scan, no allocation.
    pub fn clear_lines(&mut self) -> usize {
        let width = BOARD_WIDTH as usize;
        let mut cleared = 0usize;
        let mut write_y = BOARD_HEIGHT as usize;

        // Scan from bottom to top
        for read_y in (0..BOARD_HEIGHT as usize).rev() {
            if self.is_row_full(read_y) {
                cleared += 1;
            } else {
                write_y -= 1;
                if write_y != read_y {
                    // copy_within handles the overlapping ranges
                    let src_start = read_y * width;
                    let dst_start = write_y * width;
                    self.cells
                        .copy_within(src_start..src_start + width, dst_start);
                }
            }
        }

        for cell in &mut self.cells[..write_y * width] {
            *cell = EMPTY;
        }

        cleared
    }

    /// Side-effect-free variant of [`Board::clear_lines`].
    pub fn cleared(&self) -> (Board, usize) {
        let mut next = self.clone();
        let lines = next.clear_lines();
        (next, lines)
    }

    /// Get a reference to the internal cells array
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate the board one row at a time, top first
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks_exact(BOARD_WIDTH as usize)
    }

    /// Write the board into a fixed 20x10 grid (row-major, top row first)
    pub fn write_u8_grid(&self, out: &mut [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) {
        for (dst, src) in out.iter_mut().zip(self.rows()) {
            dst.copy_from_slice(src);
        }
    }

    /// Build a board from a 20x10 grid; any non-zero value counts as filled
    pub fn from_u8_grid(grid: &[[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize]) -> Self {
        let mut board = Self::new();
        for (y, row) in grid.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                board.cells[y * BOARD_WIDTH as usize + x] = if v != 0 { FILLED } else { EMPTY };
            }
        }
        board
    }

    /// Fill a whole row (test fixtures and benches)
    pub fn fill_row(&mut self, y: i8) {
        for x in 0..BOARD_WIDTH as i8 {
            self.set(x, y, true);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(Board::index(0, 0), Some(0));
        assert_eq!(Board::index(9, 0), Some(9));
        assert_eq!(Board::index(0, 1), Some(10));
        assert_eq!(Board::index(9, 19), Some(199));
        assert_eq!(Board::index(-1, 0), None);
        assert_eq!(Board::index(10, 0), None);
        assert_eq!(Board::index(0, 20), None);
    }

    #[test]
    fn test_board_flat_array() {
        let mut board = Board::new();

        board.set(0, 0, true);
        board.set(5, 10, true);

        assert_eq!(board.get(0, 0), Some(FILLED));
        assert_eq!(board.get(5, 10), Some(FILLED));

        assert_eq!(board.cells[0], FILLED);
        assert_eq!(board.cells[10 * 10 + 5], FILLED);
        assert_eq!(board.filled_count(), 2);
    }

    #[test]
    fn test_grid_conversion_keeps_cells() {
        let mut board = Board::new();
        board.set(3, 5, true);
        board.set(7, 19, true);

        let mut grid = [[0u8; 10]; 20];
        board.write_u8_grid(&mut grid);
        assert_eq!(grid[5][3], 1);
        assert_eq!(grid[19][7], 1);

        assert_eq!(Board::from_u8_grid(&grid), board);
    }

    #[test]
    fn test_clear_lines_keeps_row_order() {
        let mut board = Board::new();
        board.set(0, 16, true);
        board.fill_row(17);
        board.set(1, 18, true);
        board.fill_row(19);

        let cleared = board.clear_lines();
        assert_eq!(cleared, 2);
        assert!(board.is_occupied(0, 18));
        assert!(board.is_occupied(1, 19));
        assert_eq!(board.filled_count(), 2);
    }
}
