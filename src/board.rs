use crate::piece::ActivePiece;
use crate::shape::Shape;

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

/// Row 0 is the top of the well. Cells hold a color id, 0 when empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[u8; COLS]; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[0; COLS]; ROWS],
        }
    }

    pub fn from_rows(cells: [[u8; COLS]; ROWS]) -> Self {
        Self { cells }
    }

    pub fn cell(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, color: u8) {
        self.cells[row][col] = color;
    }

    pub fn rows(&self) -> &[[u8; COLS]; ROWS] {
        &self.cells
    }

    pub fn is_row_full(&self, row: usize) -> bool {
        self.cells[row].iter().all(|&c| c != 0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&c| c == 0))
    }

    /// True when `shape` placed with its origin at (`x`, `y`) would leave the well
    /// sideways or through the floor, or overlap a filled cell. Rows above the top
    /// (`y < 0`) never collide on their own.
    pub fn collision(&self, shape: &Shape, x: i32, y: i32) -> bool {
        for (dr, dc) in shape.filled() {
            let col = x + dc;
            let row = y + dr;
            if col < 0 || col >= COLS as i32 || row >= ROWS as i32 {
                return true;
            }
            if row >= 0 && self.cells[row as usize][col as usize] != 0 {
                return true;
            }
        }
        false
    }

    /// Writes the piece's cells into the board. Cells still above the top are dropped.
    pub fn lock_piece(&mut self, piece: &ActivePiece) {
        for (dr, dc) in piece.shape.filled() {
            let col = piece.x + dc;
            let row = piece.y + dr;
            if row >= 0 && (0..COLS as i32).contains(&col) && row < ROWS as i32 {
                self.cells[row as usize][col as usize] = piece.color;
            }
        }
    }

    /// Removes every full row in one bottom-up pass, refilling from the top with
    /// empty rows. Returns how many rows went.
    pub fn clear_lines(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = ROWS;
        while row > 0 {
            let y = row - 1;
            if self.is_row_full(y) {
                cleared += 1;
                // move everything above this line down by one
                for pull in (1..=y).rev() {
                    self.cells[pull] = self.cells[pull - 1];
                }
                self.cells[0] = [0; COLS];
                // same index again: it now holds the row that was above
            } else {
                row -= 1;
            }
        }
        cleared
    }
}
