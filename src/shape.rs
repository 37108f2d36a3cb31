use serde::{Deserialize, Serialize};

/// Largest side of any shape matrix in the catalog.
pub const MAX_SHAPE: usize = 4;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Tetromino {
    I,
    O,
    T,
    L,
    J,
    Z,
    S,
}

impl Tetromino {
    pub fn all() -> [Tetromino; 7] {
        [
            Tetromino::I,
            Tetromino::O,
            Tetromino::T,
            Tetromino::L,
            Tetromino::J,
            Tetromino::Z,
            Tetromino::S,
        ]
    }

    pub fn index(self) -> usize {
        match self {
            Tetromino::I => 0,
            Tetromino::O => 1,
            Tetromino::T => 2,
            Tetromino::L => 3,
            Tetromino::J => 4,
            Tetromino::Z => 5,
            Tetromino::S => 6,
        }
    }

    /// Board value written for this piece; 0 is reserved for empty cells.
    pub fn color_id(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn shape(self) -> Shape {
        // Spawn matrices, rows top to bottom.
        match self {
            Tetromino::I => Shape::from_rows(&[
                &[0, 1, 0, 0],
                &[0, 1, 0, 0],
                &[0, 1, 0, 0],
                &[0, 1, 0, 0],
            ]),
            Tetromino::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            Tetromino::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]]),
            Tetromino::L => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]]),
            Tetromino::J => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]]),
            Tetromino::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]]),
            Tetromino::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]]),
        }
    }
}

/// A square 0/1 matrix of side 2, 3 or 4, stored in the top-left corner of a 4x4 array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    size: usize,
    cells: [[u8; MAX_SHAPE]; MAX_SHAPE],
}

impl Shape {
    /// Builds a shape from square rows. Panics on a non-square or oversized input,
    /// which only the constant catalog and tests ever pass.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let size = rows.len();
        assert!(size <= MAX_SHAPE, "shape larger than {MAX_SHAPE}x{MAX_SHAPE}");
        let mut cells = [[0; MAX_SHAPE]; MAX_SHAPE];
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), size, "shape rows must be square");
            for (c, &v) in row.iter().enumerate() {
                cells[r][c] = u8::from(v != 0);
            }
        }
        Self { size, cells }
    }

    pub fn width(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col] != 0
    }

    /// Occupied cells as (row, col) offsets from the origin.
    pub fn filled(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c] != 0)
                .map(move |c| (r as i32, c as i32))
        })
    }

    /// Clockwise quarter turn: new[r][c] = old[size - 1 - c][r].
    pub fn rotated_cw(&self) -> Shape {
        let n = self.size;
        let mut cells = [[0; MAX_SHAPE]; MAX_SHAPE];
        for r in 0..n {
            for c in 0..n {
                cells[r][c] = self.cells[n - 1 - c][r];
            }
        }
        Shape { size: n, cells }
    }

    pub fn rows(&self) -> Vec<Vec<u8>> {
        (0..self.size)
            .map(|r| self.cells[r][..self.size].to_vec())
            .collect()
    }
}

impl Serialize for Shape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows().serialize(serializer)
    }
}
