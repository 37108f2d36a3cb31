use serde::Serialize;

use crate::board::COLS;
use crate::shape::{Shape, Tetromino};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivePiece {
    pub kind: Tetromino,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub color: u8,
}

impl ActivePiece {
    /// Spawn orientation, centered horizontally on the top row.
    pub fn new(kind: Tetromino) -> Self {
        let shape = kind.shape();
        Self {
            kind,
            x: (COLS / 2) as i32 - (shape.width() / 2) as i32,
            y: 0,
            color: kind.color_id(),
            shape,
        }
    }

    /// Absolute (row, col) of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .filled()
            .map(move |(dr, dc)| (self.y + dr, self.x + dc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_is_centered() {
        assert_eq!(ActivePiece::new(Tetromino::O).x, 4);
        assert_eq!(ActivePiece::new(Tetromino::T).x, 4);
        assert_eq!(ActivePiece::new(Tetromino::I).x, 3);
        for kind in Tetromino::all() {
            let piece = ActivePiece::new(kind);
            assert_eq!(piece.y, 0);
            assert_eq!(piece.color, kind.index() as u8 + 1);
        }
    }

    #[test]
    fn cells_are_offset_by_origin() {
        let piece = ActivePiece::new(Tetromino::O);
        let mut cells: Vec<_> = piece.cells().collect();
        cells.sort();
        assert_eq!(cells, vec![(0, 4), (0, 5), (1, 4), (1, 5)]);
    }
}
