//! Placement of the 8×8 square grid inside the rectified board image.

use crate::square::{Square, BOARD_SIDE};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Pixel offset of the top-left corner of the 8×8 grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOrigin {
    pub start_x: i32,
    pub start_y: i32,
}

/// Center a grid of `8 × square_size` pixels inside a `width × height` image.
///
/// Uses floor division, so an image smaller than the grid yields a negative origin.
pub fn grid_origin(width: usize, height: usize, square_size: u32) -> GridOrigin {
    let extent = BOARD_SIDE as i64 * square_size as i64;
    GridOrigin {
        start_x: (width as i64 - extent).div_euclid(2) as i32,
        start_y: (height as i64 - extent).div_euclid(2) as i32,
    }
}

/// An 8×8 grid of square cells anchored at [`GridOrigin`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareGrid {
    pub origin: GridOrigin,
    pub square_size: u32,
}

impl SquareGrid {
    /// Grid centered in a `width × height` image.
    pub fn centered(width: usize, height: usize, square_size: u32) -> Self {
        Self {
            origin: grid_origin(width, height, square_size),
            square_size,
        }
    }

    /// Square containing pixel `p`; points off the grid clamp to the nearest edge square.
    pub fn square_at(&self, p: Point2<f32>) -> Square {
        let s = self.square_size.max(1) as f32;
        let row = ((p.y - self.origin.start_y as f32) / s).floor();
        let col = ((p.x - self.origin.start_x as f32) / s).floor();
        Square::clamped(row as i64, col as i64)
    }

    /// Integer variant of [`square_at`](Self::square_at), floor-dividing in pixels.
    pub fn square_at_pixel(&self, p: Point2<i64>) -> Square {
        let s = self.square_size.max(1) as i64;
        let row = (p.y - self.origin.start_y as i64).div_euclid(s);
        let col = (p.x - self.origin.start_x as i64).div_euclid(s);
        Square::clamped(row, col)
    }

    /// Pixel rectangle `[x0, y0, x1, y1)` covered by `sq`.
    pub fn cell_rect(&self, sq: Square) -> [i32; 4] {
        let s = self.square_size as i32;
        let x0 = self.origin.start_x + sq.col() as i32 * s;
        let y0 = self.origin.start_y + sq.row() as i32 * s;
        [x0, y0, x0 + s, y0 + s]
    }

    /// Center pixel of `sq`.
    pub fn cell_center(&self, sq: Square) -> Point2<f32> {
        let [x0, y0, x1, y1] = self.cell_rect(sq);
        Point2::new((x0 + x1) as f32 * 0.5, (y0 + y1) as f32 * 0.5)
    }
}
