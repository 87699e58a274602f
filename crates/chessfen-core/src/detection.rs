use crate::piece::Piece;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box `(x1, y1, x2, y2)` in frame pixels. Serialized as a 4-array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box of size `w × h` centered on `c`.
    pub fn centered_at(c: Point2<f32>, w: f32, h: f32) -> Self {
        Self::new(c.x - w * 0.5, c.y - h * 0.5, c.x + w * 0.5, c.y + h * 0.5)
    }

    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) * 0.5, (self.y1 + self.y2) * 0.5)
    }

    /// Integer pixel center used for square lookup.
    ///
    /// Each coordinate is truncated toward zero first, then the sum is floor-halved,
    /// so `(104.9, 105.9)` gives `104` where [`center`](Self::center) gives `105.4`.
    #[inline]
    pub fn pixel_center(&self) -> Point2<i64> {
        let mid = |a: f32, b: f32| (a as i64 + b as i64).div_euclid(2);
        Point2::new(mid(self.x1, self.x2), mid(self.y1, self.y2))
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One piece reported by the external detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    #[serde(rename = "label")]
    pub piece: Piece,
    /// Detector score in `[0, 1]`.
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, piece: Piece, confidence: f32) -> Self {
        Self {
            bbox,
            piece,
            confidence,
        }
    }
}
