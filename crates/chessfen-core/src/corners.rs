//! Board boundary quadrilaterals and their canonical corner order.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Four board-boundary vertices in frame pixels, in whatever order the
/// contour search produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point2<i32>; 4],
}

impl Quad {
    pub fn new(points: [Point2<i32>; 4]) -> Self {
        Self { points }
    }

    pub fn from_xy(xy: [[i32; 2]; 4]) -> Self {
        Self::new(xy.map(|[x, y]| Point2::new(x, y)))
    }

    /// Absolute area of the polygon traced in stored order.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }
}

/// Quad corners assigned to fixed roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCorners {
    pub top_left: Point2<i32>,
    pub top_right: Point2<i32>,
    pub bottom_left: Point2<i32>,
    pub bottom_right: Point2<i32>,
}

impl CanonicalCorners {
    /// Corners as `[TL, TR, BL, BR]`, the order used for the rectifying homography.
    pub fn to_array(&self) -> [Point2<i32>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Area of the boundary walked TL → TR → BR → BL.
    pub fn area(&self) -> f64 {
        polygon_area(&[
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ])
    }

    /// `false` if any two roles were given the same point.
    pub fn has_distinct_roles(&self) -> bool {
        let pts = self.to_array();
        (0..4).all(|i| (i + 1..4).all(|j| pts[i] != pts[j]))
    }
}

/// Strategy assigning [`CanonicalCorners`] roles to an unordered [`Quad`].
pub trait CornerOrdering {
    fn canonicalize(&self, quad: &Quad) -> CanonicalCorners;
}

/// Role assignment by coordinate sums and differences.
///
/// Smallest `x + y` is top-left, largest is bottom-right; smallest `y - x` is
/// top-right, largest is bottom-left. Ties go to the earliest point. This holds
/// only while the board is rotated less than about 45° in the image; beyond that
/// roles swap, and with a diamond-shaped quad two roles can land on the same
/// point (see [`CanonicalCorners::has_distinct_roles`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumDiffOrdering;

impl CornerOrdering for SumDiffOrdering {
    fn canonicalize(&self, quad: &Quad) -> CanonicalCorners {
        let pts = &quad.points;
        let sum = |p: &Point2<i32>| p.x as i64 + p.y as i64;
        let diff = |p: &Point2<i32>| p.y as i64 - p.x as i64;

        CanonicalCorners {
            top_left: pts[first_index_by(pts, sum, Extremum::Min)],
            top_right: pts[first_index_by(pts, diff, Extremum::Min)],
            bottom_left: pts[first_index_by(pts, diff, Extremum::Max)],
            bottom_right: pts[first_index_by(pts, sum, Extremum::Max)],
        }
    }
}

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

fn first_index_by<F>(pts: &[Point2<i32>; 4], key: F, which: Extremum) -> usize
where
    F: Fn(&Point2<i32>) -> i64,
{
    let mut best = 0;
    let mut best_key = key(&pts[0]);
    for (i, p) in pts.iter().enumerate().skip(1) {
        let k = key(p);
        let better = match which {
            Extremum::Min => k < best_key,
            Extremum::Max => k > best_key,
        };
        if better {
            best = i;
            best_key = k;
        }
    }
    best
}

/// Shoelace area of a closed polygon.
pub fn polygon_area(points: &[Point2<i32>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    (twice as f64 * 0.5).abs()
}
