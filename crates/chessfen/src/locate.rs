//! Finding the board boundary in a frame.
//!
//! The default strategy takes the largest four-sided outer contour of the
//! closed edge map. It is a heuristic: a larger quadrilateral elsewhere in the
//! frame (a table edge, a picture frame) wins over the board. Other strategies
//! can be plugged in through [`BoardLocator`].

use chessfen_core::{polygon_area, Quad};
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::geometry::arc_length;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Strategy producing the board's four boundary vertices, in any order.
pub trait BoardLocator {
    fn locate(&self, frame: &image::RgbImage) -> Option<Quad>;
}

impl<F> BoardLocator for F
where
    F: Fn(&image::RgbImage) -> Option<Quad>,
{
    fn locate(&self, frame: &image::RgbImage) -> Option<Quad> {
        self(frame)
    }
}

/// Parameters of the edge/contour board search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    /// Gaussian sigma of the pre-blur (1.1 matches a 5×5 kernel); `0` disables it.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Chebyshev radius of the closing element; 2 gives a 5×5 square, `0` disables it.
    pub close_radius: u8,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_rel: f64,
    /// Contours must enclose strictly more than this many square pixels.
    pub min_contour_area: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            close_radius: 2,
            approx_epsilon_rel: 0.02,
            min_contour_area: 0.0,
        }
    }
}

/// Picks the four-vertex outer contour enclosing the largest area.
#[derive(Clone, Debug, Default)]
pub struct LargestQuadLocator {
    params: LocatorParams,
}

impl LargestQuadLocator {
    pub fn new(params: LocatorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &LocatorParams {
        &self.params
    }
}

impl BoardLocator for LargestQuadLocator {
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(width = frame.width(), height = frame.height())
        )
    )]
    fn locate(&self, frame: &image::RgbImage) -> Option<Quad> {
        let edges = closed_edge_map(frame, &self.params);
        let contours = find_contours::<i32>(&edges);
        let p = &self.params;

        let mut best: Option<(f64, Quad)> = None;
        let mut candidates = 0usize;
        for contour in contours
            .iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        {
            let pts: Vec<Point2<i32>> = contour
                .points
                .iter()
                .map(|q| Point2::new(q.x, q.y))
                .collect();
            let epsilon = p.approx_epsilon_rel * arc_length(&contour.points, true);
            let approx = approximate_closed_polygon(&pts, epsilon);
            let Ok(vertices) = <[Point2<i32>; 4]>::try_from(approx) else {
                continue;
            };
            candidates += 1;

            let area = polygon_area(&pts);
            let current = best.as_ref().map_or(p.min_contour_area, |(a, _)| *a);
            if area > current {
                best = Some((area, Quad::new(vertices)));
            }
        }

        match &best {
            Some((area, quad)) => log::debug!(
                "board quad {:?} area={:.0} ({} quad candidates of {} contours)",
                quad.points.map(|q| [q.x, q.y]),
                area,
                candidates,
                contours.len()
            ),
            None => log::debug!("no quadrilateral among {} contours", contours.len()),
        }
        best.map(|(_, quad)| quad)
    }
}

/// Grayscale → blur → Canny → morphological closing.
pub fn closed_edge_map(frame: &image::RgbImage, params: &LocatorParams) -> image::GrayImage {
    let gray = image::imageops::grayscale(frame);
    let blurred = if params.blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(&gray, params.blur_sigma)
    } else {
        gray
    };
    let edges = imageproc::edges::canny(&blurred, params.canny_low, params.canny_high);
    if params.close_radius > 0 {
        imageproc::morphology::close(&edges, Norm::LInf, params.close_radius)
    } else {
        edges
    }
}

/// Douglas–Peucker simplification of a closed contour.
///
/// The loop is cut at two mutually distant points and each half is simplified
/// as an open chain, so the result does not depend on where tracing started.
pub(crate) fn approximate_closed_polygon(points: &[Point2<i32>], epsilon: f64) -> Vec<Point2<i32>> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let a = farthest_from(points, points[0]);
    let b = farthest_from(points, points[a]);
    if a == b {
        return vec![points[a]];
    }
    let (lo, hi) = (a.min(b), a.max(b));

    let first = &points[lo..=hi];
    let second: Vec<Point2<i32>> = points[hi..]
        .iter()
        .chain(points[..=lo].iter())
        .copied()
        .collect();

    let mut out = Vec::new();
    simplify_chain(first, epsilon, &mut out);
    simplify_chain(&second, epsilon, &mut out);
    out
}

fn farthest_from(points: &[Point2<i32>], origin: Point2<i32>) -> usize {
    let mut best = 0;
    let mut best_d = -1i64;
    for (i, p) in points.iter().enumerate() {
        let dx = (p.x - origin.x) as i64;
        let dy = (p.y - origin.y) as i64;
        let d = dx * dx + dy * dy;
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

// Emits the first point of `chain` and every kept interior point; the last
// point belongs to the next chain.
fn simplify_chain(chain: &[Point2<i32>], epsilon: f64, out: &mut Vec<Point2<i32>>) {
    let Some(last) = chain.len().checked_sub(1) else {
        return;
    };
    if last < 2 {
        out.push(chain[0]);
        return;
    }

    let (start, end) = (chain[0], chain[last]);
    let mut split = 0;
    let mut dmax = 0.0;
    for (i, p) in chain.iter().enumerate().take(last).skip(1) {
        let d = distance_to_line(*p, start, end);
        if d > dmax {
            dmax = d;
            split = i;
        }
    }

    if dmax > epsilon {
        simplify_chain(&chain[..=split], epsilon, out);
        simplify_chain(&chain[split..], epsilon, out);
    } else {
        out.push(start);
    }
}

fn distance_to_line(p: Point2<i32>, a: Point2<i32>, b: Point2<i32>) -> f64 {
    let (dx, dy) = ((b.x - a.x) as f64, (b.y - a.y) as f64);
    let (px, py) = ((p.x - a.x) as f64, (p.y - a.y) as f64);
    let len = dx.hypot(dy);
    if len < 1e-12 {
        return px.hypot(py);
    }
    (dx * py - dy * px).abs() / len
}
