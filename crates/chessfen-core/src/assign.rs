//! Mapping piece detections onto board squares.

use crate::detection::Detection;
use crate::grid::SquareGrid;
use crate::placement::PiecePlacement;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Detections scoring at or below this are discarded.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Outcome of assigning one frame's detections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub placement: PiecePlacement,
    /// Detections that landed on a square (including ones later overwritten).
    pub accepted: usize,
    /// Detections dropped for `confidence <= threshold`.
    pub low_confidence: usize,
    /// Accepted detections that replaced an earlier piece on the same square.
    pub collisions: usize,
}

/// Assign each detection to the square under its bounding-box center.
///
/// The center is taken in whole pixels (see
/// [`pixel_center`](crate::BoundingBox::pixel_center)), so a box straddling a
/// cell edge resolves by integer floor division.
///
/// Centers off the grid clamp to the nearest edge square. A detection is kept
/// only if `confidence > confidence_threshold`. When two kept detections resolve
/// to the same square the later one in input order wins.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(detections, grid), fields(n = detections.len()))
)]
pub fn assign_pieces(
    detections: &[Detection],
    grid: &SquareGrid,
    confidence_threshold: f32,
) -> Assignment {
    let mut out = Assignment::default();

    for det in detections {
        if det.confidence.is_nan() || det.confidence <= confidence_threshold {
            out.low_confidence += 1;
            continue;
        }
        let sq = grid.square_at_pixel(det.bbox.pixel_center());
        if let Some(prev) = out.placement.insert(sq, det.piece, det.confidence) {
            log::debug!(
                "square {} reassigned {} -> {} (conf {:.3} -> {:.3})",
                sq,
                prev.piece,
                det.piece,
                prev.confidence,
                det.confidence
            );
            out.collisions += 1;
        }
        out.accepted += 1;
    }

    log::debug!(
        "assigned {} detections: placed={} low_conf={} collisions={}",
        detections.len(),
        out.placement.len(),
        out.low_confidence,
        out.collisions
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;
    use crate::piece::{Piece, PieceKind};
    use crate::square::Square;
    use nalgebra::Point2;

    fn grid() -> SquareGrid {
        SquareGrid::centered(600, 600, 65)
    }

    fn det_on(sq: &str, piece: Piece, confidence: f32) -> Detection {
        let c = grid().cell_center(sq.parse().unwrap());
        Detection::new(BoundingBox::centered_at(c, 40.0, 60.0), piece, confidence)
    }

    #[test]
    fn threshold_is_strict() {
        let pawn = Piece::white(PieceKind::Pawn);
        let at = assign_pieces(&[det_on("e4", pawn, 0.5)], &grid(), 0.5);
        assert!(at.placement.is_empty());
        assert_eq!(at.low_confidence, 1);

        let above = assign_pieces(&[det_on("e4", pawn, 0.51)], &grid(), 0.5);
        assert_eq!(above.placement.piece_at("e4".parse().unwrap()), Some(pawn));
        assert_eq!(above.accepted, 1);
    }

    #[test]
    fn nan_confidence_is_dropped() {
        let pawn = Piece::white(PieceKind::Pawn);
        let at = assign_pieces(&[det_on("e4", pawn, f32::NAN)], &grid(), 0.5);
        assert!(at.placement.is_empty());
    }

    #[test]
    fn collisions_keep_last_detection() {
        let queen = Piece::black(PieceKind::Queen);
        let king = Piece::black(PieceKind::King);
        // The later, lower-scoring detection still wins.
        let dets = [det_on("d8", queen, 0.95), det_on("d8", king, 0.6)];
        let at = assign_pieces(&dets, &grid(), 0.5);
        assert_eq!(at.placement.len(), 1);
        assert_eq!(at.placement.piece_at("d8".parse().unwrap()), Some(king));
        assert_eq!(at.collisions, 1);
        assert_eq!(at.accepted, 2);
    }

    #[test]
    fn off_grid_centers_clamp_to_edge_squares() {
        let rook = Piece::white(PieceKind::Rook);
        let far = Detection::new(
            BoundingBox::centered_at(Point2::new(-50.0, 900.0), 10.0, 10.0),
            rook,
            0.9,
        );
        let at = assign_pieces(&[far], &grid(), 0.5);
        assert_eq!(at.placement.piece_at(Square::new(7, 0).unwrap()), Some(rook));
    }

    #[test]
    fn rows_follow_image_y_and_cols_follow_image_x() {
        // Row 0 of the grid is rank 8; col 0 is file a.
        let g = grid();
        let top_left = Detection::new(
            BoundingBox::centered_at(Point2::new(41.0, 41.0), 2.0, 2.0),
            Piece::black(PieceKind::Rook),
            0.9,
        );
        let at = assign_pieces(&[top_left], &g, 0.5);
        let (sq, _) = at.placement.iter().next().unwrap();
        assert_eq!(sq.algebraic(), "a8");
    }

    #[test]
    fn straddling_box_uses_truncated_integer_center() {
        // Float midpoint is x = 105.4 (file b); truncated pixels give (104 + 105) / 2 = 104.
        let bishop = Piece::white(PieceKind::Bishop);
        let det = Detection::new(BoundingBox::new(104.9, 330.0, 105.9, 335.0), bishop, 0.9);
        let at = assign_pieces(&[det], &grid(), 0.5);
        let (sq, placed) = at.placement.iter().next().unwrap();
        assert_eq!(sq.file(), 'a');
        assert_eq!(sq.algebraic(), "a4");
        assert_eq!(placed.piece, bishop);
    }
}
