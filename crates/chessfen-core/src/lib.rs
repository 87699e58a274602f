//! Geometry and encoding core for reading a chess position off a board photo.
//!
//! This crate is purely geometric and does not depend on any image library.
//! Given a board boundary and a list of piece detections it provides:
//!
//! - canonical corner ordering ([`SumDiffOrdering`] behind [`CornerOrdering`]),
//! - the rectifying homography and an RGB perspective warp,
//! - the centered 8×8 [`SquareGrid`] and detection → square assignment,
//! - FEN board-field encoding ([`encode_board`]) and parsing.
//!
//! ```
//! use chessfen_core::{assign_pieces, encode_board, BoundingBox, Detection, Piece, SquareGrid};
//!
//! let grid = SquareGrid::centered(600, 600, 65);
//! let e4 = grid.cell_center("e4".parse().unwrap());
//! let pawn = Piece::from_symbol('P').unwrap();
//! let dets = [Detection::new(BoundingBox::centered_at(e4, 40.0, 60.0), pawn, 0.9)];
//!
//! let assignment = assign_pieces(&dets, &grid, 0.5);
//! assert_eq!(encode_board(&assignment.placement).as_str(), "8/8/8/8/4P3/8/8/8");
//! ```

mod assign;
mod corners;
mod detection;
mod fen;
mod grid;
mod homography;
mod image;
mod logger;
mod piece;
mod placement;
mod square;

pub use assign::{assign_pieces, Assignment, DEFAULT_CONFIDENCE_THRESHOLD};
pub use corners::{polygon_area, CanonicalCorners, CornerOrdering, Quad, SumDiffOrdering};
pub use detection::{BoundingBox, Detection};
pub use fen::{encode_board, Fen, FenBoard, FenParseError, PlaceholderState, STARTING_BOARD};
pub use grid::{grid_origin, GridOrigin, SquareGrid};
pub use homography::{board_homography, homography_from_4pt, warp_perspective_rgb, Homography};
pub use image::{sample_bilinear_rgb, RgbImage, RgbImageView};
pub use piece::{Color, InvalidPieceSymbol, Piece, PieceKind, DETECTOR_CLASS_ORDER};
pub use placement::{PiecePlacement, PlacedPiece};
pub use square::{InvalidSquareName, Square, BOARD_SIDE};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
