//! Read the FEN board field off a chessboard photo and a set of piece detections.
//!
//! The pipeline resizes the frame, locates the board as the largest
//! quadrilateral contour, rectifies it to a top-down view, centers an 8×8
//! square grid and maps each confident detection onto a square:
//!
//! ```no_run
//! use chessfen::io::DetectionSet;
//! use chessfen::{process_frame, PipelineParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let frame = chessfen::io::load_rgb_image("board.jpg")?;
//! let detections = DetectionSet::load_json("detections.json")?.resolve();
//!
//! match process_frame(&frame, &detections, &PipelineParams::default()) {
//!     Ok(res) => println!("{}", res.board),
//!     Err(err) => eprintln!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Geometry and encoding live in [`chessfen_core`], re-exported as [`core`];
//! this crate adds the `image`/`imageproc` frontend, JSON I/O and the
//! `chessfen` command-line tool.

pub use chessfen_core as core;

pub mod io;

mod frame;
mod locate;
mod pipeline;
mod rectify;

pub use chessfen_core::{
    encode_board, init_with_level, level_from_verbosity, Detection, Fen, FenBoard, Piece,
    PiecePlacement, Quad, Square,
};
pub use frame::{prepare_frame, rgb_image_from_slice, rgb_view, FrameInputError};
pub use locate::{closed_edge_map, BoardLocator, LargestQuadLocator, LocatorParams};
pub use pipeline::{process_frame, FrameError, FrameProcessor, FrameResult, PipelineParams};
pub use rectify::{rectify_board, RectifiedBoard};

#[cfg(feature = "tracing")]
pub use chessfen_core::init_tracing;
