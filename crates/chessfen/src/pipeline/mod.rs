//! Frame → FEN board field pipeline.
//!
//! Resizes the frame, locates the board, rectifies it, centers the square grid
//! in the rectified image and assigns detections to squares. The grid origin
//! is applied to detection coordinates in the resized (unrectified) frame.

mod error;
mod params;
mod process;
mod result;

pub use error::FrameError;
pub use params::PipelineParams;
pub use process::{process_frame, FrameProcessor};
pub use result::FrameResult;
