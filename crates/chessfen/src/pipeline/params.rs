use crate::locate::LocatorParams;
use chessfen_core::DEFAULT_CONFIDENCE_THRESHOLD;
use serde::{Deserialize, Serialize};

/// Configuration for [`FrameProcessor`](super::FrameProcessor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Side of one board square in the rectified image, in pixels.
    pub square_size_px: u32,
    /// Frames are resized to this size before anything else; detections use its pixel space.
    pub canonical_width: u32,
    pub canonical_height: u32,
    /// Detections must score strictly above this.
    pub confidence_threshold: f32,
    /// Smallest canonical-corner area accepted before rectification.
    pub min_quad_area: f64,
    pub locator: LocatorParams,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            square_size_px: 65,
            canonical_width: 600,
            canonical_height: 600,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_quad_area: 1.0,
            locator: LocatorParams::default(),
        }
    }
}
