use super::{FrameError, FrameResult, PipelineParams};
use crate::frame::prepare_frame;
use crate::locate::{BoardLocator, LargestQuadLocator};
use crate::rectify::rectify_board;
use chessfen_core::{
    assign_pieces, encode_board, CornerOrdering, Detection, SquareGrid, SumDiffOrdering,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Frame processor with pluggable board localization and corner ordering.
pub struct FrameProcessor {
    params: PipelineParams,
    locator: Box<dyn BoardLocator + Send + Sync>,
    ordering: Box<dyn CornerOrdering + Send + Sync>,
}

impl FrameProcessor {
    /// Largest-quad locator and sum/diff corner ordering, configured from `params`.
    pub fn new(params: PipelineParams) -> Self {
        let locator = LargestQuadLocator::new(params.locator.clone());
        Self {
            params,
            locator: Box::new(locator),
            ordering: Box::new(SumDiffOrdering),
        }
    }

    pub fn with_locator<L>(mut self, locator: L) -> Self
    where
        L: BoardLocator + Send + Sync + 'static,
    {
        self.locator = Box::new(locator);
        self
    }

    pub fn with_corner_ordering<O>(mut self, ordering: O) -> Self
    where
        O: CornerOrdering + Send + Sync + 'static,
    {
        self.ordering = Box::new(ordering);
        self
    }

    #[inline]
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Read the board field off one frame.
    ///
    /// `frame` may have any size; it is resized to the canonical size first and
    /// `detections` must be expressed in that resized pixel space.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame, detections),
            fields(width = frame.width(), height = frame.height(), detections = detections.len())
        )
    )]
    pub fn process(
        &self,
        frame: &image::RgbImage,
        detections: &[Detection],
    ) -> Result<FrameResult, FrameError> {
        let p = &self.params;
        let frame = prepare_frame(frame, p.canonical_width, p.canonical_height);

        let quad = self
            .locator
            .locate(&frame)
            .ok_or(FrameError::BoardNotFound)?;

        let rectified = rectify_board(
            &frame,
            &quad,
            self.ordering.as_ref(),
            p.canonical_width,
            p.canonical_height,
            p.min_quad_area,
        )?;

        let (rw, rh) = rectified.image.dimensions();
        let grid = SquareGrid::centered(rw as usize, rh as usize, p.square_size_px);
        let assignment = assign_pieces(detections, &grid, p.confidence_threshold);
        let board = encode_board(&assignment.placement);

        log::debug!(
            "rectified {}x{}, grid origin ({}, {}), {} pieces ({} low-confidence, {} collisions) -> {}",
            rw,
            rh,
            grid.origin.start_x,
            grid.origin.start_y,
            assignment.placement.len(),
            assignment.low_confidence,
            assignment.collisions,
            board
        );

        Ok(FrameResult {
            quad,
            rectified,
            grid,
            assignment,
            board,
        })
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(PipelineParams::default())
    }
}

impl std::fmt::Debug for FrameProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameProcessor")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// One-shot convenience over [`FrameProcessor`] with the default strategies.
pub fn process_frame(
    frame: &image::RgbImage,
    detections: &[Detection],
    params: &PipelineParams,
) -> Result<FrameResult, FrameError> {
    FrameProcessor::new(params.clone()).process(frame, detections)
}
