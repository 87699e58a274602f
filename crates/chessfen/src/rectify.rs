//! Warping the located board into a top-down view.

use crate::frame::{into_image, rgb_view};
use crate::pipeline::FrameError;
use chessfen_core::{
    board_homography, warp_perspective_rgb, CanonicalCorners, CornerOrdering, Homography, Quad,
};
use image::imageops;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Top-down board image plus the geometry that produced it.
#[derive(Clone, Debug)]
pub struct RectifiedBoard {
    /// Warped board, rotated 90° counter-clockwise: `height × width` of the target rectangle.
    pub image: image::RgbImage,
    pub corners: CanonicalCorners,
    /// Maps target-rectangle pixels (before rotation) into the frame.
    pub h_img_from_rect: Homography,
}

/// Rectify the board bounded by `quad` into a `width × height` rectangle.
///
/// Quads whose canonical corners coincide, whose area is below `min_area`, or
/// whose homography is singular are rejected with [`FrameError::DegenerateGeometry`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(frame, quad, ordering))
)]
pub fn rectify_board(
    frame: &image::RgbImage,
    quad: &Quad,
    ordering: &dyn CornerOrdering,
    width: u32,
    height: u32,
    min_area: f64,
) -> Result<RectifiedBoard, FrameError> {
    let corners = ordering.canonicalize(quad);
    if !corners.has_distinct_roles() {
        log::debug!("corner roles collapse for quad {:?}", corners.to_array());
        return Err(FrameError::DegenerateGeometry);
    }
    let area = corners.area();
    if area.is_nan() || area < min_area {
        log::debug!("quad area {area:.2} below {min_area}");
        return Err(FrameError::DegenerateGeometry);
    }

    let (w, h) = (width as usize, height as usize);
    let h_img_from_rect = board_homography(&corners, w, h).ok_or(FrameError::DegenerateGeometry)?;
    let warped = warp_perspective_rgb(&rgb_view(frame), h_img_from_rect, w, h);
    let warped = into_image(warped).ok_or(FrameError::DegenerateGeometry)?;

    Ok(RectifiedBoard {
        image: imageops::rotate270(&warped),
        corners,
        h_img_from_rect,
    })
}
