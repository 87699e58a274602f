//! Conversions between `image` buffers and the core view types.

use image::imageops::{self, FilterType};

/// Errors for raw frame buffers handed in by callers.
#[derive(thiserror::Error, Debug)]
pub enum FrameInputError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },
}

/// Borrow an `image::RgbImage` as the lightweight core view.
pub fn rgb_view(img: &image::RgbImage) -> chessfen_core::RgbImageView<'_> {
    chessfen_core::RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Move a core RGB buffer into an `image::RgbImage`.
pub(crate) fn into_image(img: chessfen_core::RgbImage) -> Option<image::RgbImage> {
    let width = u32::try_from(img.width).ok()?;
    let height = u32::try_from(img.height).ok()?;
    image::RgbImage::from_raw(width, height, img.data)
}

/// Resize a frame to the canonical processing size with bilinear filtering.
///
/// Detection boxes are expected in the pixel space of the returned image.
pub fn prepare_frame(frame: &image::RgbImage, width: u32, height: u32) -> image::RgbImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    imageops::resize(frame, width, height, FilterType::Triangle)
}

/// Build an `image::RgbImage` from an interleaved `RGBRGB...` buffer.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<image::RgbImage, FrameInputError> {
    if width == 0 || height == 0 {
        return Err(FrameInputError::InvalidRgbDimensions { width, height });
    }
    let expected = usize::try_from(width)
        .ok()
        .zip(usize::try_from(height).ok())
        .and_then(|(w, h)| w.checked_mul(h))
        .and_then(|n| n.checked_mul(3))
        .ok_or(FrameInputError::InvalidRgbDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(FrameInputError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    image::RgbImage::from_raw(width, height, pixels.to_vec())
        .ok_or(FrameInputError::InvalidRgbDimensions { width, height })
}
