//! Frame buffers and region cropping

use image::imageops;
use image::RgbImage;

use crate::roi::Rect;

/// A decoded video frame, dense RGB8
pub type Frame = RgbImage;

/// Crop a configured rectangle out of a frame.
///
/// The rectangle is clamped to the frame first, so regions authored against
/// a different resolution degrade to their visible part instead of failing.
/// Returns `None` when nothing of the rectangle is visible.
pub fn slice_region(frame: &Frame, rect: &Rect) -> Option<Frame> {
    let clamped = rect.clamp(frame.width(), frame.height())?;
    let view = imageops::crop_imm(frame, clamped.x as u32, clamped.y as u32, clamped.w, clamped.h);
    Some(view.to_image())
}
