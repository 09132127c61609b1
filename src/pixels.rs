//! Conversions and region access on packed RGBA frames.
//!
//! The grayscale buffer produced here is the detector's input: one byte per pixel, row-major,
//! which is a different layout from the 4-byte RGBA frame it comes from.

use image::{DynamicImage, RgbaImage};

use crate::foundation::core::{Frame, PixelRect, SubImage, rgba_len};
use crate::foundation::error::{FaceFxError, FaceFxResult};
use crate::foundation::math::luma_u8;

/// Convert a frame to an 8-bit luma buffer (`width * height` bytes).
pub fn to_grayscale(frame: &Frame) -> Vec<u8> {
    let mut out = vec![0u8; frame.bounds().area()];
    write_grayscale(frame, &mut out);
    out
}

/// Like [`to_grayscale`], writing into a caller-owned buffer of exactly `width * height` bytes.
pub fn to_grayscale_into(frame: &Frame, out: &mut [u8]) -> FaceFxResult<()> {
    if out.len() != frame.bounds().area() {
        return Err(FaceFxError::validation(
            "grayscale buffer must hold width*height bytes",
        ));
    }
    write_grayscale(frame, out);
    Ok(())
}

fn write_grayscale(frame: &Frame, out: &mut [u8]) {
    for (dst, px) in out.iter_mut().zip(frame.data().chunks_exact(4)) {
        *dst = luma_u8(px[0], px[1], px[2]);
    }
}

/// Rectangle of a `side x side` square centered on `(cx, cy)`, clipped to `bounds`.
///
/// The top-left corner is `center - side / 2` with integer division, so odd sides lean
/// toward the bottom-right by one pixel.
pub fn square_rect(bounds: PixelRect, cx: i64, cy: i64, side: u32) -> PixelRect {
    let half = i64::from(side / 2);
    let x0 = (cx - half).max(i64::from(bounds.x));
    let y0 = (cy - half).max(i64::from(bounds.y));
    let x1 = (cx - half + i64::from(side)).min(i64::from(bounds.right()));
    let y1 = (cy - half + i64::from(side)).min(i64::from(bounds.bottom()));
    if x1 <= x0 || y1 <= y0 {
        return PixelRect::default();
    }
    PixelRect::new(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32)
}

/// Copy the square around `(cx, cy)` out of `frame`.
///
/// Squares that cross the frame border are clipped, never wrapped or padded, so the result
/// can be non-square (or empty) near the edges.
pub fn extract_square(frame: &Frame, cx: i64, cy: i64, side: u32) -> FaceFxResult<SubImage> {
    extract_rect(frame, square_rect(frame.bounds(), cx, cy, side))
}

/// Copy `rect` out of `frame`. `rect` is clipped to the frame first.
pub fn extract_rect(frame: &Frame, rect: PixelRect) -> FaceFxResult<SubImage> {
    let rect = rect.intersect(frame.bounds());
    let mut data = Vec::with_capacity(rgba_len(rect.width, rect.height)?);
    let stride = frame.width() as usize * 4;
    let row_len = rect.width as usize * 4;
    for y in rect.y..rect.bottom() {
        let start = y as usize * stride + rect.x as usize * 4;
        data.extend_from_slice(&frame.data()[start..start + row_len]);
    }
    SubImage::new(rect, data)
}

/// Write `sub` back into `frame` at its recorded placement.
pub fn write_sub_image(frame: &mut Frame, sub: &SubImage) -> FaceFxResult<()> {
    let rect = sub.rect();
    if rect.is_empty() {
        return Ok(());
    }
    if rect.intersect(frame.bounds()) != rect {
        return Err(FaceFxError::validation(
            "sub-image placement falls outside the destination frame",
        ));
    }
    let stride = frame.width() as usize * 4;
    let row_len = rect.width as usize * 4;
    for (row, src) in sub.data().chunks_exact(row_len).enumerate() {
        let start = (rect.y as usize + row) * stride + rect.x as usize * 4;
        frame.data_mut()[start..start + row_len].copy_from_slice(src);
    }
    Ok(())
}

/// Copy a frame into an `image` RGBA buffer.
pub fn to_image(frame: &Frame) -> FaceFxResult<RgbaImage> {
    RgbaImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or_else(|| FaceFxError::validation("frame buffer does not match its dimensions"))
}

/// Build a frame from any decoded image. Sources without alpha get `255`.
pub fn from_image(img: &DynamicImage) -> FaceFxResult<Frame> {
    from_rgba_image(img.to_rgba8())
}

/// Build a frame from an RGBA buffer without copying.
pub fn from_rgba_image(img: RgbaImage) -> FaceFxResult<Frame> {
    let (w, h) = img.dimensions();
    Frame::from_rgba(w, h, img.into_raw())
}

#[cfg(test)]
#[path = "../tests/unit/pixels.rs"]
mod tests;
