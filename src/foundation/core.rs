use crate::foundation::error::{FaceFxError, FaceFxResult};

pub use kurbo::{Affine, Point, Vec2};

/// Byte length of a tightly packed RGBA8 buffer, or a validation error on overflow.
pub(crate) fn rgba_len(width: u32, height: u32) -> FaceFxResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FaceFxError::validation("rgba buffer size overflow"))
}

/// A video frame as straight-alpha RGBA8 pixels, tightly packed, row-major.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Allocate a frame filled with transparent black.
    pub fn new(width: u32, height: u32) -> FaceFxResult<Self> {
        let len = rgba_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Wrap an existing RGBA8 buffer, checking its length.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> FaceFxResult<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(FaceFxError::validation(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable RGBA8 bytes. The length cannot change through this slice.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the frame and return its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Full-frame rectangle.
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }

    /// Read one pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.data[idx..idx + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Axis-aligned pixel rectangle; `(x, y)` is the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Build a rectangle from its top-left corner and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Intersection with `other`; empty rectangles collapse to the zero rect.
    pub fn intersect(self, other: PixelRect) -> PixelRect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return PixelRect::default();
        }
        PixelRect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// A rectangular RGBA8 region cut out of a [`Frame`].
///
/// `rect` records where the pixels came from so results can be written back in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubImage {
    rect: PixelRect,
    data: Vec<u8>,
}

impl SubImage {
    /// Wrap a buffer for `rect`, checking its length.
    pub fn new(rect: PixelRect, data: Vec<u8>) -> FaceFxResult<Self> {
        let expected = rgba_len(rect.width, rect.height)?;
        if data.len() != expected {
            return Err(FaceFxError::validation(format!(
                "sub-image buffer has {} bytes, expected {expected} for {}x{}",
                data.len(),
                rect.width,
                rect.height
            )));
        }
        Ok(Self { rect, data })
    }

    /// Placement of this sub-image in frame coordinates.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rect.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rect.height
    }

    /// RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable RGBA8 bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the sub-image and return its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Same placement, new pixels. Used by backends to hand back their output.
    pub fn with_data(&self, data: Vec<u8>) -> FaceFxResult<Self> {
        Self::new(self.rect, data)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
