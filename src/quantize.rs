//! Color quantization + cell averaging + noise: the mosaic engine behind the pixelate backend.
//!
//! [`Quantizer::draw`] reduces a region to a small palette, partitions it into square cells,
//! fills each cell with the mean of its quantized pixels, then optionally perturbs the result
//! with deterministic noise.

pub(crate) mod noise;
pub(crate) mod palette;

pub use noise::add_noise;
pub use palette::{MedianCut, PaletteReducer};

use crate::foundation::core::{PixelRect, SubImage};
use crate::foundation::error::{FaceFxError, FaceFxResult};

/// Cell size used when callers pass `0`, scaled so cell density looks the same across aspect
/// ratios: `floor(max * (max / min) * 0.015)`, with the aspect ratio in whole steps.
///
/// Never returns less than `1` or more than the longer side.
pub fn default_cell_size(width: u32, height: u32) -> u32 {
    let (hi, lo) = if width > height {
        (width, height)
    } else {
        (height, width)
    };
    if lo == 0 {
        return 1;
    }
    let weighted = f64::from(hi / lo) * f64::from(hi);
    ((weighted * 0.015).floor().min(f64::from(hi)) as u32).max(1)
}

/// Palette reduction + cell averaging + noise.
#[derive(Clone, Debug, Default)]
pub struct Quantizer<P = MedianCut> {
    reducer: P,
}

impl Quantizer<MedianCut> {
    /// Quantizer backed by median-cut palette reduction.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PaletteReducer> Quantizer<P> {
    /// Quantizer backed by a custom palette primitive.
    pub fn with_reducer(reducer: P) -> Self {
        Self { reducer }
    }

    /// Produce the mosaic version of `img`, same dimensions and placement.
    ///
    /// `cell_size == 0` picks [`default_cell_size`]. `noise_amount <= 0` disables noise.
    pub fn draw(
        &self,
        img: &SubImage,
        num_colors: usize,
        cell_size: u32,
        noise_amount: f64,
    ) -> FaceFxResult<SubImage> {
        let (w, h) = (img.width(), img.height());
        if w == 0 || h == 0 {
            return Ok(img.clone());
        }
        if num_colors == 0 {
            return Err(FaceFxError::validation("quantizer needs at least one color"));
        }
        let cell = if cell_size == 0 {
            default_cell_size(w, h)
        } else {
            cell_size
        };

        let quantized = self.reducer.reduce(img.data(), num_colors)?;
        if quantized.len() != img.data().len() {
            return Err(FaceFxError::backend(
                "palette reducer changed the image size",
            ));
        }

        let mut out = vec![0u8; quantized.len()];
        let bounds = PixelRect::new(0, 0, w, h);
        let mut y = 0;
        while y < h {
            let mut x = 0;
            while x < w {
                let rect = PixelRect::new(x, y, cell, cell).intersect(bounds);
                if let Some(color) = average_rgb(&quantized, w, rect) {
                    fill_rect(&mut out, w, rect, [color[0], color[1], color[2], 255]);
                }
                x = x.saturating_add(cell);
            }
            y = y.saturating_add(cell);
        }

        if noise_amount > 0.0 {
            add_noise(&mut out, w, h, noise_amount);
        }
        img.with_data(out)
    }
}

/// Mean RGB over `rect`; `None` for an empty rectangle.
fn average_rgb(rgba: &[u8], width: u32, rect: PixelRect) -> Option<[u8; 3]> {
    let count = rect.area() as u64;
    if count == 0 {
        return None;
    }
    let mut sum = [0u64; 3];
    for y in rect.y..rect.bottom() {
        let row = (y as usize * width as usize + rect.x as usize) * 4;
        for px in rgba[row..row + rect.width as usize * 4].chunks_exact(4) {
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
    }
    Some([
        (sum[0] / count) as u8,
        (sum[1] / count) as u8,
        (sum[2] / count) as u8,
    ])
}

fn fill_rect(rgba: &mut [u8], width: u32, rect: PixelRect, color: [u8; 4]) {
    for y in rect.y..rect.bottom() {
        let row = (y as usize * width as usize + rect.x as usize) * 4;
        for px in rgba[row..row + rect.width as usize * 4].chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/quantize/draw.rs"]
mod tests;
