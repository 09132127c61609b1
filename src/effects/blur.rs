//! Separable Gaussian blur over straight-alpha RGBA8.
//!
//! Frames carry straight alpha, so colors are premultiplied before the two passes and
//! restored afterwards; otherwise transparent neighbors would bleed black into the edge of a
//! region. The Q16 kernel is cached per `(radius, sigma)` and the scratch buffers live in the
//! backend, so repeated per-face calls only allocate the output.

use crate::effects::{EffectBackend, EffectKind, EffectParams};
use crate::foundation::core::{SubImage, rgba_len};
use crate::foundation::error::{FaceFxError, FaceFxResult};
use crate::foundation::math::mul_div255_u16;

const Q16_ONE: u32 = 1 << 16;

/// Gaussian blur with `sigma = radius / 2`.
///
/// The same backend serves the face blur and the background blur; only [`EffectKind`]
/// differs, which decides how the scheduler applies it.
#[derive(Clone, Debug)]
pub struct BlurBackend {
    kind: EffectKind,
    scratch: BlurScratch,
}

impl BlurBackend {
    /// Blur applied inside each face ellipse.
    pub fn new() -> Self {
        Self {
            kind: EffectKind::Blur,
            scratch: BlurScratch::default(),
        }
    }

    /// Blur applied to the whole frame, with faces kept sharp.
    pub fn background() -> Self {
        Self {
            kind: EffectKind::BackgroundBlur,
            scratch: BlurScratch::default(),
        }
    }
}

impl Default for BlurBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectBackend for BlurBackend {
    fn kind(&self) -> EffectKind {
        self.kind
    }

    fn transform(&mut self, sub: &SubImage, params: &EffectParams) -> FaceFxResult<SubImage> {
        let radius = params.blur.radius;
        let out = self.scratch.blur(
            sub.data(),
            sub.width(),
            sub.height(),
            radius,
            radius as f32 / 2.0,
        )?;
        sub.with_data(out)
    }
}

/// Reusable buffers and the last kernel built.
#[derive(Clone, Debug, Default)]
pub struct BlurScratch {
    premul: Vec<u8>,
    tmp: Vec<u8>,
    kernel: Option<Kernel>,
}

#[derive(Clone, Debug)]
struct Kernel {
    radius: u32,
    sigma_bits: u32,
    weights: Vec<u32>,
}

impl BlurScratch {
    /// Blur a straight-alpha RGBA8 buffer of `width x height` pixels.
    pub fn blur(
        &mut self,
        src: &[u8],
        width: u32,
        height: u32,
        radius: u32,
        sigma: f32,
    ) -> FaceFxResult<Vec<u8>> {
        let expected_len = rgba_len(width, height)?;
        if src.len() != expected_len {
            return Err(FaceFxError::validation(
                "blur expects src matching width*height*4",
            ));
        }
        if radius == 0 || expected_len == 0 {
            return Ok(src.to_vec());
        }

        let weights = cached_kernel(&mut self.kernel, radius, sigma)?;
        premultiply(src, &mut self.premul);
        self.tmp.clear();
        self.tmp.resize(expected_len, 0);
        let mut out = vec![0u8; expected_len];

        let (w, h) = (width as usize, height as usize);
        convolve(&self.premul, &mut self.tmp, w, h, weights, Axis::Rows);
        convolve(&self.tmp, &mut out, w, h, weights, Axis::Columns);
        unpremultiply(&mut out);
        Ok(out)
    }
}

/// Kernel for `(radius, sigma)`, rebuilt only when either changes.
fn cached_kernel(slot: &mut Option<Kernel>, radius: u32, sigma: f32) -> FaceFxResult<&[u32]> {
    let sigma_bits = sigma.to_bits();
    let kernel = match slot.take() {
        Some(k) if k.radius == radius && k.sigma_bits == sigma_bits => k,
        _ => Kernel {
            radius,
            sigma_bits,
            weights: gaussian_kernel_q16(radius, sigma)?,
        },
    };
    Ok(&slot.insert(kernel).weights)
}

/// One-shot blur of a straight-alpha RGBA8 buffer.
pub fn blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FaceFxResult<Vec<u8>> {
    BlurScratch::default().blur(src, width, height, radius, sigma)
}

/// Normalized Gaussian taps in Q16 that sum to exactly `1 << 16`.
fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FaceFxResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FaceFxError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let taps: Vec<f64> = (-r..=r)
        .map(|i| (-f64::from(i * i) / denom).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    if sum <= 0.0 {
        return Err(FaceFxError::backend("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = taps
        .iter()
        .map(|t| ((t / sum) * f64::from(Q16_ONE)).round() as u32)
        .collect();
    let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + i64::from(Q16_ONE) - total)
        .clamp(0, i64::from(Q16_ONE)) as u32;
    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Columns,
}

/// Convolve every row (or column) with `k`, clamping samples at the edges.
fn convolve(src: &[u8], dst: &mut [u8], width: usize, height: usize, k: &[u32], axis: Axis) {
    // (samples per line, byte step between samples, line count, byte step between lines)
    let (len, step, lines, line_step) = match axis {
        Axis::Rows => (width, 4, height, width * 4),
        Axis::Columns => (height, width * 4, width, 4),
    };
    let radius = (k.len() / 2) as isize;
    let last = len as isize - 1;
    for line in 0..lines {
        let base = line * line_step;
        for i in 0..len {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let j = (i as isize + ki as isize - radius).clamp(0, last) as usize;
                let px = &src[base + j * step..base + j * step + 4];
                for (a, &c) in acc.iter_mut().zip(px) {
                    *a += u64::from(kw) * u64::from(c);
                }
            }
            let o = base + i * step;
            for (d, a) in dst[o..o + 4].iter_mut().zip(acc) {
                *d = ((a + u64::from(Q16_ONE / 2)) >> 16).min(255) as u8;
            }
        }
    }
}

fn premultiply(src: &[u8], out: &mut Vec<u8>) {
    out.clear();
    out.extend_from_slice(src);
    for px in out.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), a) as u8;
        }
    }
}

fn unpremultiply(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        match a {
            255 => {}
            0 => px[..3].fill(0),
            _ => {
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
