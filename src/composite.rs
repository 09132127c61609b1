//! Soft elliptical masking and blending of effect output back over the frame.
//!
//! The mask is a circular radial gradient (opaque up to the inner stop, fading linearly to
//! transparent at the outer stop) mapped through the region's anisotropic scale and lean
//! rotation so it lands on the face as a tilted ellipse. The effect output is never rotated,
//! only the mask is.

use crate::effects::MaskParams;
use crate::foundation::core::{PixelRect, Point, SubImage};
use crate::foundation::error::{FaceFxError, FaceFxResult};
use crate::foundation::math::mul_div255_u16;
use crate::geometry::RegionGeometry;

/// Per-pixel coverage for one rectangle of the frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlphaMask {
    rect: PixelRect,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Rasterize the gradient ellipse of `geom` over `rect` (frame coordinates).
    pub fn build(geom: &RegionGeometry, rect: PixelRect, stops: MaskParams) -> FaceFxResult<Self> {
        let radius = geom.gradient_radius();
        if !(radius.is_finite() && radius > 0.0) {
            return Err(FaceFxError::validation("mask gradient radius must be > 0"));
        }
        let to_gradient = geom.mask_transform().inverse();

        let mut alpha = Vec::with_capacity(rect.area());
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let p = to_gradient * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let t = p.to_vec2().hypot() / radius;
                alpha.push((gradient_alpha(t, stops) * 255.0).round() as u8);
            }
        }
        Ok(Self { rect, alpha })
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn alpha(&self) -> &[u8] {
        &self.alpha
    }

    /// Coverage at frame pixel `(x, y)`, `0` outside the mask.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        let r = self.rect;
        if x < r.x || y < r.y || x >= r.right() || y >= r.bottom() {
            return 0;
        }
        let i = (y - r.y) as usize * r.width as usize + (x - r.x) as usize;
        self.alpha[i]
    }
}

/// Opacity of the two-stop gradient at normalized distance `t`.
pub fn gradient_alpha(t: f64, stops: MaskParams) -> f64 {
    if t <= stops.inner_stop {
        1.0
    } else if t >= stops.outer_stop {
        0.0
    } else {
        1.0 - (t - stops.inner_stop) / (stops.outer_stop - stops.inner_stop)
    }
}

/// Straight-alpha source-over with an extra coverage factor.
pub fn over_straight(dst: [u8; 4], src: [u8; 4], coverage: u8) -> [u8; 4] {
    let sa = u32::from(mul_div255_u16(u16::from(src[3]), u16::from(coverage)));
    if sa == 0 {
        return dst;
    }
    let da = u32::from(mul_div255_u16(u16::from(dst[3]), (255 - sa) as u16));
    let out_a = sa + da;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa + u32::from(dst[i]) * da;
        out[i] = ((c + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = out_a.min(255) as u8;
    out
}

/// Blend `effect` over `original` through `mask`. All three must cover the same rectangle.
pub fn blend_masked(
    original: &SubImage,
    effect: &SubImage,
    mask: &AlphaMask,
) -> FaceFxResult<SubImage> {
    if original.rect() != effect.rect() || original.rect() != mask.rect() {
        return Err(FaceFxError::validation(format!(
            "blend expects matching rects, got {:?} / {:?} / {:?}",
            original.rect(),
            effect.rect(),
            mask.rect()
        )));
    }
    let mut out = original.data().to_vec();
    for ((d, s), &a) in out
        .chunks_exact_mut(4)
        .zip(effect.data().chunks_exact(4))
        .zip(mask.alpha())
    {
        let px = over_straight([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], a);
        d.copy_from_slice(&px);
    }
    original.with_data(out)
}

/// Mask builder plus blend, configured with one set of gradient stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compositor {
    stops: MaskParams,
}

impl Compositor {
    pub fn new(stops: MaskParams) -> Self {
        Self { stops }
    }

    /// Produce the patch to write back for one face.
    pub fn composite(
        &self,
        original: &SubImage,
        effect: &SubImage,
        geom: &RegionGeometry,
    ) -> FaceFxResult<SubImage> {
        let mask = AlphaMask::build(geom, original.rect(), self.stops)?;
        blend_masked(original, effect, &mask)
    }
}

#[cfg(test)]
#[path = "../tests/unit/composite.rs"]
mod tests;
