use std::sync::{Arc, RwLock};

use crate::foundation::error::{FaceFxError, FaceFxResult};

/// Blur backend parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlurParams {
    /// Kernel radius in pixels, `5..=50`.
    pub radius: u32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self { radius: 20 }
    }
}

/// Pixelate backend parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PixelateParams {
    /// Palette size, `2..=32`.
    pub colors: usize,
    /// Cell side in pixels, `8..=30`, or `0` to derive it from the region size.
    pub cell_size: u32,
    /// Noise amplitude, `0..=64`. `0` disables noise.
    pub noise: f64,
}

impl PixelateParams {
    /// Amplitude the demo UI uses when noise is switched on.
    pub const NOISE_ON: f64 = 12.0;
}

impl Default for PixelateParams {
    fn default() -> Self {
        Self {
            colors: 8,
            cell_size: 10,
            noise: 0.0,
        }
    }
}

/// Mesh backend parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Upper bound on grid vertices, `150..=750`.
    pub max_points: u32,
    /// Luma spread below which a cell is flattened, `2..=25`.
    pub points_threshold: u32,
    /// Emit grayscale triangles.
    pub grayscale: bool,
    /// Outline every cell and triangle.
    pub wireframe: bool,
    /// Outline thickness in pixels, `0..=4`. Zero hides the wireframe.
    pub stroke_width: u32,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            max_points: 450,
            points_threshold: 10,
            grayscale: false,
            wireframe: false,
            stroke_width: 1,
        }
    }
}

/// Radial gradient stops of the face mask, as fractions of the gradient radius.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MaskParams {
    /// Fully opaque up to here.
    pub inner_stop: f64,
    /// Fully transparent from here.
    pub outer_stop: f64,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            inner_stop: 0.55,
            outer_stop: 0.75,
        }
    }
}

/// Every tunable knob of the effect pipeline. One snapshot is taken per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EffectParams {
    pub blur: BlurParams,
    pub pixelate: PixelateParams,
    pub mesh: MeshParams,
    pub mask: MaskParams,
}

impl EffectParams {
    /// Check every field against its documented range.
    pub fn validate(&self) -> FaceFxResult<()> {
        check_range("blur.radius", self.blur.radius, 5, 50)?;
        check_range("pixelate.colors", self.pixelate.colors, 2, 32)?;
        if self.pixelate.cell_size != 0 {
            check_range("pixelate.cell_size", self.pixelate.cell_size, 8, 30)?;
        }
        let noise = self.pixelate.noise;
        if !noise.is_finite() || !(0.0..=64.0).contains(&noise) {
            return Err(FaceFxError::validation(format!(
                "pixelate.noise must be within 0..=64, got {noise}"
            )));
        }
        check_range("mesh.max_points", self.mesh.max_points, 150, 750)?;
        check_range("mesh.points_threshold", self.mesh.points_threshold, 2, 25)?;
        check_range("mesh.stroke_width", self.mesh.stroke_width, 0, 4)?;
        let MaskParams {
            inner_stop,
            outer_stop,
        } = self.mask;
        if !(inner_stop.is_finite() && outer_stop.is_finite())
            || inner_stop <= 0.0
            || inner_stop >= outer_stop
            || outer_stop > 1.0
        {
            return Err(FaceFxError::validation(format!(
                "mask stops must satisfy 0 < inner < outer <= 1, got {inner_stop} / {outer_stop}"
            )));
        }
        Ok(())
    }
}

fn check_range<T>(name: &str, v: T, lo: T, hi: T) -> FaceFxResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if v < lo || v > hi {
        return Err(FaceFxError::validation(format!(
            "{name} must be within {lo}..={hi}, got {v}"
        )));
    }
    Ok(())
}

/// Externally mutable parameter handle.
///
/// Writers go through [`SharedParams::update`], which validates before publishing. The
/// scheduler reads once per tick via [`SharedParams::snapshot`], so a change lands on the
/// next tick and never halfway through one.
#[derive(Clone, Debug, Default)]
pub struct SharedParams {
    inner: Arc<RwLock<EffectParams>>,
}

impl SharedParams {
    pub fn new(params: EffectParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// Copy of the current parameters.
    pub fn snapshot(&self) -> EffectParams {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Mutate a copy, validate it, and publish it. Invalid edits leave the old value in place.
    pub fn update(&self, f: impl FnOnce(&mut EffectParams)) -> FaceFxResult<()> {
        let mut next = self.snapshot();
        f(&mut next);
        next.validate()?;
        let mut guard = match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
