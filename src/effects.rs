//! Effect backends.
//!
//! Every effect turns a face sub-image into a same-sized stylized sub-image. The scheduler
//! only sees [`EffectBackend`]; which implementation runs is a configuration choice made
//! through [`EffectKind`] and [`create_backend`].

mod blur;
mod mesh;
pub(crate) mod params;
mod pixelate;

pub use blur::{BlurBackend, BlurScratch, blur_rgba8};
pub use mesh::{MeshBackend, grid_cell_size};
pub use params::{BlurParams, EffectParams, MaskParams, MeshParams, PixelateParams, SharedParams};
pub use pixelate::PixelateBackend;

use crate::foundation::core::SubImage;
use crate::foundation::error::FaceFxResult;
use crate::geometry::RegionProfile;

/// Available effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectKind {
    Blur,
    #[default]
    Pixelate,
    Mesh,
    /// Blur everything except the faces.
    #[serde(rename = "background-blur", alias = "bgblur")]
    BackgroundBlur,
}

impl EffectKind {
    /// Region calibration this effect is tuned for.
    pub fn profile(self) -> RegionProfile {
        match self {
            Self::Blur => RegionProfile::BLUR,
            Self::Pixelate => RegionProfile::PIXELATE,
            Self::Mesh => RegionProfile::MESH,
            Self::BackgroundBlur => RegionProfile::EXPANDED,
        }
    }

    /// True when the backend runs over the whole frame and faces are restored from the
    /// original, instead of stylizing each face.
    pub fn is_background(self) -> bool {
        matches!(self, Self::BackgroundBlur)
    }
}

/// A region stylizer.
///
/// Backends are not assumed to be reentrant: they may keep scratch state between calls, so
/// the scheduler serializes `transform` calls on a single instance. The output must cover the
/// same rectangle as the input.
pub trait EffectBackend: Send {
    fn kind(&self) -> EffectKind;

    fn transform(&mut self, sub: &SubImage, params: &EffectParams) -> FaceFxResult<SubImage>;
}

/// Build the default backend for `kind`.
pub fn create_backend(kind: EffectKind) -> Box<dyn EffectBackend> {
    match kind {
        EffectKind::Blur => Box::new(BlurBackend::new()),
        EffectKind::Pixelate => Box::new(PixelateBackend::new()),
        EffectKind::Mesh => Box::new(MeshBackend::new()),
        EffectKind::BackgroundBlur => Box::new(BlurBackend::background()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/effects/kind.rs"]
mod tests;
