use crate::effects::{EffectBackend, EffectKind, EffectParams};
use crate::foundation::core::SubImage;
use crate::foundation::error::FaceFxResult;
use crate::quantize::{MedianCut, PaletteReducer, Quantizer};

/// Mosaic effect: palette reduction, cell averaging and optional noise.
#[derive(Clone, Debug, Default)]
pub struct PixelateBackend<P = MedianCut> {
    quantizer: Quantizer<P>,
}

impl PixelateBackend<MedianCut> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: PaletteReducer> PixelateBackend<P> {
    /// Pixelate with a custom palette reducer.
    pub fn with_reducer(reducer: P) -> Self {
        Self {
            quantizer: Quantizer::with_reducer(reducer),
        }
    }
}

impl<P: PaletteReducer> EffectBackend for PixelateBackend<P> {
    fn kind(&self) -> EffectKind {
        EffectKind::Pixelate
    }

    fn transform(&mut self, sub: &SubImage, params: &EffectParams) -> FaceFxResult<SubImage> {
        let p = params.pixelate;
        self.quantizer.draw(sub, p.colors, p.cell_size, p.noise)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/pixelate.rs"]
mod tests;
