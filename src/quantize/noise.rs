/// Park–Miller minimal standard generator: `state' = 16807 * state mod (2^31 - 1)`.
#[derive(Clone, Debug)]
pub(crate) struct ParkMiller {
    state: u64,
}

impl ParkMiller {
    pub(crate) const A: u64 = 16_807;
    pub(crate) const M: u64 = 0x7fff_ffff;

    pub(crate) fn new(seed: u64) -> Self {
        let state = seed % Self::M;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Next value in `[0, 1)`.
    pub(crate) fn next_f64(&mut self) -> f64 {
        self.state = (Self::A * self.state) % Self::M;
        self.state as f64 / Self::M as f64
    }
}

/// Add `(rand - 0.1) * amount` to the RGB channels of every pixel, in place.
///
/// The generator is reseeded with `1` on every call, so the same input always gets the same
/// noise. Pixels are visited column by column.
///
/// A pixel is only touched when every shifted channel stays below 255 in magnitude; otherwise
/// it is left exactly as it was. This drops noise near white instead of clamping it, which is
/// the intended look. Shifted values below zero saturate to `0`.
pub fn add_noise(rgba: &mut [u8], width: u32, height: u32, amount: f64) {
    let mut rng = ParkMiller::new(1);
    let (w, h) = (width as usize, height as usize);
    if rgba.len() < w * h * 4 {
        return;
    }
    for x in 0..w {
        for y in 0..h {
            let noise = (rng.next_f64() - 0.1) * amount;
            let idx = (y * w + x) * 4;
            let px = &mut rgba[idx..idx + 3];
            let fits = px.iter().all(|&c| (f64::from(c) + noise).abs() < 255.0);
            if fits {
                for c in px.iter_mut() {
                    *c = (f64::from(*c) + noise) as u8;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/noise.rs"]
mod tests;
