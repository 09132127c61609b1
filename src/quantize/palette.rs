use std::ops::Range;

use crate::foundation::error::{FaceFxError, FaceFxResult};

/// Palette reduction primitive used by the quantizer.
///
/// Implementations return an RGBA buffer of the same length whose pixels are all drawn from a
/// palette of at most `num_colors` entries. Alpha is written as `255`.
pub trait PaletteReducer: Send + Sync {
    /// Reduce `rgba` to at most `num_colors` distinct colors.
    fn reduce(&self, rgba: &[u8], num_colors: usize) -> FaceFxResult<Vec<u8>>;
}

/// Median-cut palette reduction.
///
/// Repeatedly splits the color box with the widest channel extent at its median until
/// `num_colors` boxes exist (or no box can be split), then maps every pixel to the nearest
/// box mean.
#[derive(Clone, Copy, Debug, Default)]
pub struct MedianCut;

impl MedianCut {
    /// Compute the palette for `rgba`. The result has between 1 and `num_colors` entries for
    /// non-empty input.
    pub fn palette(&self, rgba: &[u8], num_colors: usize) -> Vec<[u8; 3]> {
        let mut colors: Vec<[u8; 3]> = rgba
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2]])
            .collect();
        if colors.is_empty() || num_colors == 0 {
            return Vec::new();
        }

        let mut boxes: Vec<Range<usize>> = vec![0..colors.len()];
        while boxes.len() < num_colors {
            let Some((bi, channel)) = widest_box(&colors, &boxes) else {
                break;
            };
            let range = boxes[bi].clone();
            colors[range.clone()].sort_unstable_by_key(|c| c[channel]);
            let mid = range.start + range.len() / 2;
            boxes[bi] = range.start..mid;
            boxes.push(mid..range.end);
        }

        boxes.iter().map(|r| mean(&colors[r.clone()])).collect()
    }
}

impl PaletteReducer for MedianCut {
    fn reduce(&self, rgba: &[u8], num_colors: usize) -> FaceFxResult<Vec<u8>> {
        if !rgba.len().is_multiple_of(4) {
            return Err(FaceFxError::validation(
                "palette reduction expects an rgba8 buffer",
            ));
        }
        let palette = self.palette(rgba, num_colors);
        let mut out = Vec::with_capacity(rgba.len());
        for px in rgba.chunks_exact(4) {
            let c = nearest(&palette, [px[0], px[1], px[2]]);
            out.extend_from_slice(&[c[0], c[1], c[2], 255]);
        }
        Ok(out)
    }
}

/// Box with the largest single-channel extent, and that channel. Boxes that cannot be split
/// (one entry, or all entries equal) are skipped.
fn widest_box(colors: &[[u8; 3]], boxes: &[Range<usize>]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, u8)> = None;
    for (bi, r) in boxes.iter().enumerate() {
        if r.len() < 2 {
            continue;
        }
        let (channel, extent) = widest_channel(&colors[r.clone()]);
        if extent == 0 {
            continue;
        }
        if best.is_none_or(|(_, _, e)| extent > e) {
            best = Some((bi, channel, extent));
        }
    }
    best.map(|(bi, channel, _)| (bi, channel))
}

fn widest_channel(colors: &[[u8; 3]]) -> (usize, u8) {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for c in colors {
        for i in 0..3 {
            lo[i] = lo[i].min(c[i]);
            hi[i] = hi[i].max(c[i]);
        }
    }
    (0..3)
        .map(|i| (i, hi[i] - lo[i]))
        .fold((0, 0), |acc, cur| if cur.1 > acc.1 { cur } else { acc })
}

fn mean(colors: &[[u8; 3]]) -> [u8; 3] {
    let n = colors.len().max(1) as u64;
    let mut sum = [0u64; 3];
    for c in colors {
        for i in 0..3 {
            sum[i] += u64::from(c[i]);
        }
    }
    [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8]
}

fn nearest(palette: &[[u8; 3]], c: [u8; 3]) -> [u8; 3] {
    let dist = |p: &[u8; 3]| -> u32 {
        (0..3)
            .map(|i| {
                let d = i32::from(p[i]) - i32::from(c[i]);
                (d * d) as u32
            })
            .sum()
    };
    palette
        .iter()
        .min_by_key(|p| dist(p))
        .copied()
        .unwrap_or(c)
}

#[cfg(test)]
#[path = "../../tests/unit/quantize/palette.rs"]
mod tests;
