//! Low-poly stylization.
//!
//! The region is covered by a regular grid whose density follows `max_points`. Each cell is
//! either flattened to its mean color (when its luma spread is under `points_threshold`) or
//! cut along its top-left to bottom-right diagonal into two triangles, each filled with its
//! own mean. With `wireframe` on, cell edges and split diagonals are stroked in black. The
//! output is fully deterministic.

use crate::effects::{EffectBackend, EffectKind, EffectParams, MeshParams};
use crate::foundation::core::{PixelRect, SubImage};
use crate::foundation::error::FaceFxResult;
use crate::foundation::math::luma_u8;

/// Smallest cell side the grid will use.
const MIN_CELL: u32 = 2;

const STROKE: [u8; 4] = [0, 0, 0, 255];

#[derive(Clone, Copy, Debug, Default)]
pub struct MeshBackend;

impl MeshBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EffectBackend for MeshBackend {
    fn kind(&self) -> EffectKind {
        EffectKind::Mesh
    }

    fn transform(&mut self, sub: &SubImage, params: &EffectParams) -> FaceFxResult<SubImage> {
        let (w, h) = (sub.width(), sub.height());
        if w == 0 || h == 0 {
            return Ok(sub.clone());
        }
        let mesh = params.mesh;
        let cell = grid_cell_size(w, h, mesh.max_points);
        let src = sub.data();
        let mut out = vec![0u8; src.len()];
        let bounds = PixelRect::new(0, 0, w, h);

        let mut y = 0;
        while y < h {
            let mut x = 0;
            while x < w {
                let rect = PixelRect::new(x, y, cell, cell).intersect(bounds);
                shade_cell(src, &mut out, w, rect, &mesh);
                x = x.saturating_add(cell);
            }
            y = y.saturating_add(cell);
        }
        sub.with_data(out)
    }
}

/// Grid step so that roughly `max_points` vertices cover the longer side squared.
pub fn grid_cell_size(width: u32, height: u32, max_points: u32) -> u32 {
    let per_side = f64::from(max_points.max(1)).sqrt();
    let side = f64::from(width.max(height));
    ((side / per_side).ceil() as u32).max(MIN_CELL)
}

fn above_diagonal(rect: PixelRect, x: u32, y: u32) -> bool {
    let lx = u64::from(x - rect.x);
    let ly = u64::from(y - rect.y);
    lx * u64::from(rect.height) >= ly * u64::from(rect.width)
}

#[derive(Default)]
struct Mean {
    sum: [u64; 3],
    count: u64,
}

impl Mean {
    fn add(&mut self, px: &[u8]) {
        self.sum[0] += u64::from(px[0]);
        self.sum[1] += u64::from(px[1]);
        self.sum[2] += u64::from(px[2]);
        self.count += 1;
    }

    fn merge(&self, other: &Mean) -> Mean {
        Mean {
            sum: [
                self.sum[0] + other.sum[0],
                self.sum[1] + other.sum[1],
                self.sum[2] + other.sum[2],
            ],
            count: self.count + other.count,
        }
    }

    fn color(&self, grayscale: bool) -> Option<[u8; 4]> {
        if self.count == 0 {
            return None;
        }
        let [r, g, b] = self.sum.map(|s| (s / self.count) as u8);
        if grayscale {
            let l = luma_u8(r, g, b);
            Some([l, l, l, 255])
        } else {
            Some([r, g, b, 255])
        }
    }
}

/// True when `(x, y)` falls on the stroked top/left edge or, for split cells, the diagonal.
fn on_stroke(rect: PixelRect, x: u32, y: u32, stroke: u32, split: bool) -> bool {
    let (lx, ly) = (x - rect.x, y - rect.y);
    if lx < stroke || ly < stroke {
        return true;
    }
    if !split {
        return false;
    }
    let (w, h) = (f64::from(rect.width), f64::from(rect.height));
    let cross = (f64::from(lx) + 0.5) * h - (f64::from(ly) + 0.5) * w;
    cross.abs() / w.hypot(h) <= f64::from(stroke) / 2.0
}

fn shade_cell(src: &[u8], out: &mut [u8], width: u32, rect: PixelRect, mesh: &MeshParams) {
    if rect.is_empty() {
        return;
    }
    let idx = |x: u32, y: u32| (y as usize * width as usize + x as usize) * 4;

    let mut upper = Mean::default();
    let mut lower = Mean::default();
    let (mut lo, mut hi) = (u8::MAX, u8::MIN);
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let i = idx(x, y);
            let px = &src[i..i + 4];
            let l = luma_u8(px[0], px[1], px[2]);
            lo = lo.min(l);
            hi = hi.max(l);
            if above_diagonal(rect, x, y) {
                upper.add(px);
            } else {
                lower.add(px);
            }
        }
    }

    let grayscale = mesh.grayscale;
    let split = u32::from(hi - lo) >= mesh.points_threshold;
    let stroke = if mesh.wireframe { mesh.stroke_width } else { 0 };
    let whole = upper.merge(&lower);
    let (upper_color, lower_color) = if !split {
        let c = whole.color(grayscale);
        (c, c)
    } else {
        let fallback = whole.color(grayscale);
        (
            upper.color(grayscale).or(fallback),
            lower.color(grayscale).or(fallback),
        )
    };

    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let color = if stroke > 0 && on_stroke(rect, x, y, stroke, split) {
                Some(STROKE)
            } else if above_diagonal(rect, x, y) {
                upper_color
            } else {
                lower_color
            };
            if let Some(c) = color {
                let i = idx(x, y);
                out[i..i + 4].copy_from_slice(&c);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mesh.rs"]
mod tests;
