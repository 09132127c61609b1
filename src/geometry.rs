//! Ellipse geometry for a detected face region.
//!
//! A [`RegionGeometry`] is derived per detection and per tick and never outlives it. It holds
//! the square region to extract, the ellipse radii, the anisotropic correction that turns a
//! circular radial gradient into that ellipse, and the lean angle read from the pupils.

use crate::detect::{Detection, PupilPoint};
use crate::foundation::core::{Affine, Point};

/// Masks are rotated only past this lean.
pub const ROTATION_THRESHOLD: f64 = 0.1;

/// How a detection box maps onto the region handed to an effect, and how large the mask
/// ellipse is inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionProfile {
    /// Multiplier applied to the detection scale.
    pub side_factor: f64,
    /// The center row moves down by `row * row_shift`.
    pub row_shift: f64,
    /// Ellipse width as a fraction of the region side.
    pub width_ratio: f64,
    /// Ellipse height as a fraction of the region side.
    pub height_ratio: f64,
}

impl RegionProfile {
    /// The detection box as-is, with the reference ellipse.
    pub const RAW: Self = Self {
        side_factor: 1.0,
        row_shift: 0.0,
        width_ratio: 0.8 / 1.6,
        height_ratio: 0.8 / 2.1,
    };

    /// Face blur: raw box, slightly wider and flatter ellipse.
    pub const BLUR: Self = Self {
        width_ratio: 0.8 / 1.55,
        height_ratio: 0.8 / 2.2,
        ..Self::RAW
    };

    /// Tighter box pulled toward the lower face, where the mosaic reads best.
    pub const PIXELATE: Self = Self {
        side_factor: 0.75,
        row_shift: 0.115,
        ..Self::RAW
    };

    /// Low-poly mesh: raw box, rounder ellipse.
    pub const MESH: Self = Self {
        height_ratio: 0.8 / 2.0,
        ..Self::RAW
    };

    /// Box grown by 20%, used to keep the face sharp over a blurred background.
    pub const EXPANDED: Self = Self {
        side_factor: 1.2,
        ..Self::RAW
    };

    /// Center `(col, row)` and side of the region for `det`.
    pub fn apply(&self, det: &Detection) -> (i64, i64, u32) {
        let row = f64::from(det.row);
        let row = row + (row * self.row_shift).trunc();
        let side = (f64::from(det.scale.max(0)) * self.side_factor).trunc();
        (i64::from(det.col), row as i64, side as u32)
    }
}

impl Default for RegionProfile {
    fn default() -> Self {
        Self::RAW
    }
}

/// Derived ellipse parameters for one face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionGeometry {
    /// Region center in frame pixels (`x = col`, `y = row`).
    pub center: Point,
    /// Side of the square region before clipping.
    pub side: u32,
    /// Horizontal ellipse radius.
    pub radius_x: f64,
    /// Vertical ellipse radius.
    pub radius_y: f64,
    /// Horizontal correction applied to the circular gradient.
    pub scale_x: f64,
    /// Vertical correction applied to the circular gradient.
    pub scale_y: f64,
    /// Lean angle from the pupils, `0.0` when either pupil is missing.
    pub rotation_angle: f64,
}

impl RegionGeometry {
    /// Derive the geometry for `det`, or `None` when the region degenerates to nothing.
    pub fn from_detection(
        det: &Detection,
        profile: RegionProfile,
        left: Option<&PupilPoint>,
        right: Option<&PupilPoint>,
    ) -> Option<Self> {
        let (cx, cy, side) = profile.apply(det);
        if side == 0 {
            return None;
        }
        let side_f = f64::from(side);
        let radius_x = side_f * profile.width_ratio / 2.0;
        let radius_y = side_f * profile.height_ratio / 2.0;
        if !(radius_x > 0.0 && radius_y > 0.0) {
            return None;
        }
        let (scale_x, scale_y) = anisotropy(radius_x, radius_y);
        let rotation_angle = match (left, right) {
            (Some(l), Some(r)) => lean_angle(l, r),
            _ => 0.0,
        };
        Some(Self {
            center: Point::new(cx as f64, cy as f64),
            side,
            radius_x,
            radius_y,
            scale_x,
            scale_y,
            rotation_angle,
        })
    }

    /// Return `true` when the mask should be rotated.
    ///
    /// The lean angle is `1.0` for level eyes and `0.0` for a vertical pupil pair, so a
    /// frontal face is the rotated case here and the mask stays axis-aligned only when the
    /// pupils sit close to vertical or are missing.
    pub fn applies_rotation(&self) -> bool {
        self.rotation_angle.abs() > ROTATION_THRESHOLD
    }

    /// Radius of the circular gradient before the anisotropic correction: twice the major
    /// radius.
    pub fn gradient_radius(&self) -> f64 {
        2.0 * self.radius_x.max(self.radius_y)
    }

    /// Map from gradient space (circle at the origin) to frame pixels.
    ///
    /// The rotation is built as translate to center, rotate, translate back, and then the
    /// scaled gradient is placed at the center.
    pub fn mask_transform(&self) -> Affine {
        let to_center = self.center.to_vec2();
        let angle = if self.applies_rotation() {
            self.rotation_angle
        } else {
            0.0
        };
        let rotate_about_center = Affine::translate(to_center)
            * Affine::rotate(angle)
            * Affine::translate(-to_center);
        rotate_about_center
            * Affine::translate(to_center)
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }
}

/// Correction that stretches the minor axis: one factor is exactly `1`, the other is the
/// major/minor radius ratio.
pub fn anisotropy(radius_x: f64, radius_y: f64) -> (f64, f64) {
    if radius_x >= radius_y {
        (1.0, radius_x / radius_y)
    } else {
        (radius_y / radius_x, 1.0)
    }
}

/// `1 - atan2(dRow, dCol)` in degrees over 90, with the delta taken from left to right pupil.
///
/// Level eyes give `1.0`, a vertical pupil pair gives `0.0`. The result is used directly as a
/// rotation in radians.
pub fn lean_angle(left: &PupilPoint, right: &PupilPoint) -> f64 {
    let d_row = f64::from(right.row - left.row);
    let d_col = f64::from(right.col - left.col);
    1.0 - d_row.atan2(d_col).to_degrees() / 90.0
}

#[cfg(test)]
#[path = "../tests/unit/geometry.rs"]
mod tests;
