use super::*;
use crate::detect::{Detection, PupilPoint};
use crate::geometry::RegionProfile;

fn geom(side: i32, left: Option<PupilPoint>, right: Option<PupilPoint>) -> RegionGeometry {
    let det = Detection {
        row: side / 2,
        col: side / 2,
        scale: side,
        confidence: 99.0,
    };
    RegionGeometry::from_detection(&det, RegionProfile::RAW, left.as_ref(), right.as_ref())
        .unwrap()
}

fn solid(rect: PixelRect, px: [u8; 4]) -> SubImage {
    SubImage::new(rect, px.repeat(rect.area())).unwrap()
}

#[test]
fn gradient_has_two_stops() {
    let stops = MaskParams::default();
    assert_eq!(gradient_alpha(0.0, stops), 1.0);
    assert_eq!(gradient_alpha(0.55, stops), 1.0);
    assert!((gradient_alpha(0.65, stops) - 0.5).abs() < 1e-9);
    assert_eq!(gradient_alpha(0.75, stops), 0.0);
    assert_eq!(gradient_alpha(3.0, stops), 0.0);
}

#[test]
fn mask_is_opaque_at_center_and_clear_at_corners() {
    let g = geom(100, None, None);
    let rect = PixelRect::new(0, 0, 100, 100);
    let mask = AlphaMask::build(&g, rect, MaskParams::default()).unwrap();
    assert_eq!(mask.coverage(50, 50), 255);
    assert_eq!(mask.coverage(0, 0), 0);
    assert_eq!(mask.coverage(99, 99), 0);
    assert_eq!(mask.coverage(99, 50), 0);
    assert_eq!(mask.coverage(500, 500), 0);
}

#[test]
fn mask_ellipse_is_taller_than_wide() {
    let g = geom(100, None, None);
    let rect = PixelRect::new(0, 0, 100, 100);
    let mask = AlphaMask::build(&g, rect, MaskParams::default()).unwrap();
    // Same distance from the center, vertical sample sits deeper inside the ellipse.
    assert!(mask.coverage(50, 20) > mask.coverage(20, 50));
}

#[test]
fn small_lean_does_not_rotate_the_mask() {
    let rect = PixelRect::new(0, 0, 60, 60);
    let flat = AlphaMask::build(&geom(60, None, None), rect, MaskParams::default()).unwrap();

    let mut slight = geom(60, None, None);
    slight.rotation_angle = 0.05;
    let slight = AlphaMask::build(&slight, rect, MaskParams::default()).unwrap();
    assert_eq!(flat, slight);

    let level = geom(
        60,
        Some(PupilPoint {
            row: 20,
            col: 10,
            scale: 3.0,
        }),
        Some(PupilPoint {
            row: 20,
            col: 50,
            scale: 3.0,
        }),
    );
    let rotated = AlphaMask::build(&level, rect, MaskParams::default()).unwrap();
    assert_ne!(flat, rotated);
    assert_eq!(rotated.coverage(30, 30), 255);
}

#[test]
fn over_respects_coverage() {
    let dst = [0, 0, 0, 255];
    let src = [255, 255, 255, 255];
    assert_eq!(over_straight(dst, src, 0), dst);
    assert_eq!(over_straight(dst, src, 255), src);
    let half = over_straight(dst, src, 128);
    assert!((126..=130).contains(&half[0]));
    assert_eq!(half[3], 255);
}

#[test]
fn composite_keeps_destination_outside_mask() {
    let rect = PixelRect::new(0, 0, 40, 40);
    let original = solid(rect, [10, 20, 30, 255]);
    let effect = solid(rect, [200, 200, 200, 255]);
    let out = Compositor::default()
        .composite(&original, &effect, &geom(40, None, None))
        .unwrap();

    let at = |x: usize, y: usize| {
        let i = (y * 40 + x) * 4;
        out.data()[i..i + 4].to_vec()
    };
    assert_eq!(at(0, 0), vec![10, 20, 30, 255]);
    assert_eq!(at(20, 20), vec![200, 200, 200, 255]);
}

#[test]
fn blend_rejects_mismatched_rects() {
    let a = solid(PixelRect::new(0, 0, 4, 4), [0; 4]);
    let b = solid(PixelRect::new(1, 0, 4, 4), [0; 4]);
    let mask = AlphaMask::build(&geom(4, None, None), a.rect(), MaskParams::default()).unwrap();
    assert!(blend_masked(&a, &b, &mask).is_err());
}
