use super::*;

fn pupil(row: i32, col: i32) -> PupilPoint {
    PupilPoint {
        row,
        col,
        scale: 4.0,
    }
}

fn det(row: i32, col: i32, scale: i32) -> Detection {
    Detection {
        row,
        col,
        scale,
        confidence: 90.0,
    }
}

#[test]
fn level_eyes_give_one() {
    let angle = lean_angle(&pupil(10, 0), &pupil(10, 100));
    assert_eq!(angle, 1.0);
}

#[test]
fn vertical_pupils_give_zero() {
    let angle = lean_angle(&pupil(0, 0), &pupil(100, 0));
    assert!(angle.abs() < 1e-12, "{angle}");
}

#[test]
fn missing_pupil_means_no_rotation() {
    let d = det(50, 50, 40);
    let g = RegionGeometry::from_detection(&d, RegionProfile::RAW, Some(&pupil(45, 40)), None)
        .unwrap();
    assert_eq!(g.rotation_angle, 0.0);
    assert!(!g.applies_rotation());
}

#[test]
fn rotation_threshold_is_strict() {
    let mut g =
        RegionGeometry::from_detection(&det(50, 50, 40), RegionProfile::RAW, None, None).unwrap();
    g.rotation_angle = 0.1;
    assert!(!g.applies_rotation());
    g.rotation_angle = -0.11;
    assert!(g.applies_rotation());
}

#[test]
fn anisotropy_keeps_one_axis_at_unity() {
    assert_eq!(anisotropy(10.0, 5.0), (1.0, 2.0));
    assert_eq!(anisotropy(4.0, 8.0), (2.0, 1.0));
    assert_eq!(anisotropy(3.0, 3.0), (1.0, 1.0));

    let g =
        RegionGeometry::from_detection(&det(0, 0, 100), RegionProfile::RAW, None, None).unwrap();
    assert!(g.radius_x > 0.0 && g.radius_y > 0.0);
    assert_eq!(g.scale_x, 1.0);
    assert!((g.scale_y - g.radius_x / g.radius_y).abs() < 1e-12);
    assert_eq!(g.gradient_radius(), 2.0 * g.radius_x);
}

#[test]
fn zero_scale_is_degenerate() {
    assert!(
        RegionGeometry::from_detection(&det(10, 10, 0), RegionProfile::RAW, None, None).is_none()
    );
    assert!(
        RegionGeometry::from_detection(&det(10, 10, 1), RegionProfile::PIXELATE, None, None)
            .is_none()
    );
}

#[test]
fn pixelate_profile_shrinks_and_nudges() {
    let (cx, cy, side) = RegionProfile::PIXELATE.apply(&det(200, 120, 100));
    assert_eq!(cx, 120);
    assert_eq!(cy, 223);
    assert_eq!(side, 75);

    let (_, _, side) = RegionProfile::EXPANDED.apply(&det(200, 120, 100));
    assert_eq!(side, 120);
}

#[test]
fn transform_maps_origin_to_center() {
    let g = RegionGeometry::from_detection(
        &det(30, 70, 60),
        RegionProfile::RAW,
        Some(&pupil(10, 0)),
        Some(&pupil(10, 100)),
    )
    .unwrap();
    assert!(g.applies_rotation());
    let p = g.mask_transform() * Point::ORIGIN;
    assert!((p.x - 70.0).abs() < 1e-9);
    assert!((p.y - 30.0).abs() < 1e-9);
}

#[test]
fn unrotated_transform_stretches_the_minor_axis() {
    let g =
        RegionGeometry::from_detection(&det(0, 0, 100), RegionProfile::RAW, None, None).unwrap();
    let p = g.mask_transform() * Point::new(1.0, 1.0);
    assert!((p.x - 1.0).abs() < 1e-9);
    assert!((p.y - g.scale_y).abs() < 1e-9);
}

#[test]
fn frontal_face_is_the_rotated_case() {
    let d = det(50, 50, 40);
    let level = RegionGeometry::from_detection(
        &d,
        RegionProfile::RAW,
        Some(&pupil(45, 40)),
        Some(&pupil(45, 60)),
    )
    .unwrap();
    assert!(level.applies_rotation());

    let vertical = RegionGeometry::from_detection(
        &d,
        RegionProfile::RAW,
        Some(&pupil(40, 50)),
        Some(&pupil(60, 50)),
    )
    .unwrap();
    assert!(!vertical.applies_rotation());
}

#[test]
fn each_profile_keeps_its_own_ellipse() {
    let d = det(100, 100, 110);
    let radii = |profile| {
        let g = RegionGeometry::from_detection(&d, profile, None, None).unwrap();
        (g.radius_x, g.radius_y)
    };

    let (rx, ry) = radii(RegionProfile::RAW);
    assert!((rx - 110.0 * 0.8 / 1.6 / 2.0).abs() < 1e-9);
    assert!((ry - 110.0 * 0.8 / 2.1 / 2.0).abs() < 1e-9);

    let (rx, ry) = radii(RegionProfile::BLUR);
    assert!((rx - 110.0 * 0.8 / 1.55 / 2.0).abs() < 1e-9);
    assert!((ry - 110.0 * 0.8 / 2.2 / 2.0).abs() < 1e-9);

    let (_, ry) = radii(RegionProfile::MESH);
    assert!((ry - 110.0 * 0.8 / 2.0 / 2.0).abs() < 1e-9);

    let (rx, _) = radii(RegionProfile::EXPANDED);
    assert!((rx - 132.0 * 0.8 / 1.6 / 2.0).abs() < 1e-9);
}

#[test]
fn zero_ellipse_ratio_is_degenerate() {
    let flat = RegionProfile {
        height_ratio: 0.0,
        ..RegionProfile::RAW
    };
    assert!(RegionGeometry::from_detection(&det(10, 10, 40), flat, None, None).is_none());
}
