use super::*;

#[test]
fn defaults_are_valid() {
    let p = EffectParams::default();
    p.validate().unwrap();
    assert_eq!(p.blur.radius, 20);
    assert_eq!(p.pixelate.colors, 8);
    assert_eq!(p.mesh.max_points, 450);
    assert_eq!(p.mask.inner_stop, 0.55);
    assert_eq!(p.mask.outer_stop, 0.75);
}

#[test]
fn out_of_range_fields_are_rejected() {
    let mut p = EffectParams::default();
    p.pixelate.colors = 1;
    assert!(p.validate().is_err());

    let mut p = EffectParams::default();
    p.pixelate.cell_size = 0;
    p.validate().unwrap();
    p.pixelate.cell_size = 7;
    assert!(p.validate().is_err());

    let mut p = EffectParams::default();
    p.mesh.points_threshold = 26;
    assert!(p.validate().is_err());

    let mut p = EffectParams::default();
    p.mesh.stroke_width = 0;
    p.validate().unwrap();
    p.mesh.stroke_width = 5;
    assert!(p.validate().is_err());

    let mut p = EffectParams::default();
    p.mask.inner_stop = 0.8;
    assert!(p.validate().is_err());

    let mut p = EffectParams::default();
    p.pixelate.noise = f64::NAN;
    assert!(p.validate().is_err());
}

#[test]
fn partial_json_fills_defaults() {
    let p: EffectParams =
        serde_json::from_str(r#"{ "pixelate": { "colors": 16 }, "blur": { "radius": 9 } }"#)
            .unwrap();
    assert_eq!(p.pixelate.colors, 16);
    assert_eq!(p.pixelate.cell_size, 10);
    assert_eq!(p.blur.radius, 9);
    assert_eq!(p.mesh, MeshParams::default());
}

#[test]
fn shared_params_publish_only_valid_edits() {
    let shared = SharedParams::default();
    let reader = shared.clone();

    shared.update(|p| p.pixelate.colors = 4).unwrap();
    assert_eq!(reader.snapshot().pixelate.colors, 4);

    assert!(shared.update(|p| p.pixelate.colors = 99).is_err());
    assert_eq!(reader.snapshot().pixelate.colors, 4);
}
