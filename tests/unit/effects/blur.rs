use super::*;
use crate::foundation::core::PixelRect;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 255u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgba8(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn spreads_energy_from_single_pixel() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8(&src, w, h, 2, 1.0).unwrap();
    assert!(out[center] < 255);
    let right = center + 4;
    assert!(out[right] > 0);
}

#[test]
fn size_mismatch_is_rejected() {
    assert!(blur_rgba8(&[0u8; 7], 1, 2, 3, 1.5).is_err());
}

#[test]
fn backend_keeps_region_geometry() {
    let rect = PixelRect::new(3, 4, 6, 5);
    let mut data = vec![0u8; rect.area() * 4];
    data[0..4].copy_from_slice(&[255, 0, 0, 255]);
    let sub = SubImage::new(rect, data).unwrap();

    let mut backend = BlurBackend::new();
    let out = backend.transform(&sub, &EffectParams::default()).unwrap();
    assert_eq!(out.rect(), rect);
    assert_ne!(out.data(), sub.data());
    assert_eq!(backend.kind(), EffectKind::Blur);
}

#[test]
fn empty_region_passes_through() {
    let sub = SubImage::new(PixelRect::default(), Vec::new()).unwrap();
    let out = BlurBackend::new()
        .transform(&sub, &EffectParams::default())
        .unwrap();
    assert!(out.data().is_empty());
}

#[test]
fn transparent_neighbors_do_not_darken_edges() {
    let (w, h) = (4u32, 1u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    src[0..4].copy_from_slice(&[255, 0, 0, 255]);

    let out = blur_rgba8(&src, w, h, 2, 1.0).unwrap();
    for px in out.chunks_exact(4).filter(|px| px[3] > 0) {
        assert!(px[0] >= 250, "red bled toward black: {px:?}");
        assert_eq!(&px[1..3], &[0, 0]);
    }
    assert!(out[7] > 0);
}

#[test]
fn reused_scratch_matches_one_shot_blur() {
    let (w, h) = (6u32, 4u32);
    let src: Vec<u8> = (0..w * h * 4).map(|i| (i * 37 % 256) as u8).collect();
    let expected = blur_rgba8(&src, w, h, 3, 1.5).unwrap();

    let mut scratch = BlurScratch::default();
    assert_eq!(scratch.blur(&src, w, h, 3, 1.5).unwrap(), expected);
    assert_eq!(scratch.blur(&src, w, h, 3, 1.5).unwrap(), expected);

    let narrower = blur_rgba8(&src, w, h, 1, 0.5).unwrap();
    assert_eq!(scratch.blur(&src, w, h, 1, 0.5).unwrap(), narrower);
}

#[test]
fn background_backend_reports_its_kind() {
    assert_eq!(BlurBackend::background().kind(), EffectKind::BackgroundBlur);
    assert_eq!(BlurBackend::default().kind(), EffectKind::Blur);
}
