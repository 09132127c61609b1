use super::*;

fn sub(w: u32, h: u32, data: Vec<u8>) -> SubImage {
    SubImage::new(PixelRect::new(0, 0, w, h), data).unwrap()
}

#[test]
fn default_cell_size_weights_by_aspect() {
    assert_eq!(default_cell_size(200, 200), 3);
    // 400 * (400 / 100) * 0.015 = 24
    assert_eq!(default_cell_size(400, 100), 24);
    assert_eq!(default_cell_size(100, 400), 24);
    assert_eq!(default_cell_size(10, 10), 1);
    assert_eq!(default_cell_size(0, 10), 1);
}

#[test]
fn thin_strips_get_a_bounded_cell() {
    assert_eq!(default_cell_size(70_000, 1), 70_000);
    assert_eq!(default_cell_size(1, u32::MAX), u32::MAX);
    // 300 * 3 * 0.015 = 13.5
    assert_eq!(default_cell_size(300, 100), 13);
}

#[test]
fn thin_strip_with_auto_cell_is_one_flat_run() {
    let w = 70_000u32;
    let mut data = Vec::with_capacity(w as usize * 4);
    for x in 0..w {
        data.extend_from_slice(&[(x % 256) as u8, 40, 90, 255]);
    }
    let img = sub(w, 1, data);
    let out = Quantizer::new().draw(&img, 4, 0, 0.0).unwrap();
    assert_eq!(out.rect(), img.rect());
    let first = pixel(&out, 0, 0);
    assert_eq!(pixel(&out, w - 1, 0), first);
}

#[test]
fn uniform_cell_keeps_exact_color() {
    let img = sub(8, 8, [77u8, 140, 201, 255].repeat(64));
    let out = Quantizer::new().draw(&img, 4, 4, 0.0).unwrap();
    assert_eq!(out.data(), img.data());
}

#[test]
fn each_cell_is_flat() {
    let mut data = Vec::new();
    for y in 0..6u32 {
        for x in 0..6u32 {
            data.extend_from_slice(&[(x * 40) as u8, (y * 40) as u8, 90, 255]);
        }
    }
    let img = sub(6, 6, data);
    let out = Quantizer::new().draw(&img, 32, 3, 0.0).unwrap();
    for (cx, cy) in [(0u32, 0u32), (3, 0), (0, 3), (3, 3)] {
        let first = pixel(&out, cx, cy);
        for y in cy..cy + 3 {
            for x in cx..cx + 3 {
                assert_eq!(pixel(&out, x, y), first);
            }
        }
    }
}

#[test]
fn edge_cells_are_clipped_not_padded() {
    // 5x5 with cell 4: the right column and bottom row form clipped cells.
    let mut data = [0u8, 0, 0, 255].repeat(25);
    for y in 0..5usize {
        let idx = (y * 5 + 4) * 4;
        data[idx..idx + 4].copy_from_slice(&[255, 255, 255, 255]);
    }
    let img = sub(5, 5, data);
    let out = Quantizer::new().draw(&img, 4, 4, 0.0).unwrap();
    assert_eq!(out.data().len(), img.data().len());
    assert_eq!(pixel(&out, 4, 0), [255, 255, 255, 255]);
    assert_eq!(pixel(&out, 0, 0), [0, 0, 0, 255]);
}

#[test]
fn preserves_placement_and_handles_empty() {
    let rect = PixelRect::new(9, 4, 0, 0);
    let empty = SubImage::new(rect, Vec::new()).unwrap();
    let out = Quantizer::new().draw(&empty, 8, 0, 12.0).unwrap();
    assert_eq!(out, empty);

    let placed = SubImage::new(PixelRect::new(2, 3, 2, 2), vec![50u8; 16]).unwrap();
    let out = Quantizer::new().draw(&placed, 8, 0, 0.0).unwrap();
    assert_eq!(out.rect(), placed.rect());
}

#[test]
fn extreme_params_do_not_panic() {
    let img = sub(3, 2, (0..24u8).collect());
    assert!(Quantizer::new().draw(&img, 0, 4, 0.0).is_err());
    let out = Quantizer::new().draw(&img, 10_000, 10_000, 500.0).unwrap();
    assert_eq!(out.data().len(), 24);
}

#[test]
fn noise_changes_output_deterministically() {
    let img = sub(4, 4, [90u8, 90, 90, 255].repeat(16));
    let q = Quantizer::new();
    let a = q.draw(&img, 4, 2, 12.0).unwrap();
    let b = q.draw(&img, 4, 2, 12.0).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.data(), img.data());
}

fn pixel(img: &SubImage, x: u32, y: u32) -> [u8; 4] {
    let idx = ((y * img.width() + x) * 4) as usize;
    let p = &img.data()[idx..idx + 4];
    [p[0], p[1], p[2], p[3]]
}
