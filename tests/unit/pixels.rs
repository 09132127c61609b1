use super::*;

fn ramp_frame(w: u32, h: u32) -> Frame {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[x as u8, y as u8, (x + y) as u8, 200]);
        }
    }
    Frame::from_rgba(w, h, data).unwrap()
}

#[test]
fn grayscale_is_compact_and_rounded() {
    let frame = Frame::from_rgba(2, 1, vec![255, 0, 0, 255, 10, 20, 30, 255]).unwrap();
    let gray = to_grayscale(&frame);
    assert_eq!(gray.len(), 2);
    assert_eq!(gray[0], 54);
    // 0.2126*10 + 0.7152*20 + 0.0722*30 = 18.596
    assert_eq!(gray[1], 19);
}

#[test]
fn grayscale_into_checks_length() {
    let frame = ramp_frame(3, 2);
    let mut small = vec![0u8; 5];
    assert!(to_grayscale_into(&frame, &mut small).is_err());
    let mut buf = vec![0u8; 6];
    to_grayscale_into(&frame, &mut buf).unwrap();
    assert_eq!(buf, to_grayscale(&frame));
}

#[test]
fn interior_square_is_full_size() {
    let frame = ramp_frame(20, 20);
    let sub = extract_square(&frame, 10, 10, 6).unwrap();
    assert_eq!(sub.rect(), PixelRect::new(7, 7, 6, 6));
    assert_eq!(&sub.data()[0..4], &[7, 7, 14, 200]);
}

#[test]
fn square_near_edge_is_clipped_not_wrapped() {
    let frame = ramp_frame(20, 10);
    let sub = extract_square(&frame, 1, 8, 8).unwrap();
    assert_eq!(sub.rect(), PixelRect::new(0, 4, 5, 6));
    assert_eq!(sub.data().len(), 5 * 6 * 4);
    // First pixel is the frame's (0, 4).
    assert_eq!(&sub.data()[0..4], &[0, 4, 4, 200]);
}

#[test]
fn square_fully_outside_is_empty() {
    let frame = ramp_frame(8, 8);
    let sub = extract_square(&frame, -50, -50, 10).unwrap();
    assert!(sub.rect().is_empty());
    assert!(sub.data().is_empty());
}

#[test]
fn write_back_roundtrips_region() {
    let frame = ramp_frame(12, 9);
    let mut dst = Frame::new(12, 9).unwrap();
    let sub = extract_square(&frame, 11, 0, 6).unwrap();
    write_sub_image(&mut dst, &sub).unwrap();
    let again = extract_rect(&dst, sub.rect()).unwrap();
    assert_eq!(again, sub);
}

#[test]
fn image_conversion_is_lossless() {
    let frame = ramp_frame(7, 5);
    let img = to_image(&frame).unwrap();
    let back = from_rgba_image(img).unwrap();
    assert_eq!(back, frame);
}

#[test]
fn rgb_sources_get_opaque_alpha() {
    let rgb = image::RgbImage::from_raw(1, 1, vec![1, 2, 3]).unwrap();
    let frame = from_image(&DynamicImage::ImageRgb8(rgb)).unwrap();
    assert_eq!(frame.data(), &[1, 2, 3, 255]);
}
