use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(0, 255), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(255, 128), 128);
}

#[test]
fn luma_uses_rec709_weights() {
    assert_eq!(luma_u8(255, 255, 255), 255);
    assert_eq!(luma_u8(0, 0, 0), 0);
    // 0.2126 * 255 = 54.2
    assert_eq!(luma_u8(255, 0, 0), 54);
    // 0.7152 * 255 = 182.4
    assert_eq!(luma_u8(0, 255, 0), 182);
    // 0.0722 * 255 = 18.4
    assert_eq!(luma_u8(0, 0, 255), 18);
}
