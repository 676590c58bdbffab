use super::*;

#[test]
fn fnv_is_deterministic_and_input_sensitive() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"scene");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"scene");
    let mut c = Fnv1a64::new_default();
    c.write_bytes(b"scenes");
    assert_eq!(a.finish(), b.finish());
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 0), 0);
    assert_eq!(mul_div255_u16(128, 255), 128);
}

#[test]
fn ramp_clamps_and_handles_zero_length() {
    assert_eq!(ramp(-1.0, 0.5), 0.0);
    assert!((ramp(0.25, 0.5) - 0.5).abs() < 1e-12);
    assert_eq!(ramp(3.0, 0.5), 1.0);
    assert_eq!(ramp(0.0, 0.0), 1.0);
}

#[test]
fn weight_u8_saturates() {
    assert_eq!(weight_u8(-0.5), 0);
    assert_eq!(weight_u8(0.5), 128);
    assert_eq!(weight_u8(2.0), 255);
}
