#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Quantize a `[0, 1]` weight to the `0..=255` fixed-point scale used by the blenders.
pub(crate) fn weight_u8(w: f32) -> u16 {
    ((w.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Linear ramp position of `t` inside `[0, len]`, clamped to `[0, 1]`.
pub(crate) fn ramp(t: f64, len: f64) -> f64 {
    if len <= 0.0 {
        return 1.0;
    }
    (t / len).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
