use image::imageops::FilterType;

use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::math::{mul_div255_u16, weight_u8};
use crate::media::FrameRgba;

/// Straight-alpha RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Straight-alpha `src` over an opaque `dst`. The result is opaque.
pub fn over(dst: Rgba8, src: Rgba8, opacity: f32) -> Rgba8 {
    let op = weight_u8(opacity);
    let sa = mul_div255_u16(u16::from(src[3]), op);
    if sa == 0 {
        return [dst[0], dst[1], dst[2], 255];
    }
    let inv = 255 - sa;

    let mut out = [0u8, 0, 0, 255];
    for i in 0..3 {
        let v = mul_div255_u16(u16::from(src[i]), sa) + mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = v.min(255) as u8;
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> MontageResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(MontageError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Weighted sum of opaque layers over black, written into `dst`.
///
/// Weights that sum to 1 give a linear cross-dissolve; a single layer with weight below 1 fades
/// towards black. Channel sums saturate at 255.
pub fn blend_weighted(dst: &mut [u8], layers: &[(&[u8], f32)]) -> MontageResult<()> {
    if !dst.len().is_multiple_of(4) || layers.iter().any(|(src, _)| src.len() != dst.len()) {
        return Err(MontageError::render(
            "blend_weighted expects equal-length rgba8 buffers",
        ));
    }

    if let [(src, w)] = layers
        && weight_u8(*w) == 255
    {
        dst.copy_from_slice(src);
        return Ok(());
    }

    let weights: Vec<u16> = layers.iter().map(|(_, w)| weight_u8(*w)).collect();
    for (px, d) in dst.chunks_exact_mut(4).enumerate() {
        let off = px * 4;
        for c in 0..3 {
            let sum: u16 = layers
                .iter()
                .zip(&weights)
                .map(|((src, _), w)| mul_div255_u16(u16::from(src[off + c]), *w))
                .sum();
            d[c] = sum.min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

/// Rescale a frame to `width`x`height`. Frames already at that size are cloned.
pub fn resize_rgba(
    frame: &FrameRgba,
    width: u32,
    height: u32,
    filter: FilterType,
) -> MontageResult<FrameRgba> {
    if frame.width == width && frame.height == height {
        return Ok(frame.clone());
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            MontageError::render(format!(
                "frame buffer does not match {}x{} rgba8",
                frame.width, frame.height
            ))
        })?;
    let scaled = image::imageops::resize(&img, width, height, filter);
    Ok(FrameRgba {
        width,
        height,
        data: scaled.into_raw(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
