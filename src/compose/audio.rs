use crate::compose::timeline::{Placement, Timeline};
use crate::extract::SceneSegment;
use crate::media::AudioPcm;

/// Output channel layout of the composed soundtrack.
pub const OUTPUT_CHANNELS: u16 = 2;

/// Lay every segment's native-rate audio onto one stereo track at `sample_rate`.
///
/// Each segment is resampled exactly once (linear interpolation) and weighted by its placement
/// envelope, so fades ramp volume and crossfades cross-fade gain the same way frames do. Segments
/// without audio contribute silence.
pub fn compose_audio(
    timeline: &Timeline,
    segments: &[SceneSegment],
    sample_rate: u32,
    total_samples: u64,
) -> AudioPcm {
    let channels = usize::from(OUTPUT_CHANNELS);
    let mut out = vec![0.0f32; total_samples as usize * channels];

    for (p, seg) in timeline.placements().iter().zip(segments) {
        if let Some(pcm) = seg.audio.as_ref() {
            place_segment(&mut out, sample_rate, p, pcm);
        }
    }

    AudioPcm {
        sample_rate,
        channels: OUTPUT_CHANNELS,
        interleaved_f32: out,
    }
}

fn place_segment(out: &mut [f32], sample_rate: u32, p: &Placement, src: &AudioPcm) {
    let src_channels = usize::from(src.channels);
    let src_frames = src.frames();
    if src_frames == 0 || src.sample_rate == 0 {
        return;
    }
    let out_frames = out.len() / usize::from(OUTPUT_CHANNELS);
    let rate = f64::from(sample_rate);
    let start = (p.start_sec * rate).round() as usize;
    let end = ((p.end_sec() * rate).round() as usize).min(out_frames);

    for dst in start..end {
        let rel_sec = (dst - start) as f64 / rate;
        let gain = p.gain_local(rel_sec) as f32;
        if gain <= 0.0 {
            continue;
        }

        let src_pos = rel_sec * f64::from(src.sample_rate);
        let f0 = src_pos.floor() as usize;
        if f0 >= src_frames {
            break;
        }
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (src_pos - f0 as f64) as f32;
        let s = &src.interleaved_f32;

        let (l, r) = if src_channels == 1 {
            let v = s[f0] + (s[f1] - s[f0]) * frac;
            (v, v)
        } else {
            let (i0, i1) = (f0 * src_channels, f1 * src_channels);
            (
                s[i0] + (s[i1] - s[i0]) * frac,
                s[i0 + 1] + (s[i1 + 1] - s[i0 + 1]) * frac,
            )
        };

        let o = dst * 2;
        out[o] += l * gain;
        out[o + 1] += r * gain;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/audio.rs"]
mod tests;
