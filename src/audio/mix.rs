use std::io::Write as _;
use std::path::Path;

use crate::config::MixConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::warning::Warning;
use crate::media::{AudioPcm, MediaBackend};
use crate::script::model::MusicHint;

/// Output time range whose own audio should push the music down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DuckRange {
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Music gain relative to the scene audio: the script's `music.volume` wins over the config.
pub fn music_gain(hint: Option<&MusicHint>, cfg: &MixConfig) -> f32 {
    hint.and_then(|h| h.volume)
        .unwrap_or(cfg.music_gain)
        .clamp(0.0, 1.0)
}

/// Decode `music_path` and mix it under `track`.
///
/// Without a path the track is left untouched. A missing or undecodable file is recorded as a
/// warning and the track is left untouched.
#[tracing::instrument(skip_all, fields(music = ?music_path))]
pub fn apply_music(
    backend: &dyn MediaBackend,
    music_path: Option<&Path>,
    hint: Option<&MusicHint>,
    track: &mut AudioPcm,
    ducks: &[DuckRange],
    cfg: &MixConfig,
    warnings: &mut Vec<Warning>,
) {
    let Some(path) = music_path else {
        return;
    };
    let mut unavailable = |reason: String| {
        tracing::warn!(path = %path.display(), %reason, "music unavailable, continuing without it");
        warnings.push(Warning::MusicUnavailable {
            path: path.to_path_buf(),
            reason,
        });
    };

    let music = match backend.decode_audio(path, track.sample_rate) {
        Ok(m) => m,
        Err(e) => {
            unavailable(e.to_string());
            return;
        }
    };
    if music.frames() == 0 {
        unavailable("no audio samples".to_string());
        return;
    }

    let gain = music_gain(hint, cfg);
    mix_music(track, &music, gain, ducks, cfg);
    tracing::info!(
        gain,
        music_sec = music.duration_sec(),
        track_sec = track.duration_sec(),
        ducked_ranges = ducks.len(),
        "music mixed"
    );
}

/// Add `music` under `track`, looping it from its start when short and trimming it when long.
///
/// `music` must already be at the track's sample rate. The result is clamped to `[-1, 1]`.
pub fn mix_music(track: &mut AudioPcm, music: &AudioPcm, gain: f32, ducks: &[DuckRange], cfg: &MixConfig) {
    let music_frames = music.frames();
    if music_frames == 0 || track.channels == 0 {
        return;
    }
    let channels = usize::from(track.channels);
    let music_channels = usize::from(music.channels);
    let rate = f64::from(track.sample_rate);

    for (i, frame) in track.interleaved_f32.chunks_exact_mut(channels).enumerate() {
        let t = i as f64 / rate;
        let g = gain * duck_factor(t, ducks, cfg);
        let m = (i % music_frames) * music_channels;
        for (c, s) in frame.iter_mut().enumerate() {
            let v = music.interleaved_f32[m + c.min(music_channels - 1)];
            *s = (*s + v * g).clamp(-1.0, 1.0);
        }
    }
}

/// Music gain factor at `t`: `duck_gain` inside any duck range, 1 outside, with linear ramps of
/// `duck_ramp_sec` on either side.
pub fn duck_factor(t: f64, ducks: &[DuckRange], cfg: &MixConfig) -> f32 {
    let r = cfg.duck_ramp_sec.max(0.0);
    let coverage = ducks
        .iter()
        .map(|d| {
            if r <= 0.0 {
                return if t >= d.start_sec && t < d.end_sec { 1.0 } else { 0.0 };
            }
            let rise = (t - (d.start_sec - r)) / r;
            let fall = ((d.end_sec + r) - t) / r;
            rise.min(fall).clamp(0.0, 1.0)
        })
        .fold(0.0f64, f64::max);
    let duck = f64::from(cfg.duck_gain.clamp(0.0, 1.0));
    (1.0 - (1.0 - duck) * coverage) as f32
}

/// Write interleaved `f32` PCM as raw little-endian samples.
pub fn write_f32le(samples: &[f32], out: &mut impl std::io::Write) -> MontageResult<()> {
    let mut w = std::io::BufWriter::new(out);
    for &s in samples {
        w.write_all(&s.to_le_bytes())
            .map_err(|e| MontageError::render(format!("failed to write audio samples: {e}")))?;
    }
    w.flush()
        .map_err(|e| MontageError::render(format!("failed to write audio samples: {e}")))
}

/// Nearest sample index of `frames` video frames at `sample_rate`.
pub fn frames_to_samples(frames: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frames) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
