//! Encoding the composed timeline to a single output file.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::audio::mix::write_f32le;
use crate::compose::timeline::{OutputFormat, ScenePlacement, Timeline};
use crate::compose::video::FrameAssembler;
use crate::config::EncoderConfig;
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::extract::SceneSegment;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::math::Fnv1a64;
use crate::foundation::warning::Warning;
use crate::media::{AudioPcm, MediaBackend};
use crate::overlay::Thumbnail;

/// Outcome of a successful composition.
#[derive(Clone, Debug, Serialize)]
pub struct CompositionResult {
    /// Absolute path of the encoded file.
    pub output_path: PathBuf,
    /// Realized output length in seconds.
    pub duration_sec: f64,
    pub frame_count: u64,
    pub fps: Fps,
    /// Per-scene output offsets, in script order.
    pub scenes: Vec<ScenePlacement>,
    pub warnings: Vec<Warning>,
}

/// Removes the output file on drop unless [`commit`](Self::commit) was called.
#[derive(Debug)]
pub struct OutputGuard {
    path: Option<PathBuf>,
}

impl OutputGuard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Keep the file and return its path.
    pub fn commit(mut self) -> PathBuf {
        self.path.take().unwrap_or_default()
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take()
            && path.exists()
        {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output"),
            }
        }
    }
}

/// Everything the encoder loop reads.
pub struct RenderInput<'a> {
    pub timeline: &'a Timeline,
    pub segments: &'a [SceneSegment],
    pub format: OutputFormat,
    pub audio: &'a AudioPcm,
    pub thumbnail: Option<&'a Thumbnail>,
}

/// What [`render`] wrote.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedOutput {
    pub path: PathBuf,
    pub frame_count: u64,
}

/// `<dir>/composed_<hash>.mp4`, where the hash covers the script and the clip list.
pub fn default_output_path(dir: &Path, script_json: &str, clips: &[PathBuf]) -> PathBuf {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(script_json.as_bytes());
    for clip in clips {
        h.write_bytes(&[0]);
        h.write_bytes(clip.to_string_lossy().as_bytes());
    }
    dir.join(format!("composed_{:016x}.mp4", h.finish()))
}

/// Encode the timeline to `out_path`.
///
/// Frames are pushed in strictly increasing order; the soundtrack is handed to the sink through a
/// temporary `f32le` file next to the output. On any failure, including cancellation, the sink is
/// aborted and the output file is removed.
#[tracing::instrument(skip_all, fields(out = %out_path.display()))]
pub fn render(
    backend: &dyn MediaBackend,
    input: &RenderInput<'_>,
    out_path: &Path,
    encoder: &EncoderConfig,
    cancel: &CancelToken,
) -> MontageResult<RenderedOutput> {
    let out = std::path::absolute(out_path)
        .with_context(|| format!("cannot resolve output path '{}'", out_path.display()))?;
    let dir = out
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| MontageError::render(format!("output path '{}' has no parent", out.display())))?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    if !encoder.overwrite && out.exists() {
        return Err(MontageError::render(format!(
            "output file '{}' already exists",
            out.display()
        )));
    }

    let guard = OutputGuard::new(&out);

    let mut pcm = tempfile::Builder::new()
        .prefix(".montage-")
        .suffix(".f32le")
        .tempfile_in(&dir)
        .context("failed to create temporary audio file")?;
    write_f32le(&input.audio.interleaved_f32, pcm.as_file_mut())?;

    let mut sink = backend.create_sink(&out, encoder)?;
    let audio = AudioInputConfig {
        path: pcm.path().to_path_buf(),
        sample_rate: input.audio.sample_rate,
        channels: input.audio.channels,
    };
    let frame_count = match stream_frames(sink.as_mut(), input, audio, cancel) {
        Ok(n) => n,
        Err(e) => {
            sink.abort();
            tracing::error!(error = %e, "render failed");
            return Err(e);
        }
    };
    drop(pcm);

    let path = guard.commit();
    tracing::info!(path = %path.display(), frames = frame_count, "output written");
    Ok(RenderedOutput { path, frame_count })
}

fn stream_frames(
    sink: &mut dyn FrameSink,
    input: &RenderInput<'_>,
    audio: AudioInputConfig,
    cancel: &CancelToken,
) -> MontageResult<u64> {
    let canvas = input.format.canvas;
    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: input.format.fps,
        audio: Some(audio),
    })?;

    let mut assembler = FrameAssembler::new(input.timeline, input.segments, input.format)?;
    let frame_count = assembler.frame_count();
    let log_every = u64::from(input.format.fps.num / input.format.fps.den.max(1)).max(1) * 10;

    for i in 0..frame_count {
        cancel.check()?;
        let idx = FrameIndex(i);
        let mut frame = assembler.frame_at(idx)?;
        if let Some(thumb) = input.thumbnail {
            thumb.apply(idx, &mut frame)?;
        }
        sink.push_frame(idx, &frame)?;
        if i % log_every == 0 {
            tracing::debug!(frame = i, total = frame_count, "encoding");
        }
    }

    sink.end()?;
    Ok(frame_count)
}

#[cfg(test)]
#[path = "../tests/unit/render.rs"]
mod tests;
