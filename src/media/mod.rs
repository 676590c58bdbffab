//! Media access seam.
//!
//! The engine never talks to a decoder directly; it goes through [`MediaBackend`], which opens
//! [`MediaClip`] handles, decodes standalone audio files and creates encoder sinks. Two backends
//! ship with the crate: [`ffmpeg`] (system `ffprobe`/`ffmpeg`, feature `media-ffmpeg`) and
//! [`synthetic`] (deterministic in-process clips for tests and debugging).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::EncoderConfig;
use crate::encode::sink::FrameSink;
use crate::foundation::core::Fps;
use crate::foundation::error::MontageResult;

#[cfg(feature = "media-ffmpeg")]
/// `ffprobe`/`ffmpeg` subprocess backend.
pub mod ffmpeg;
/// Deterministic in-process backend.
pub mod synthetic;

#[derive(Clone, Debug, PartialEq)]
/// Basic metadata about a source clip.
pub struct MediaInfo {
    /// Path the clip was opened from.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Native frame rate.
    pub fps: Fps,
    /// Container duration in seconds.
    pub duration_sec: f64,
    /// Native audio sample rate, when the clip carries audio.
    pub audio_sample_rate: Option<u32>,
}

impl MediaInfo {
    pub fn has_audio(&self) -> bool {
        self.audio_sample_rate.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Decoded interleaved floating-point PCM.
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.interleaved_f32.len() / usize::from(self.channels)
    }

    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Straight-alpha RGBA8 frame, row-major.
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Opaque frame filled with one colour.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// RGBA of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

#[derive(Clone, Debug)]
/// A decoded frame and its presentation time relative to the start of its cursor.
pub struct TimedFrame {
    pub pts_sec: f64,
    pub frame: FrameRgba,
}

/// Sequential, independent read position over one range of a clip.
pub trait FrameCursor: Send {
    /// Next frame in presentation order, or `None` once the range is exhausted.
    fn next_frame(&mut self) -> MontageResult<Option<TimedFrame>>;
}

/// An opened, read-only source clip.
///
/// Handles are shared between scenes; every read goes through its own cursor so no handle state
/// is mutated after opening.
pub trait MediaClip: Send + Sync {
    fn info(&self) -> &MediaInfo;

    /// Open an independent frame cursor over `[start_sec, end_sec)` at the native frame rate.
    fn open_cursor(&self, start_sec: f64, end_sec: f64) -> MontageResult<Box<dyn FrameCursor>>;

    /// Decode `[start_sec, end_sec)` of the clip's audio at its native sample rate.
    ///
    /// Returns `None` for clips without audio.
    fn read_audio(&self, start_sec: f64, end_sec: f64) -> MontageResult<Option<AudioPcm>>;

    /// Release the handle. Further cursors cannot be opened.
    fn close(&self);
}

impl std::fmt::Debug for dyn MediaClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaClip")
            .field("info", self.info())
            .finish_non_exhaustive()
    }
}

/// Shared handle to an opened clip.
pub type ClipHandle = Arc<dyn MediaClip>;

/// Factory for clip handles, decoded audio files and output sinks.
pub trait MediaBackend: Send + Sync {
    /// Open and probe a source clip.
    fn open_clip(&self, path: &Path) -> MontageResult<ClipHandle>;

    /// Decode a standalone audio file to stereo PCM at `sample_rate`.
    fn decode_audio(&self, path: &Path, sample_rate: u32) -> MontageResult<AudioPcm>;

    /// Create an encoder sink writing to `out_path`.
    fn create_sink(&self, out_path: &Path, encoder: &EncoderConfig) -> MontageResult<Box<dyn FrameSink>>;
}

#[cfg(test)]
#[path = "../../tests/unit/media/frame.rs"]
mod tests;
