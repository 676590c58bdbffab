//! Deterministic in-process media.
//!
//! Clips are solid-colour frame sequences with an optional constant-level soundtrack, registered
//! under a path. Sinks record what they were fed instead of encoding, and can be told to fail
//! part-way so cleanup paths can be exercised without `ffmpeg`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::EncoderConfig;
use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::{AudioPcm, ClipHandle, FrameCursor, FrameRgba, MediaBackend, MediaClip, MediaInfo, TimedFrame};

/// Description of one synthetic clip.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticClip {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub duration_sec: f64,
    /// Colour of every frame.
    pub color: [u8; 3],
    /// Constant sample value of the soundtrack; `None` for a silent clip without audio.
    pub audio_level: Option<f32>,
    pub audio_sample_rate: u32,
}

impl SyntheticClip {
    /// Silent solid-colour clip.
    pub fn solid(width: u32, height: u32, fps: Fps, duration_sec: f64, color: [u8; 3]) -> Self {
        Self {
            width,
            height,
            fps,
            duration_sec,
            color,
            audio_level: None,
            audio_sample_rate: 48_000,
        }
    }

    pub fn with_audio(mut self, level: f32, sample_rate: u32) -> Self {
        self.audio_level = Some(level);
        self.audio_sample_rate = sample_rate;
        self
    }
}

/// What one synthetic sink received.
#[derive(Clone, Debug)]
pub struct RecordedRender {
    pub out_path: PathBuf,
    pub config: Option<SinkConfig>,
    pub frames: Vec<(FrameIndex, FrameRgba)>,
    /// Soundtrack samples as handed to the sink.
    pub audio: Option<Vec<f32>>,
    /// `true` when `end` completed; `false` when the sink was aborted.
    pub finished: bool,
}

#[derive(Debug, Default)]
struct Shared {
    renders: Mutex<Vec<RecordedRender>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// In-process [`MediaBackend`].
#[derive(Debug, Default, Clone)]
pub struct SyntheticBackend {
    clips: HashMap<PathBuf, SyntheticClip>,
    /// Music files: duration and constant level.
    audio_files: HashMap<PathBuf, (f64, f32)>,
    fail_sink_at: Option<u64>,
    shared: Arc<Shared>,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a clip under `path`.
    pub fn with_clip(mut self, path: impl Into<PathBuf>, clip: SyntheticClip) -> Self {
        self.clips.insert(path.into(), clip);
        self
    }

    /// Register a decodable audio file of `duration_sec` at constant `level`.
    pub fn with_audio_file(mut self, path: impl Into<PathBuf>, duration_sec: f64, level: f32) -> Self {
        self.audio_files.insert(path.into(), (duration_sec, level));
        self
    }

    /// Make every sink fail when frame `index` is pushed.
    pub fn fail_sink_at(mut self, index: u64) -> Self {
        self.fail_sink_at = Some(index);
        self
    }

    /// Everything sinks from this backend have recorded, in creation order.
    pub fn renders(&self) -> Vec<RecordedRender> {
        lock(&self.shared.renders).clone()
    }

    /// Number of clip handles opened so far.
    pub fn opened_clips(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    /// Number of clip handles closed so far.
    pub fn closed_clips(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MediaBackend for SyntheticBackend {
    fn open_clip(&self, path: &Path) -> MontageResult<ClipHandle> {
        let def = self
            .clips
            .get(path)
            .ok_or_else(|| MontageError::media(format!("no such clip '{}'", path.display())))?;
        self.shared.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(SyntheticHandle {
            info: MediaInfo {
                path: path.to_path_buf(),
                width: def.width,
                height: def.height,
                fps: def.fps,
                duration_sec: def.duration_sec,
                audio_sample_rate: def.audio_level.map(|_| def.audio_sample_rate),
            },
            def: def.clone(),
            closed: AtomicBool::new(false),
            shared: Arc::clone(&self.shared),
        }))
    }

    fn decode_audio(&self, path: &Path, sample_rate: u32) -> MontageResult<AudioPcm> {
        let (duration_sec, level) = self
            .audio_files
            .get(path)
            .ok_or_else(|| MontageError::media(format!("cannot decode audio '{}'", path.display())))?;
        Ok(constant_pcm(*level, *duration_sec, sample_rate))
    }

    fn create_sink(&self, out_path: &Path, _encoder: &EncoderConfig) -> MontageResult<Box<dyn FrameSink>> {
        Ok(Box::new(RecordingSink {
            out_path: out_path.to_path_buf(),
            inner: InMemorySink::new(),
            fail_at: self.fail_sink_at,
            shared: Arc::clone(&self.shared),
            done: false,
        }))
    }
}

fn constant_pcm(level: f32, duration_sec: f64, sample_rate: u32) -> AudioPcm {
    let frames = (duration_sec.max(0.0) * f64::from(sample_rate)).round() as usize;
    AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: vec![level; frames * 2],
    }
}

struct SyntheticHandle {
    info: MediaInfo,
    def: SyntheticClip,
    closed: AtomicBool,
    shared: Arc<Shared>,
}

impl MediaClip for SyntheticHandle {
    fn info(&self) -> &MediaInfo {
        &self.info
    }

    fn open_cursor(&self, start_sec: f64, end_sec: f64) -> MontageResult<Box<dyn FrameCursor>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MontageError::media("clip is closed"));
        }
        let span = (end_sec.min(self.def.duration_sec) - start_sec).max(0.0);
        let count = (span * self.def.fps.as_f64() - 1e-9).ceil().max(0.0) as u64;
        Ok(Box::new(SolidCursor {
            frame: FrameRgba::solid(self.def.width, self.def.height, self.def.color),
            fps: self.def.fps,
            next: 0,
            count,
        }))
    }

    fn read_audio(&self, start_sec: f64, end_sec: f64) -> MontageResult<Option<AudioPcm>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MontageError::media("clip is closed"));
        }
        Ok(self
            .def
            .audio_level
            .map(|level| constant_pcm(level, end_sec - start_sec, self.def.audio_sample_rate)))
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.shared.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct SolidCursor {
    frame: FrameRgba,
    fps: Fps,
    next: u64,
    count: u64,
}

impl FrameCursor for SolidCursor {
    fn next_frame(&mut self) -> MontageResult<Option<TimedFrame>> {
        if self.next >= self.count {
            return Ok(None);
        }
        let pts_sec = self.fps.frames_to_secs(self.next);
        self.next += 1;
        Ok(Some(TimedFrame {
            pts_sec,
            frame: self.frame.clone(),
        }))
    }
}

/// Sink that records into the backend and leaves a placeholder file at the output path, so
/// callers can observe both success and cleanup.
struct RecordingSink {
    out_path: PathBuf,
    inner: InMemorySink,
    fail_at: Option<u64>,
    shared: Arc<Shared>,
    done: bool,
}

impl RecordingSink {
    fn record(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        lock(&self.shared.renders).push(RecordedRender {
            out_path: self.out_path.clone(),
            config: self.inner.config().cloned(),
            frames: self.inner.frames().to_vec(),
            audio: self.inner.audio().map(<[f32]>::to_vec),
            finished: self.inner.is_finished(),
        });
    }
}

impl FrameSink for RecordingSink {
    fn begin(&mut self, cfg: SinkConfig) -> MontageResult<()> {
        std::fs::write(&self.out_path, b"").map_err(|e| {
            MontageError::render(format!(
                "failed to create output '{}': {e}",
                self.out_path.display()
            ))
        })?;
        self.inner.begin(cfg)
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgba) -> MontageResult<()> {
        if self.fail_at == Some(idx.0) {
            return Err(MontageError::render(format!(
                "synthetic sink failure at frame {}",
                idx.0
            )));
        }
        self.inner.push_frame(idx, frame)
    }

    fn end(&mut self) -> MontageResult<()> {
        self.inner.end()?;
        std::fs::write(&self.out_path, b"synthetic").map_err(|e| {
            MontageError::render(format!(
                "failed to write output '{}': {e}",
                self.out_path.display()
            ))
        })?;
        self.record();
        Ok(())
    }

    fn abort(&mut self) {
        self.record();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/synthetic.rs"]
mod tests;
