//! Per-scene extraction against resolved clip handles.

use rayon::prelude::*;

use crate::foundation::cancel::CancelToken;
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::{AudioPcm, ClipHandle, FrameCursor, MediaInfo};
use crate::script::validate::ValidScene;

/// Slack allowed past the probed duration, absorbing container rounding.
pub const RANGE_EPSILON_SEC: f64 = 1e-3;

/// One scene's source range, at the source's native frame and sample rate.
///
/// Video is not decoded up front; [`SceneSegment::open_frames`] opens an independent cursor when
/// the compositor reaches the scene.
pub struct SceneSegment {
    pub scene_id: i64,
    pub source_start: f64,
    pub source_end: f64,
    pub info: MediaInfo,
    /// Native-rate audio, `None` when the source has no audio stream.
    pub audio: Option<AudioPcm>,
    handle: ClipHandle,
}

impl SceneSegment {
    pub fn duration(&self) -> f64 {
        self.source_end - self.source_start
    }

    pub fn open_frames(&self) -> MontageResult<Box<dyn FrameCursor>> {
        self.handle.open_cursor(self.source_start, self.source_end)
    }
}

impl std::fmt::Debug for SceneSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSegment")
            .field("scene_id", &self.scene_id)
            .field("source_start", &self.source_start)
            .field("source_end", &self.source_end)
            .field("path", &self.info.path)
            .field("has_audio", &self.audio.is_some())
            .finish()
    }
}

/// Reject ranges that run past the end of the source. Never clamps.
pub fn check_range(scene: &ValidScene, info: &MediaInfo) -> MontageResult<()> {
    if scene.end > info.duration_sec + RANGE_EPSILON_SEC {
        return Err(MontageError::TimeRange {
            scene_id: scene.scene_id,
            start: scene.start,
            end: scene.end,
            source_duration: info.duration_sec,
        });
    }
    Ok(())
}

/// Extract one scene: range check, then native-rate audio.
pub fn extract(handle: &ClipHandle, scene: &ValidScene) -> MontageResult<SceneSegment> {
    let info = handle.info().clone();
    check_range(scene, &info)?;
    let audio = handle.read_audio(scene.start, scene.end)?;
    tracing::debug!(
        scene_id = scene.scene_id,
        start = scene.start,
        end = scene.end,
        audio_frames = audio.as_ref().map(AudioPcm::frames).unwrap_or(0),
        "scene extracted"
    );
    Ok(SceneSegment {
        scene_id: scene.scene_id,
        source_start: scene.start,
        source_end: scene.end,
        info,
        audio,
        handle: ClipHandle::clone(handle),
    })
}

/// Extract every scene on a bounded worker pool. Output order equals `scenes` order.
///
/// All ranges are checked before any decoding starts.
#[tracing::instrument(skip_all, fields(scenes = scenes.len(), workers = ?workers))]
pub fn extract_all(
    scenes: &[ValidScene],
    handles: &[ClipHandle],
    workers: Option<usize>,
    cancel: &CancelToken,
) -> MontageResult<Vec<SceneSegment>> {
    if scenes.len() != handles.len() {
        return Err(MontageError::media(format!(
            "{} scenes but {} resolved handles",
            scenes.len(),
            handles.len()
        )));
    }
    for (scene, handle) in scenes.iter().zip(handles) {
        check_range(scene, handle.info())?;
    }

    let pool = build_thread_pool(workers)?;
    let segments = pool.install(|| {
        scenes
            .par_iter()
            .zip(handles.par_iter())
            .map(|(scene, handle)| {
                cancel.check()?;
                extract(handle, scene)
            })
            .collect::<MontageResult<Vec<_>>>()
    })?;
    tracing::info!(segments = segments.len(), "extraction complete");
    Ok(segments)
}

fn build_thread_pool(workers: Option<usize>) -> MontageResult<rayon::ThreadPool> {
    if workers == Some(0) {
        return Err(MontageError::media("workers must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = workers {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| MontageError::media(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../tests/unit/extract.rs"]
mod tests;
