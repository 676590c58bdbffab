use std::path::PathBuf;

use serde::Serialize;

use crate::audio::mix::{DuckRange, apply_music, frames_to_samples};
use crate::compose::audio::compose_audio;
use crate::compose::timeline::{OutputFormat, ScenePlacement, Timeline};
use crate::config::ComposeConfig;
use crate::extract::{SceneSegment, check_range, extract_all};
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::warning::Warning;
use crate::media::MediaBackend;
use crate::overlay;
use crate::render::{CompositionResult, RenderInput, default_output_path, render};
use crate::resolve::{ClipResolver, SourceSet};
use crate::script::model::Script;
use crate::script::validate::{ValidatedScript, validate};

/// Inputs of one composition.
#[derive(Clone, Debug)]
pub struct ComposeRequest {
    pub script: Script,
    /// Source clips; entry `i` is what `source_video: i` refers to.
    pub video_clips: Vec<PathBuf>,
    pub music_path: Option<PathBuf>,
    pub thumbnail_path: Option<PathBuf>,
    /// Output file; a name is generated under the configured output directory when absent.
    pub output_path: Option<PathBuf>,
}

impl ComposeRequest {
    pub fn new<I, P>(script: Script, video_clips: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            script,
            video_clips: video_clips.into_iter().map(Into::into).collect(),
            music_path: None,
            thumbnail_path: None,
            output_path: None,
        }
    }

    pub fn with_music(mut self, path: impl Into<PathBuf>) -> Self {
        self.music_path = Some(path.into());
        self
    }

    pub fn with_thumbnail(mut self, path: impl Into<PathBuf>) -> Self {
        self.thumbnail_path = Some(path.into());
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Dry-run outcome: what [`Composer::compose`] would produce, without decoding or encoding.
#[derive(Clone, Debug, Serialize)]
pub struct CompositionPlan {
    pub output_path: PathBuf,
    pub duration_sec: f64,
    pub frame_count: u64,
    pub fps: Fps,
    pub canvas: Canvas,
    pub scenes: Vec<ScenePlacement>,
    pub warnings: Vec<Warning>,
}

/// Runs compositions against one media backend and configuration.
///
/// Every call builds and tears down its own clip cache; nothing is shared between calls except
/// the backend and the cancellation token.
pub struct Composer {
    backend: Box<dyn MediaBackend>,
    config: ComposeConfig,
    cancel: CancelToken,
}

impl Composer {
    pub fn new(backend: impl MediaBackend + 'static, config: ComposeConfig) -> Self {
        Self {
            backend: Box::new(backend),
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share `token` with the caller so the composition can be cancelled from another thread.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Validate, resolve and lay out the request without decoding any media.
    #[tracing::instrument(skip_all)]
    pub fn plan(&self, request: &ComposeRequest) -> MontageResult<CompositionPlan> {
        self.config.validate()?;
        let validated = validate(&request.script, request.video_clips.len(), &self.config)?;
        let sources = SourceSet::new(request.video_clips.iter().cloned());
        let resolver = ClipResolver::new(self.backend.as_ref());

        let plan = self.lay_out(request, &validated, &sources, &resolver);
        resolver.release();
        plan
    }

    /// Run the whole pipeline and write the output file.
    ///
    /// All clip handles are released before this returns, and a failed run leaves no output file
    /// behind.
    #[tracing::instrument(skip_all, fields(scenes = request.script.scenes.len(), clips = request.video_clips.len()))]
    pub fn compose(&self, request: &ComposeRequest) -> MontageResult<CompositionResult> {
        tracing::info!("composition started");
        self.config.validate()?;
        let validated = validate(&request.script, request.video_clips.len(), &self.config)?;
        for w in &validated.warnings {
            tracing::warn!(warning = %w, "script warning");
        }

        let sources = SourceSet::new(request.video_clips.iter().cloned());
        let resolver = ClipResolver::new(self.backend.as_ref());
        let result = self.run(request, &validated, &sources, &resolver);
        resolver.release();

        match &result {
            Ok(r) => tracing::info!(
                output = %r.output_path.display(),
                duration = r.duration_sec,
                frames = r.frame_count,
                warnings = r.warnings.len(),
                "composition finished"
            ),
            Err(e) => tracing::error!(error = %e, "composition failed"),
        }
        result
    }

    fn run(
        &self,
        request: &ComposeRequest,
        validated: &ValidatedScript,
        sources: &SourceSet,
        resolver: &ClipResolver<'_>,
    ) -> MontageResult<CompositionResult> {
        let mut warnings = validated.warnings.clone();

        let handles = resolver.resolve_all(validated, sources)?;
        self.cancel.check()?;
        let segments = extract_all(&validated.scenes, &handles, self.config.workers, &self.cancel)?;
        self.cancel.check()?;

        let first = segments
            .first()
            .ok_or_else(|| MontageError::media("no scenes were extracted"))?;
        let timeline = Timeline::build(validated);
        let format = OutputFormat::resolve(&self.config.output, &first.info);
        let frame_count = format.frame_count(timeline.duration_sec());
        tracing::info!(
            duration = timeline.duration_sec(),
            frames = frame_count,
            fps = format.fps.as_f64(),
            width = format.canvas.width,
            height = format.canvas.height,
            "timeline built"
        );

        let rate = self.config.mix.sample_rate;
        let mut audio = compose_audio(
            &timeline,
            &segments,
            rate,
            frames_to_samples(frame_count, format.fps, rate),
        );
        apply_music(
            self.backend.as_ref(),
            request.music_path.as_deref(),
            validated.music.as_ref(),
            &mut audio,
            &duck_ranges(&timeline, &segments),
            &self.config.mix,
            &mut warnings,
        );

        let thumbnail = overlay::prepare(
            request.thumbnail_path.as_deref(),
            &format,
            &self.config.overlay,
            &mut warnings,
        );

        let out_path = self.output_path_for(request)?;
        let rendered = render(
            self.backend.as_ref(),
            &RenderInput {
                timeline: &timeline,
                segments: &segments,
                format,
                audio: &audio,
                thumbnail: thumbnail.as_ref(),
            },
            &out_path,
            &self.config.encoder,
            &self.cancel,
        )?;

        Ok(CompositionResult {
            output_path: rendered.path,
            duration_sec: timeline.duration_sec(),
            frame_count: rendered.frame_count,
            fps: format.fps,
            scenes: timeline.scene_placements().to_vec(),
            warnings,
        })
    }

    fn lay_out(
        &self,
        request: &ComposeRequest,
        validated: &ValidatedScript,
        sources: &SourceSet,
        resolver: &ClipResolver<'_>,
    ) -> MontageResult<CompositionPlan> {
        let handles = resolver.resolve_all(validated, sources)?;
        for (scene, handle) in validated.scenes.iter().zip(&handles) {
            check_range(scene, handle.info())?;
        }
        let first = handles
            .first()
            .ok_or_else(|| MontageError::media("no scenes to plan"))?;
        let timeline = Timeline::build(validated);
        let format = OutputFormat::resolve(&self.config.output, first.info());
        Ok(CompositionPlan {
            output_path: self.output_path_for(request)?,
            duration_sec: timeline.duration_sec(),
            frame_count: format.frame_count(timeline.duration_sec()),
            fps: format.fps,
            canvas: format.canvas,
            scenes: timeline.scene_placements().to_vec(),
            warnings: validated.warnings.clone(),
        })
    }

    fn output_path_for(&self, request: &ComposeRequest) -> MontageResult<PathBuf> {
        if let Some(p) = &request.output_path {
            return Ok(p.clone());
        }
        let json = request.script.to_json_string()?;
        Ok(default_output_path(
            &self.config.output.output_dir,
            &json,
            &request.video_clips,
        ))
    }
}

/// Scene ranges whose source carries its own audio; music is ducked under them.
fn duck_ranges(timeline: &Timeline, segments: &[SceneSegment]) -> Vec<DuckRange> {
    timeline
        .placements()
        .iter()
        .zip(segments)
        .filter(|(_, seg)| seg.audio.is_some())
        .map(|(p, _)| DuckRange {
            start_sec: p.start_sec,
            end_sec: p.end_sec(),
        })
        .collect()
}

/// Compose with the system `ffmpeg` backend.
#[cfg(feature = "media-ffmpeg")]
pub fn compose(request: &ComposeRequest, config: &ComposeConfig) -> MontageResult<CompositionResult> {
    Composer::new(crate::media::ffmpeg::FfmpegBackend::new(), config.clone()).compose(request)
}

/// Dry-run planning with the system `ffprobe` backend.
#[cfg(feature = "media-ffmpeg")]
pub fn compose_plan(request: &ComposeRequest, config: &ComposeConfig) -> MontageResult<CompositionPlan> {
    Composer::new(crate::media::ffmpeg::FfmpegBackend::new(), config.clone()).plan(request)
}
