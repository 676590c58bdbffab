//! Montage composes one video from several source clips by following a declarative script.
//!
//! A script is an ordered list of scenes, each naming a source clip, a source time range and the
//! transitions at its boundaries. The pipeline runs strictly in order:
//!
//! - validate the [`Script`] into a [`ValidatedScript`]
//! - resolve every scene to a shared clip handle, opening each source once
//! - extract each scene's range (in parallel, order preserved)
//! - lay scenes out on the output timeline, blending cuts, fades and crossfades
//! - mix an optional music bed, overlay an optional thumbnail
//! - encode through a [`FrameSink`] and return a [`CompositionResult`]
//!
//! Media access goes through [`MediaBackend`]; the `ffmpeg` backend is the default and
//! [`SyntheticBackend`] runs the whole pipeline in process.
#![forbid(unsafe_code)]

pub mod audio;
pub mod compose;
pub mod config;
pub mod effects;
pub mod encode;
pub mod extract;
mod foundation;
pub mod media;
pub mod overlay;
pub mod pipeline;
pub mod render;
pub mod resolve;
pub mod script;

pub use crate::config::{
    BoundaryPolicy, ComposeConfig, EncoderConfig, LoggingConfig, MixConfig, OutputConfig,
    OverlayConfig, TransitionConfig, ValidationConfig, init_logging,
};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::foundation::cancel::CancelToken;
pub use crate::foundation::core::{Canvas, Fps, FrameIndex};
pub use crate::foundation::error::{MontageError, MontageResult};
pub use crate::foundation::warning::Warning;
pub use crate::media::synthetic::{RecordedRender, SyntheticBackend, SyntheticClip};
pub use crate::media::{AudioPcm, ClipHandle, FrameCursor, FrameRgba, MediaBackend, MediaClip, MediaInfo};
pub use crate::compose::timeline::ScenePlacement;
pub use crate::pipeline::{ComposeRequest, Composer, CompositionPlan};
#[cfg(feature = "media-ffmpeg")]
pub use crate::pipeline::{compose, compose_plan};
pub use crate::render::CompositionResult;
pub use crate::script::issue::{IssueKind, ScriptIssue};
pub use crate::script::model::{MusicHint, Scene, Script, SourceField, SourceRef, Transition};
pub use crate::script::validate::{ValidScene, ValidatedScript, validate};

#[cfg(feature = "media-ffmpeg")]
pub use crate::encode::ffmpeg::{FfmpegSink, is_ffmpeg_on_path, is_ffprobe_on_path};
#[cfg(feature = "media-ffmpeg")]
pub use crate::media::ffmpeg::FfmpegBackend;
