//! Composition configuration.
//!
//! Everything the engine needs beyond the script and input paths is passed in explicitly through
//! [`ComposeConfig`]; no stage reads global directories or environment state.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{MontageError, MontageResult};

/// Top-level configuration for one or more compositions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Script validation tolerances.
    pub validation: ValidationConfig,
    /// Transition defaults and boundary policy.
    pub transitions: TransitionConfig,
    /// Music bed mixing.
    pub mix: MixConfig,
    /// Thumbnail overlay window.
    pub overlay: OverlayConfig,
    /// Output format and location.
    pub output: OutputConfig,
    /// Encoder settings.
    pub encoder: EncoderConfig,
    /// Worker threads used for per-scene extraction (`None` = rayon default).
    pub workers: Option<usize>,
}

/// Tolerances applied by the script validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Allowed difference between a declared scene `duration` and `end_time - start_time`.
    pub duration_tolerance_sec: f64,
    /// Allowed difference between the realized length and `total_duration` before warning.
    pub total_tolerance_sec: f64,
}

/// How the transition at an internal boundary is chosen when the two scenes disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Rank `crossfade` over `fade` over `cut`: the transition that costs both sides the most wins.
    #[default]
    PreferOverlap,
    /// Use the outgoing scene's `transition_out`, falling back to the incoming `transition_in`
    /// only when the outgoing side is `cut`.
    PreferOutgoing,
}

/// Default transition lengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Ramp length of `fade` transitions, in seconds.
    pub fade_sec: f64,
    /// Overlap length of `crossfade` transitions, in seconds.
    pub crossfade_sec: f64,
    /// Boundary tie-break rule.
    pub policy: BoundaryPolicy,
}

/// Music bed mixing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Output audio sample rate; all scene audio is resampled to it once.
    pub sample_rate: u32,
    /// Music gain relative to the scene audio, used when the script carries no `music.volume`.
    pub music_gain: f32,
    /// Extra gain factor applied to music under scenes whose source carries audio.
    pub duck_gain: f32,
    /// Length of the ramps into and out of ducked ranges.
    pub duck_ramp_sec: f64,
}

/// Thumbnail overlay parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Seconds of output covered by the thumbnail; `None` covers exactly the first frame.
    pub window_sec: Option<f64>,
}

/// Output stream shape and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output frame rate; defaults to the first scene's source rate.
    pub fps: Option<Fps>,
    /// Output canvas; defaults to the first scene's source size.
    pub canvas: Option<Canvas>,
    /// Directory for generated output paths when the caller supplies none.
    pub output_dir: PathBuf,
}

/// Encoder settings passed to the sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub video_codec: String,
    pub audio_codec: String,
    pub pix_fmt: String,
    pub crf: u8,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

/// Logging configuration for the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "montage=debug,warn").
    pub level: String,
    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            duration_tolerance_sec: 0.05,
            total_tolerance_sec: 1.0,
        }
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_sec: 0.5,
            crossfade_sec: 0.5,
            policy: BoundaryPolicy::default(),
        }
    }
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            music_gain: 0.5,
            duck_gain: 0.4,
            duck_ramp_sec: 0.05,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fps: None,
            canvas: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            pix_fmt: "yuv420p".to_string(),
            crf: 20,
            overwrite: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ComposeConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_path(path: &Path) -> MontageResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// Deserialization already checks `Fps` and `Canvas`; this also covers configs built in code.
    pub fn validate(&self) -> MontageResult<()> {
        if let Some(fps) = self.output.fps {
            Fps::new(fps.num, fps.den).map_err(|e| MontageError::config(format!("output.fps: {e}")))?;
        }
        if let Some(canvas) = self.output.canvas {
            Canvas::new(canvas.width, canvas.height)?;
        }
        if self.mix.sample_rate == 0 {
            return Err(MontageError::config("mix.sample_rate must be > 0"));
        }
        if self.workers == Some(0) {
            return Err(MontageError::config("workers must be >= 1 when set"));
        }

        let non_negative = [
            ("validation.duration_tolerance_sec", self.validation.duration_tolerance_sec),
            ("validation.total_tolerance_sec", self.validation.total_tolerance_sec),
            ("transitions.fade_sec", self.transitions.fade_sec),
            ("transitions.crossfade_sec", self.transitions.crossfade_sec),
            ("mix.duck_ramp_sec", self.mix.duck_ramp_sec),
            ("mix.music_gain", f64::from(self.mix.music_gain)),
            ("mix.duck_gain", f64::from(self.mix.duck_gain)),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(MontageError::config(format!(
                    "{name} must be a finite, non-negative number, got {value}"
                )));
            }
        }
        if let Some(w) = self.overlay.window_sec
            && !w.is_finite()
        {
            return Err(MontageError::config("overlay.window_sec must be finite"));
        }
        Ok(())
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level`. Calling this twice is harmless.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{EnvFilter, fmt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
