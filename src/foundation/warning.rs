use std::fmt;
use std::path::PathBuf;

/// A recoverable condition recorded on the
/// [`CompositionResult`](crate::CompositionResult).
///
/// None of these abort a composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A declared scene duration differed from `end_time - start_time` but stayed within tolerance.
    DurationAdjusted {
        scene_id: i64,
        declared: f64,
        derived: f64,
    },
    /// The realized timeline length differs from `total_duration` by more than the tolerance.
    TotalDurationMismatch {
        declared: f64,
        realized: f64,
        tolerance: f64,
    },
    /// A crossfade was longer than half the shorter adjacent scene.
    CrossfadeClamped {
        from_scene: i64,
        to_scene: i64,
        requested: f64,
        applied: f64,
    },
    /// A fade ramp was longer than half of its own scene.
    FadeClamped {
        scene_id: i64,
        requested: f64,
        applied: f64,
    },
    /// Background music could not be read; composed without it.
    MusicUnavailable { path: PathBuf, reason: String },
    /// The thumbnail could not be read; composed without it.
    ThumbnailUnavailable { path: PathBuf, reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationAdjusted {
                scene_id,
                declared,
                derived,
            } => write!(
                f,
                "scene {scene_id}: declared duration {declared:.3}s adjusted to {derived:.3}s"
            ),
            Self::TotalDurationMismatch {
                declared,
                realized,
                tolerance,
            } => write!(
                f,
                "realized duration {realized:.3}s differs from total_duration {declared:.3}s by more than {tolerance:.3}s"
            ),
            Self::CrossfadeClamped {
                from_scene,
                to_scene,
                requested,
                applied,
            } => write!(
                f,
                "crossfade between scenes {from_scene} and {to_scene} clamped from {requested:.3}s to {applied:.3}s"
            ),
            Self::FadeClamped {
                scene_id,
                requested,
                applied,
            } => write!(
                f,
                "scene {scene_id}: fade clamped from {requested:.3}s to {applied:.3}s"
            ),
            Self::MusicUnavailable { path, reason } => {
                write!(f, "music '{}' skipped: {reason}", path.display())
            }
            Self::ThumbnailUnavailable { path, reason } => {
                write!(f, "thumbnail '{}' skipped: {reason}", path.display())
            }
        }
    }
}
