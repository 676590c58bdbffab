use crate::script::issue::ScriptIssue;

/// Result alias used across the crate.
pub type MontageResult<T> = Result<T, MontageError>;

/// Fatal composition failures.
///
/// Recoverable conditions never surface here; they are recorded as
/// [`Warning`](crate::Warning)s on the result instead.
#[derive(thiserror::Error, Debug)]
pub enum MontageError {
    /// Structural or timing problems found before any media was opened.
    #[error("script validation failed: {}", join_issues(.issues))]
    ScriptValidation {
        /// Every offending scene, in script order.
        issues: Vec<ScriptIssue>,
    },

    /// A scene's `source_video` could not be mapped to a supplied clip.
    #[error("scene {scene_id}: cannot resolve source_video {reference}: {reason}")]
    SourceResolution {
        /// Offending scene.
        scene_id: i64,
        /// The reference as written in the script.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A scene requested more source time than the clip contains.
    #[error(
        "scene {scene_id}: requested range [{start:.3}s, {end:.3}s) exceeds source duration {source_duration:.3}s"
    )]
    TimeRange {
        /// Offending scene.
        scene_id: i64,
        /// Requested source start in seconds.
        start: f64,
        /// Requested source end in seconds.
        end: f64,
        /// Actual duration of the resolved source.
        source_duration: f64,
    },

    /// Probing or decoding of an already-resolved clip failed.
    #[error("media error: {0}")]
    Media(String),

    /// Encoding or writing the output failed.
    #[error("render error: {0}")]
    Render(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The script payload was not well-formed JSON.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The caller cancelled the composition.
    #[error("composition cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MontageError {
    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Scene id carried by the error, when it names one.
    pub fn scene_id(&self) -> Option<i64> {
        match self {
            Self::SourceResolution { scene_id, .. } | Self::TimeRange { scene_id, .. } => {
                Some(*scene_id)
            }
            _ => None,
        }
    }
}

fn join_issues(issues: &[ScriptIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
