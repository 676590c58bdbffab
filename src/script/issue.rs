use std::fmt;

/// One structural or timing problem found by the validator.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScriptIssue {
    /// Offending scene; `None` for script-level problems.
    pub scene_id: Option<i64>,
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// What is wrong.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum IssueKind {
    NoScenes,
    NoSources,
    InvalidTotalDuration { value: f64 },
    NonFinite { field: &'static str },
    NegativeStart { start: f64 },
    NonPositiveRange { start: f64, end: f64 },
    MissingEnd,
    DurationMismatch { declared: f64, derived: f64, tolerance: f64 },
    MissingSource,
    NegativeIndex { index: i64 },
    EmptyName,
    /// `source_video` is neither an integer nor a string; `value` is the JSON as written.
    InvalidSource { value: String },
    SourceOutOfRange { index: i64, source_count: usize },
    UnknownTransition { field: &'static str, value: String },
    DuplicateSceneId,
}

impl ScriptIssue {
    pub fn script(kind: IssueKind) -> Self {
        Self {
            scene_id: None,
            kind,
        }
    }

    pub fn scene(scene_id: i64, kind: IssueKind) -> Self {
        Self {
            scene_id: Some(scene_id),
            kind,
        }
    }
}

impl fmt::Display for ScriptIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scene_id {
            Some(id) => write!(f, "scene {id}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScenes => write!(f, "script must contain at least one scene"),
            Self::NoSources => write!(f, "at least one source clip is required"),
            Self::InvalidTotalDuration { value } => {
                write!(f, "total_duration must be > 0, got {value}")
            }
            Self::NonFinite { field } => write!(f, "{field} must be a finite number"),
            Self::NegativeStart { start } => write!(f, "start_time {start} must be >= 0"),
            Self::NonPositiveRange { start, end } => {
                write!(f, "end_time {end} must be greater than start_time {start}")
            }
            Self::MissingEnd => write!(f, "end_time or duration is required"),
            Self::DurationMismatch {
                declared,
                derived,
                tolerance,
            } => write!(
                f,
                "declared duration {declared:.3}s differs from end_time - start_time = {derived:.3}s by more than {tolerance:.3}s"
            ),
            Self::MissingSource => write!(f, "missing 'source_video'"),
            Self::NegativeIndex { index } => {
                write!(f, "source_video index {index} must be non-negative")
            }
            Self::EmptyName => write!(f, "source_video filename must be non-empty"),
            Self::InvalidSource { value } => write!(
                f,
                "source_video {value} must be a clip index or a file name"
            ),
            Self::SourceOutOfRange {
                index,
                source_count,
            } => write!(
                f,
                "source_video index {index} out of range for {source_count} clip(s)"
            ),
            Self::UnknownTransition { field, value } => write!(
                f,
                "{field} '{value}' is not one of cut, fade, crossfade"
            ),
            Self::DuplicateSceneId => write!(f, "scene_id is not unique"),
        }
    }
}
