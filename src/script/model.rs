use std::fmt;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{MontageError, MontageResult};

/// Timeline script as supplied by the caller.
///
/// This is the loosely-checked wire form. Nothing downstream of the validator consumes it; see
/// [`validate`](crate::script::validate::validate).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Script {
    /// Declared target length in seconds.
    pub total_duration: f64,
    /// Scenes in output order.
    pub scenes: Vec<Scene>,
    /// Informational music hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicHint>,
}

/// One timeline entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scene {
    pub scene_id: i64,
    /// Ordinal or basename of the source clip. Optional and loosely typed on the wire so a
    /// missing or wrong-typed reference is reported alongside every other issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_video: Option<SourceField>,
    #[serde(default)]
    pub start_time: f64,
    /// Source-relative end; may be omitted when `duration` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default = "default_transition")]
    pub transition_in: String,
    #[serde(default = "default_transition")]
    pub transition_out: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Reference from a scene to one of the supplied source clips.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceRef {
    /// Zero-based position in the clip list.
    Index(i64),
    /// Basename (or full path) of a clip in the list.
    Name(String),
}

/// Wire form of `source_video`: a usable reference, or any other JSON value for the validator to
/// report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceField {
    Ref(SourceRef),
    Invalid(serde_json::Value),
}

impl SourceField {
    pub fn as_source(&self) -> Option<&SourceRef> {
        match self {
            Self::Ref(r) => Some(r),
            Self::Invalid(_) => None,
        }
    }
}

impl From<SourceRef> for SourceField {
    fn from(r: SourceRef) -> Self {
        Self::Ref(r)
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => write!(f, "'{n}'"),
        }
    }
}

/// Music hints carried by the script. Only `volume` affects rendering.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MusicHint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sync_points: Vec<f64>,
    /// Music gain override in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
}

/// Scene boundary transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Cut,
    Fade,
    Crossfade,
}

impl Transition {
    /// Parse a wire value. Only the exact lowercase names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cut" => Some(Self::Cut),
            "fade" => Some(Self::Fade),
            "crossfade" => Some(Self::Crossfade),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cut => "cut",
            Self::Fade => "fade",
            Self::Crossfade => "crossfade",
        }
    }
}

fn default_transition() -> String {
    Transition::Cut.as_str().to_string()
}

impl Scene {
    /// Build a `cut`-bounded scene over `[start_time, end_time)` of `source`.
    pub fn new(scene_id: i64, source: SourceRef, start_time: f64, end_time: f64) -> Self {
        Self {
            scene_id,
            source_video: Some(source.into()),
            start_time,
            end_time: Some(end_time),
            duration: None,
            transition_in: default_transition(),
            transition_out: default_transition(),
            dialogue: None,
            speaker: None,
        }
    }

    /// Set both boundary transitions.
    pub fn with_transitions(mut self, transition_in: Transition, transition_out: Transition) -> Self {
        self.transition_in = transition_in.as_str().to_string();
        self.transition_out = transition_out.as_str().to_string();
        self
    }
}

impl Script {
    pub fn new(total_duration: f64, scenes: Vec<Scene>) -> Self {
        Self {
            total_duration,
            scenes,
            music: None,
        }
    }

    pub fn from_json_str(s: &str) -> MontageResult<Self> {
        serde_json::from_str(s).map_err(|e| MontageError::serde(format!("invalid script JSON: {e}")))
    }

    pub fn from_path(path: &Path) -> MontageResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> MontageResult<String> {
        serde_json::to_string(self).map_err(|e| MontageError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/model.rs"]
mod tests;
