use std::collections::HashSet;

use crate::config::ComposeConfig;
use crate::effects::transitions::{BoundaryPlan, SceneTiming, plan_boundaries};
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::warning::Warning;
use crate::script::issue::{IssueKind, ScriptIssue};
use crate::script::model::{MusicHint, Script, SourceField, SourceRef, Transition};

/// A scene that passed validation. All fields are typed and mutually consistent.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidScene {
    pub scene_id: i64,
    pub source: SourceRef,
    /// Source-relative start in seconds.
    pub start: f64,
    /// Source-relative end in seconds (`end > start`).
    pub end: f64,
    pub transition_in: Transition,
    pub transition_out: Transition,
    pub dialogue: Option<String>,
    pub speaker: Option<String>,
}

impl ValidScene {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub(crate) fn timing(&self) -> SceneTiming {
        SceneTiming {
            scene_id: self.scene_id,
            duration: self.duration(),
            transition_in: self.transition_in,
            transition_out: self.transition_out,
        }
    }
}

/// Output of [`validate`]; the only script form later stages accept.
#[derive(Clone, Debug)]
pub struct ValidatedScript {
    pub total_duration: f64,
    pub scenes: Vec<ValidScene>,
    pub music: Option<MusicHint>,
    /// Resolved boundaries and clamped ramp lengths.
    pub boundaries: BoundaryPlan,
    /// `sum(durations) - sum(crossfade overlaps)`.
    pub realized_duration: f64,
    pub warnings: Vec<Warning>,
}

/// Validate a script against the number of supplied source clips.
///
/// Pure: no media is touched. Every scene is checked and every issue is collected before
/// returning, so the error lists all offending scenes at once.
#[tracing::instrument(skip_all, fields(scenes = script.scenes.len(), source_count = source_count))]
pub fn validate(
    script: &Script,
    source_count: usize,
    config: &ComposeConfig,
) -> MontageResult<ValidatedScript> {
    let tolerance = config.validation.duration_tolerance_sec;
    let mut issues = Vec::<ScriptIssue>::new();
    let mut warnings = Vec::<Warning>::new();
    let mut scenes = Vec::with_capacity(script.scenes.len());

    // Script-level checks.
    if script.scenes.is_empty() {
        issues.push(ScriptIssue::script(IssueKind::NoScenes));
    }
    if source_count == 0 {
        issues.push(ScriptIssue::script(IssueKind::NoSources));
    }
    if !script.total_duration.is_finite() || script.total_duration <= 0.0 {
        issues.push(ScriptIssue::script(IssueKind::InvalidTotalDuration {
            value: script.total_duration,
        }));
    }

    let mut seen_ids = HashSet::new();
    for scene in &script.scenes {
        let id = scene.scene_id;
        let before = issues.len();
        let mut push = |kind| issues.push(ScriptIssue::scene(id, kind));

        if !seen_ids.insert(id) {
            push(IssueKind::DuplicateSceneId);
        }

        // Timing.
        let start = scene.start_time;
        let mut end = None;
        if !start.is_finite() {
            push(IssueKind::NonFinite { field: "start_time" });
        } else if start < 0.0 {
            push(IssueKind::NegativeStart { start });
        }
        match (scene.end_time, scene.duration) {
            (Some(e), _) if !e.is_finite() => push(IssueKind::NonFinite { field: "end_time" }),
            (_, Some(d)) if !d.is_finite() => push(IssueKind::NonFinite { field: "duration" }),
            (Some(e), _) => end = Some(e),
            (None, Some(d)) => end = Some(start + d),
            (None, None) => push(IssueKind::MissingEnd),
        }
        if let Some(e) = end
            && start.is_finite()
            && e <= start
        {
            push(IssueKind::NonPositiveRange { start, end: e });
        }

        // Declared duration against the range.
        if let (Some(e), Some(declared)) = (scene.end_time, scene.duration)
            && e.is_finite()
            && declared.is_finite()
        {
            let derived = e - start;
            let diff = (declared - derived).abs();
            if diff > tolerance {
                push(IssueKind::DurationMismatch {
                    declared,
                    derived,
                    tolerance,
                });
            } else if diff > 1e-9 {
                warnings.push(Warning::DurationAdjusted {
                    scene_id: id,
                    declared,
                    derived,
                });
            }
        }

        // Source reference.
        match &scene.source_video {
            None => push(IssueKind::MissingSource),
            Some(SourceField::Invalid(value)) => push(IssueKind::InvalidSource {
                value: value.to_string(),
            }),
            Some(SourceField::Ref(SourceRef::Index(i))) if *i < 0 => {
                push(IssueKind::NegativeIndex { index: *i })
            }
            Some(SourceField::Ref(SourceRef::Index(i)))
                if source_count > 0 && *i as u64 >= source_count as u64 =>
            {
                push(IssueKind::SourceOutOfRange {
                    index: *i,
                    source_count,
                })
            }
            Some(SourceField::Ref(SourceRef::Name(n))) if n.trim().is_empty() => {
                push(IssueKind::EmptyName)
            }
            Some(_) => {}
        }

        // Transitions.
        let transition_in = Transition::parse(&scene.transition_in);
        if transition_in.is_none() {
            push(IssueKind::UnknownTransition {
                field: "transition_in",
                value: scene.transition_in.clone(),
            });
        }
        let transition_out = Transition::parse(&scene.transition_out);
        if transition_out.is_none() {
            push(IssueKind::UnknownTransition {
                field: "transition_out",
                value: scene.transition_out.clone(),
            });
        }

        if issues.len() != before {
            continue;
        }
        if let (Some(end), Some(source), Some(transition_in), Some(transition_out)) =
            (
            end,
            scene.source_video.as_ref().and_then(SourceField::as_source).cloned(),
            transition_in,
            transition_out,
        )
        {
            scenes.push(ValidScene {
                scene_id: id,
                source,
                start,
                end,
                transition_in,
                transition_out,
                dialogue: scene.dialogue.clone(),
                speaker: scene.speaker.clone(),
            });
        }
    }

    if !issues.is_empty() {
        return Err(issues_to_error(issues));
    }

    // Realized length once crossfades are subtracted.
    let timings: Vec<SceneTiming> = scenes.iter().map(ValidScene::timing).collect();
    let boundaries = plan_boundaries(&timings, &config.transitions);
    let realized_duration =
        timings.iter().map(|t| t.duration).sum::<f64>() - boundaries.total_overlap();
    let total_tolerance = config.validation.total_tolerance_sec;
    if (realized_duration - script.total_duration).abs() > total_tolerance {
        tracing::warn!(
            declared = script.total_duration,
            realized = realized_duration,
            "total duration mismatch"
        );
        warnings.push(Warning::TotalDurationMismatch {
            declared: script.total_duration,
            realized: realized_duration,
            tolerance: total_tolerance,
        });
    }
    warnings.extend(boundaries.warnings.iter().cloned());

    tracing::debug!(realized_duration, warnings = warnings.len(), "script validated");
    Ok(ValidatedScript {
        total_duration: script.total_duration,
        scenes,
        music: script.music.clone(),
        boundaries,
        realized_duration,
        warnings,
    })
}

/// A script whose only defects are dangling ordinals is structurally sound; it fails as a
/// resolution error naming the first such scene. Anything else is a validation failure.
fn issues_to_error(issues: Vec<ScriptIssue>) -> MontageError {
    let all_dangling = issues
        .iter()
        .all(|i| matches!(i.kind, IssueKind::SourceOutOfRange { .. }) && i.scene_id.is_some());
    if all_dangling
        && let Some(ScriptIssue {
            scene_id: Some(scene_id),
            kind: IssueKind::SourceOutOfRange {
                index,
                source_count,
            },
        }) = issues.first()
    {
        return MontageError::SourceResolution {
            scene_id: *scene_id,
            reference: index.to_string(),
            reason: format!("index out of range for {source_count} supplied clip(s)"),
        };
    }
    MontageError::ScriptValidation { issues }
}

#[cfg(test)]
#[path = "../../tests/unit/script/validate.rs"]
mod tests;
