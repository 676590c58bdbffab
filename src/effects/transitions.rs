use crate::config::{BoundaryPolicy, TransitionConfig};
use crate::foundation::warning::Warning;
use crate::script::model::Transition;

/// Timing facts about one scene that transition planning needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTiming {
    pub scene_id: i64,
    pub duration: f64,
    pub transition_in: Transition,
    pub transition_out: Transition,
}

/// The transition realized between scene `index` and scene `index + 1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    /// Position of the outgoing scene.
    pub index: usize,
    pub transition: Transition,
    /// Seconds of output shared by both scenes (non-zero only for crossfades).
    pub overlap_sec: f64,
}

/// Envelope ramp lengths at either end of one scene, in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneRamps {
    pub lead_sec: f64,
    pub tail_sec: f64,
}

/// Resolved transitions and ramp lengths for a whole scene list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryPlan {
    /// One entry per internal boundary, in scene order.
    pub boundaries: Vec<Boundary>,
    /// One entry per scene.
    pub ramps: Vec<SceneRamps>,
    /// Clamping warnings.
    pub warnings: Vec<Warning>,
}

impl BoundaryPlan {
    /// Overlap between scene `index` and its successor (0 for the last scene).
    pub fn overlap_after(&self, index: usize) -> f64 {
        self.boundaries
            .get(index)
            .map(|b| b.overlap_sec)
            .unwrap_or(0.0)
    }

    /// Sum of all crossfade overlaps.
    pub fn total_overlap(&self) -> f64 {
        self.boundaries.iter().map(|b| b.overlap_sec).sum()
    }
}

/// Pick the transition used at a boundary whose two sides may disagree.
pub fn resolve_boundary(outgoing: Transition, incoming: Transition, policy: BoundaryPolicy) -> Transition {
    if outgoing == incoming {
        return outgoing;
    }
    match policy {
        BoundaryPolicy::PreferOverlap => {
            if rank(outgoing) >= rank(incoming) {
                outgoing
            } else {
                incoming
            }
        }
        BoundaryPolicy::PreferOutgoing => {
            if outgoing == Transition::Cut {
                incoming
            } else {
                outgoing
            }
        }
    }
}

fn rank(t: Transition) -> u8 {
    match t {
        Transition::Cut => 0,
        Transition::Fade => 1,
        Transition::Crossfade => 2,
    }
}

fn nominal_len(t: Transition, cfg: &TransitionConfig) -> f64 {
    match t {
        Transition::Cut => 0.0,
        Transition::Fade => cfg.fade_sec.max(0.0),
        Transition::Crossfade => cfg.crossfade_sec.max(0.0),
    }
}

/// Resolve every boundary and clamp transition lengths.
///
/// Crossfades never exceed half the shorter adjacent scene; fade ramps never exceed half of their
/// own scene. Both clamps are recorded as warnings. The first scene's `transition_in` and the last
/// scene's `transition_out` become a fade from / to black of the declared kind's length.
pub fn plan_boundaries(scenes: &[SceneTiming], cfg: &TransitionConfig) -> BoundaryPlan {
    let mut plan = BoundaryPlan {
        boundaries: Vec::with_capacity(scenes.len().saturating_sub(1)),
        ramps: vec![SceneRamps::default(); scenes.len()],
        warnings: Vec::new(),
    };
    let (Some(first), Some(last)) = (scenes.first(), scenes.last()) else {
        return plan;
    };

    plan.ramps[0].lead_sec = clamp_fade(first, nominal_len(first.transition_in, cfg), &mut plan.warnings);

    for (i, pair) in scenes.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        let transition = resolve_boundary(a.transition_out, b.transition_in, cfg.policy);
        let mut overlap_sec = 0.0;
        match transition {
            Transition::Cut => {}
            Transition::Fade => {
                let d = nominal_len(Transition::Fade, cfg);
                plan.ramps[i].tail_sec = clamp_fade(a, d, &mut plan.warnings);
                plan.ramps[i + 1].lead_sec = clamp_fade(b, d, &mut plan.warnings);
            }
            Transition::Crossfade => {
                let requested = nominal_len(Transition::Crossfade, cfg);
                let bound = a.duration.min(b.duration) / 2.0;
                let applied = requested.min(bound).max(0.0);
                if applied < requested {
                    tracing::warn!(
                        from_scene = a.scene_id,
                        to_scene = b.scene_id,
                        requested,
                        applied,
                        "crossfade clamped"
                    );
                    plan.warnings.push(Warning::CrossfadeClamped {
                        from_scene: a.scene_id,
                        to_scene: b.scene_id,
                        requested,
                        applied,
                    });
                }
                plan.ramps[i].tail_sec = applied;
                plan.ramps[i + 1].lead_sec = applied;
                overlap_sec = applied;
            }
        }
        plan.boundaries.push(Boundary {
            index: i,
            transition,
            overlap_sec,
        });
    }

    let n = scenes.len();
    plan.ramps[n - 1].tail_sec = clamp_fade(last, nominal_len(last.transition_out, cfg), &mut plan.warnings);
    plan
}

fn clamp_fade(scene: &SceneTiming, requested: f64, warnings: &mut Vec<Warning>) -> f64 {
    let bound = (scene.duration / 2.0).max(0.0);
    if requested <= bound {
        return requested;
    }
    tracing::warn!(scene_id = scene.scene_id, requested, applied = bound, "fade clamped");
    warnings.push(Warning::FadeClamped {
        scene_id: scene.scene_id,
        requested,
        applied: bound,
    });
    bound
}

#[cfg(test)]
#[path = "../../tests/unit/effects/transitions.rs"]
mod tests;
