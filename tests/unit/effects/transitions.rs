use super::*;

fn timing(scene_id: i64, duration: f64, tin: Transition, tout: Transition) -> SceneTiming {
    SceneTiming {
        scene_id,
        duration,
        transition_in: tin,
        transition_out: tout,
    }
}

#[test]
fn agreeing_sides_keep_their_transition() {
    for t in [Transition::Cut, Transition::Fade, Transition::Crossfade] {
        assert_eq!(resolve_boundary(t, t, BoundaryPolicy::PreferOverlap), t);
        assert_eq!(resolve_boundary(t, t, BoundaryPolicy::PreferOutgoing), t);
    }
}

#[test]
fn prefer_overlap_lets_crossfade_win_over_fade() {
    assert_eq!(
        resolve_boundary(Transition::Fade, Transition::Crossfade, BoundaryPolicy::PreferOverlap),
        Transition::Crossfade
    );
    assert_eq!(
        resolve_boundary(Transition::Cut, Transition::Fade, BoundaryPolicy::PreferOverlap),
        Transition::Fade
    );
}

#[test]
fn prefer_outgoing_only_yields_when_outgoing_is_cut() {
    assert_eq!(
        resolve_boundary(Transition::Fade, Transition::Crossfade, BoundaryPolicy::PreferOutgoing),
        Transition::Fade
    );
    assert_eq!(
        resolve_boundary(Transition::Cut, Transition::Crossfade, BoundaryPolicy::PreferOutgoing),
        Transition::Crossfade
    );
}

#[test]
fn crossfade_overlap_uses_default_length() {
    let scenes = [
        timing(1, 5.0, Transition::Cut, Transition::Crossfade),
        timing(2, 5.0, Transition::Crossfade, Transition::Cut),
    ];
    let plan = plan_boundaries(&scenes, &TransitionConfig::default());
    assert_eq!(plan.boundaries.len(), 1);
    assert_eq!(plan.boundaries[0].transition, Transition::Crossfade);
    assert!((plan.total_overlap() - 0.5).abs() < 1e-12);
    assert_eq!(plan.ramps[0].tail_sec, 0.5);
    assert_eq!(plan.ramps[1].lead_sec, 0.5);
    assert!(plan.warnings.is_empty());
}

#[test]
fn oversized_crossfade_is_clamped_with_warning() {
    let cfg = TransitionConfig {
        crossfade_sec: 2.0,
        ..TransitionConfig::default()
    };
    let scenes = [
        timing(1, 1.0, Transition::Cut, Transition::Crossfade),
        timing(2, 6.0, Transition::Crossfade, Transition::Cut),
    ];
    let plan = plan_boundaries(&scenes, &cfg);
    assert!((plan.overlap_after(0) - 0.5).abs() < 1e-12);
    assert_eq!(
        plan.warnings,
        vec![Warning::CrossfadeClamped {
            from_scene: 1,
            to_scene: 2,
            requested: 2.0,
            applied: 0.5,
        }]
    );
}

#[test]
fn fades_consume_no_duration() {
    let scenes = [
        timing(1, 3.0, Transition::Fade, Transition::Fade),
        timing(2, 3.0, Transition::Cut, Transition::Fade),
    ];
    let plan = plan_boundaries(&scenes, &TransitionConfig::default());
    assert_eq!(plan.boundaries[0].transition, Transition::Fade);
    assert_eq!(plan.total_overlap(), 0.0);
    assert_eq!(plan.ramps[0], SceneRamps { lead_sec: 0.5, tail_sec: 0.5 });
    assert_eq!(plan.ramps[1], SceneRamps { lead_sec: 0.5, tail_sec: 0.5 });
}

#[test]
fn open_and_close_crossfades_become_fades_without_overlap() {
    let scenes = [timing(1, 4.0, Transition::Crossfade, Transition::Crossfade)];
    let plan = plan_boundaries(&scenes, &TransitionConfig::default());
    assert!(plan.boundaries.is_empty());
    assert_eq!(plan.total_overlap(), 0.0);
    assert_eq!(plan.ramps[0], SceneRamps { lead_sec: 0.5, tail_sec: 0.5 });
}

#[test]
fn long_fade_on_short_scene_is_clamped() {
    let scenes = [timing(9, 0.4, Transition::Fade, Transition::Cut)];
    let plan = plan_boundaries(&scenes, &TransitionConfig::default());
    assert!((plan.ramps[0].lead_sec - 0.2).abs() < 1e-12);
    assert_eq!(plan.warnings.len(), 1);
}

#[test]
fn empty_scene_list_yields_empty_plan() {
    let plan = plan_boundaries(&[], &TransitionConfig::default());
    assert!(plan.boundaries.is_empty());
    assert!(plan.ramps.is_empty());
}
