use super::*;

#[test]
fn parses_wire_format_with_both_reference_kinds() {
    let script = Script::from_json_str(
        r#"{
            "total_duration": 9.5,
            "scenes": [
                {"scene_id": 1, "source_video": 0, "start_time": 0.0, "end_time": 5.0,
                 "duration": 5.0, "transition_in": "fade", "transition_out": "crossfade",
                 "dialogue": "hello", "speaker": "A"},
                {"scene_id": 2, "source_video": "b.mp4", "start_time": 1.0, "end_time": 6.0,
                 "transition_in": "crossfade", "transition_out": "fade"}
            ],
            "music": {"mood": "energetic", "bpm": 120, "sync_points": [0.0, 4.5], "volume": 0.3}
        }"#,
    )
    .unwrap();

    assert_eq!(script.scenes.len(), 2);
    assert_eq!(
        script.scenes[0].source_video,
        Some(SourceField::Ref(SourceRef::Index(0)))
    );
    assert_eq!(
        script.scenes[1].source_video,
        Some(SourceField::Ref(SourceRef::Name("b.mp4".to_string())))
    );
    assert_eq!(script.scenes[1].duration, None);
    assert_eq!(script.music.as_ref().and_then(|m| m.volume), Some(0.3));
}

#[test]
fn transitions_default_to_cut_and_start_to_zero() {
    let script = Script::from_json_str(
        r#"{"total_duration": 2.0, "scenes": [{"scene_id": 1, "source_video": 0, "end_time": 2.0}]}"#,
    )
    .unwrap();
    let scene = &script.scenes[0];
    assert_eq!(scene.transition_in, "cut");
    assert_eq!(scene.transition_out, "cut");
    assert_eq!(scene.start_time, 0.0);
}

#[test]
fn unknown_transition_survives_parsing() {
    let script = Script::from_json_str(
        r#"{"total_duration": 2.0, "scenes": [{"scene_id": 1, "source_video": 0,
            "end_time": 2.0, "transition_in": "wipe"}]}"#,
    )
    .unwrap();
    assert_eq!(script.scenes[0].transition_in, "wipe");
    assert_eq!(Transition::parse("wipe"), None);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Script::from_json_str("{ not json").unwrap_err();
    assert!(matches!(err, MontageError::Serde(_)));
}

#[test]
fn transition_parse_accepts_only_exact_names() {
    assert_eq!(Transition::parse("crossfade"), Some(Transition::Crossfade));
    assert_eq!(Transition::parse("fade"), Some(Transition::Fade));
    assert_eq!(Transition::parse(" CrossFade "), None);
    assert_eq!(Transition::parse("FADE"), None);
    assert_eq!(Transition::Cut.as_str(), "cut");
}

#[test]
fn wrong_typed_source_survives_parsing() {
    let script = Script::from_json_str(
        r#"{"total_duration": 2.0, "scenes": [
            {"scene_id": 1, "source_video": 1.5, "end_time": 1.0},
            {"scene_id": 2, "source_video": true, "end_time": 1.0},
            {"scene_id": 3, "source_video": null, "end_time": 1.0}
        ]}"#,
    )
    .unwrap();
    assert_eq!(
        script.scenes[0].source_video,
        Some(SourceField::Invalid(serde_json::json!(1.5)))
    );
    assert_eq!(
        script.scenes[1].source_video,
        Some(SourceField::Invalid(serde_json::json!(true)))
    );
    assert_eq!(script.scenes[2].source_video, None);
    assert!(script.scenes[0].source_video.as_ref().unwrap().as_source().is_none());
}

#[test]
fn builder_round_trips_through_json() {
    let script = Script::new(
        3.0,
        vec![
            Scene::new(1, SourceRef::Index(0), 0.0, 3.0)
                .with_transitions(Transition::Fade, Transition::Cut),
        ],
    );
    let back = Script::from_json_str(&script.to_json_string().unwrap()).unwrap();
    assert_eq!(back.scenes[0].transition_in, "fade");
    assert_eq!(back.scenes[0].end_time, Some(3.0));
}
