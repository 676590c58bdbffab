use super::*;
use crate::script::issue::IssueKind;

#[test]
fn display_prefixes_are_stable() {
    assert!(MontageError::media("x").to_string().contains("media error:"));
    assert!(MontageError::render("x").to_string().contains("render error:"));
    assert!(
        MontageError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn validation_error_lists_every_issue() {
    let err = MontageError::ScriptValidation {
        issues: vec![
            ScriptIssue::scene(1, IssueKind::NonPositiveRange { start: 2.0, end: 1.0 }),
            ScriptIssue::scene(
                3,
                IssueKind::UnknownTransition {
                    field: "transition_in",
                    value: "wipe".to_string(),
                },
            ),
        ],
    };
    let msg = err.to_string();
    assert!(msg.contains("scene 1"));
    assert!(msg.contains("scene 3"));
    assert!(msg.contains("wipe"));
}

#[test]
fn resolution_error_names_scene_and_reference() {
    let err = MontageError::SourceResolution {
        scene_id: 7,
        reference: "2".to_string(),
        reason: "index out of range".to_string(),
    };
    assert_eq!(err.scene_id(), Some(7));
    let msg = err.to_string();
    assert!(msg.contains("scene 7"));
    assert!(msg.contains('2'));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MontageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
