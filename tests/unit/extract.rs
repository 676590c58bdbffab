use std::path::Path;

use super::*;
use crate::foundation::core::Fps;
use crate::media::MediaBackend;
use crate::media::synthetic::{SyntheticBackend, SyntheticClip};
use crate::script::model::{SourceRef, Transition};

fn scene(id: i64, start: f64, end: f64) -> ValidScene {
    ValidScene {
        scene_id: id,
        source: SourceRef::Index(0),
        start,
        end,
        transition_in: Transition::Cut,
        transition_out: Transition::Cut,
        dialogue: None,
        speaker: None,
    }
}

fn handle(duration: f64, audio: bool) -> ClipHandle {
    let mut clip = SyntheticClip::solid(2, 2, Fps::new(25, 1).unwrap(), duration, [9, 9, 9]);
    if audio {
        clip = clip.with_audio(0.1, 16_000);
    }
    SyntheticBackend::new()
        .with_clip("s.mp4", clip)
        .open_clip(Path::new("s.mp4"))
        .unwrap()
}

#[test]
fn range_past_source_end_is_a_time_range_error() {
    let h = handle(4.0, false);
    let err = extract(&h, &scene(7, 1.0, 4.5)).unwrap_err();
    match err {
        MontageError::TimeRange {
            scene_id,
            start,
            end,
            source_duration,
        } => {
            assert_eq!(scene_id, 7);
            assert_eq!((start, end), (1.0, 4.5));
            assert_eq!(source_duration, 4.0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn container_rounding_is_tolerated() {
    let h = handle(4.0, false);
    assert!(extract(&h, &scene(1, 0.0, 4.0005)).is_ok());
}

#[test]
fn audio_stays_at_native_rate() {
    let h = handle(4.0, true);
    let seg = extract(&h, &scene(1, 1.0, 3.0)).unwrap();
    let pcm = seg.audio.as_ref().unwrap();
    assert_eq!(pcm.sample_rate, 16_000);
    assert_eq!(pcm.frames(), 32_000);
    assert!((seg.duration() - 2.0).abs() < 1e-12);
}

#[test]
fn each_segment_gets_its_own_cursor() {
    let h = handle(4.0, false);
    let seg = extract(&h, &scene(1, 0.0, 1.0)).unwrap();
    let mut a = seg.open_frames().unwrap();
    let mut b = seg.open_frames().unwrap();
    a.next_frame().unwrap();
    a.next_frame().unwrap();
    let first_b = b.next_frame().unwrap().unwrap();
    assert_eq!(first_b.pts_sec, 0.0);
}

#[test]
fn extract_all_preserves_scene_order() {
    let h = handle(10.0, true);
    let scenes: Vec<_> = (0..8)
        .map(|i| scene(100 - i, f64::from(i as u32), f64::from(i as u32) + 1.0))
        .collect();
    let handles = vec![h; scenes.len()];
    let segs = extract_all(&scenes, &handles, Some(3), &CancelToken::new()).unwrap();
    let ids: Vec<_> = segs.iter().map(|s| s.scene_id).collect();
    assert_eq!(ids, (0..8).map(|i| 100 - i).collect::<Vec<_>>());
}

#[test]
fn extract_all_fails_fast_on_any_bad_range() {
    let h = handle(3.0, false);
    let scenes = vec![scene(1, 0.0, 1.0), scene(2, 2.0, 3.5)];
    let handles = vec![h.clone(), h];
    let err = extract_all(&scenes, &handles, None, &CancelToken::new()).unwrap_err();
    assert_eq!(err.scene_id(), Some(2));
}

#[test]
fn cancelled_extraction_returns_cancelled() {
    let h = handle(3.0, false);
    let token = CancelToken::new();
    token.cancel();
    let err = extract_all(&[scene(1, 0.0, 1.0)], &[h], Some(1), &token).unwrap_err();
    assert!(matches!(err, MontageError::Cancelled));
}

#[test]
fn zero_workers_is_rejected() {
    let h = handle(3.0, false);
    assert!(extract_all(&[scene(1, 0.0, 1.0)], &[h], Some(0), &CancelToken::new()).is_err());
}
