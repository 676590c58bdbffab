use super::*;
use crate::config::ComposeConfig;
use crate::foundation::cancel::CancelToken;
use crate::foundation::core::Fps;
use crate::media::MediaBackend;
use crate::media::synthetic::{SyntheticBackend, SyntheticClip};
use crate::extract::extract_all;
use crate::resolve::{ClipResolver, SourceSet};
use crate::script::model::{Scene, Script, SourceRef, Transition};
use crate::script::validate::validate;

const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];

fn backend() -> SyntheticBackend {
    let fps = Fps::new(10, 1).unwrap();
    SyntheticBackend::new()
        .with_clip("a.mp4", SyntheticClip::solid(16, 8, fps, 6.0, RED))
        .with_clip("b.mp4", SyntheticClip::solid(8, 4, fps, 6.0, BLUE))
}

type Prepared<'b> = (ClipResolver<'b>, Timeline, Vec<SceneSegment>, OutputFormat);

fn prepare(backend: &dyn MediaBackend, scenes: Vec<Scene>, total: f64) -> Prepared<'_> {
    let cfg = ComposeConfig::default();
    let validated = validate(&Script::new(total, scenes), 2, &cfg).unwrap();
    let sources = SourceSet::new(["a.mp4", "b.mp4"]);
    let resolver = ClipResolver::new(backend);
    let handles = resolver.resolve_all(&validated, &sources).unwrap();
    let segments = extract_all(&validated.scenes, &handles, Some(2), &CancelToken::new()).unwrap();
    let format = OutputFormat::resolve(&cfg.output, &segments[0].info);
    (resolver, Timeline::build(&validated), segments, format)
}

fn crossfade_scenes() -> Vec<Scene> {
    vec![
        Scene::new(1, SourceRef::Index(0), 0.0, 5.0)
            .with_transitions(Transition::Cut, Transition::Crossfade),
        Scene::new(2, SourceRef::Name("b.mp4".into()), 0.0, 5.0)
            .with_transitions(Transition::Crossfade, Transition::Cut),
    ]
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 1)
}

#[test]
fn crossfade_dissolves_between_sources() {
    let backend = backend();
    let (_resolver, timeline, segments, format) = prepare(&backend, crossfade_scenes(), 9.5);
    let mut asm = FrameAssembler::new(&timeline, &segments, format).unwrap();
    assert_eq!(asm.frame_count(), 95);

    let first = asm.frame_at(FrameIndex(0)).unwrap();
    assert_eq!((first.width, first.height), (16, 8));
    assert_eq!(first.pixel(0, 0), [255, 0, 0, 255]);

    let start_of_overlap = asm.frame_at(FrameIndex(45)).unwrap();
    assert!(close(start_of_overlap.pixel(5, 5), [255, 0, 0, 255]));

    let mid = asm.frame_at(FrameIndex(47)).unwrap();
    assert!(close(mid.pixel(5, 5), [153, 0, 102, 255]), "{:?}", mid.pixel(5, 5));

    let last = asm.frame_at(FrameIndex(94)).unwrap();
    assert_eq!(last.pixel(15, 7), [0, 0, 255, 255]);
}

#[test]
fn smaller_sources_are_scaled_to_the_canvas() {
    let backend = backend();
    let (_resolver, timeline, segments, format) = prepare(
        &backend,
        vec![
            Scene::new(1, SourceRef::Index(0), 0.0, 1.0),
            Scene::new(2, SourceRef::Index(1), 0.0, 1.0),
        ],
        2.0,
    );
    let mut asm = FrameAssembler::new(&timeline, &segments, format).unwrap();
    let f = asm.frame_at(FrameIndex(15)).unwrap();
    assert_eq!((f.width, f.height), (16, 8));
    assert_eq!(f.pixel(15, 7), [0, 0, 255, 255]);
}

#[test]
fn fade_from_black_starts_dark() {
    let backend = backend();
    let (_resolver, timeline, segments, format) = prepare(
        &backend,
        vec![Scene::new(1, SourceRef::Index(0), 0.0, 2.0).with_transitions(Transition::Fade, Transition::Cut)],
        2.0,
    );
    let mut asm = FrameAssembler::new(&timeline, &segments, format).unwrap();
    assert_eq!(asm.frame_at(FrameIndex(0)).unwrap().pixel(0, 0), [0, 0, 0, 255]);
    let quarter = asm.frame_at(FrameIndex(1)).unwrap();
    assert!(close(quarter.pixel(0, 0), [51, 0, 0, 255]), "{:?}", quarter.pixel(0, 0));
    assert_eq!(asm.frame_at(FrameIndex(10)).unwrap().pixel(0, 0), [255, 0, 0, 255]);
}

#[test]
fn released_handles_cannot_feed_the_assembler() {
    let backend = backend();
    let (resolver, timeline, segments, format) = prepare(&backend, crossfade_scenes(), 9.5);
    resolver.release();
    let mut asm = FrameAssembler::new(&timeline, &segments, format).unwrap();
    assert!(asm.frame_at(FrameIndex(0)).is_err());
}

#[test]
fn frames_must_be_requested_in_order() {
    let backend = backend();
    let (_resolver, timeline, segments, format) = prepare(&backend, crossfade_scenes(), 9.5);
    let mut asm = FrameAssembler::new(&timeline, &segments, format).unwrap();
    asm.frame_at(FrameIndex(3)).unwrap();
    assert!(asm.frame_at(FrameIndex(3)).is_err());
    assert!(asm.frame_at(FrameIndex(2)).is_err());
}

#[test]
fn mismatched_segment_count_is_rejected() {
    let backend = backend();
    let (_resolver, timeline, segments, format) = prepare(&backend, crossfade_scenes(), 9.5);
    assert!(FrameAssembler::new(&timeline, &segments[..1], format).is_err());
}
