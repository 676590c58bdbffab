use super::*;
use crate::compose::timeline::Timeline;
use crate::foundation::core::Canvas;
use crate::media::synthetic::SyntheticBackend;

#[test]
fn guard_removes_uncommitted_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.mp4");
    std::fs::write(&path, b"half").unwrap();
    drop(OutputGuard::new(&path));
    assert!(!path.exists());
}

#[test]
fn committed_output_survives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("done.mp4");
    std::fs::write(&path, b"full").unwrap();
    let kept = OutputGuard::new(&path).commit();
    assert_eq!(kept, path);
    assert!(path.exists());
}

#[test]
fn default_path_is_stable_and_input_sensitive() {
    let dir = Path::new("/tmp/out");
    let clips = vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")];
    let p1 = default_output_path(dir, "{}", &clips);
    let p2 = default_output_path(dir, "{}", &clips);
    assert_eq!(p1, p2);
    assert_eq!(p1.parent(), Some(dir));
    let name = p1.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("composed_") && name.ends_with(".mp4"));
    assert_eq!(name.len(), "composed_".len() + 16 + ".mp4".len());

    let swapped = vec![PathBuf::from("b.mp4"), PathBuf::from("a.mp4")];
    assert_ne!(p1, default_output_path(dir, "{}", &swapped));
    assert_ne!(p1, default_output_path(dir, "{ }", &clips));
}

#[test]
fn existing_file_is_kept_when_overwrite_is_off() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("keep.mp4");
    std::fs::write(&out, b"precious").unwrap();

    let timeline = Timeline::build(&crate::script::validate::ValidatedScript {
        total_duration: 1.0,
        scenes: Vec::new(),
        music: None,
        boundaries: Default::default(),
        realized_duration: 0.0,
        warnings: Vec::new(),
    });
    let audio = AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: Vec::new(),
    };
    let input = RenderInput {
        timeline: &timeline,
        segments: &[],
        format: OutputFormat {
            fps: Fps::new(10, 1).unwrap(),
            canvas: Canvas {
                width: 2,
                height: 2,
            },
        },
        audio: &audio,
        thumbnail: None,
    };
    let encoder = EncoderConfig {
        overwrite: false,
        ..EncoderConfig::default()
    };
    let err = render(
        &SyntheticBackend::new(),
        &input,
        &out,
        &encoder,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, MontageError::Render(_)));
    assert_eq!(std::fs::read(&out).unwrap(), b"precious");
}
