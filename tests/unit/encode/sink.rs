use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(10, 1).unwrap(),
        audio: None,
    }
}

#[test]
fn in_memory_sink_captures_frames_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let f = FrameRgba::solid(2, 2, [1, 2, 3]);
    sink.push_frame(FrameIndex(0), &f).unwrap();
    sink.push_frame(FrameIndex(1), &f).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 2);
    assert!(sink.audio().is_none());
}

#[test]
fn in_memory_sink_rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let f = FrameRgba::solid(2, 2, [0, 0, 0]);
    sink.push_frame(FrameIndex(3), &f).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &f).is_err());
}

#[test]
fn in_memory_sink_reads_back_audio_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mix.f32le");
    let samples = [0.25f32, -0.5, 1.0, 0.0];
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    std::fs::write(&path, bytes).unwrap();

    let mut sink = InMemorySink::new();
    let mut c = cfg();
    c.audio = Some(AudioInputConfig {
        path,
        sample_rate: 48_000,
        channels: 2,
    });
    sink.begin(c).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.audio().unwrap(), &samples);
}
