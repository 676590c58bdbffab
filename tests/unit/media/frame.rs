use super::*;

#[test]
fn solid_frame_is_opaque() {
    let f = FrameRgba::solid(3, 2, [10, 20, 30]);
    assert_eq!(f.data.len(), 3 * 2 * 4);
    assert_eq!(f.pixel(2, 1), [10, 20, 30, 255]);
}

#[test]
fn pcm_frames_and_duration() {
    let pcm = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.0; 16],
    };
    assert_eq!(pcm.frames(), 8);
    assert!((pcm.duration_sec() - 2.0).abs() < 1e-12);
}
