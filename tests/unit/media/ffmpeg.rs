use super::*;

#[test]
fn read_full_reports_short_streams() {
    let mut buf = [0u8; 4];
    let mut full: &[u8] = &[1, 2, 3, 4, 5];
    assert!(read_full(&mut full, &mut buf).unwrap());
    assert_eq!(buf, [1, 2, 3, 4]);

    let mut short: &[u8] = &[9, 9];
    assert!(!read_full(&mut short, &mut buf).unwrap());
}

#[test]
fn f32le_conversion_rejects_misaligned_input() {
    let bytes: Vec<u8> = [0.5f32, -1.0].iter().flat_map(|s| s.to_le_bytes()).collect();
    assert_eq!(f32le_to_samples(&bytes).unwrap(), vec![0.5, -1.0]);
    assert!(f32le_to_samples(&bytes[..5]).is_err());
}

#[test]
fn closed_clip_refuses_new_reads() {
    let clip = FfmpegClip {
        info: MediaInfo {
            path: PathBuf::from("never-opened.mp4"),
            width: 2,
            height: 2,
            fps: FALLBACK_FPS,
            duration_sec: 1.0,
            audio_sample_rate: None,
        },
        closed: AtomicBool::new(false),
    };
    assert!(clip.read_audio(0.0, 1.0).unwrap().is_none());
    clip.close();
    assert!(clip.open_cursor(0.0, 1.0).is_err());
    assert!(clip.read_audio(0.0, 1.0).is_err());
}
