use super::*;
use crate::encode::sink::AudioInputConfig;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30000, 1001).unwrap(),
        audio: None,
    }
}

fn args_of(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn begin_rejects_odd_or_empty_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");
    let mut sink = FfmpegSink::new(&out, EncoderConfig::default());
    assert!(sink.begin(cfg(11, 10)).is_err());
    assert!(sink.begin(cfg(0, 10)).is_err());
    assert!(!out.exists());
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new("unused.mp4", EncoderConfig::default());
    let f = FrameRgba::solid(2, 2, [0, 0, 0]);
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
}

#[test]
fn command_carries_encoder_settings_and_rational_fps() {
    let encoder = EncoderConfig {
        crf: 23,
        ..EncoderConfig::default()
    };
    let sink = FfmpegSink::new("out/clip.mp4", encoder);
    let args = args_of(&sink.build_command(&cfg(640, 360)).unwrap());

    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(args[pos("-s") + 1], "640x360");
    assert_eq!(args[pos("-r") + 1], "30000/1001");
    assert_eq!(args[pos("-c:v") + 1], "libx264");
    assert_eq!(args[pos("-crf") + 1], "23");
    assert!(args.contains(&"-an".to_string()));
    assert_eq!(args.last().unwrap(), "out/clip.mp4");
}

#[test]
fn command_muxes_pcm_soundtrack_when_present() {
    let sink = FfmpegSink::new("o.mp4", EncoderConfig::default());
    let mut c = cfg(4, 4);
    c.audio = Some(AudioInputConfig {
        path: PathBuf::from("mix.f32le"),
        sample_rate: 48_000,
        channels: 2,
    });
    let args = args_of(&sink.build_command(&c).unwrap());
    let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
    assert_eq!(args[pos("-ar") + 1], "48000");
    assert_eq!(args[pos("-c:a") + 1], "aac");
    assert!(args.contains(&"mix.f32le".to_string()));
    assert!(args.contains(&"-shortest".to_string()));
    assert!(!args.contains(&"-an".to_string()));
}

#[test]
fn zero_rate_soundtrack_is_rejected() {
    let sink = FfmpegSink::new("o.mp4", EncoderConfig::default());
    let mut c = cfg(4, 4);
    c.audio = Some(AudioInputConfig {
        path: PathBuf::from("mix.f32le"),
        sample_rate: 0,
        channels: 2,
    });
    assert!(sink.build_command(&c).is_err());
}
