#[cfg(feature = "media-ffmpeg")]
pub mod ffmpeg;
pub mod sink;
