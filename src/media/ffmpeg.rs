use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::EncoderConfig;
use crate::encode::ffmpeg::FfmpegSink;
use crate::encode::sink::FrameSink;
use crate::foundation::core::Fps;
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::{AudioPcm, ClipHandle, FrameCursor, FrameRgba, MediaBackend, MediaClip, MediaInfo, TimedFrame};

/// Used when ffprobe reports no usable frame rate.
const FALLBACK_FPS: Fps = Fps { num: 30, den: 1 };

/// Backend driving the system `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }
}

impl MediaBackend for FfmpegBackend {
    fn open_clip(&self, path: &Path) -> MontageResult<ClipHandle> {
        let info = probe(path)?;
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.fps.as_f64(),
            duration = info.duration_sec,
            has_audio = info.has_audio(),
            "probed clip"
        );
        Ok(Arc::new(FfmpegClip {
            info,
            closed: AtomicBool::new(false),
        }))
    }

    fn decode_audio(&self, path: &Path, sample_rate: u32) -> MontageResult<AudioPcm> {
        decode_audio_f32_stereo(path, None, sample_rate)
    }

    fn create_sink(&self, out_path: &Path, encoder: &EncoderConfig) -> MontageResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::new(out_path, encoder.clone())))
    }
}

/// Probe clip metadata through `ffprobe`.
pub fn probe(path: &Path) -> MontageResult<MediaInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        avg_frame_rate: Option<String>,
        r_frame_rate: Option<String>,
        sample_rate: Option<String>,
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| MontageError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(MontageError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| MontageError::media(format!("ffprobe json parse failed: {e}")))?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MontageError::media(format!("no video stream in '{}'", path.display())))?;
    let width = video
        .width
        .ok_or_else(|| MontageError::media("missing video width from ffprobe"))?;
    let height = video
        .height
        .ok_or_else(|| MontageError::media("missing video height from ffprobe"))?;
    let fps = [&video.avg_frame_rate, &video.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|r| Fps::parse_ratio(r))
        .unwrap_or(FALLBACK_FPS);

    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| MontageError::media(format!("unknown duration for '{}'", path.display())))?;

    let audio_sample_rate = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| {
            s.sample_rate
                .as_deref()
                .and_then(|r| r.parse::<u32>().ok())
                .unwrap_or(48_000)
        });

    Ok(MediaInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps,
        duration_sec,
        audio_sample_rate,
    })
}

/// Clip handle backed by probed metadata. Every read spawns its own `ffmpeg` process.
#[derive(Debug)]
pub struct FfmpegClip {
    info: MediaInfo,
    closed: AtomicBool,
}

impl FfmpegClip {
    fn ensure_open(&self) -> MontageResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(MontageError::media(format!(
                "clip '{}' is closed",
                self.info.path.display()
            )));
        }
        Ok(())
    }
}

impl MediaClip for FfmpegClip {
    fn info(&self) -> &MediaInfo {
        &self.info
    }

    fn open_cursor(&self, start_sec: f64, end_sec: f64) -> MontageResult<Box<dyn FrameCursor>> {
        self.ensure_open()?;
        Ok(Box::new(FfmpegCursor::spawn(&self.info, start_sec, end_sec)?))
    }

    fn read_audio(&self, start_sec: f64, end_sec: f64) -> MontageResult<Option<AudioPcm>> {
        self.ensure_open()?;
        let Some(rate) = self.info.audio_sample_rate else {
            return Ok(None);
        };
        decode_audio_f32_stereo(&self.info.path, Some((start_sec, end_sec)), rate).map(Some)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Streaming decoder over one range: a child `ffmpeg` writing raw RGBA frames to a pipe.
///
/// Dropping the cursor kills the child.
pub struct FfmpegCursor {
    path: PathBuf,
    fps: Fps,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    width: u32,
    height: u32,
    next_idx: u64,
}

impl FfmpegCursor {
    fn spawn(info: &MediaInfo, start_sec: f64, end_sec: f64) -> MontageResult<Self> {
        let dur = (end_sec - start_sec).max(0.0);
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{start_sec:.6}")])
            .arg("-i")
            .arg(&info.path)
            .args([
                "-t",
                &format!("{dur:.6}"),
                "-map",
                "0:v:0",
                "-an",
                "-r",
                &format!("{}/{}", info.fps.num, info.fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MontageError::media(format!("failed to spawn ffmpeg for video decode: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MontageError::media("failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| MontageError::media("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            path: info.path.clone(),
            fps: info.fps,
            child: Some(child),
            stdout: Some(BufReader::new(stdout)),
            stderr_drain: Some(stderr_drain),
            width: info.width,
            height: info.height,
            next_idx: 0,
        })
    }

    fn finish(&mut self) -> MontageResult<()> {
        self.stdout = None;
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| MontageError::media(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr_drain.take() {
            Some(h) => h.join().ok().and_then(|r| r.ok()).unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            return Err(MontageError::media(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.path.display(),
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }
}

impl FrameCursor for FfmpegCursor {
    fn next_frame(&mut self) -> MontageResult<Option<TimedFrame>> {
        let Some(reader) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut data = vec![0u8; self.width as usize * self.height as usize * 4];
        let complete = read_full(reader, &mut data)
            .map_err(|e| MontageError::media(format!("failed to read decoded frame: {e}")))?;
        if !complete {
            self.finish()?;
            return Ok(None);
        }

        let pts_sec = self.fps.frames_to_secs(self.next_idx);
        self.next_idx += 1;
        Ok(Some(TimedFrame {
            pts_sec,
            frame: FrameRgba {
                width: self.width,
                height: self.height,
                data,
            },
        }))
    }
}

impl Drop for FfmpegCursor {
    fn drop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Fill `buf` completely. Returns `false` if the stream ended first; a trailing partial frame is
/// discarded.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Decode audio to stereo interleaved `f32` PCM, optionally restricted to `[start, end)`.
pub fn decode_audio_f32_stereo(
    path: &Path,
    range: Option<(f64, f64)>,
    sample_rate: u32,
) -> MontageResult<AudioPcm> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-v", "error"]);
    if let Some((start, _)) = range {
        cmd.args(["-ss", &format!("{start:.6}")]);
    }
    cmd.arg("-i").arg(path);
    if let Some((start, end)) = range {
        cmd.args(["-t", &format!("{:.6}", (end - start).max(0.0))]);
    }
    let out = cmd
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| MontageError::media(format!("failed to run ffmpeg for audio decode: {e}")))?;

    if !out.status.success() {
        return Err(MontageError::media(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: f32le_to_samples(&out.stdout)?,
    })
}

pub(crate) fn f32le_to_samples(bytes: &[u8]) -> MontageResult<Vec<f32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(MontageError::media(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/media/ffmpeg.rs"]
mod tests;
