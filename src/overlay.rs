//! Still-image overlay on the opening frames.

use std::path::Path;

use image::imageops::FilterType;

use crate::compose::timeline::OutputFormat;
use crate::config::OverlayConfig;
use crate::effects::composite::{over_in_place, resize_rgba};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{MontageError, MontageResult};
use crate::foundation::warning::Warning;
use crate::media::FrameRgba;

/// A thumbnail scaled to the canvas, ready to be composited.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    image: FrameRgba,
    frames: u64,
}

impl Thumbnail {
    /// Load `path` and scale it to the full canvas.
    pub fn load(path: &Path, format: &OutputFormat, cfg: &OverlayConfig) -> MontageResult<Self> {
        let img = image::open(path)
            .map_err(|e| MontageError::render(format!("cannot read '{}': {e}", path.display())))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let frame = FrameRgba {
            width,
            height,
            data: img.into_raw(),
        };
        let canvas = format.canvas;
        Ok(Self {
            image: resize_rgba(&frame, canvas.width, canvas.height, FilterType::Lanczos3)?,
            frames: window_frames(format, cfg),
        })
    }

    /// Number of opening frames covered.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn applies_to(&self, idx: FrameIndex) -> bool {
        idx.0 < self.frames
    }

    /// Composite the thumbnail over `frame` when `idx` falls inside the window.
    pub fn apply(&self, idx: FrameIndex, frame: &mut FrameRgba) -> MontageResult<()> {
        if !self.applies_to(idx) {
            return Ok(());
        }
        over_in_place(&mut frame.data, &self.image.data, 1.0)
    }
}

/// Frames in the overlay window: exactly one unless a window length is configured.
pub fn window_frames(format: &OutputFormat, cfg: &OverlayConfig) -> u64 {
    match cfg.window_sec {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            ((secs * format.fps.as_f64()) - 1e-9).ceil().max(1.0) as u64
        }
        _ => 1,
    }
}

/// Load the optional thumbnail. Unreadable images become a warning and no overlay.
pub fn prepare(
    path: Option<&Path>,
    format: &OutputFormat,
    cfg: &OverlayConfig,
    warnings: &mut Vec<Warning>,
) -> Option<Thumbnail> {
    let path = path?;
    match Thumbnail::load(path, format, cfg) {
        Ok(t) => {
            tracing::info!(path = %path.display(), frames = t.frames(), "thumbnail overlay loaded");
            Some(t)
        }
        Err(e) => {
            let reason = e.to_string();
            tracing::warn!(path = %path.display(), %reason, "thumbnail unavailable, skipping overlay");
            warnings.push(Warning::ThumbnailUnavailable {
                path: path.to_path_buf(),
                reason,
            });
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/overlay.rs"]
mod tests;
