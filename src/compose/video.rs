use image::imageops::FilterType;

use crate::compose::timeline::{OutputFormat, Timeline};
use crate::effects::composite::{blend_weighted, resize_rgba};
use crate::extract::SceneSegment;
use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::media::{FrameCursor, FrameRgba, TimedFrame};

/// Frames within this many seconds of the requested time count as "at" it.
const PTS_EPSILON_SEC: f64 = 1e-6;

/// Produces output frames in increasing order from the extracted segments.
///
/// A segment's cursor is opened when its placement first becomes visible and dropped once the
/// output has moved past it, so at most the scenes sharing a boundary are decoding at once.
/// Each segment is sampled at its native rate by timestamp, holding the last decoded frame, and
/// scaled to the canvas.
pub struct FrameAssembler<'a> {
    timeline: &'a Timeline,
    segments: &'a [SceneSegment],
    format: OutputFormat,
    readers: Vec<Option<SegmentReader>>,
    last: Option<FrameIndex>,
}

impl<'a> FrameAssembler<'a> {
    pub fn new(
        timeline: &'a Timeline,
        segments: &'a [SceneSegment],
        format: OutputFormat,
    ) -> MontageResult<Self> {
        if timeline.placements().len() != segments.len() {
            return Err(MontageError::render(format!(
                "timeline has {} placements but {} segments were extracted",
                timeline.placements().len(),
                segments.len()
            )));
        }
        Ok(Self {
            timeline,
            segments,
            format,
            readers: (0..segments.len()).map(|_| None).collect(),
            last: None,
        })
    }

    pub fn frame_count(&self) -> u64 {
        self.format.frame_count(self.timeline.duration_sec())
    }

    /// Compose output frame `idx`. Indices must strictly increase between calls.
    pub fn frame_at(&mut self, idx: FrameIndex) -> MontageResult<FrameRgba> {
        if let Some(last) = self.last
            && idx <= last
        {
            return Err(MontageError::render(
                "frames must be assembled in increasing order",
            ));
        }
        self.last = Some(idx);
        let t = self.format.fps.frames_to_secs(idx.0);

        let timeline = self.timeline;
        let mut active = Vec::with_capacity(2);
        for (i, p) in timeline.placements().iter().enumerate() {
            if t >= p.end_sec() {
                if self.readers[i].take().is_some() {
                    tracing::trace!(scene_id = p.scene_id, "segment cursor closed");
                }
                continue;
            }
            if !p.contains(t) {
                continue;
            }
            if self.readers[i].is_none() {
                let cursor = self.segments[i].open_frames()?;
                tracing::trace!(scene_id = p.scene_id, at = t, "segment cursor opened");
                self.readers[i] = Some(SegmentReader::new(cursor, self.format.canvas));
            }
            if let Some(reader) = self.readers[i].as_mut() {
                reader.advance_to(t - p.start_sec)?;
            }
            active.push((i, p.gain_at(t) as f32));
        }

        let layers: Vec<(&[u8], f32)> = active
            .iter()
            .filter_map(|&(i, gain)| {
                let frame = self.readers[i].as_ref()?.current()?;
                Some((frame.data.as_slice(), gain))
            })
            .collect();

        let canvas = self.format.canvas;
        let mut out = FrameRgba {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba_len()],
        };
        blend_weighted(&mut out.data, &layers)?;
        Ok(out)
    }
}

struct SegmentReader {
    cursor: Box<dyn FrameCursor>,
    canvas: Canvas,
    lookahead: Option<TimedFrame>,
    current: Option<FrameRgba>,
    current_scaled: bool,
    exhausted: bool,
}

impl SegmentReader {
    fn new(cursor: Box<dyn FrameCursor>, canvas: Canvas) -> Self {
        Self {
            cursor,
            canvas,
            lookahead: None,
            current: None,
            current_scaled: false,
            exhausted: false,
        }
    }

    /// Advance to the last frame presented at or before `local` seconds into the segment.
    fn advance_to(&mut self, local: f64) -> MontageResult<()> {
        loop {
            if self.lookahead.is_none() && !self.exhausted {
                self.lookahead = self.cursor.next_frame()?;
                self.exhausted = self.lookahead.is_none();
            }
            let due = match &self.lookahead {
                Some(f) => f.pts_sec <= local + PTS_EPSILON_SEC || self.current.is_none(),
                None => false,
            };
            if !due {
                break;
            }
            if let Some(f) = self.lookahead.take() {
                self.current = Some(f.frame);
                self.current_scaled = false;
            }
        }

        if !self.current_scaled
            && let Some(frame) = self.current.as_mut()
        {
            if frame.width != self.canvas.width || frame.height != self.canvas.height {
                *frame = resize_rgba(frame, self.canvas.width, self.canvas.height, FilterType::Triangle)?;
            }
            self.current_scaled = true;
        }
        Ok(())
    }

    fn current(&self) -> Option<&FrameRgba> {
        self.current.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/video.rs"]
mod tests;
