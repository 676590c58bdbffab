use serde::Serialize;

use crate::config::OutputConfig;
use crate::effects::transitions::SceneRamps;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::math::ramp;
use crate::media::MediaInfo;
use crate::script::validate::ValidatedScript;

/// Reported position of one scene in the output, in seconds.
///
/// Adjacent entries abut: a crossfade overlap is split at its midpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenePlacement {
    pub scene_id: i64,
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Where one scene's segment actually plays, including any overlap with its neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scene_id: i64,
    /// Output time of the segment's first source instant.
    pub start_sec: f64,
    pub duration_sec: f64,
    pub ramps: SceneRamps,
}

impl Placement {
    pub fn end_sec(&self) -> f64 {
        self.start_sec + self.duration_sec
    }

    /// `true` for output times in `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_sec && t < self.end_sec()
    }

    /// Envelope gain at `local` seconds into the segment.
    pub fn gain_local(&self, local: f64) -> f64 {
        if local < 0.0 || local >= self.duration_sec {
            return 0.0;
        }
        ramp(local, self.ramps.lead_sec) * ramp(self.duration_sec - local, self.ramps.tail_sec)
    }

    /// Envelope gain at output time `t`; zero outside the placement.
    pub fn gain_at(&self, t: f64) -> f64 {
        self.gain_local(t - self.start_sec)
    }
}

/// Scene layout on the output timeline.
///
/// Scene `i + 1` starts `overlap_i` seconds before scene `i` ends, so the total length is the sum
/// of scene durations minus every crossfade overlap. Order is the script's order.
#[derive(Clone, Debug, PartialEq)]
pub struct Timeline {
    placements: Vec<Placement>,
    reported: Vec<ScenePlacement>,
    duration_sec: f64,
}

impl Timeline {
    pub fn build(script: &ValidatedScript) -> Self {
        let plan = &script.boundaries;
        let mut placements = Vec::with_capacity(script.scenes.len());
        let mut reported = Vec::with_capacity(script.scenes.len());
        let mut cursor = 0.0f64;

        for (i, scene) in script.scenes.iter().enumerate() {
            let p = Placement {
                scene_id: scene.scene_id,
                start_sec: cursor,
                duration_sec: scene.duration(),
                ramps: plan.ramps.get(i).copied().unwrap_or_default(),
            };
            let before = if i == 0 { 0.0 } else { plan.overlap_after(i - 1) };
            let after = plan.overlap_after(i);
            reported.push(ScenePlacement {
                scene_id: scene.scene_id,
                start_sec: p.start_sec + before / 2.0,
                end_sec: p.end_sec() - after / 2.0,
            });
            cursor = p.end_sec() - after;
            placements.push(p);
        }

        let duration_sec = placements.last().map(Placement::end_sec).unwrap_or(0.0);
        Self {
            placements,
            reported,
            duration_sec,
        }
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn scene_placements(&self) -> &[ScenePlacement] {
        &self.reported
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    /// Placements audible/visible at `t` with their envelope gain, in scene order.
    pub fn active_at(&self, t: f64) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.contains(t))
            .map(move |(i, p)| (i, p.gain_at(t)))
    }
}

/// Output frame rate and canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OutputFormat {
    pub fps: Fps,
    pub canvas: Canvas,
}

impl OutputFormat {
    /// Configured values, falling back to the first scene's source. The canvas is made even.
    pub fn resolve(cfg: &OutputConfig, first_source: &MediaInfo) -> Self {
        let canvas = cfg.canvas.unwrap_or(Canvas {
            width: first_source.width,
            height: first_source.height,
        });
        Self {
            fps: cfg.fps.unwrap_or(first_source.fps),
            canvas: canvas.even(),
        }
    }

    /// Frames needed to cover `duration_sec`, never fewer than one.
    pub fn frame_count(&self, duration_sec: f64) -> u64 {
        self.fps.secs_to_frames_round(duration_sec).max(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/timeline.rs"]
mod tests;
