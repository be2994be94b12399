//! Rolling statistics for the render pipeline and the frame queue.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Rolling render statistics owned by the pipeline.
///
/// The measurement window opens when the first frame is rendered; FPS and
/// average render time are derived from it on demand.
#[derive(Debug, Default)]
pub struct RenderStats {
    rendered_frames: u64,
    total_render_time: Duration,
    measurement_start: Option<Instant>,
    interval_frames: u64,
    interval_start: Option<Instant>,
}

/// Read-only snapshot of the render statistics, e.g. for an on-screen
/// overlay. All values are zero before the first rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderStatsSnapshot {
    pub rendered_frames: u64,
    pub fps: f32,
    pub average_render_time_ms: f32,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one rendered frame. `started` is the wall-clock time taken
    /// just before submit; the delta to now is the frame's render time.
    pub fn record_frame(&mut self, started: Instant) {
        if self.rendered_frames == 0 {
            self.measurement_start = Some(started);
        }
        if self.interval_start.is_none() {
            self.interval_start = Some(started);
        }
        self.total_render_time += started.elapsed();
        self.rendered_frames += 1;
        self.interval_frames += 1;
    }

    /// FPS over the last reporting interval, if `period` has elapsed since
    /// the interval opened. Resets the interval when it fires.
    pub fn interval_fps(&mut self, period: Duration) -> Option<f32> {
        let start = self.interval_start?;
        let elapsed = start.elapsed();
        if elapsed < period || elapsed.is_zero() {
            return None;
        }
        let fps = self.interval_frames as f32 / elapsed.as_secs_f32();
        self.interval_frames = 0;
        self.interval_start = Some(Instant::now());
        Some(fps)
    }

    pub fn rendered_frames(&self) -> u64 {
        self.rendered_frames
    }

    pub fn snapshot(&self) -> RenderStatsSnapshot {
        let fps = match self.measurement_start {
            Some(start) if self.rendered_frames > 0 => {
                let secs = start.elapsed().as_secs_f32();
                if secs > 0.0 {
                    self.rendered_frames as f32 / secs
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };

        let average_render_time_ms = if self.rendered_frames > 0 {
            self.total_render_time.as_secs_f32() * 1000.0 / self.rendered_frames as f32
        } else {
            0.0
        };

        RenderStatsSnapshot {
            rendered_frames: self.rendered_frames,
            fps,
            average_render_time_ms,
        }
    }
}

/// Snapshot of the frame queue's diagnostics counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QueueStats {
    /// Frames currently waiting for delivery
    pub pending: usize,
    /// Frames discarded on overflow
    pub dropped: u64,
    /// Deliveries that repeated the last-shown frame
    pub repeated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = RenderStats::new();
        let snap = stats.snapshot();
        assert_eq!(snap.rendered_frames, 0);
        assert_eq!(snap.fps, 0.0);
        assert_eq!(snap.average_render_time_ms, 0.0);
    }

    #[test]
    fn test_record_frame_accumulates() {
        let mut stats = RenderStats::new();
        stats.record_frame(Instant::now());
        stats.record_frame(Instant::now());
        let snap = stats.snapshot();
        assert_eq!(snap.rendered_frames, 2);
        assert!(snap.average_render_time_ms >= 0.0);
    }

    #[test]
    fn test_interval_fps_waits_for_period() {
        let mut stats = RenderStats::new();
        stats.record_frame(Instant::now());
        assert!(stats.interval_fps(Duration::from_secs(5)).is_none());
        assert!(stats.interval_fps(Duration::ZERO).is_some());
    }
}
