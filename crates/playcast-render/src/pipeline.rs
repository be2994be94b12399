//! Per-frame render orchestration.
//!
//! The pipeline is driven from the render thread only: pop a frame from the
//! hand-off queue, look up (or build) the GPU resources for its buffer,
//! submit the prerecorded draw, and keep rolling statistics.

use crate::backend::{GpuBackend, StreamParams};
use crate::cache::BufferResourceCache;
use playcast_core::{ColorTransform, DecodedFrame, RenderStats, RenderStatsSnapshot, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Orchestrates lazy setup, resource caching, submission, and statistics.
///
/// Configuration (frame/screen dimensions, color transform) is locked in
/// from the first drawable frame and immutable for the stream's lifetime; a
/// mid-stream resolution change requires a new pipeline.
pub struct RenderPipeline<B: GpuBackend> {
    backend: B,
    cache: BufferResourceCache<B>,
    stream: Option<StreamParams>,
    stats: RenderStats,
    stats_log_interval: Duration,
}

impl<B: GpuBackend> RenderPipeline<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            cache: BufferResourceCache::new(),
            stream: None,
            stats: RenderStats::new(),
            stats_log_interval: Duration::from_secs(5),
        }
    }

    /// Override the periodic FPS log interval.
    pub fn with_stats_log_interval(mut self, interval: Duration) -> Self {
        self.stats_log_interval = interval;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.stream.is_some()
    }

    /// Render one frame to the screen-sized target.
    ///
    /// Invalid input (zero-dimension frame or screen) is a transient defect:
    /// logged and skipped without touching pipeline state. GPU failures
    /// surface as errors so the caller can abort the stream.
    pub fn draw_frame(
        &mut self,
        screen_width: u32,
        screen_height: u32,
        frame: &DecodedFrame,
    ) -> Result<()> {
        if screen_width == 0 || screen_height == 0 || !frame.is_valid() {
            warn!(
                screen_width,
                screen_height,
                frame_width = frame.width,
                frame_height = frame.height,
                "skipping invalid frame"
            );
            return Ok(());
        }

        if self.stream.is_none() {
            let transform = ColorTransform::compute(
                frame.color_space,
                frame.color_range,
                frame.width,
                frame.height,
                screen_width,
                screen_height,
            );
            let params = StreamParams {
                frame_width: frame.width,
                frame_height: frame.height,
                screen_width,
                screen_height,
                transform,
            };
            info!(
                frame_width = frame.width,
                frame_height = frame.height,
                screen_width,
                screen_height,
                color_space = ?frame.color_space,
                color_range = ?frame.color_range,
                "initializing render pipeline"
            );
            self.backend.begin_stream(&params)?;
            self.stream = Some(params);
        }

        let entry = self.cache.get_or_build(&mut self.backend, frame)?;
        self.backend.upload(&entry.memory, frame)?;

        let started = Instant::now();
        self.backend.submit(&entry.list)?;
        self.backend.flush()?;
        self.stats.record_frame(started);

        if let Some(fps) = self.stats.interval_fps(self.stats_log_interval) {
            debug!(fps, "render interval");
        }

        Ok(())
    }

    /// Rolling statistics snapshot for the caller's overlay.
    pub fn stats(&self) -> RenderStatsSnapshot {
        self.stats.snapshot()
    }

    /// The per-buffer resource cache (for diagnostics).
    pub fn cache(&self) -> &BufferResourceCache<B> {
        &self.cache
    }

    /// The concrete backend (for diagnostics).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Flush the GPU queue to idle, then release every cached resource.
    ///
    /// Must run after the producer has stopped and the hand-off queue has
    /// been drained; destroying cached memory referenced by in-flight
    /// commands is not recoverable.
    pub fn teardown(&mut self) -> Result<()> {
        self.backend.flush()?;
        self.cache.teardown();
        self.stream = None;
        info!(
            rendered_frames = self.stats.rendered_frames(),
            "render pipeline torn down"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playcast_core::{BufferId, ColorRange, ColorSpace};

    /// Records backend calls so ordering and caching can be asserted
    /// without a GPU.
    #[derive(Default)]
    struct RecordingBackend {
        begins: usize,
        imports: usize,
        records: usize,
        uploads: usize,
        submits: usize,
        flushes: usize,
        last_params: Option<StreamParams>,
    }

    impl GpuBackend for RecordingBackend {
        type MemoryView = BufferId;
        type CommandList = BufferId;

        fn begin_stream(&mut self, params: &StreamParams) -> Result<()> {
            self.begins += 1;
            self.last_params = Some(*params);
            Ok(())
        }

        fn import_buffer(&mut self, frame: &DecodedFrame) -> Result<Self::MemoryView> {
            self.imports += 1;
            Ok(frame.buffer)
        }

        fn record_draw(
            &mut self,
            view: &Self::MemoryView,
            _frame: &DecodedFrame,
        ) -> Result<Self::CommandList> {
            self.records += 1;
            Ok(*view)
        }

        fn upload(&mut self, _view: &Self::MemoryView, _frame: &DecodedFrame) -> Result<()> {
            self.uploads += 1;
            Ok(())
        }

        fn submit(&mut self, _list: &Self::CommandList) -> Result<()> {
            self.submits += 1;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    fn frame(buffer: u64, width: u32, height: u32) -> DecodedFrame {
        DecodedFrame {
            width,
            height,
            color_space: ColorSpace::Bt709,
            color_range: ColorRange::Limited,
            buffer: BufferId(buffer),
            chroma_offset: (width * height) as usize,
            data: vec![0u8; DecodedFrame::nv12_size(width, height)].into(),
        }
    }

    #[test]
    fn test_first_frame_initializes_once() {
        let mut pipeline = RenderPipeline::new(RecordingBackend::default());
        assert!(!pipeline.is_initialized());

        pipeline.draw_frame(1920, 1080, &frame(1, 1280, 720)).unwrap();
        assert!(pipeline.is_initialized());

        // Later frames, even with a different screen size, do not re-init
        pipeline.draw_frame(800, 600, &frame(2, 1280, 720)).unwrap();
        assert_eq!(pipeline.backend.begins, 1);
        let params = pipeline.backend.last_params.unwrap();
        assert_eq!(params.screen_width, 1920);
    }

    #[test]
    fn test_invalid_frame_skipped_without_state_change() {
        let mut pipeline = RenderPipeline::new(RecordingBackend::default());
        pipeline.draw_frame(1920, 1080, &frame(1, 0, 0)).unwrap();
        assert!(!pipeline.is_initialized());
        assert_eq!(pipeline.stats().rendered_frames, 0);

        pipeline.draw_frame(0, 0, &frame(1, 1280, 720)).unwrap();
        assert!(!pipeline.is_initialized());
    }

    #[test]
    fn test_buffer_pool_builds_then_reuses() {
        let mut pipeline = RenderPipeline::new(RecordingBackend::default());
        // Decoder cycles a 3-slot pool for 9 frames
        for n in 0..9u64 {
            pipeline.draw_frame(1920, 1080, &frame(n % 3, 1280, 720)).unwrap();
        }
        assert_eq!(pipeline.backend.imports, 3);
        assert_eq!(pipeline.backend.records, 3);
        assert_eq!(pipeline.backend.submits, 9);
        assert_eq!(pipeline.backend.uploads, 9);
        assert_eq!(pipeline.cache().builds(), 3);
        assert_eq!(pipeline.cache().hits(), 6);
    }

    #[test]
    fn test_stats_accumulate_per_rendered_frame() {
        let mut pipeline = RenderPipeline::new(RecordingBackend::default());
        for n in 0..4u64 {
            pipeline.draw_frame(1920, 1080, &frame(n % 2, 1280, 720)).unwrap();
        }
        let snap = pipeline.stats();
        assert_eq!(snap.rendered_frames, 4);
        assert!(snap.fps >= 0.0);
        assert!(snap.average_render_time_ms >= 0.0);
    }

    #[test]
    fn test_teardown_flushes_before_release() {
        let mut pipeline = RenderPipeline::new(RecordingBackend::default());
        pipeline.draw_frame(1920, 1080, &frame(1, 1280, 720)).unwrap();
        let flushes_before = pipeline.backend.flushes;
        pipeline.teardown().unwrap();
        assert_eq!(pipeline.backend.flushes, flushes_before + 1);
        assert!(pipeline.cache().is_empty());
        assert!(!pipeline.is_initialized());
    }
}
