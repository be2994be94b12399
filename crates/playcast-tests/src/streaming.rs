//! End-to-end tests for the decode→display hand-off.
//!
//! Exercises CPU-side logic only — no actual GPU required. A recording
//! mock backend stands in for the graphics API so resource builds and
//! submissions can be counted.

use playcast_core::{
    BufferId, ColorRange, ColorSpace, DecodedFrame, Result, SharedFrame, StreamSettings,
};
use playcast_queue::FrameQueue;
use playcast_render::{GpuBackend, RenderPipeline, StreamParams};
use std::sync::Arc;

/// Mock graphics backend that records every call.
#[derive(Default)]
struct MockBackend {
    begins: usize,
    imports: Vec<BufferId>,
    submits: Vec<BufferId>,
    flushes: usize,
}

impl GpuBackend for MockBackend {
    type MemoryView = BufferId;
    type CommandList = BufferId;

    fn begin_stream(&mut self, _params: &StreamParams) -> Result<()> {
        self.begins += 1;
        Ok(())
    }

    fn import_buffer(&mut self, frame: &DecodedFrame) -> Result<Self::MemoryView> {
        self.imports.push(frame.buffer);
        Ok(frame.buffer)
    }

    fn record_draw(
        &mut self,
        view: &Self::MemoryView,
        _frame: &DecodedFrame,
    ) -> Result<Self::CommandList> {
        Ok(*view)
    }

    fn upload(&mut self, _view: &Self::MemoryView, _frame: &DecodedFrame) -> Result<()> {
        Ok(())
    }

    fn submit(&mut self, list: &Self::CommandList) -> Result<()> {
        self.submits.push(*list);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

fn frame(buffer: u64) -> SharedFrame {
    Arc::new(DecodedFrame {
        width: 1280,
        height: 720,
        color_space: ColorSpace::Bt709,
        color_range: ColorRange::Limited,
        buffer: BufferId(buffer),
        chroma_offset: (1280 * 720) as usize,
        data: vec![0u8; DecodedFrame::nv12_size(1280, 720)].into(),
    })
}

#[test]
fn configured_queue_drops_then_repeats_in_order() {
    let settings = StreamSettings {
        frame_queue_capacity: 3,
        ..Default::default()
    };
    let queue = FrameQueue::new(settings.frame_queue_capacity);

    for id in 1..=5 {
        queue.push(frame(id));
    }
    assert_eq!(queue.stats().dropped, 2);
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.pop().unwrap().buffer, BufferId(3));
    assert_eq!(queue.pop().unwrap().buffer, BufferId(4));
    assert_eq!(queue.pop().unwrap().buffer, BufferId(5));

    let repeated = queue.pop().unwrap();
    assert_eq!(repeated.buffer, BufferId(5));
    assert_eq!(queue.stats().repeated, 1);
}

#[test]
fn queue_feeds_pipeline_with_buffer_pool_reuse() {
    let queue = FrameQueue::new(3);
    let mut pipeline = RenderPipeline::new(MockBackend::default());

    // Decoder pushes 12 frames cycling a 3-slot pool; renderer keeps up
    for n in 0..12u64 {
        queue.push(frame(n % 3));
        let popped = queue.pop().unwrap();
        pipeline.draw_frame(1920, 1080, &popped).unwrap();
    }

    // Three distinct buffer identities → three builds, the rest are hits
    assert_eq!(pipeline.cache().builds(), 3);
    assert_eq!(pipeline.cache().hits(), 9);
    assert_eq!(pipeline.stats().rendered_frames, 12);
    assert_eq!(pipeline.backend().begins, 1);
    assert_eq!(
        pipeline.backend().imports,
        vec![BufferId(0), BufferId(1), BufferId(2)]
    );
    assert_eq!(pipeline.backend().submits.len(), 12);
}

#[test]
fn underrun_repeats_frames_and_still_renders() {
    let queue = FrameQueue::new(3);
    let mut pipeline = RenderPipeline::new(MockBackend::default());

    queue.push(frame(1));
    let first = queue.pop().unwrap();
    pipeline.draw_frame(1920, 1080, &first).unwrap();

    // Decoder stalls; display keeps drawing the repeated frame
    for _ in 0..4 {
        let repeated = queue.pop().unwrap();
        pipeline.draw_frame(1920, 1080, &repeated).unwrap();
    }

    assert_eq!(queue.stats().repeated, 4);
    assert_eq!(pipeline.stats().rendered_frames, 5);
    // Repeats reuse the same buffer, so only one resource build happened
    assert_eq!(pipeline.cache().builds(), 1);
}

#[test]
fn shutdown_order_flushes_before_cache_release() {
    let queue = FrameQueue::new(3);
    let mut pipeline = RenderPipeline::new(MockBackend::default());

    for n in 0..3u64 {
        queue.push(frame(n));
    }
    while let Some(f) = (!queue.is_empty()).then(|| queue.pop()).flatten() {
        pipeline.draw_frame(1920, 1080, &f).unwrap();
    }

    queue.clear();
    let flushes_before = pipeline.backend().flushes;
    pipeline.teardown().unwrap();

    assert_eq!(pipeline.backend().flushes, flushes_before + 1);
    assert!(pipeline.cache().is_empty());
    assert!(queue.pop().is_none(), "cleared queue has nothing to repeat");
}

#[test]
fn decode_and_render_threads_share_only_the_queue() {
    let queue = Arc::new(FrameQueue::new(4));
    let mut pipeline = RenderPipeline::new(MockBackend::default());

    let producer = {
        let queue = Arc::clone(&queue);
        std::thread::spawn(move || {
            for n in 0..100u64 {
                queue.push(frame(n % 3));
            }
        })
    };

    let mut rendered = 0;
    while rendered < 50 {
        if let Some(f) = queue.pop() {
            pipeline.draw_frame(1920, 1080, &f).unwrap();
            rendered += 1;
        }
        assert!(queue.len() <= 4);
    }
    producer.join().unwrap();

    assert_eq!(pipeline.stats().rendered_frames, 50);
    assert!(pipeline.cache().builds() <= 3);
}
