//! Headless streaming session driver.
//!
//! Stands in for the real session wiring: a producer thread plays the part
//! of the hardware decoder, cycling frames through a small fixed buffer
//! pool into the hand-off queue, while the main thread drains the queue
//! through the render pipeline. Demonstrates the required shutdown order:
//! stop the producer, drain the queue, flush the GPU, tear down the cache.

use anyhow::{Context, Result};
use playcast_core::{BufferId, ColorRange, ColorSpace, DecodedFrame, SharedFrame, StreamSettings};
use playcast_queue::FrameQueue;
use playcast_render::{GpuContext, RenderPipeline, WgpuBackend};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_WIDTH: u32 = 1280;
const FRAME_HEIGHT: u32 = 720;
const SCREEN_WIDTH: u32 = 1920;
const SCREEN_HEIGHT: u32 = 1080;
const POOL_SLOTS: u64 = 3;
const SESSION_FRAMES: u64 = 300;

fn load_settings() -> Result<StreamSettings> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading settings from {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing settings from {path}"))
        }
        None => Ok(StreamSettings::default()),
    }
}

/// Synthetic decoder output: a gray frame in one of the pool's slots.
fn decode_frame(pool: &[Arc<[u8]>], n: u64) -> SharedFrame {
    let slot = n % POOL_SLOTS;
    Arc::new(DecodedFrame {
        width: FRAME_WIDTH,
        height: FRAME_HEIGHT,
        color_space: ColorSpace::Bt709,
        color_range: ColorRange::Limited,
        buffer: BufferId(slot),
        chroma_offset: (FRAME_WIDTH * FRAME_HEIGHT) as usize,
        data: Arc::clone(&pool[slot as usize]),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    info!(?settings, "starting session");

    let ctx = GpuContext::new_blocking().context("acquiring GPU context")?;
    info!("adapter: {:?}", ctx.adapter_info());
    let mut pipeline = RenderPipeline::new(WgpuBackend::new(ctx))
        .with_stats_log_interval(Duration::from_secs(settings.stats_log_interval_secs));

    let queue = Arc::new(FrameQueue::new(settings.frame_queue_capacity));

    // Decoder stand-in: a fixed pool of physical buffers, reused round-robin.
    let pool: Vec<Arc<[u8]>> = (0..POOL_SLOTS)
        .map(|_| Arc::from(vec![128u8; DecodedFrame::nv12_size(FRAME_WIDTH, FRAME_HEIGHT)]))
        .collect();

    let producer = {
        let queue = Arc::clone(&queue);
        std::thread::spawn(move || {
            for n in 0..SESSION_FRAMES {
                queue.push(decode_frame(&pool, n));
                // Decode cadence: ~60 fps
                std::thread::sleep(Duration::from_millis(16));
            }
        })
    };

    let mut delivered = 0u64;
    while delivered < SESSION_FRAMES {
        // Display cadence, independent of decode cadence
        std::thread::sleep(Duration::from_millis(16));
        let Some(frame) = queue.pop() else {
            continue;
        };
        delivered += 1;
        pipeline.draw_frame(SCREEN_WIDTH, SCREEN_HEIGHT, &frame)?;
    }

    // Shutdown order matters: producer first, then drain, then GPU teardown.
    producer.join().ok();
    queue.clear();
    pipeline.teardown()?;

    let render = pipeline.stats();
    let queue_stats = queue.stats();
    info!(
        fps = render.fps,
        average_render_time_ms = render.average_render_time_ms,
        rendered_frames = render.rendered_frames,
        dropped = queue_stats.dropped,
        repeated = queue_stats.repeated,
        "session finished"
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "render": render,
            "queue": queue_stats,
        }))?
    );

    Ok(())
}
