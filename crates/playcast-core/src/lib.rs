//! Playcast Core - Foundation types for the streaming client
//!
//! This crate provides the fundamental types shared by the decoder hand-off
//! and the video renderer:
//! - Decoded frame handles and buffer identity
//! - YUV→RGB color transform computation
//! - Render and queue statistics
//! - Stream settings

pub mod error;
pub mod frame;
pub mod settings;
pub mod stats;
pub mod transform;

pub use error::{PlaycastError, Result};
pub use frame::{BufferId, ColorRange, ColorSpace, DecodedFrame, SharedFrame};
pub use settings::StreamSettings;
pub use stats::{QueueStats, RenderStats, RenderStatsSnapshot};
pub use transform::ColorTransform;
