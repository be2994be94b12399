//! Playcast Render - GPU presentation of decoded frames
//!
//! The pipeline builds GPU resources once per physical decoder buffer and
//! replays a prerecorded draw for every frame that reuses that buffer.

pub mod backend;
pub mod cache;
pub mod context;
pub mod pipeline;
pub mod wgpu_backend;

pub use backend::{GpuBackend, StreamParams};
pub use cache::BufferResourceCache;
pub use context::GpuContext;
pub use pipeline::RenderPipeline;
pub use wgpu_backend::WgpuBackend;
