//! The seam between the backend-agnostic pipeline and a concrete graphics
//! API. One implementation is selected at startup; the rest of the renderer
//! never branches on the backend.

use playcast_core::{ColorTransform, DecodedFrame, Result};

/// Stream-wide parameters locked in from the first observed frame.
#[derive(Debug, Clone, Copy)]
pub struct StreamParams {
    pub frame_width: u32,
    pub frame_height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub transform: ColorTransform,
}

/// Concrete graphics backend.
///
/// `MemoryView` is a decoder buffer imported as GPU-visible plane images;
/// `CommandList` is a finished, replayable draw recorded against one such
/// view. Both are owned by the resource cache and dropped only at teardown,
/// after `flush` has brought the GPU queue to idle.
pub trait GpuBackend {
    type MemoryView;
    type CommandList;

    /// One-time setup: shaders, static quad, color uniform, render target.
    fn begin_stream(&mut self, params: &StreamParams) -> Result<()>;

    /// Import the physical buffer backing `frame` as luma/chroma plane
    /// images (R8 `w×h` and RG8 `w/2×h/2` at the frame's chroma offset).
    fn import_buffer(&mut self, frame: &DecodedFrame) -> Result<Self::MemoryView>;

    /// Record the fixed draw sequence for an imported buffer: bind shaders,
    /// both plane textures, the color uniform, the static quad, one draw.
    fn record_draw(&mut self, view: &Self::MemoryView, frame: &DecodedFrame)
        -> Result<Self::CommandList>;

    /// Refresh the imported view with the frame's current plane contents.
    /// A no-op for backends that alias decoder memory directly; a plane
    /// copy for backends that cannot.
    fn upload(&mut self, view: &Self::MemoryView, frame: &DecodedFrame) -> Result<()>;

    /// Submit a recorded command list to the GPU queue.
    fn submit(&mut self, list: &Self::CommandList) -> Result<()>;

    /// Block until the GPU queue is idle.
    fn flush(&mut self) -> Result<()>;
}
