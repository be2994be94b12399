//! Decoded frame handles.
//!
//! The hardware decoder owns frame memory and cycles through a small fixed
//! pool of physical buffers. A frame handle carries metadata plus a reference
//! to the pooled buffer it occupies; the rest of the client never copies
//! pixel data.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Stable identity of the physical buffer slot a frame occupies.
///
/// Frames sharing a `BufferId` share the same backing memory, dimensions,
/// and plane layout for as long as the decoder reuses that slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BufferId(pub u64);

/// YUV color space signalled by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// BT.601 (SD video)
    #[default]
    Bt601,
    /// BT.709 (HD video)
    Bt709,
    /// BT.2020 (UHD/HDR video)
    Bt2020,
}

/// Quantization range of the YUV samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorRange {
    /// Limited range (16-235 luma)
    #[default]
    Limited,
    /// Full range (0-255)
    Full,
}

/// A decoded video frame in NV12 layout.
///
/// The luma plane starts at byte 0 of `data`; the interleaved chroma plane
/// starts at `chroma_offset`. Chroma is subsampled 4:2:0, so it covers
/// `width/2 × height/2` texels at two bytes each.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Signalled color space
    pub color_space: ColorSpace,
    /// Signalled quantization range
    pub color_range: ColorRange,
    /// Identity of the physical buffer slot backing this frame
    pub buffer: BufferId,
    /// Byte offset of the chroma plane from the luma base
    pub chroma_offset: usize,
    /// Pooled buffer memory, shared by every frame in the same slot
    pub data: Arc<[u8]>,
}

impl DecodedFrame {
    /// Bytes needed for an NV12 frame of the given dimensions.
    pub fn nv12_size(width: u32, height: u32) -> usize {
        let luma = width as usize * height as usize;
        luma + luma / 2
    }

    /// The luma plane (`width × height`, one byte per texel).
    #[inline]
    pub fn luma_plane(&self) -> &[u8] {
        let len = self.width as usize * self.height as usize;
        &self.data[..len.min(self.data.len())]
    }

    /// The interleaved chroma plane (`width/2 × height/2`, two bytes per texel).
    #[inline]
    pub fn chroma_plane(&self) -> &[u8] {
        let start = self.chroma_offset.min(self.data.len());
        let len = self.width as usize * self.height as usize / 2;
        let end = (start + len).min(self.data.len());
        &self.data[start..end]
    }

    /// Whether the handle describes a drawable frame.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() >= Self::nv12_size(self.width, self.height)
    }
}

/// Arc-wrapped frame handle for shared ownership between the decode and
/// render threads.
pub type SharedFrame = Arc<DecodedFrame>;
