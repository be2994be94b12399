//! Per-buffer GPU resource cache.
//!
//! The decoder cycles through a small fixed pool of physical buffers, so
//! after the first few frames every buffer identity has already been seen
//! and the per-frame cost degrades from "rebuild GPU state" to a hash
//! lookup.

use crate::backend::GpuBackend;
use playcast_core::{BufferId, DecodedFrame, Result};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Prebuilt GPU objects for one physical buffer slot.
pub struct CacheEntry<B: GpuBackend> {
    pub memory: B::MemoryView,
    pub list: B::CommandList,
    pub width: u32,
    pub height: u32,
}

/// Maps a buffer identity to its imported memory view and recorded command
/// list. Entries are built at most once per identity and destroyed only at
/// teardown; the caller must flush the GPU queue before tearing down, since
/// in-flight commands may still reference cached memory.
pub struct BufferResourceCache<B: GpuBackend> {
    entries: HashMap<BufferId, CacheEntry<B>>,
    builds: u64,
    hits: u64,
    invalidations: u64,
}

impl<B: GpuBackend> Default for BufferResourceCache<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GpuBackend> BufferResourceCache<B> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            builds: 0,
            hits: 0,
            invalidations: 0,
        }
    }

    /// Return the cached entry for the frame's buffer, building it on first
    /// sight. A hit is O(1) with no GPU calls.
    ///
    /// Identity equality alone is not a safe reuse condition: a stream
    /// restart can recycle a buffer address at a new resolution, leaving the
    /// recorded draw pointing at stale image layouts. Entries are therefore
    /// gated on dimensions and rebuilt on mismatch.
    pub fn get_or_build(
        &mut self,
        backend: &mut B,
        frame: &DecodedFrame,
    ) -> Result<&CacheEntry<B>> {
        let stale = self
            .entries
            .get(&frame.buffer)
            .is_some_and(|e| e.width != frame.width || e.height != frame.height);
        if stale {
            warn!(
                buffer = frame.buffer.0,
                width = frame.width,
                height = frame.height,
                "buffer identity reused with new dimensions, rebuilding resources"
            );
            self.entries.remove(&frame.buffer);
            self.invalidations += 1;
        }

        match self.entries.entry(frame.buffer) {
            Entry::Occupied(slot) => {
                self.hits += 1;
                Ok(slot.into_mut())
            }
            Entry::Vacant(slot) => {
                let memory = backend.import_buffer(frame)?;
                let list = backend.record_draw(&memory, frame)?;
                self.builds += 1;
                debug!(
                    buffer = frame.buffer.0,
                    builds = self.builds,
                    "built command list for new buffer"
                );
                Ok(slot.insert(CacheEntry {
                    memory,
                    list,
                    width: frame.width,
                    height: frame.height,
                }))
            }
        }
    }

    /// Number of distinct buffer identities currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Command lists built since stream start.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Lookups served without touching the GPU.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Entries rebuilt because a reused identity changed dimensions.
    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    /// Release every cached memory view and command list. Only call after
    /// the GPU queue has been flushed to idle.
    pub fn teardown(&mut self) {
        debug!(entries = self.entries.len(), "releasing cached buffer resources");
        self.entries.clear();
    }
}
