//! Bounded frame hand-off between the decode and render threads.
//!
//! The decoder pushes at decode cadence, the renderer pops at display
//! cadence, and neither side ever blocks. Overflow discards the oldest
//! pending frame (stale frames are worse than skipped ones for a live
//! stream); underrun re-delivers the last frame shown so the display never
//! stalls. Both events are counted so decoder stutter and renderer stutter
//! can be diagnosed separately.

use parking_lot::Mutex;
use playcast_core::{QueueStats, SharedFrame};
use std::collections::VecDeque;
use tracing::debug;

struct QueueState {
    pending: VecDeque<SharedFrame>,
    last_delivered: Option<SharedFrame>,
    dropped: u64,
    repeated: u64,
}

/// Thread-safe bounded mailbox of decoded frames.
///
/// Capacity is fixed at stream start. A capacity of zero disables buffering
/// entirely: every push is counted as dropped.
pub struct FrameQueue {
    capacity: usize,
    state: Mutex<QueueState>,
}

impl FrameQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState {
                pending: VecDeque::with_capacity(capacity),
                last_delivered: None,
                dropped: 0,
                repeated: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a frame. Never blocks and never fails; if the queue is full
    /// the oldest pending frame is evicted and counted as dropped.
    pub fn push(&self, frame: SharedFrame) {
        let mut state = self.state.lock();

        if self.capacity == 0 {
            state.dropped += 1;
            debug!(buffer = frame.buffer.0, "unbuffered queue, dropping frame");
            return;
        }

        if state.pending.len() == self.capacity {
            state.pending.pop_front();
            state.dropped += 1;
            debug!(
                dropped = state.dropped,
                "queue full, evicting oldest pending frame"
            );
        }
        state.pending.push_back(frame);
    }

    /// Take the oldest pending frame. If none is pending, re-deliver the
    /// last frame handed out (counted as repeated); `None` only before the
    /// first ever delivery.
    pub fn pop(&self) -> Option<SharedFrame> {
        let mut state = self.state.lock();

        if let Some(frame) = state.pending.pop_front() {
            state.last_delivered = Some(frame.clone());
            return Some(frame);
        }

        if let Some(last) = state.last_delivered.clone() {
            state.repeated += 1;
            return Some(last);
        }

        None
    }

    /// Number of frames currently pending.
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().pending.is_empty()
    }

    /// Snapshot of the diagnostics counters.
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock();
        QueueStats {
            pending: state.pending.len(),
            dropped: state.dropped,
            repeated: state.repeated,
        }
    }

    /// Release every pending frame reference and the last-delivered slot.
    /// Used at stream teardown, after the producer has stopped.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.pending.clear();
        state.last_delivered = None;
    }
}
