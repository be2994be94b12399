//! Stream settings consumed from the client configuration layer.

use serde::{Deserialize, Serialize};

/// Settings for one streaming session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Capacity of the decode→render frame queue. Zero means frames are
    /// never buffered: every push is dropped.
    pub frame_queue_capacity: usize,
    /// Seconds between periodic FPS log lines.
    pub stats_log_interval_secs: u64,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            frame_queue_capacity: 3,
            stats_log_interval_secs: 5,
        }
    }
}
