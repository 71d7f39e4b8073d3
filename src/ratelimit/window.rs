//! Rate Window Module
//!
//! The fixed-window counter stored per (client, route) key.

use serde::{Deserialize, Serialize};

// == Rate Window ==
/// Requests seen in the window that opened at `first_request_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    /// Admitted requests counted in this window
    pub count: u32,
    /// Unix milliseconds of the request that opened the window
    pub first_request_time: u64,
}

impl RateWindow {
    /// An empty window opening at `now_ms`.
    pub fn open(now_ms: u64) -> Self {
        Self {
            count: 0,
            first_request_time: now_ms,
        }
    }

    /// True once strictly more than `window_ms` has passed since the window
    /// opened. A request landing exactly on the boundary still belongs to the
    /// old window.
    pub fn is_elapsed(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.first_request_time) > window_ms
    }

    /// Applies one request at `now_ms`: restarts the window at a count of 1
    /// if it has elapsed, otherwise increments it.
    pub fn record(self, now_ms: u64, window_ms: u64) -> Self {
        if self.is_elapsed(now_ms, window_ms) {
            Self {
                count: 1,
                first_request_time: now_ms,
            }
        } else {
            Self {
                count: self.count.saturating_add(1),
                ..self
            }
        }
    }

    /// Milliseconds until this window stops admitting the counted requests.
    pub fn resets_in_ms(&self, now_ms: u64, window_ms: u64) -> u64 {
        (self.first_request_time + window_ms).saturating_sub(now_ms)
    }
}
