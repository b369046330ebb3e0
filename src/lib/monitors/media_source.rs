//! Monitor for a local capture source.

use crate::records::MediaSourceStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct MediaSourceMonitor {
    pub stats: MediaSourceStats,
    visited: bool,
}

impl MediaSourceMonitor {
    pub fn new(stats: MediaSourceStats) -> Self {
        Self {
            stats,
            visited: false,
        }
    }

    pub fn accept(&mut self, next: MediaSourceStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.stats = next;
    }

    pub fn create_sample(&self) -> MediaSourceStats {
        self.stats.clone()
    }

    /// A muted source legitimately produces nothing to send.
    pub fn is_muted(&self) -> bool {
        self.stats.muted == Some(true)
    }
}

impl_tracked!(MediaSourceMonitor);
