//! Monitor for whole-connection counters.

use crate::records::PeerConnectionStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct PeerConnectionMonitor {
    pub stats: PeerConnectionStats,
    visited: bool,
}

impl PeerConnectionMonitor {
    pub fn new(stats: PeerConnectionStats) -> Self {
        Self {
            stats,
            visited: false,
        }
    }

    pub fn accept(&mut self, next: PeerConnectionStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.stats = next;
    }

    pub fn create_sample(&self) -> PeerConnectionStats {
        self.stats.clone()
    }
}

impl_tracked!(PeerConnectionMonitor);
