//! Monitor for a negotiated codec. Static once reported.

use crate::records::CodecStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct CodecMonitor {
    pub stats: CodecStats,
    visited: bool,
}

impl CodecMonitor {
    pub fn new(stats: CodecStats) -> Self {
        Self {
            stats,
            visited: false,
        }
    }

    pub fn accept(&mut self, next: CodecStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.stats = next;
    }

    pub fn create_sample(&self) -> CodecStats {
        self.stats.clone()
    }
}

impl_tracked!(CodecMonitor);
