//! Monitor for one local or remote ICE candidate.

use crate::records::IceCandidateStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct IceCandidateMonitor {
    pub stats: IceCandidateStats,
    visited: bool,
}

impl IceCandidateMonitor {
    pub fn new(stats: IceCandidateStats) -> Self {
        Self {
            stats,
            visited: false,
        }
    }

    pub fn accept(&mut self, next: IceCandidateStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.stats = next;
    }

    pub fn create_sample(&self) -> IceCandidateStats {
        self.stats.clone()
    }

    /// Relayed candidates mean the connection goes through a TURN server.
    pub fn is_relay(&self) -> bool {
        self.stats.candidate_type.as_deref() == Some("relay")
    }

    pub fn is_tcp(&self) -> bool {
        self.stats
            .protocol
            .as_deref()
            .is_some_and(|protocol| protocol.eq_ignore_ascii_case("tcp"))
    }
}

impl_tracked!(IceCandidateMonitor);
