//! Monitor for a DTLS certificate. Static once reported.

use crate::records::CertificateStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct CertificateMonitor {
    pub stats: CertificateStats,
    visited: bool,
}

impl CertificateMonitor {
    pub fn new(stats: CertificateStats) -> Self {
        Self {
            stats,
            visited: false,
        }
    }

    pub fn accept(&mut self, next: CertificateStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        self.stats = next;
    }

    pub fn create_sample(&self) -> CertificateStats {
        self.stats.clone()
    }
}

impl_tracked!(CertificateMonitor);
