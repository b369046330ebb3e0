//! Monitor for the audio playout path.

use crate::records::MediaPlayoutStats;

use super::{elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct MediaPlayoutMonitor {
    pub stats: MediaPlayoutStats,
    visited: bool,

    /// Synthesized (concealment) audio produced this interval, in ms.
    pub delta_synthesized_samples_ms: f64,
    /// Total audio played out this interval, in ms.
    pub delta_total_samples_ms: f64,
}

impl MediaPlayoutMonitor {
    pub fn new(stats: MediaPlayoutStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_synthesized_samples_ms: 0.0,
            delta_total_samples_ms: 0.0,
        }
    }

    pub fn accept(&mut self, next: MediaPlayoutStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        let prev = &self.stats;

        self.delta_synthesized_samples_ms = duration_delta_ms(
            prev.synthesized_samples_duration,
            next.synthesized_samples_duration,
        );
        self.delta_total_samples_ms =
            duration_delta_ms(prev.total_samples_duration, next.total_samples_duration);

        self.stats = next;
    }

    pub fn create_sample(&self) -> MediaPlayoutStats {
        self.stats.clone()
    }
}

fn duration_delta_ms(prev: Option<f64>, next: Option<f64>) -> f64 {
    match (prev, next) {
        (Some(prev), Some(next)) => ((next - prev) * 1000.0).max(0.0),
        (None, Some(next)) => next * 1000.0,
        _ => 0.0,
    }
}

impl_tracked!(MediaPlayoutMonitor);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_delta_in_ms() {
        let mut monitor = MediaPlayoutMonitor::new(MediaPlayoutStats {
            id: "AP01".into(),
            timestamp: 0.0,
            synthesized_samples_duration: Some(1.0),
            total_samples_duration: Some(10.0),
            ..Default::default()
        });
        monitor.accept(MediaPlayoutStats {
            id: "AP01".into(),
            timestamp: 1_000.0,
            synthesized_samples_duration: Some(1.4),
            total_samples_duration: Some(11.0),
            ..Default::default()
        });
        assert!((monitor.delta_synthesized_samples_ms - 400.0).abs() < 1e-6);
        assert!((monitor.delta_total_samples_ms - 1_000.0).abs() < 1e-6);
    }
}
