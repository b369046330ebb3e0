//! Anomaly detectors.
//!
//! An ordered, growable collection of independent detectors, each bound
//! to one entity (or to the connection as a whole). Every cycle the
//! engine runs each detector once; a failing detector is logged and
//! skipped so it cannot poison the others. Detectors are added when
//! their entity first appears and removed when the sweep collects it.

pub mod congestion;
pub mod cpu_limitation;
pub mod dry_inbound_track;
pub mod dry_outbound_track;
pub mod freezed_video_track;
pub mod playout_discrepancy;
pub mod synthesized_samples;

use anyhow::Result;
use enum_dispatch::enum_dispatch;
use tracing::*;

use crate::config::MonitorConfig;
use crate::connection::{ConnectionAggregates, EntityStores};
use crate::events::EventOutbox;

pub use congestion::CongestionDetector;
pub use cpu_limitation::CpuLimitationDetector;
pub use dry_inbound_track::DryInboundTrackDetector;
pub use dry_outbound_track::DryOutboundTrackDetector;
pub use freezed_video_track::FreezedVideoTrackDetector;
pub use playout_discrepancy::PlayoutDiscrepancyDetector;
pub use synthesized_samples::SynthesizedSamplesDetector;

/// Everything one detector may read and emit to during a cycle. Stores
/// and aggregates are the post-sweep state of the current cycle.
pub struct DetectorCycle<'a> {
    pub stores: &'a EntityStores,
    pub aggregates: &'a ConnectionAggregates,
    pub config: &'a MonitorConfig,
    /// Timestamp of the current cycle in ms, derived from the batch.
    pub now_ms: f64,
    pub outbox: &'a mut EventOutbox,
}

#[enum_dispatch]
pub trait Detector {
    /// Stable name for logs and configuration mapping.
    fn name(&self) -> &'static str;

    /// Primary key of the entity this detector is bound to.
    fn entity_id(&self) -> &str;

    /// Run one evaluation step.
    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()>;
}

#[enum_dispatch(Detector)]
#[derive(Debug)]
pub enum AnyDetector {
    DryInboundTrack(DryInboundTrackDetector),
    DryOutboundTrack(DryOutboundTrackDetector),
    FreezedVideoTrack(FreezedVideoTrackDetector),
    PlayoutDiscrepancy(PlayoutDiscrepancyDetector),
    SynthesizedSamples(SynthesizedSamplesDetector),
    Congestion(CongestionDetector),
    CpuLimitation(CpuLimitationDetector),
}

/// Ordered detector collection with per-detector failure isolation.
#[derive(Debug, Default)]
pub struct DetectorEngine {
    detectors: Vec<AnyDetector>,
}

impl DetectorEngine {
    pub fn add(&mut self, detector: AnyDetector) {
        self.detectors.push(detector);
    }

    pub fn has(&self, name: &str, entity_id: &str) -> bool {
        self.detectors
            .iter()
            .any(|detector| detector.name() == name && detector.entity_id() == entity_id)
    }

    /// Drop every detector bound to the given entity.
    pub fn remove_entity(&mut self, entity_id: &str) {
        self.detectors
            .retain(|detector| detector.entity_id() != entity_id);
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector once. A failure is logged with the detector's
    /// identity and never stops the loop.
    pub fn update(&mut self, cycle: &mut DetectorCycle<'_>) {
        for detector in &mut self.detectors {
            if let Err(error) = detector.update(cycle) {
                warn!(
                    detector = detector.name(),
                    entity = detector.entity_id(),
                    ?error,
                    "Detector update failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::events::EventOutbox;

    #[test]
    fn test_engine_isolates_failures() {
        // A detector bound to a missing entity must not fail; make sure
        // the engine runs all detectors even when stores are empty.
        let stores = EntityStores::new();
        let aggregates = ConnectionAggregates::default();
        let config = MonitorConfig::default();
        let mut outbox = EventOutbox::default();

        let mut engine = DetectorEngine::default();
        engine.add(AnyDetector::from(FreezedVideoTrackDetector::new(
            "missing".to_owned(),
        )));
        engine.add(AnyDetector::from(CongestionDetector::new(
            "connection".to_owned(),
        )));
        assert_eq!(engine.len(), 2);

        let mut cycle = DetectorCycle {
            stores: &stores,
            aggregates: &aggregates,
            config: &config,
            now_ms: 0.0,
            outbox: &mut outbox,
        };
        engine.update(&mut cycle);
        assert!(outbox.drain_events().is_empty());
    }

    #[test]
    fn test_remove_entity_drops_all_bound_detectors() {
        let mut engine = DetectorEngine::default();
        engine.add(AnyDetector::from(FreezedVideoTrackDetector::new(
            "in-1".to_owned(),
        )));
        engine.add(AnyDetector::from(DryInboundTrackDetector::new(
            "in-1".to_owned(),
        )));
        engine.add(AnyDetector::from(DryInboundTrackDetector::new(
            "in-2".to_owned(),
        )));

        engine.remove_entity("in-1");
        assert_eq!(engine.len(), 1);
        assert!(engine.has("dry-inbound-track", "in-2"));
        assert!(!engine.has("freezed-video-track", "in-1"));
    }
}
