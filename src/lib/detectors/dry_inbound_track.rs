//! Dry inbound track: received bytes stayed at exactly zero for too long
//! while the remote side is not intentionally paused.
//!
//! Timed activation with reset, latched once triggered: the timer starts
//! on the first zero-byte observation, clears whenever bytes arrive or
//! the remote outbound counterpart appears paused, and the detector
//! never re-evaluates after it has fired for this entity.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct DryInboundTrackDetector {
    inbound_rtp_id: String,
    started_at_ms: Option<f64>,
    triggered: bool,
}

impl DryInboundTrackDetector {
    pub fn new(inbound_rtp_id: String) -> Self {
        Self {
            inbound_rtp_id,
            started_at_ms: None,
            triggered: false,
        }
    }
}

impl Detector for DryInboundTrackDetector {
    fn name(&self) -> &'static str {
        "dry-inbound-track"
    }

    fn entity_id(&self) -> &str {
        &self.inbound_rtp_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.dry_inbound_track;
        if config.disabled || self.triggered {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.inbound_rtps.get(&self.inbound_rtp_id) else {
            return Ok(());
        };

        if monitor.stats.bytes_received.unwrap_or(0) > 0 {
            self.started_at_ms = None;
            return Ok(());
        }

        // A paused sender is legitimate silence, not a dry track.
        let remote_paused = cycle
            .stores
            .remote_outbound_counterpart(monitor)
            .map(|remote| remote.appears_paused())
            .unwrap_or(false);
        if remote_paused {
            self.started_at_ms = None;
            return Ok(());
        }

        let started_at = *self.started_at_ms.get_or_insert(cycle.now_ms);
        let duration_ms = cycle.now_ms - started_at;
        if duration_ms < config.threshold_ms {
            return Ok(());
        }

        self.triggered = true;
        let track_id = monitor.track_identifier().unwrap_or_default().to_owned();
        if config.create_event {
            cycle.outbox.push_event(MonitorEvent::DryInboundTrack {
                track_id: track_id.clone(),
                duration_ms,
            });
        }
        if config.create_issue {
            cycle.outbox.push_issue(Issue {
                kind: IssueKind::DryInboundTrack,
                payload: serde_json::json!({
                    "trackId": track_id,
                    "duration": duration_ms,
                }),
                timestamp: cycle.now_ms,
            });
        }
        Ok(())
    }
}
