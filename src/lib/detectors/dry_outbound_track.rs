//! Dry outbound track: a live, unmuted sender that never put a byte on
//! the wire. Timed activation with reset, latched once triggered.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct DryOutboundTrackDetector {
    outbound_rtp_id: String,
    started_at_ms: Option<f64>,
    triggered: bool,
}

impl DryOutboundTrackDetector {
    pub fn new(outbound_rtp_id: String) -> Self {
        Self {
            outbound_rtp_id,
            started_at_ms: None,
            triggered: false,
        }
    }
}

impl Detector for DryOutboundTrackDetector {
    fn name(&self) -> &'static str {
        "dry-outbound-track"
    }

    fn entity_id(&self) -> &str {
        &self.outbound_rtp_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.dry_outbound_track;
        if config.disabled || self.triggered {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.outbound_rtps.get(&self.outbound_rtp_id) else {
            return Ok(());
        };

        if monitor.stats.bytes_sent.unwrap_or(0) > 0 {
            self.started_at_ms = None;
            return Ok(());
        }

        // Deactivated streams and muted sources are silent on purpose.
        let intentionally_silent = monitor.stats.active == Some(false)
            || cycle
                .stores
                .media_source_of_outbound(monitor)
                .map(|source| source.is_muted())
                .unwrap_or(false);
        if intentionally_silent {
            self.started_at_ms = None;
            return Ok(());
        }

        let started_at = *self.started_at_ms.get_or_insert(cycle.now_ms);
        let duration_ms = cycle.now_ms - started_at;
        if duration_ms < config.threshold_ms {
            return Ok(());
        }

        self.triggered = true;
        let track_id = cycle
            .stores
            .media_source_of_outbound(monitor)
            .and_then(|source| source.stats.track_identifier.clone())
            .unwrap_or_default();
        if config.create_event {
            cycle.outbox.push_event(MonitorEvent::DryOutboundTrack {
                track_id: track_id.clone(),
                duration_ms,
            });
        }
        if config.create_issue {
            cycle.outbox.push_issue(Issue {
                kind: IssueKind::DryOutboundTrack,
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
