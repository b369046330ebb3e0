//! CPU limitation on an outbound video stream.
//!
//! Edge-triggered: fires once when the encoder reports the CPU as its
//! quality limitation reason, and re-arms as soon as the reason moves
//! away from CPU.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct CpuLimitationDetector {
    outbound_rtp_id: String,
    limited: bool,
}

impl CpuLimitationDetector {
    pub fn new(outbound_rtp_id: String) -> Self {
        Self {
            outbound_rtp_id,
            limited: false,
        }
    }
}

impl Detector for CpuLimitationDetector {
    fn name(&self) -> &'static str {
        "cpu-limitation"
    }

    fn entity_id(&self) -> &str {
        &self.outbound_rtp_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.cpu_limitation;
        if config.disabled {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.outbound_rtps.get(&self.outbound_rtp_id) else {
            return Ok(());
        };

        let limited_now = monitor.is_cpu_limited();
        if limited_now && !self.limited {
            self.limited = true;
            let ssrc = monitor.ssrc().unwrap_or(0);
            let track_id = cycle
                .stores
                .media_source_of_outbound(monitor)
                .and_then(|source| source.stats.track_identifier.clone());
            if config.create_event {
                cycle.outbox.push_event(MonitorEvent::CpuLimitation {
                    ssrc,
                    track_id: track_id.clone(),
                });
            }
            if config.create_issue {
                cycle.outbox.push_issue(Issue {
                    kind: IssueKind::CpuLimitation,
                    payload: serde_json::json!({
                        "ssrc": ssrc,
                        "trackId": track_id,
                    }),
                    timestamp: cycle.now_ms,
                });
            }
        } else if !limited_now {
            self.limited = false;
        }
        Ok(())
    }
}
