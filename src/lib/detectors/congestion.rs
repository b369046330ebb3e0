//! Congestion detection for the whole connection.
//!
//! Compares the currently available outgoing bitrate against its
//! high-water mark. A collapse below the enter ratio means the bandwidth
//! estimator backed off hard; recovery above the release ratio re-arms
//! the detector. High-water marks below a floor are startup noise and
//! never judged.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct CongestionDetector {
    connection_id: String,
    active: bool,
}

impl CongestionDetector {
    pub fn new(connection_id: String) -> Self {
        Self {
            connection_id,
            active: false,
        }
    }
}

impl Detector for CongestionDetector {
    fn name(&self) -> &'static str {
        "congestion"
    }

    fn entity_id(&self) -> &str {
        &self.connection_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.congestion;
        if config.disabled {
            return Ok(());
        }
        let Some(available) = cycle.aggregates.available_outgoing_bitrate else {
            return Ok(());
        };
        let high_water = cycle.aggregates.highest_available_outgoing_bitrate;
        if high_water < config.min_high_water_bitrate {
            return Ok(());
        }

        if !self.active && available < high_water * config.enter_ratio {
            self.active = true;
            if config.create_event {
                cycle.outbox.push_event(MonitorEvent::Congestion {
                    available_outgoing_bitrate: available,
                    high_water_mark: high_water,
                });
            }
            if config.create_issue {
                cycle.outbox.push_issue(Issue {
                    kind: IssueKind::Congestion,
                    payload: serde_json::json!({
                        "availableOutgoingBitrate": available,
                        "highWaterMark": high_water,
                    }),
                    timestamp: cycle.now_ms,
                });
            }
        } else if self.active && available > high_water * config.release_ratio {
            self.active = false;
        }
        Ok(())
    }
}
