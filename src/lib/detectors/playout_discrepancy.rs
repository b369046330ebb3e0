//! Inbound video playout discrepancy.
//!
//! Hysteresis on the per-cycle frame skew (frames received minus frames
//! rendered): enters Active at the high threshold and emits once, stays
//! silent while Active, releases to Idle only below the low threshold.
//! Skew values between the two thresholds leave the state unchanged.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct PlayoutDiscrepancyDetector {
    inbound_rtp_id: String,
    active: bool,
    ewma_fps: Option<f64>,
}

impl PlayoutDiscrepancyDetector {
    pub fn new(inbound_rtp_id: String) -> Self {
        Self {
            inbound_rtp_id,
            active: false,
            ewma_fps: None,
        }
    }
}

impl Detector for PlayoutDiscrepancyDetector {
    fn name(&self) -> &'static str {
        "playout-discrepancy"
    }

    fn entity_id(&self) -> &str {
        &self.inbound_rtp_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.playout_discrepancy;
        if config.disabled {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.inbound_rtps.get(&self.inbound_rtp_id) else {
            return Ok(());
        };

        if let Some(fps) = monitor.stats.frames_per_second {
            self.ewma_fps = Some(match self.ewma_fps {
                Some(previous) => fps * 0.1 + previous * 0.9,
                None => fps,
            });
        }

        let frame_skew =
            monitor.delta_frames_received as i64 - monitor.delta_frames_rendered as i64;

        if !self.active && frame_skew >= config.high_skew_threshold {
            self.active = true;
            let track_id = monitor.track_identifier().unwrap_or_default().to_owned();
            let ewma_fps = self.ewma_fps.unwrap_or(0.0);
            if config.create_event {
                cycle.outbox.push_event(MonitorEvent::PlayoutDiscrepancy {
                    track_id: track_id.clone(),
                    frame_skew,
                    ewma_fps,
                });
            }
            if config.create_issue {
                cycle.outbox.push_issue(Issue {
                    kind: IssueKind::PlayoutDiscrepancy,
                    payload: serde_json::json!({
                        "trackId": track_id,
                        "frameSkew": frame_skew,
                        "ewmaFps": ewma_fps,
                    }),
                    timestamp: cycle.now_ms,
                });
            }
        } else if self.active && frame_skew < config.low_skew_threshold {
            self.active = false;
        }
        Ok(())
    }
}
