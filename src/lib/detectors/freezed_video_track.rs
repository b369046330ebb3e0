//! Frozen video track detection.
//!
//! Purely delta-driven: a cycle whose freezeCount advanced marks the
//! track frozen and fires the event once; the next cycle with a flat
//! freezeCount clears the flag silently.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct FreezedVideoTrackDetector {
    inbound_rtp_id: String,
    is_freezed: bool,
}

impl FreezedVideoTrackDetector {
    pub fn new(inbound_rtp_id: String) -> Self {
        Self {
            inbound_rtp_id,
            is_freezed: false,
        }
    }

    pub fn is_freezed(&self) -> bool {
        self.is_freezed
    }
}

impl Detector for FreezedVideoTrackDetector {
    fn name(&self) -> &'static str {
        "freezed-video-track"
    }

    fn entity_id(&self) -> &str {
        &self.inbound_rtp_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.freezed_video_track;
        if config.disabled {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.inbound_rtps.get(&self.inbound_rtp_id) else {
            return Ok(());
        };

        let delta = monitor.delta_freeze_count;
        if delta > 0 && !self.is_freezed {
            self.is_freezed = true;
            let track_id = monitor.track_identifier().unwrap_or_default().to_owned();
            let ssrc = monitor.ssrc().unwrap_or(0);
            if config.create_event {
                cycle.outbox.push_event(MonitorEvent::FreezeStarted {
                    track_id: track_id.clone(),
                    ssrc,
                    freeze_count_delta: delta,
                });
            }
            if config.create_issue {
                cycle.outbox.push_issue(Issue {
                    kind: IssueKind::FreezedVideoTrack,
                    payload: serde_json::json!({
                        "trackId": track_id,
                        "ssrc": ssrc,
                    }),
                    timestamp: cycle.now_ms,
                });
            }
        } else if delta == 0 && self.is_freezed {
            // The freeze ended somewhere in this interval; no event.
            self.is_freezed = false;
        }
        Ok(())
    }
}
