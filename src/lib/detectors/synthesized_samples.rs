//! Synthesized audio detection on the playout path.
//!
//! Hysteresis on the synthesized-samples duration produced per cycle:
//! heavy concealment enters Active (one event), light concealment below
//! the low threshold releases back to Idle.

use anyhow::Result;

use crate::events::{Issue, IssueKind, MonitorEvent};

use super::{Detector, DetectorCycle};

#[derive(Debug)]
pub struct SynthesizedSamplesDetector {
    media_playout_id: String,
    active: bool,
}

impl SynthesizedSamplesDetector {
    pub fn new(media_playout_id: String) -> Self {
        Self {
            media_playout_id,
            active: false,
        }
    }
}

impl Detector for SynthesizedSamplesDetector {
    fn name(&self) -> &'static str {
        "synthesized-samples"
    }

    fn entity_id(&self) -> &str {
        &self.media_playout_id
    }

    fn update(&mut self, cycle: &mut DetectorCycle<'_>) -> Result<()> {
        let config = &cycle.config.synthesized_samples;
        if config.disabled {
            return Ok(());
        }
        let Some(monitor) = cycle.stores.media_playouts.get(&self.media_playout_id) else {
            return Ok(());
        };

        let synthesized_ms = monitor.delta_synthesized_samples_ms;
        if !self.active && synthesized_ms >= config.high_threshold_ms {
            self.active = true;
            if config.create_event {
                cycle.outbox.push_event(MonitorEvent::SynthesizedAudio {
                    playout_id: self.media_playout_id.clone(),
                    synthesized_ms,
                });
            }
            if config.create_issue {
                cycle.outbox.push_issue(Issue {
                    kind: IssueKind::SynthesizedAudio,
                    payload: serde_json::json!({
                        "playoutId": self.media_playout_id,
                        "synthesizedMs": synthesized_ms,
                    }),
                    timestamp: cycle.now_ms,
                });
            }
        } else if self.active && synthesized_ms < config.low_threshold_ms {
            self.active = false;
        }
        Ok(())
    }
}
