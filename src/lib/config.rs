//! Monitor configuration.
//!
//! A flat, serde-deserializable object keyed by detector/score name. The
//! crate consumes it but never loads it from anywhere; unspecified fields
//! take the built-in defaults below.

use serde::{Deserialize, Serialize};

/// Track identifier of the synthetic diagnostic ("probator") stream some
/// media servers inject. Detectors are never created for it.
pub const DEFAULT_PROBATOR_TRACK_ID: &str = "probator";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    pub probator_track_id: String,
    pub dry_inbound_track: DryInboundTrackConfig,
    pub dry_outbound_track: DryOutboundTrackConfig,
    pub freezed_video_track: FreezedVideoTrackConfig,
    pub playout_discrepancy: PlayoutDiscrepancyConfig,
    pub synthesized_samples: SynthesizedSamplesConfig,
    pub congestion: CongestionConfig,
    pub cpu_limitation: CpuLimitationConfig,
    pub scoring: ScoringConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            probator_track_id: DEFAULT_PROBATOR_TRACK_ID.to_owned(),
            dry_inbound_track: Default::default(),
            dry_outbound_track: Default::default(),
            freezed_video_track: Default::default(),
            playout_discrepancy: Default::default(),
            synthesized_samples: Default::default(),
            congestion: Default::default(),
            cpu_limitation: Default::default(),
            scoring: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DryInboundTrackConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
    /// How long received bytes must stay at zero before triggering.
    pub threshold_ms: f64,
}

impl Default for DryInboundTrackConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
            threshold_ms: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DryOutboundTrackConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
    /// How long sent bytes must stay flat before triggering.
    pub threshold_ms: f64,
}

impl Default for DryOutboundTrackConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
            threshold_ms: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FreezedVideoTrackConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
}

impl Default for FreezedVideoTrackConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayoutDiscrepancyConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
    /// Frame skew (received minus rendered, per cycle) entering Active.
    pub high_skew_threshold: i64,
    /// Frame skew below which the detector releases back to Idle.
    pub low_skew_threshold: i64,
}

impl Default for PlayoutDiscrepancyConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
            high_skew_threshold: 10,
            low_skew_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesizedSamplesConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
    /// Synthesized audio per cycle (ms) entering Active.
    pub high_threshold_ms: f64,
    /// Synthesized audio per cycle (ms) releasing back to Idle.
    pub low_threshold_ms: f64,
}

impl Default for SynthesizedSamplesConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
            high_threshold_ms: 300.0,
            low_threshold_ms: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CongestionConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
    /// Enter Active when available outgoing bitrate drops below this
    /// fraction of its high-water mark.
    pub enter_ratio: f64,
    /// Release to Idle once it recovers above this fraction.
    pub release_ratio: f64,
    /// High-water marks below this are noise, not a baseline.
    pub min_high_water_bitrate: f64,
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
            enter_ratio: 0.5,
            release_ratio: 0.8,
            min_high_water_bitrate: 100_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuLimitationConfig {
    pub disabled: bool,
    pub create_event: bool,
    pub create_issue: bool,
}

impl Default for CpuLimitationConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            create_event: true,
            create_issue: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringConfig {
    /// Samples kept per score history window.
    pub window_length: usize,
    /// Samples required before a score value is published.
    pub min_window_length: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_length: 10,
            min_window_length: 5,
        }
    }
}

impl ScoringConfig {
    /// Window lengths are interdependent; a shrunken window also lowers
    /// the publication minimum.
    pub fn normalized(&self) -> Self {
        let window_length = self.window_length.max(1);
        Self {
            window_length,
            min_window_length: self.min_window_length.clamp(1, window_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: MonitorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.dry_inbound_track.threshold_ms, 5_000.0);
        assert_eq!(config.playout_discrepancy.high_skew_threshold, 10);
        assert_eq!(config.scoring.window_length, 10);
        assert!(!config.congestion.disabled);
    }

    #[test]
    fn test_partial_override() {
        let config: MonitorConfig = serde_json::from_str(
            r#"{"dryInboundTrack": {"thresholdMs": 2000.0, "createIssue": false}}"#,
        )
        .unwrap();
        assert_eq!(config.dry_inbound_track.threshold_ms, 2_000.0);
        assert!(!config.dry_inbound_track.create_issue);
        assert!(config.dry_inbound_track.create_event);
    }

    #[test]
    fn test_scoring_normalized_clamps_minimum() {
        let scoring = ScoringConfig {
            window_length: 4,
            min_window_length: 9,
        };
        let normalized = scoring.normalized();
        assert_eq!(normalized.window_length, 4);
        assert_eq!(normalized.min_window_length, 4);
    }
}
