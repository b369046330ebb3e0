//! Typed events and issues surfaced by the monitor.
//!
//! The core never pushes to an external emitter; it appends to a bounded
//! outbox the embedding application drains after each cycle (or less
//! often). When the outbox overflows, the oldest entries are dropped:
//! stale notifications are worth less than fresh ones.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use tracing::*;

/// Default outbox capacity, events and issues each.
const DEFAULT_OUTBOX_CAPACITY: usize = 1024;

/// A notification about something that changed or went wrong on a
/// connection, tagged the same way raw records are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MonitorEvent {
    /// The ICE state summary (state + TCP + TURN flags) changed.
    #[serde(rename_all = "camelCase")]
    StateChanged { summary: String, previous: String },
    /// A video track started freezing.
    #[serde(rename_all = "camelCase")]
    FreezeStarted {
        track_id: String,
        ssrc: u32,
        freeze_count_delta: u64,
    },
    /// An inbound track received exactly zero bytes for too long.
    #[serde(rename_all = "camelCase")]
    DryInboundTrack { track_id: String, duration_ms: f64 },
    /// An outbound track sent nothing for too long while its source was live.
    #[serde(rename_all = "camelCase")]
    DryOutboundTrack { track_id: String, duration_ms: f64 },
    /// Rendered frames fall behind received frames.
    #[serde(rename_all = "camelCase")]
    PlayoutDiscrepancy {
        track_id: String,
        frame_skew: i64,
        ewma_fps: f64,
    },
    /// The playout path is synthesizing (concealing) audio.
    #[serde(rename_all = "camelCase")]
    SynthesizedAudio {
        playout_id: String,
        synthesized_ms: f64,
    },
    /// Available outgoing bitrate collapsed against its high-water mark.
    #[serde(rename_all = "camelCase")]
    Congestion {
        available_outgoing_bitrate: f64,
        high_water_mark: f64,
    },
    /// An encoder reports CPU as its quality limitation.
    #[serde(rename_all = "camelCase")]
    CpuLimitation { ssrc: u32, track_id: Option<String> },
}

impl MonitorEvent {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state-changed",
            Self::FreezeStarted { .. } => "freeze-started",
            Self::DryInboundTrack { .. } => "dry-inbound-track",
            Self::DryOutboundTrack { .. } => "dry-outbound-track",
            Self::PlayoutDiscrepancy { .. } => "playout-discrepancy",
            Self::SynthesizedAudio { .. } => "synthesized-audio",
            Self::Congestion { .. } => "congestion",
            Self::CpuLimitation { .. } => "cpu-limitation",
        }
    }
}

/// Kinds of issue records detectors can open, independent of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    DryInboundTrack,
    DryOutboundTrack,
    FreezedVideoTrack,
    PlayoutDiscrepancy,
    SynthesizedAudio,
    Congestion,
    CpuLimitation,
}

/// An issue record: kind, opaque payload, and the cycle timestamp it was
/// opened at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub payload: serde_json::Value,
    pub timestamp: f64,
}

/// Bounded event/issue buffer owned by one coordinator.
#[derive(Debug)]
pub struct EventOutbox {
    events: VecDeque<MonitorEvent>,
    issues: VecDeque<Issue>,
    capacity: usize,
    dropped: u64,
}

impl Default for EventOutbox {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }
}

impl EventOutbox {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            issues: VecDeque::new(),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    pub fn push_event(&mut self, event: MonitorEvent) {
        trace!(kind = event.kind_name(), "monitor event");
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn push_issue(&mut self, issue: Issue) {
        if self.issues.len() == self.capacity {
            self.issues.pop_front();
            self.dropped += 1;
        }
        self.issues.push_back(issue);
    }

    pub fn drain_events(&mut self) -> Vec<MonitorEvent> {
        self.events.drain(..).collect()
    }

    pub fn drain_issues(&mut self) -> Vec<Issue> {
        self.issues.drain(..).collect()
    }

    /// Entries discarded because the outbox was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
