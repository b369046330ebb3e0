//! Whole-pipeline cycles driven by synthetic report batches.

use rtc_stats_monitor::records::{
    CandidatePairStats, IceCandidateStats, InboundRtpStats, MediaKind, MediaPlayoutStats,
    OutboundRtpStats, RawRecord, RemoteInboundRtpStats, TransportStats,
};
use rtc_stats_monitor::{ClientMonitor, ConnectionCoordinator, MonitorConfig, MonitorEvent};

fn coordinator() -> ConnectionCoordinator {
    ConnectionCoordinator::new("conn-1".into(), MonitorConfig::default())
}

fn inbound_audio(timestamp: f64, bytes: u64) -> RawRecord {
    RawRecord::InboundRtp(InboundRtpStats {
        id: "IT01".into(),
        timestamp,
        ssrc: Some(1111),
        kind: Some(MediaKind::Audio),
        track_identifier: Some("audio-in".into()),
        bytes_received: Some(bytes),
        packets_received: Some(bytes / 100),
        ..Default::default()
    })
}

fn inbound_video(
    timestamp: f64,
    bytes: u64,
    frames_received: u64,
    frames_rendered: u64,
    freeze_count: u64,
) -> RawRecord {
    RawRecord::InboundRtp(InboundRtpStats {
        id: "IT02".into(),
        timestamp,
        ssrc: Some(2222),
        kind: Some(MediaKind::Video),
        track_identifier: Some("video-in".into()),
        bytes_received: Some(bytes),
        frames_received: Some(frames_received),
        frames_rendered: Some(frames_rendered),
        freeze_count: Some(freeze_count),
        frames_per_second: Some(30.0),
        frame_width: Some(1280),
        frame_height: Some(720),
        ..Default::default()
    })
}

#[test]
fn receiving_bitrate_across_one_second_interval() {
    // 1000 -> 9000 bytes over one second yields 64 000 bit/s.
    let mut coordinator = coordinator();
    coordinator.accept(vec![inbound_audio(0.0, 1_000)]);
    coordinator.accept(vec![inbound_audio(1_000.0, 9_000)]);

    let monitor = coordinator.stores().inbound_rtps.get("IT01").unwrap();
    assert_eq!(monitor.receiving_bitrate, 64_000.0);
    assert_eq!(coordinator.aggregates().receiving_bitrate(), 64_000.0);
}

#[test]
fn dry_inbound_track_fires_once_past_threshold() {
    // Zero bytes from the start; cycles at 0, 2000, 4000, 6000 ms. The
    // 5000 ms threshold is crossed at 6000 ms with duration 6000, and
    // the detector stays latched afterwards.
    let mut coordinator = coordinator();
    for timestamp in [0.0, 2_000.0, 4_000.0, 6_000.0] {
        coordinator.accept(vec![inbound_audio(timestamp, 0)]);
    }

    let events = coordinator.drain_events();
    let dry: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::DryInboundTrack {
                track_id,
                duration_ms,
            } => Some((track_id.as_str(), *duration_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(dry, vec![("audio-in", 6_000.0)]);

    let issues = coordinator.drain_issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].payload["duration"], 6_000.0);

    // Latched: further dry cycles stay silent.
    coordinator.accept(vec![inbound_audio(8_000.0, 0)]);
    assert!(coordinator.drain_events().is_empty());
}

#[test]
fn playout_discrepancy_hysteresis_enter_and_release() {
    let mut coordinator = coordinator();
    // Baseline, then a cycle with skew 15 (>= 10 enters), then skew 15
    // again (still active, no second event), then skew 2 (< 3 releases).
    coordinator.accept(vec![inbound_video(0.0, 10_000, 0, 0, 0)]);
    coordinator.accept(vec![inbound_video(1_000.0, 20_000, 30, 15, 0)]);

    let events = coordinator.drain_events();
    let skews: Vec<i64> = events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::PlayoutDiscrepancy { frame_skew, .. } => Some(*frame_skew),
            _ => None,
        })
        .collect();
    assert_eq!(skews, vec![15]);

    coordinator.accept(vec![inbound_video(2_000.0, 30_000, 75, 45, 0)]);
    assert!(coordinator
        .drain_events()
        .iter()
        .all(|event| !matches!(event, MonitorEvent::PlayoutDiscrepancy { .. })));

    // Released below the low threshold; a later spike may fire again.
    coordinator.accept(vec![inbound_video(3_000.0, 40_000, 107, 105, 0)]);
    coordinator.accept(vec![inbound_video(4_000.0, 50_000, 152, 120, 0)]);
    let events = coordinator.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, MonitorEvent::PlayoutDiscrepancy { .. })));
}

#[test]
fn freeze_enters_once_then_clears_silently() {
    let mut coordinator = coordinator();
    coordinator.accept(vec![inbound_video(0.0, 10_000, 0, 0, 0)]);
    // freezeCount 0 -> 1: one freeze-started event.
    coordinator.accept(vec![inbound_video(1_000.0, 20_000, 30, 30, 1)]);

    let events = coordinator.drain_events();
    let freezes: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, MonitorEvent::FreezeStarted { .. }))
        .collect();
    assert_eq!(freezes.len(), 1);

    // Flat freezeCount clears the state without an event.
    coordinator.accept(vec![inbound_video(2_000.0, 30_000, 60, 60, 1)]);
    assert!(coordinator.drain_events().is_empty());

    // A new freeze fires again.
    coordinator.accept(vec![inbound_video(3_000.0, 40_000, 90, 90, 2)]);
    let events = coordinator.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, MonitorEvent::FreezeStarted { .. })));
}

#[test]
fn audio_mos_reference_values_flow_into_track_score() {
    // 64 kbit/s, no loss, 10 ms buffer delay, 50 ms RTT: MOS = 4.43.
    // The RTT comes in through the remote receiver report EWMA.
    let mut coordinator = coordinator();

    let batch = |timestamp: f64, bytes: u64| {
        vec![
            RawRecord::InboundRtp(InboundRtpStats {
                id: "IT01".into(),
                timestamp,
                ssrc: Some(1111),
                kind: Some(MediaKind::Audio),
                track_identifier: Some("audio-in".into()),
                bytes_received: Some(bytes),
                packets_received: Some(bytes / 160),
                jitter_buffer_delay: Some(timestamp / 1_000.0 * 0.5),
                jitter_buffer_emitted_count: Some((timestamp as u64 / 1_000) * 50),
                ..Default::default()
            }),
            RawRecord::RemoteInboundRtp(RemoteInboundRtpStats {
                id: "RI01".into(),
                timestamp,
                ssrc: Some(1111),
                round_trip_time: Some(0.05),
                ..Default::default()
            }),
        ]
    };

    // Six one-second cycles at a steady 64 kbit/s; the score window
    // publishes once it holds five samples.
    for cycle in 0..=6u64 {
        coordinator.accept(batch(cycle as f64 * 1_000.0, cycle * 8_000));
    }

    // jitter buffer: 0.5 s per 50 emitted samples per cycle = 10 ms avg.
    let monitor = coordinator.stores().inbound_rtps.get("IT01").unwrap();
    assert_eq!(monitor.receiving_bitrate, 64_000.0);
    assert!((monitor.avg_jitter_buffer_delay_ms - 10.0).abs() < 1e-9);
    assert_eq!(coordinator.aggregates().ewma_rtt_ms, Some(50.0));

    // Every raw sample is 4.43, so the weighted mean is exactly 4.43.
    let (_, score) = coordinator
        .track_scores()
        .find(|(key, _)| key.as_str() == "IT01")
        .unwrap();
    assert!((score.value.unwrap() - 4.43).abs() < 1e-9);
}

#[test]
fn swept_entity_takes_detector_and_score_state_with_it() {
    let mut coordinator = coordinator();
    coordinator.accept(vec![inbound_audio(0.0, 1_000)]);
    coordinator.accept(vec![inbound_audio(1_000.0, 9_000)]);
    assert_eq!(coordinator.stores().inbound_rtps.len(), 1);

    // Gone for one cycle: entity, detector and score window are dropped.
    coordinator.accept(vec![]);
    assert!(coordinator.stores().inbound_rtps.is_empty());
    assert!(coordinator.track_scores().next().is_none());

    // Reappearing under the same id starts from scratch.
    coordinator.accept(vec![inbound_audio(3_000.0, 50_000)]);
    let monitor = coordinator.stores().inbound_rtps.get("IT01").unwrap();
    assert_eq!(monitor.receiving_bitrate, 0.0);
}

#[test]
fn congestion_event_on_available_bitrate_collapse() {
    let mut coordinator = coordinator();
    let batch = |timestamp: f64, available: f64| {
        vec![
            RawRecord::Transport(TransportStats {
                id: "T01".into(),
                timestamp,
                ice_state: Some("connected".into()),
                selected_candidate_pair_id: Some("CP01".into()),
                ..Default::default()
            }),
            RawRecord::CandidatePair(CandidatePairStats {
                id: "CP01".into(),
                timestamp,
                local_candidate_id: Some("LC01".into()),
                available_outgoing_bitrate: Some(available),
                ..Default::default()
            }),
            RawRecord::LocalCandidate(IceCandidateStats {
                id: "LC01".into(),
                timestamp,
                candidate_type: Some("host".into()),
                protocol: Some("udp".into()),
                ..Default::default()
            }),
        ]
    };

    // Establish a 2 Mbit/s high-water mark, then collapse below half.
    coordinator.accept(batch(0.0, 2_000_000.0));
    coordinator.accept(batch(1_000.0, 900_000.0));
    let events = coordinator.drain_events();
    let congestions: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::Congestion {
                available_outgoing_bitrate,
                high_water_mark,
            } => Some((*available_outgoing_bitrate, *high_water_mark)),
            _ => None,
        })
        .collect();
    assert_eq!(congestions, vec![(900_000.0, 2_000_000.0)]);

    // Still congested: no repeat while active.
    coordinator.accept(batch(2_000.0, 800_000.0));
    assert!(coordinator.drain_events().is_empty());

    // Recovery above the release ratio re-arms; a later collapse fires
    // again.
    coordinator.accept(batch(3_000.0, 1_900_000.0));
    coordinator.accept(batch(4_000.0, 700_000.0));
    let events = coordinator.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, MonitorEvent::Congestion { .. })));
}

#[test]
fn synthesized_audio_hysteresis_on_playout() {
    let mut coordinator = coordinator();
    let batch = |timestamp: f64, synthesized_s: f64| {
        vec![RawRecord::MediaPlayout(MediaPlayoutStats {
            id: "AP01".into(),
            timestamp,
            kind: Some(MediaKind::Audio),
            synthesized_samples_duration: Some(synthesized_s),
            total_samples_duration: Some(timestamp / 1_000.0),
            ..Default::default()
        })]
    };

    coordinator.accept(batch(0.0, 0.0));
    // 400 ms synthesized in one cycle: enters Active.
    coordinator.accept(batch(1_000.0, 0.4));
    let events = coordinator.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        MonitorEvent::SynthesizedAudio { synthesized_ms, .. } if (*synthesized_ms - 400.0).abs() < 1e-6
    )));

    // 100 ms sits between the thresholds: still active, still silent.
    coordinator.accept(batch(2_000.0, 0.5));
    assert!(coordinator.drain_events().is_empty());

    // 20 ms releases; the next burst fires again.
    coordinator.accept(batch(3_000.0, 0.52));
    coordinator.accept(batch(4_000.0, 0.92));
    let events = coordinator.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, MonitorEvent::SynthesizedAudio { .. })));
}

#[test]
fn dry_outbound_resets_while_source_muted() {
    use rtc_stats_monitor::records::MediaSourceStats;

    let mut coordinator = coordinator();
    let batch = |timestamp: f64, muted: bool| {
        vec![
            RawRecord::OutboundRtp(OutboundRtpStats {
                id: "OT01".into(),
                timestamp,
                ssrc: Some(3333),
                kind: Some(MediaKind::Audio),
                media_source_id: Some("MS01".into()),
                bytes_sent: Some(0),
                ..Default::default()
            }),
            RawRecord::MediaSource(MediaSourceStats {
                id: "MS01".into(),
                timestamp,
                kind: Some(MediaKind::Audio),
                track_identifier: Some("audio-out".into()),
                muted: Some(muted),
                ..Default::default()
            }),
        ]
    };

    // Muted the whole time: the timer keeps resetting, no event even far
    // past the threshold.
    for timestamp in [0.0, 3_000.0, 6_000.0, 9_000.0] {
        coordinator.accept(batch(timestamp, true));
    }
    assert!(coordinator
        .drain_events()
        .iter()
        .all(|event| !matches!(event, MonitorEvent::DryOutboundTrack { .. })));

    // Unmuted and still silent: triggers once the threshold elapses.
    for timestamp in [10_000.0, 13_000.0, 16_000.0] {
        coordinator.accept(batch(timestamp, false));
    }
    let events = coordinator.drain_events();
    let dry: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::DryOutboundTrack {
                track_id,
                duration_ms,
            } => Some((track_id.as_str(), *duration_ms)),
            _ => None,
        })
        .collect();
    assert_eq!(dry, vec![("audio-out", 6_000.0)]);
}

#[test]
fn client_monitor_composes_connections() {
    let mut client = ClientMonitor::new(MonitorConfig::default());
    for cycle in 0..=6u64 {
        let timestamp = cycle as f64 * 1_000.0;
        client.accept("conn-a", vec![inbound_audio(timestamp, cycle * 8_000)]);
        client.accept("conn-b", vec![inbound_audio(timestamp, cycle * 4_000)]);
    }

    let sample = client.create_sample();
    assert_eq!(sample.connections.len(), 2);
    assert_eq!(sample.timestamp, 6_000.0);
    // Both connections have published scores by now.
    assert!(client.score().is_some());

    client.close_connection("conn-b").unwrap();
    assert_eq!(client.create_sample().connections.len(), 1);
}
