//! Per-connection coordination.
//!
//! One [`ConnectionCoordinator`] owns the full entity graph of a single
//! connection and drives the whole cycle: classify the incoming batch,
//! update monitors, sweep entities that disappeared, recompute the
//! connection-wide aggregates, run the detectors and refresh the scores.
//!
//! Everything is synchronous and cycle-driven; a batch is processed to
//! completion before the next one is accepted.

use rustc_hash::FxHashSet;
use tracing::*;

use crate::config::MonitorConfig;
use crate::detectors::{
    AnyDetector, CongestionDetector, CpuLimitationDetector, DetectorCycle, DetectorEngine,
    DryInboundTrackDetector, DryOutboundTrackDetector, FreezedVideoTrackDetector,
    PlayoutDiscrepancyDetector, SynthesizedSamplesDetector,
};
use crate::events::{EventOutbox, Issue, MonitorEvent};
use crate::monitors::{
    fraction_lost, CandidatePairMonitor, CertificateMonitor, CodecMonitor, DataChannelMonitor,
    IceCandidateMonitor, InboundRtpMonitor, MediaPlayoutMonitor, MediaSourceMonitor,
    OutboundRtpMonitor, PeerConnectionMonitor, RemoteInboundRtpMonitor, RemoteOutboundRtpMonitor,
    Tracked, TransportMonitor,
};
use crate::records::{MediaKind, RawRecord};
use crate::sample::ConnectionSample;
use crate::scores::mos::{audio_mos, video_mos, AudioMosInput};
use crate::scores::{stability_raw_score, CalculatedScore, ScoreBook};
use crate::store::{EntityStore, IndexValue};

/// Name of the ssrc secondary index registered on the RTP stream stores.
pub const SSRC_INDEX: &str = "ssrc";

fn inbound_ssrc(monitor: &InboundRtpMonitor) -> Option<IndexValue> {
    monitor.ssrc().map(IndexValue::from)
}

fn outbound_ssrc(monitor: &OutboundRtpMonitor) -> Option<IndexValue> {
    monitor.ssrc().map(IndexValue::from)
}

fn remote_inbound_ssrc(monitor: &RemoteInboundRtpMonitor) -> Option<IndexValue> {
    monitor.ssrc().map(IndexValue::from)
}

fn remote_outbound_ssrc(monitor: &RemoteOutboundRtpMonitor) -> Option<IndexValue> {
    monitor.ssrc().map(IndexValue::from)
}

/// All entity stores of one connection. RTP stream stores carry an ssrc
/// secondary index on top of the primary id map.
pub struct EntityStores {
    pub codecs: EntityStore<CodecMonitor>,
    pub inbound_rtps: EntityStore<InboundRtpMonitor>,
    pub outbound_rtps: EntityStore<OutboundRtpMonitor>,
    pub remote_inbound_rtps: EntityStore<RemoteInboundRtpMonitor>,
    pub remote_outbound_rtps: EntityStore<RemoteOutboundRtpMonitor>,
    pub media_sources: EntityStore<MediaSourceMonitor>,
    pub media_playouts: EntityStore<MediaPlayoutMonitor>,
    pub peer_connections: EntityStore<PeerConnectionMonitor>,
    pub data_channels: EntityStore<DataChannelMonitor>,
    pub transports: EntityStore<TransportMonitor>,
    pub candidate_pairs: EntityStore<CandidatePairMonitor>,
    pub local_candidates: EntityStore<IceCandidateMonitor>,
    pub remote_candidates: EntityStore<IceCandidateMonitor>,
    pub certificates: EntityStore<CertificateMonitor>,
}

impl Default for EntityStores {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStores {
    pub fn new() -> Self {
        let mut stores = Self {
            codecs: EntityStore::new(),
            inbound_rtps: EntityStore::new(),
            outbound_rtps: EntityStore::new(),
            remote_inbound_rtps: EntityStore::new(),
            remote_outbound_rtps: EntityStore::new(),
            media_sources: EntityStore::new(),
            media_playouts: EntityStore::new(),
            peer_connections: EntityStore::new(),
            data_channels: EntityStore::new(),
            transports: EntityStore::new(),
            candidate_pairs: EntityStore::new(),
            local_candidates: EntityStore::new(),
            remote_candidates: EntityStore::new(),
            certificates: EntityStore::new(),
        };
        // Fresh stores cannot hold a duplicate index name.
        let _ = stores.inbound_rtps.add_index(SSRC_INDEX, inbound_ssrc);
        let _ = stores.outbound_rtps.add_index(SSRC_INDEX, outbound_ssrc);
        let _ = stores
            .remote_inbound_rtps
            .add_index(SSRC_INDEX, remote_inbound_ssrc);
        let _ = stores
            .remote_outbound_rtps
            .add_index(SSRC_INDEX, remote_outbound_ssrc);
        stores
    }

    /// The remote sender report for an inbound stream, by `remoteId` when
    /// declared, otherwise by shared ssrc.
    pub fn remote_outbound_counterpart(
        &self,
        monitor: &InboundRtpMonitor,
    ) -> Option<&RemoteOutboundRtpMonitor> {
        if let Some(remote_id) = monitor.stats.remote_id.as_deref() {
            if let Some(remote) = self.remote_outbound_rtps.get(remote_id) {
                return Some(remote);
            }
        }
        let ssrc = IndexValue::from(monitor.ssrc()?);
        self.remote_outbound_rtps
            .values_by_index(SSRC_INDEX, ssrc)
            .into_iter()
            .next()
    }

    /// The remote receiver report for an outbound stream, by `remoteId`
    /// when declared, otherwise by shared ssrc.
    pub fn remote_inbound_counterpart(
        &self,
        monitor: &OutboundRtpMonitor,
    ) -> Option<&RemoteInboundRtpMonitor> {
        if let Some(remote_id) = monitor.stats.remote_id.as_deref() {
            if let Some(remote) = self.remote_inbound_rtps.get(remote_id) {
                return Some(remote);
            }
        }
        let ssrc = IndexValue::from(monitor.ssrc()?);
        self.remote_inbound_rtps
            .values_by_index(SSRC_INDEX, ssrc)
            .into_iter()
            .next()
    }

    /// The capture source feeding an outbound stream.
    pub fn media_source_of_outbound(
        &self,
        monitor: &OutboundRtpMonitor,
    ) -> Option<&MediaSourceMonitor> {
        let source_id = monitor.stats.media_source_id.as_deref()?;
        self.media_sources.get(source_id)
    }

    /// The playout path an inbound audio stream feeds.
    pub fn playout_of_inbound(&self, monitor: &InboundRtpMonitor) -> Option<&MediaPlayoutMonitor> {
        let playout_id = monitor.stats.playout_id.as_deref()?;
        self.media_playouts.get(playout_id)
    }

    /// The nominated candidate pair of a transport.
    pub fn selected_candidate_pair(
        &self,
        monitor: &TransportMonitor,
    ) -> Option<&CandidatePairMonitor> {
        let pair_id = monitor.selected_candidate_pair_id()?;
        self.candidate_pairs.get(pair_id)
    }

    /// The local candidate of a candidate pair.
    pub fn local_candidate_of_pair(
        &self,
        monitor: &CandidatePairMonitor,
    ) -> Option<&IceCandidateMonitor> {
        let candidate_id = monitor.stats.local_candidate_id.as_deref()?;
        self.local_candidates.get(candidate_id)
    }
}

/// Connection-wide aggregates recomputed every cycle from the post-sweep
/// entity graph. High-water marks and the RTT EWMA survive across cycles;
/// everything else is per-cycle.
#[derive(Debug, Default)]
pub struct ConnectionAggregates {
    pub sending_audio_bitrate: f64,
    pub sending_video_bitrate: f64,
    pub receiving_audio_bitrate: f64,
    pub receiving_video_bitrate: f64,

    pub delta_packets_sent: u64,
    pub delta_packets_received: u64,
    pub delta_packets_lost: i64,
    pub total_packets_sent: u64,
    pub total_packets_received: u64,
    pub total_packets_lost: u64,
    /// Receive loss ratio of the last interval.
    pub fraction_lost: f64,

    /// Mean of the non-zero RTT samples observed this cycle, in ms.
    pub avg_rtt_ms: Option<f64>,
    /// Smoothed RTT, `avg * 0.1 + prev * 0.9`, seeded with the first
    /// non-zero average.
    pub ewma_rtt_ms: Option<f64>,

    pub available_outgoing_bitrate: Option<f64>,
    pub highest_available_outgoing_bitrate: f64,
    pub highest_sending_bitrate: f64,
    pub highest_receiving_bitrate: f64,

    pub using_tcp: bool,
    pub using_turn: bool,
    pub ice_state: Option<String>,

    /// Records with a kind this crate does not know about, cumulative.
    pub unrecognized_records: u64,
}

impl ConnectionAggregates {
    /// Zero the per-cycle fields. EWMA, high-water marks and cumulative
    /// counters survive.
    fn reset_cycle(&mut self) {
        self.sending_audio_bitrate = 0.0;
        self.sending_video_bitrate = 0.0;
        self.receiving_audio_bitrate = 0.0;
        self.receiving_video_bitrate = 0.0;
        self.delta_packets_sent = 0;
        self.delta_packets_received = 0;
        self.delta_packets_lost = 0;
        self.fraction_lost = 0.0;
        self.avg_rtt_ms = None;
        self.available_outgoing_bitrate = None;
    }

    pub fn sending_bitrate(&self) -> f64 {
        self.sending_audio_bitrate + self.sending_video_bitrate
    }

    pub fn receiving_bitrate(&self) -> f64 {
        self.receiving_audio_bitrate + self.receiving_video_bitrate
    }

    /// Compact summary of the transport state, compared across cycles to
    /// detect meaningful changes.
    pub fn state_summary(&self) -> String {
        format!(
            "{}|tcp={}|turn={}",
            self.ice_state.as_deref().unwrap_or("unknown"),
            self.using_tcp,
            self.using_turn,
        )
    }
}

/// Coordinator of one connection. See the module docs for the cycle order.
pub struct ConnectionCoordinator {
    connection_id: String,
    config: MonitorConfig,
    stores: EntityStores,
    aggregates: ConnectionAggregates,
    engine: DetectorEngine,
    scores: ScoreBook,
    outbox: EventOutbox,
    last_state_summary: Option<String>,
    now_ms: f64,
}

impl ConnectionCoordinator {
    pub fn new(connection_id: String, config: MonitorConfig) -> Self {
        let scores = ScoreBook::new(&config.scoring);
        Self {
            connection_id,
            config,
            stores: EntityStores::new(),
            aggregates: ConnectionAggregates::default(),
            engine: DetectorEngine::default(),
            scores,
            outbox: EventOutbox::default(),
            last_state_summary: None,
            now_ms: 0.0,
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn stores(&self) -> &EntityStores {
        &self.stores
    }

    pub fn aggregates(&self) -> &ConnectionAggregates {
        &self.aggregates
    }

    /// Process one report batch to completion.
    pub fn accept(&mut self, batch: Vec<RawRecord>) {
        self.aggregates.reset_cycle();
        self.now_ms = batch
            .iter()
            .filter_map(RawRecord::timestamp_ms)
            .fold(self.now_ms, f64::max);

        for record in batch {
            self.classify(record);
        }

        let removed = self.sweep();
        if !removed.is_empty() {
            debug!(
                connection = %self.connection_id,
                count = removed.len(),
                "Swept entities that disappeared from the report"
            );
            for entity_id in &removed {
                self.engine.remove_entity(entity_id);
            }
            self.scores.retain(|key| !removed.contains(key));
        }

        self.update_aggregates();
        self.feed_stability_samples();
        self.detect_state_change();
        self.sync_detectors();

        let mut cycle = DetectorCycle {
            stores: &self.stores,
            aggregates: &self.aggregates,
            config: &self.config,
            now_ms: self.now_ms,
            outbox: &mut self.outbox,
        };
        self.engine.update(&mut cycle);

        self.update_scores();
    }

    /// Route one record into its typed monitor. Malformed records warn
    /// and are skipped; the batch continues.
    fn classify(&mut self, record: RawRecord) {
        macro_rules! track {
            ($store:expr, $monitor:ident, $stats:expr) => {{
                let stats = $stats;
                let id = stats.id.clone();
                $store.upsert_with(
                    &id,
                    || $monitor::new(stats.clone()),
                    |monitor| monitor.accept(stats.clone()),
                );
                if let Some(monitor) = $store.get_mut(&id) {
                    monitor.mark_visited();
                }
            }};
        }

        match record {
            RawRecord::InboundRtp(stats) => {
                if stats.ssrc.is_none() || stats.track_identifier.is_none() {
                    warn!(id = %stats.id, "Dropping inbound-rtp record without ssrc/trackIdentifier");
                    return;
                }
                track!(self.stores.inbound_rtps, InboundRtpMonitor, stats);
            }
            RawRecord::OutboundRtp(stats) => {
                if stats.ssrc.is_none() {
                    warn!(id = %stats.id, "Dropping outbound-rtp record without ssrc");
                    return;
                }
                track!(self.stores.outbound_rtps, OutboundRtpMonitor, stats);
            }
            RawRecord::RemoteInboundRtp(stats) => {
                if stats.ssrc.is_none() {
                    warn!(id = %stats.id, "Dropping remote-inbound-rtp record without ssrc");
                    return;
                }
                track!(
                    self.stores.remote_inbound_rtps,
                    RemoteInboundRtpMonitor,
                    stats
                );
            }
            RawRecord::RemoteOutboundRtp(stats) => {
                if stats.ssrc.is_none() {
                    warn!(id = %stats.id, "Dropping remote-outbound-rtp record without ssrc");
                    return;
                }
                track!(
                    self.stores.remote_outbound_rtps,
                    RemoteOutboundRtpMonitor,
                    stats
                );
            }
            RawRecord::Codec(stats) => track!(self.stores.codecs, CodecMonitor, stats),
            RawRecord::MediaSource(stats) => {
                track!(self.stores.media_sources, MediaSourceMonitor, stats)
            }
            RawRecord::MediaPlayout(stats) => {
                track!(self.stores.media_playouts, MediaPlayoutMonitor, stats)
            }
            RawRecord::PeerConnection(stats) => {
                track!(self.stores.peer_connections, PeerConnectionMonitor, stats)
            }
            RawRecord::DataChannel(stats) => {
                track!(self.stores.data_channels, DataChannelMonitor, stats)
            }
            RawRecord::Transport(stats) => {
                track!(self.stores.transports, TransportMonitor, stats)
            }
            RawRecord::CandidatePair(stats) => {
                track!(self.stores.candidate_pairs, CandidatePairMonitor, stats)
            }
            RawRecord::LocalCandidate(stats) => {
                track!(self.stores.local_candidates, IceCandidateMonitor, stats)
            }
            RawRecord::RemoteCandidate(stats) => {
                track!(self.stores.remote_candidates, IceCandidateMonitor, stats)
            }
            RawRecord::Certificate(stats) => {
                track!(self.stores.certificates, CertificateMonitor, stats)
            }
            RawRecord::Unrecognized => {
                self.aggregates.unrecognized_records += 1;
            }
        }
    }

    /// Mark-and-sweep garbage collection: every monitor not visited this
    /// cycle is removed from its store. Returns the removed entity ids.
    fn sweep(&mut self) -> FxHashSet<String> {
        let stores = &mut self.stores;
        let mut removed = FxHashSet::default();
        removed.extend(stores.codecs.sweep_unvisited(Tracked::take_visited));
        removed.extend(stores.inbound_rtps.sweep_unvisited(Tracked::take_visited));
        removed.extend(stores.outbound_rtps.sweep_unvisited(Tracked::take_visited));
        removed.extend(
            stores
                .remote_inbound_rtps
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(
            stores
                .remote_outbound_rtps
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(stores.media_sources.sweep_unvisited(Tracked::take_visited));
        removed.extend(stores.media_playouts.sweep_unvisited(Tracked::take_visited));
        removed.extend(
            stores
                .peer_connections
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(stores.data_channels.sweep_unvisited(Tracked::take_visited));
        removed.extend(stores.transports.sweep_unvisited(Tracked::take_visited));
        removed.extend(
            stores
                .candidate_pairs
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(
            stores
                .local_candidates
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(
            stores
                .remote_candidates
                .sweep_unvisited(Tracked::take_visited),
        );
        removed.extend(stores.certificates.sweep_unvisited(Tracked::take_visited));
        removed
    }

    fn update_aggregates(&mut self) {
        let stores = &self.stores;
        let aggregates = &mut self.aggregates;

        for monitor in stores.outbound_rtps.values() {
            match monitor.media_kind() {
                Some(MediaKind::Video) => aggregates.sending_video_bitrate += monitor.sending_bitrate,
                _ => aggregates.sending_audio_bitrate += monitor.sending_bitrate,
            }
            if monitor.interval_advanced() {
                aggregates.delta_packets_sent += monitor.delta_packets_sent;
            }
        }
        for monitor in stores.inbound_rtps.values() {
            match monitor.media_kind() {
                Some(MediaKind::Video) => {
                    aggregates.receiving_video_bitrate += monitor.receiving_bitrate
                }
                _ => aggregates.receiving_audio_bitrate += monitor.receiving_bitrate,
            }
            // Rejected stale snapshots keep last interval's deltas; those
            // must not count towards this cycle's traffic or the totals.
            if monitor.interval_advanced() {
                aggregates.delta_packets_received += monitor.delta_packets_received;
                aggregates.delta_packets_lost += monitor.delta_packets_lost;
            }
        }
        aggregates.total_packets_sent += aggregates.delta_packets_sent;
        aggregates.total_packets_received += aggregates.delta_packets_received;
        aggregates.total_packets_lost += aggregates.delta_packets_lost.max(0) as u64;
        aggregates.fraction_lost = fraction_lost(
            aggregates.delta_packets_lost,
            aggregates.delta_packets_received,
        );

        // RTT samples: remote receiver reports, remote sender reports and
        // the nominated candidate pairs. Zero samples are placeholders.
        let mut rtt_samples: Vec<f64> = Vec::new();
        rtt_samples.extend(
            stores
                .remote_inbound_rtps
                .values()
                .filter_map(RemoteInboundRtpMonitor::round_trip_time_ms)
                .filter(|rtt| *rtt > 0.0),
        );
        rtt_samples.extend(
            stores
                .remote_outbound_rtps
                .values()
                .filter_map(RemoteOutboundRtpMonitor::round_trip_time_ms)
                .filter(|rtt| *rtt > 0.0),
        );

        let mut available_outgoing = None;
        for transport in stores.transports.values() {
            if let Some(state) = transport.ice_state() {
                aggregates.ice_state = Some(state.to_owned());
            }
            let Some(pair) = stores.selected_candidate_pair(transport) else {
                continue;
            };
            if let Some(rtt) = pair.round_trip_time_ms() {
                if rtt > 0.0 {
                    rtt_samples.push(rtt);
                }
            }
            if let Some(bitrate) = pair.available_outgoing_bitrate() {
                *available_outgoing.get_or_insert(0.0) += bitrate;
            }
            if let Some(local) = stores.local_candidate_of_pair(pair) {
                aggregates.using_tcp = local.is_tcp();
                aggregates.using_turn = local.is_relay();
            }
        }

        if !rtt_samples.is_empty() {
            let avg = rtt_samples.iter().sum::<f64>() / rtt_samples.len() as f64;
            aggregates.avg_rtt_ms = Some(avg);
            aggregates.ewma_rtt_ms = Some(match aggregates.ewma_rtt_ms {
                Some(prev) => avg * 0.1 + prev * 0.9,
                None => avg,
            });
        }

        aggregates.available_outgoing_bitrate = available_outgoing;
        if let Some(bitrate) = available_outgoing {
            aggregates.highest_available_outgoing_bitrate =
                aggregates.highest_available_outgoing_bitrate.max(bitrate);
        }
        aggregates.highest_sending_bitrate = aggregates
            .highest_sending_bitrate
            .max(aggregates.sending_bitrate());
        aggregates.highest_receiving_bitrate = aggregates
            .highest_receiving_bitrate
            .max(aggregates.receiving_bitrate());
    }

    /// Push one stability sample per outbound stream whose remote
    /// receiver report carries an RTT this cycle.
    fn feed_stability_samples(&mut self) {
        let samples: Vec<(String, f64, u64)> = self
            .stores
            .outbound_rtps
            .iter()
            .filter_map(|(id, monitor)| {
                let remote = self.stores.remote_inbound_counterpart(monitor)?;
                let rtt_s = remote.stats.round_trip_time?;
                let lost = remote.delta_packets_lost.max(0) as u64;
                Some((id.clone(), rtt_s, lost))
            })
            .collect();
        for (id, rtt_s, lost) in samples {
            if let Some(monitor) = self.stores.outbound_rtps.get_mut(&id) {
                monitor.record_stability_sample(rtt_s, lost);
            }
        }
    }

    fn detect_state_change(&mut self) {
        let summary = self.aggregates.state_summary();
        // The first cycle establishes the baseline silently.
        if let Some(previous) = self.last_state_summary.take() {
            if previous != summary {
                self.outbox.push_event(MonitorEvent::StateChanged {
                    summary: summary.clone(),
                    previous,
                });
            }
        }
        self.last_state_summary = Some(summary);
    }

    /// Create the detectors every eligible entity is entitled to. The
    /// synthetic diagnostic (probator) track never gets detectors.
    fn sync_detectors(&mut self) {
        let probator = self.config.probator_track_id.as_str();

        if !self.engine.has("congestion", &self.connection_id) {
            self.engine.add(AnyDetector::from(CongestionDetector::new(
                self.connection_id.clone(),
            )));
        }

        let mut wanted: Vec<AnyDetector> = Vec::new();
        for (id, monitor) in self.stores.inbound_rtps.iter() {
            if monitor.track_identifier() == Some(probator) {
                continue;
            }
            if !self.engine.has("dry-inbound-track", id) {
                wanted.push(AnyDetector::from(DryInboundTrackDetector::new(id.clone())));
            }
            if monitor.media_kind() == Some(MediaKind::Video) {
                if !self.engine.has("freezed-video-track", id) {
                    wanted.push(AnyDetector::from(FreezedVideoTrackDetector::new(id.clone())));
                }
                if !self.engine.has("playout-discrepancy", id) {
                    wanted.push(AnyDetector::from(PlayoutDiscrepancyDetector::new(
                        id.clone(),
                    )));
                }
            }
        }
        for (id, monitor) in self.stores.outbound_rtps.iter() {
            let track_id = self
                .stores
                .media_source_of_outbound(monitor)
                .and_then(|source| source.stats.track_identifier.as_deref());
            if track_id == Some(probator) {
                continue;
            }
            if !self.engine.has("dry-outbound-track", id) {
                wanted.push(AnyDetector::from(DryOutboundTrackDetector::new(id.clone())));
            }
            if monitor.media_kind() == Some(MediaKind::Video)
                && !self.engine.has("cpu-limitation", id)
            {
                wanted.push(AnyDetector::from(CpuLimitationDetector::new(id.clone())));
            }
        }
        for (id, monitor) in self.stores.media_playouts.iter() {
            if monitor.stats.kind == Some(MediaKind::Video) {
                continue;
            }
            if !self.engine.has("synthesized-samples", id) {
                wanted.push(AnyDetector::from(SynthesizedSamplesDetector::new(
                    id.clone(),
                )));
            }
        }
        for detector in wanted {
            self.engine.add(detector);
        }
    }

    /// Refresh every score window from this cycle's derived metrics.
    /// Monitors without a completed interval yet push nothing, so a
    /// freshly created stream does not drag the score down with zeros.
    fn update_scores(&mut self) {
        let stores = &self.stores;
        let aggregates = &self.aggregates;
        let ewma_rtt = aggregates.ewma_rtt_ms.unwrap_or(0.0);

        for (id, monitor) in stores.inbound_rtps.iter() {
            if monitor.receiving_bitrate <= 0.0 {
                continue;
            }
            match monitor.media_kind() {
                Some(MediaKind::Video) => {
                    let raw = video_mos(
                        monitor.receiving_bitrate,
                        monitor.stats.frame_width.unwrap_or(0),
                        monitor.stats.frame_height.unwrap_or(0),
                        monitor.stats.frames_per_second.unwrap_or(0.0),
                    );
                    self.scores.push_inbound(
                        id,
                        raw,
                        serde_json::json!({
                            "model": "video-bppf",
                            "bitrate": monitor.receiving_bitrate,
                        }),
                    );
                }
                _ => {
                    let raw = audio_mos(AudioMosInput {
                        bitrate: monitor.receiving_bitrate,
                        packet_loss_pct: monitor.fraction_lost * 100.0,
                        buffer_delay_ms: monitor.avg_jitter_buffer_delay_ms,
                        rtt_ms: ewma_rtt,
                        dtx: false,
                        fec: monitor.uses_fec(),
                    });
                    self.scores.push_inbound(
                        id,
                        raw,
                        serde_json::json!({
                            "model": "audio-emodel",
                            "bitrate": monitor.receiving_bitrate,
                            "fractionLost": monitor.fraction_lost,
                        }),
                    );
                }
            }
        }

        for (id, monitor) in stores.outbound_rtps.iter() {
            if monitor.sending_bitrate <= 0.0 {
                continue;
            }
            match monitor.media_kind() {
                Some(MediaKind::Video) => {
                    // Video senders are scored by their delivery stability.
                    if let Some(stability) = monitor.stability_score {
                        self.scores.push_outbound(
                            id,
                            stability * 5.0,
                            serde_json::json!({
                                "model": "stability",
                                "stability": stability,
                            }),
                        );
                    }
                }
                _ => {
                    let remote = stores.remote_inbound_counterpart(monitor);
                    let loss_pct = remote
                        .map(|remote| {
                            fraction_lost(remote.delta_packets_lost, monitor.delta_packets_sent)
                                * 100.0
                        })
                        .unwrap_or(0.0);
                    let rtt_ms = remote
                        .and_then(RemoteInboundRtpMonitor::round_trip_time_ms)
                        .unwrap_or(ewma_rtt);
                    let raw = audio_mos(AudioMosInput {
                        bitrate: monitor.sending_bitrate,
                        packet_loss_pct: loss_pct,
                        buffer_delay_ms: 0.0,
                        rtt_ms,
                        dtx: false,
                        fec: false,
                    });
                    self.scores.push_outbound(
                        id,
                        raw,
                        serde_json::json!({
                            "model": "audio-emodel",
                            "bitrate": monitor.sending_bitrate,
                            "packetLossPct": loss_pct,
                        }),
                    );
                }
            }
        }

        let stability = stability_raw_score(aggregates.ewma_rtt_ms, aggregates.fraction_lost);
        self.scores.push_stability(
            stability,
            serde_json::json!({
                "rttMs": aggregates.ewma_rtt_ms,
                "fractionLost": aggregates.fraction_lost,
            }),
        );
    }

    pub fn connection_score(&self) -> CalculatedScore {
        self.scores.connection_score()
    }

    pub fn track_scores(&self) -> impl Iterator<Item = (&String, CalculatedScore)> {
        self.scores.track_scores()
    }

    pub fn drain_events(&mut self) -> Vec<MonitorEvent> {
        self.outbox.drain_events()
    }

    pub fn drain_issues(&mut self) -> Vec<Issue> {
        self.outbox.drain_issues()
    }

    /// Assemble the wire-shaped sample of the current entity graph.
    pub fn create_sample(&self) -> ConnectionSample {
        ConnectionSample::assemble(
            &self.connection_id,
            self.now_ms,
            &self.stores,
            self.connection_score().value,
        )
    }
}
