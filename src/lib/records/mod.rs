//! Raw stat report records.
//!
//! One report cycle yields a batch of heterogeneous records, each tagged by
//! a `type` string. The browser-facing collector (outside this crate) is
//! free to produce them from any stats source; the only contract is
//! `type + id + timestamp + kind-specific fields`.
//!
//! Unknown record kinds deserialize into [`RawRecord::Unrecognized`] and are
//! counted and dropped by the classifier instead of failing the batch.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Media kind of an RTP stream or media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Reason an outbound encoder is limiting its quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum QualityLimitationReason {
    None,
    Cpu,
    Bandwidth,
    Other,
}

/// One raw stat record, tagged by its declared kind.
///
/// The closed set of known kinds mirrors what live media stacks report for
/// a single connection. The identity key is `id`; RTP stream kinds carry an
/// additional numeric `ssrc` used as a secondary index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawRecord {
    #[serde(rename = "codec")]
    Codec(CodecStats),
    #[serde(rename = "inbound-rtp")]
    InboundRtp(InboundRtpStats),
    #[serde(rename = "outbound-rtp")]
    OutboundRtp(OutboundRtpStats),
    #[serde(rename = "remote-inbound-rtp")]
    RemoteInboundRtp(RemoteInboundRtpStats),
    #[serde(rename = "remote-outbound-rtp")]
    RemoteOutboundRtp(RemoteOutboundRtpStats),
    #[serde(rename = "media-source")]
    MediaSource(MediaSourceStats),
    #[serde(rename = "media-playout")]
    MediaPlayout(MediaPlayoutStats),
    #[serde(rename = "peer-connection")]
    PeerConnection(PeerConnectionStats),
    #[serde(rename = "data-channel")]
    DataChannel(DataChannelStats),
    #[serde(rename = "transport")]
    Transport(TransportStats),
    #[serde(rename = "candidate-pair")]
    CandidatePair(CandidatePairStats),
    #[serde(rename = "local-candidate")]
    LocalCandidate(IceCandidateStats),
    #[serde(rename = "remote-candidate")]
    RemoteCandidate(IceCandidateStats),
    #[serde(rename = "certificate")]
    Certificate(CertificateStats),
    /// Any record kind this crate does not know about.
    #[serde(other)]
    Unrecognized,
}

impl RawRecord {
    /// The declared kind, as its wire name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Codec(_) => "codec",
            Self::InboundRtp(_) => "inbound-rtp",
            Self::OutboundRtp(_) => "outbound-rtp",
            Self::RemoteInboundRtp(_) => "remote-inbound-rtp",
            Self::RemoteOutboundRtp(_) => "remote-outbound-rtp",
            Self::MediaSource(_) => "media-source",
            Self::MediaPlayout(_) => "media-playout",
            Self::PeerConnection(_) => "peer-connection",
            Self::DataChannel(_) => "data-channel",
            Self::Transport(_) => "transport",
            Self::CandidatePair(_) => "candidate-pair",
            Self::LocalCandidate(_) => "local-candidate",
            Self::RemoteCandidate(_) => "remote-candidate",
            Self::Certificate(_) => "certificate",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Primary identity key, when the record carries one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Codec(s) => Some(&s.id),
            Self::InboundRtp(s) => Some(&s.id),
            Self::OutboundRtp(s) => Some(&s.id),
            Self::RemoteInboundRtp(s) => Some(&s.id),
            Self::RemoteOutboundRtp(s) => Some(&s.id),
            Self::MediaSource(s) => Some(&s.id),
            Self::MediaPlayout(s) => Some(&s.id),
            Self::PeerConnection(s) => Some(&s.id),
            Self::DataChannel(s) => Some(&s.id),
            Self::Transport(s) => Some(&s.id),
            Self::CandidatePair(s) => Some(&s.id),
            Self::LocalCandidate(s) => Some(&s.id),
            Self::RemoteCandidate(s) => Some(&s.id),
            Self::Certificate(s) => Some(&s.id),
            Self::Unrecognized => None,
        }
    }

    /// Record timestamp in milliseconds, when the record carries one.
    pub fn timestamp_ms(&self) -> Option<f64> {
        match self {
            Self::Codec(s) => Some(s.timestamp),
            Self::InboundRtp(s) => Some(s.timestamp),
            Self::OutboundRtp(s) => Some(s.timestamp),
            Self::RemoteInboundRtp(s) => Some(s.timestamp),
            Self::RemoteOutboundRtp(s) => Some(s.timestamp),
            Self::MediaSource(s) => Some(s.timestamp),
            Self::MediaPlayout(s) => Some(s.timestamp),
            Self::PeerConnection(s) => Some(s.timestamp),
            Self::DataChannel(s) => Some(s.timestamp),
            Self::Transport(s) => Some(s.timestamp),
            Self::CandidatePair(s) => Some(s.timestamp),
            Self::LocalCandidate(s) => Some(s.timestamp),
            Self::RemoteCandidate(s) => Some(s.timestamp),
            Self::Certificate(s) => Some(s.timestamp),
            Self::Unrecognized => None,
        }
    }
}

/// Codec description. Static per negotiation, no counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CodecStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_type: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clock_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp_fmtp_line: Option<String>,
}

/// Receive side of one RTP stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct InboundRtpStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,
    /// Id of the remote-outbound-rtp record reporting the sender's view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_lost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_bytes_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    /// Cumulative jitter buffer delay in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_buffer_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter_buffer_emitted_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_packet_received_timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fec_packets_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_samples_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concealed_samples: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent_concealed_samples: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_decoded: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_rendered: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_dropped: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freeze_count: Option<u64>,
    /// Cumulative freeze duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_freezes_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nack_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pli_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fir_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_processing_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_implementation: Option<String>,
}

/// Send side of one RTP stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRtpStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_source_id: Option<String>,
    /// Id of the remote-inbound-rtp record reporting the receiver's view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retransmitted_packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_encoded: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_limitation_reason: Option<QualityLimitationReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nack_count: Option<u64>,
}

/// Remote receiver report for one of our outbound streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RemoteInboundRtpStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec_id: Option<String>,
    /// Id of the local outbound-rtp record this report refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_lost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jitter: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fraction_lost: Option<f64>,
    /// Round-trip time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_round_trip_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip_time_measurements: Option<u64>,
}

/// Remote sender report for one of our inbound streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOutboundRtpStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssrc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    /// Id of the local inbound-rtp record this report refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reports_sent: Option<u64>,
    /// Round-trip time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round_trip_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_round_trip_time: Option<f64>,
}

/// Local capture source feeding outbound streams.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MediaSourceStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_level: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_audio_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo_return_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames_per_second: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u64>,
}

/// Audio playout path statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MediaPlayoutStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<MediaKind>,
    /// Cumulative duration of synthesized (concealment) samples, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesized_samples_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesized_samples_events: Option<u64>,
    /// Cumulative duration of all played samples, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_samples_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_playout_delay: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_samples_count: Option<u64>,
}

/// Whole-connection counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PeerConnectionStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_channels_opened: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_channels_closed: Option<u32>,
}

/// One data channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DataChannelStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_channel_identifier: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
}

/// ICE transport carrying the connection's media.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TransportStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtls_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_candidate_pair_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_candidate_pair_changes: Option<u32>,
}

/// One local/remote ICE address combination considered for transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePairStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packets_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<u64>,
    /// Latest RTT in seconds, from STUN round trips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_round_trip_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_round_trip_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_outgoing_bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_incoming_bitrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests_sent: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_packet_sent_timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_packet_received_timestamp: Option<f64>,
}

/// One local or remote ICE candidate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Transport protocol, `udp` or `tcp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// `host`, `srflx`, `prflx` or `relay`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation: Option<String>,
}

/// DTLS certificate in use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStats {
    pub id: String,
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_certificate_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_kind_roundtrip() {
        let json = r#"{
            "type": "inbound-rtp",
            "id": "IT01A123",
            "timestamp": 1000.0,
            "ssrc": 123456,
            "kind": "audio",
            "trackIdentifier": "track-1",
            "bytesReceived": 9000
        }"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        match &record {
            RawRecord::InboundRtp(stats) => {
                assert_eq!(stats.ssrc, Some(123456));
                assert_eq!(stats.bytes_received, Some(9000));
                assert_eq!(stats.kind, Some(MediaKind::Audio));
            }
            other => panic!("wrong variant: {}", other.kind_name()),
        }
        assert_eq!(record.id(), Some("IT01A123"));
        assert_eq!(record.timestamp_ms(), Some(1000.0));
    }

    #[test]
    fn test_unknown_kind_is_unrecognized() {
        let json = r#"{"type": "quantum-telemetry", "id": "X", "timestamp": 1.0}"#;
        let record: RawRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(record, RawRecord::Unrecognized));
        assert_eq!(record.id(), None);
    }

    #[test]
    fn test_optional_fields_skipped_in_output() {
        let stats = CodecStats {
            id: "C1".into(),
            timestamp: 5.0,
            mime_type: Some("audio/opus".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("mimeType"));
        assert!(!json.contains("payloadType"));
        assert!(!json.contains("clockRate"));
    }
}
