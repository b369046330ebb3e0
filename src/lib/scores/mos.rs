//! Closed-form MOS estimators.
//!
//! Audio follows the E-model transmission rating pipeline: equipment and
//! loss impairments plus a delay impairment are subtracted from a rating
//! of 100, and the rating maps onto the 1..5 MOS scale. Video uses a
//! bits-per-pixel-per-frame log curve.
//!
//! All results are rounded to two decimals so downstream consumers see
//! stable values across platforms.

/// Fixed processing delay (codec + network stack), in ms.
const BASE_DELAY_MS: f64 = 20.0;
/// Extra equipment impairment when discontinuous transmission is on.
const DTX_IMPAIRMENT: f64 = 8.0;
/// Loss robustness factor; doubled when forward error correction is used.
const BPL_DEFAULT: f64 = 10.0;
const BPL_FEC: f64 = 20.0;
/// One-way delay above which the delay impairment grows steeply.
const DELAY_KNEE_MS: f64 = 177.3;

/// Inputs of the audio estimator, all per-interval observations.
#[derive(Debug, Clone, Copy)]
pub struct AudioMosInput {
    /// Receiving or sending bitrate in bits per second.
    pub bitrate: f64,
    /// Packet loss in percent (0..100).
    pub packet_loss_pct: f64,
    /// Average jitter buffer delay in ms.
    pub buffer_delay_ms: f64,
    /// Round-trip time in ms.
    pub rtt_ms: f64,
    pub dtx: bool,
    pub fec: bool,
}

/// E-model derived audio MOS in `[1, 5]`.
pub fn audio_mos(input: AudioMosInput) -> f64 {
    if input.bitrate <= 0.0 {
        return 1.0;
    }

    let delay = BASE_DELAY_MS + input.buffer_delay_ms + input.rtt_ms / 2.0;

    let mut equipment_impairment = (55.0 - 4.6 * input.bitrate.ln()).clamp(0.0, 30.0);
    if input.dtx {
        equipment_impairment += DTX_IMPAIRMENT;
    }

    let bpl = if input.fec { BPL_FEC } else { BPL_DEFAULT };
    let loss = input.packet_loss_pct.max(0.0);
    let loss_impairment =
        equipment_impairment + (95.0 - equipment_impairment) * loss / (loss + bpl);

    let delay_impairment = if delay > DELAY_KNEE_MS {
        0.024 * delay + 0.11 * (delay - DELAY_KNEE_MS)
    } else {
        0.024 * delay
    };

    let rating = (100.0 - loss_impairment - delay_impairment).clamp(0.0, 100.0);
    let mos = 1.0 + 0.035 * rating + 7e-6 * rating * (rating - 60.0) * (100.0 - rating);
    round2(mos.clamp(1.0, 5.0))
}

/// Bits-per-pixel-per-frame log curve for inbound video, in `[1, 5]`.
///
/// `bppf = bitrate / (width * height * fps)`; the curve saturates near 5
/// above ~0.3 bppf and bottoms out at 1 as the stream starves.
pub fn video_mos(bitrate: f64, width: u32, height: u32, frames_per_second: f64) -> f64 {
    let pixels = width as f64 * height as f64;
    if bitrate <= 0.0 || pixels <= 0.0 || frames_per_second <= 0.0 {
        return 1.0;
    }
    let bppf = bitrate / (pixels * frames_per_second);
    let mos = 1.0 + 2.7 * (1.0 + 10.0 * bppf).ln();
    round2(mos.clamp(1.0, 5.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
