//! Quality scores.
//!
//! Every scorable unit (inbound/outbound track, connection, client) keeps
//! a bounded history of per-cycle raw scores in `[0, 5]` and publishes the
//! linearly-weighted mean once enough history exists. Raw scores come
//! from the MOS estimators in [`mos`] and from the connection stability
//! penalty model; parents compose their children as weight-normalized
//! means that simply exclude children without a value yet.

pub mod mos;

use ringbuffer::{AllocRingBuffer, RingBuffer};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::ScoringConfig;

/// A published score: smoothing weight, the bounded value once available,
/// and an opaque breakdown of how it was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedScore {
    pub weight: f64,
    pub value: Option<f64>,
    pub detail: serde_json::Value,
}

impl CalculatedScore {
    pub fn undefined(weight: f64) -> Self {
        Self {
            weight,
            value: None,
            detail: serde_json::Value::Null,
        }
    }
}

/// Linearly-weighted mean over a window, weight = 1-based position, so
/// the most recent sample weighs the most.
fn weighted_mean(window: &AllocRingBuffer<f64>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (position, value) in window.iter().enumerate() {
        let weight = (position + 1) as f64;
        weighted_sum += weight * value;
        weight_total += weight;
    }
    weighted_sum / weight_total.max(1.0)
}

/// Bounded raw-score history for one scorable unit.
#[derive(Debug)]
struct ScoreWindow {
    history: AllocRingBuffer<f64>,
    min_samples: usize,
    last_detail: serde_json::Value,
}

impl ScoreWindow {
    fn new(config: &ScoringConfig) -> Self {
        Self {
            history: AllocRingBuffer::new(config.window_length),
            min_samples: config.min_window_length,
            last_detail: serde_json::Value::Null,
        }
    }

    fn push(&mut self, raw: f64, detail: serde_json::Value) {
        self.history.push(raw.clamp(0.0, 5.0));
        self.last_detail = detail;
    }

    fn value(&self) -> Option<f64> {
        (self.history.len() >= self.min_samples).then(|| weighted_mean(&self.history))
    }

    fn score(&self) -> CalculatedScore {
        CalculatedScore {
            weight: 1.0,
            value: self.value(),
            detail: self.last_detail.clone(),
        }
    }
}

/// Connection stability raw score: penalties subtracted from 5.0,
/// floored at 0.
pub fn stability_raw_score(rtt_ms: Option<f64>, fraction_lost: f64) -> f64 {
    let mut penalty: f64 = 0.0;
    if let Some(rtt) = rtt_ms {
        if rtt > 300.0 {
            penalty += 2.0;
        } else if rtt > 150.0 {
            penalty += 1.0;
        }
    }
    if fraction_lost >= 0.2 {
        penalty += 5.0;
    } else if fraction_lost >= 0.05 {
        penalty += 2.0;
    } else if fraction_lost > 0.0 {
        penalty += 1.0;
    }
    (5.0 - penalty).max(0.0)
}

/// Weight-normalized mean of defined children; `None` when no child has
/// a value yet.
pub fn compose_scores<'a>(children: impl Iterator<Item = &'a CalculatedScore>) -> Option<f64> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for child in children {
        if let Some(value) = child.value {
            weighted_sum += child.weight * value;
            weight_total += child.weight;
        }
    }
    (weight_total > 0.0).then(|| weighted_sum / weight_total)
}

/// All score windows of one connection, keyed by monitor id.
#[derive(Debug)]
pub struct ScoreBook {
    config: ScoringConfig,
    inbound_tracks: FxHashMap<String, ScoreWindow>,
    outbound_tracks: FxHashMap<String, ScoreWindow>,
    connection: ScoreWindow,
}

impl ScoreBook {
    pub fn new(config: &ScoringConfig) -> Self {
        let config = config.normalized();
        Self {
            connection: ScoreWindow::new(&config),
            inbound_tracks: FxHashMap::default(),
            outbound_tracks: FxHashMap::default(),
            config,
        }
    }

    pub fn push_inbound(&mut self, key: &str, raw: f64, detail: serde_json::Value) {
        self.inbound_tracks
            .entry(key.to_owned())
            .or_insert_with(|| ScoreWindow::new(&self.config))
            .push(raw, detail);
    }

    pub fn push_outbound(&mut self, key: &str, raw: f64, detail: serde_json::Value) {
        self.outbound_tracks
            .entry(key.to_owned())
            .or_insert_with(|| ScoreWindow::new(&self.config))
            .push(raw, detail);
    }

    pub fn push_stability(&mut self, raw: f64, detail: serde_json::Value) {
        self.connection.push(raw, detail);
    }

    /// Drop windows whose entity is gone; history dies with the entity.
    pub fn retain(&mut self, mut alive: impl FnMut(&str) -> bool) {
        self.inbound_tracks.retain(|key, _| alive(key));
        self.outbound_tracks.retain(|key, _| alive(key));
    }

    pub fn inbound_score(&self, key: &str) -> Option<CalculatedScore> {
        self.inbound_tracks.get(key).map(ScoreWindow::score)
    }

    pub fn outbound_score(&self, key: &str) -> Option<CalculatedScore> {
        self.outbound_tracks.get(key).map(ScoreWindow::score)
    }

    pub fn track_scores(&self) -> impl Iterator<Item = (&String, CalculatedScore)> {
        self.inbound_tracks
            .iter()
            .chain(self.outbound_tracks.iter())
            .map(|(key, window)| (key, window.score()))
    }

    /// Connection score: stability window composed with every track
    /// window, weight-normalized, children without a value excluded.
    pub fn connection_score(&self) -> CalculatedScore {
        let stability = self.connection.score();
        let children: Vec<CalculatedScore> = std::iter::once(stability.clone())
            .chain(self.track_scores().map(|(_, score)| score))
            .collect();
        let value = compose_scores(children.iter());
        CalculatedScore {
            weight: 1.0,
            value,
            detail: serde_json::json!({
                "stability": stability.value,
                "trackCount": children.len() - 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScoringConfig {
        ScoringConfig {
            window_length: 10,
            min_window_length: 5,
        }
    }

    #[test]
    fn test_stability_penalties() {
        assert_eq!(stability_raw_score(None, 0.0), 5.0);
        assert_eq!(stability_raw_score(Some(100.0), 0.0), 5.0);
        assert_eq!(stability_raw_score(Some(200.0), 0.0), 4.0);
        assert_eq!(stability_raw_score(Some(400.0), 0.0), 3.0);
        assert_eq!(stability_raw_score(None, 0.01), 4.0);
        assert_eq!(stability_raw_score(None, 0.1), 3.0);
        assert_eq!(stability_raw_score(None, 0.25), 0.0);
        // Penalties stack and floor at zero.
        assert_eq!(stability_raw_score(Some(400.0), 0.25), 0.0);
    }

    #[test]
    fn test_no_value_before_min_history() {
        let mut book = ScoreBook::new(&config());
        for _ in 0..4 {
            book.push_inbound("t1", 4.0, serde_json::Value::Null);
        }
        assert!(book.inbound_score("t1").unwrap().value.is_none());
        book.push_inbound("t1", 4.0, serde_json::Value::Null);
        let score = book.inbound_score("t1").unwrap();
        assert!((score.value.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_favors_recent() {
        let mut book = ScoreBook::new(&config());
        for _ in 0..5 {
            book.push_inbound("t1", 1.0, serde_json::Value::Null);
        }
        for _ in 0..5 {
            book.push_inbound("t1", 5.0, serde_json::Value::Null);
        }
        let value = book.inbound_score("t1").unwrap().value.unwrap();
        // Plain mean would be 3.0; recent 5.0s must pull it above that.
        assert!(value > 3.0);
        assert!(value < 5.0);
    }

    #[test]
    fn test_undefined_children_excluded_from_composition() {
        let defined = CalculatedScore {
            weight: 2.0,
            value: Some(4.0),
            detail: serde_json::Value::Null,
        };
        let undefined = CalculatedScore::undefined(10.0);
        let composed = compose_scores([&defined, &undefined].into_iter()).unwrap();
        assert_eq!(composed, 4.0);
        assert!(compose_scores([&undefined].into_iter()).is_none());
    }

    #[test]
    fn test_retain_drops_dead_windows() {
        let mut book = ScoreBook::new(&config());
        for _ in 0..5 {
            book.push_inbound("dead", 3.0, serde_json::Value::Null);
        }
        book.retain(|key| key != "dead");
        assert!(book.inbound_score("dead").is_none());
    }
}
