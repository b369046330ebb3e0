//! Client-level monitoring.
//!
//! A client owns one coordinator per connection and composes their
//! outputs: samples, drained events/issues and the client score.

use rustc_hash::FxHashMap;
use tracing::*;

use crate::config::MonitorConfig;
use crate::connection::ConnectionCoordinator;
use crate::error::{MonitorError, Result};
use crate::events::{Issue, MonitorEvent};
use crate::records::RawRecord;
use crate::sample::ClientSample;
use crate::scores::{compose_scores, CalculatedScore};

/// Contract of a raw-stats collaborator. The crate never polls anything
/// itself; an embedding application implements this against its stats
/// acquisition layer and feeds the result to [`ClientMonitor::accept`].
///
/// Teardown policy belongs to the collaborator too: the conventional
/// signal for giving up on a connection is three consecutive `poll`
/// failures, after which the collaborator stops reporting the connection
/// and the sweep collects its entities.
pub trait StatsSource {
    /// Connection this source reports for.
    fn connection_id(&self) -> &str;

    /// Produce the next report batch.
    fn poll(&mut self) -> anyhow::Result<Vec<RawRecord>>;
}

/// Owner of every connection coordinator of one client.
pub struct ClientMonitor {
    config: MonitorConfig,
    connections: FxHashMap<String, ConnectionCoordinator>,
}

impl ClientMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            connections: FxHashMap::default(),
        }
    }

    /// Route one batch to its connection's coordinator, creating the
    /// coordinator on first sight.
    pub fn accept(&mut self, connection_id: &str, batch: Vec<RawRecord>) {
        let coordinator = self
            .connections
            .entry(connection_id.to_owned())
            .or_insert_with(|| {
                debug!(connection = connection_id, "Tracking new connection");
                ConnectionCoordinator::new(connection_id.to_owned(), self.config.clone())
            });
        coordinator.accept(batch);
    }

    /// Drop a connection and everything bound to it. Call when the
    /// collaborator gives up on the connection.
    pub fn close_connection(&mut self, connection_id: &str) -> Result<()> {
        self.connections
            .remove(connection_id)
            .map(|_| ())
            .ok_or_else(|| MonitorError::UnknownConnection(connection_id.to_owned()))
    }

    pub fn connection(&self, connection_id: &str) -> Option<&ConnectionCoordinator> {
        self.connections.get(connection_id)
    }

    pub fn connection_ids(&self) -> impl Iterator<Item = &String> {
        self.connections.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Events of every connection, drained.
    pub fn drain_events(&mut self) -> Vec<MonitorEvent> {
        self.connections
            .values_mut()
            .flat_map(ConnectionCoordinator::drain_events)
            .collect()
    }

    /// Issues of every connection, drained.
    pub fn drain_issues(&mut self) -> Vec<Issue> {
        self.connections
            .values_mut()
            .flat_map(ConnectionCoordinator::drain_issues)
            .collect()
    }

    /// Client score: weight-normalized mean of the defined connection
    /// scores.
    pub fn score(&self) -> Option<f64> {
        let children: Vec<CalculatedScore> = self
            .connections
            .values()
            .map(ConnectionCoordinator::connection_score)
            .collect();
        compose_scores(children.iter())
    }

    /// Assemble the client sample from every connection's sample, in
    /// connection-id order.
    pub fn create_sample(&self) -> ClientSample {
        let mut connections: Vec<_> = self
            .connections
            .values()
            .map(ConnectionCoordinator::create_sample)
            .collect();
        connections.sort_by(|a, b| a.connection_id.cmp(&b.connection_id));
        let timestamp = connections
            .iter()
            .map(|sample| sample.timestamp)
            .fold(0.0, f64::max);
        ClientSample {
            timestamp,
            score: self.score(),
            connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{InboundRtpStats, MediaKind};

    fn inbound_batch(timestamp: f64, bytes: u64) -> Vec<RawRecord> {
        vec![RawRecord::InboundRtp(InboundRtpStats {
            id: "IT01".into(),
            timestamp,
            ssrc: Some(1),
            kind: Some(MediaKind::Audio),
            track_identifier: Some("t".into()),
            bytes_received: Some(bytes),
            ..Default::default()
        })]
    }

    #[test]
    fn test_connections_created_on_demand_and_closed() {
        let mut client = ClientMonitor::new(MonitorConfig::default());
        client.accept("conn-a", inbound_batch(0.0, 100));
        client.accept("conn-b", inbound_batch(0.0, 100));
        assert_eq!(client.connection_ids().count(), 2);

        assert!(client.close_connection("conn-a").is_ok());
        assert!(matches!(
            client.close_connection("conn-a"),
            Err(crate::error::MonitorError::UnknownConnection(id)) if id == "conn-a"
        ));
        assert!(client.connection("conn-a").is_none());
        assert!(client.connection("conn-b").is_some());
    }

    #[test]
    fn test_client_sample_orders_connections() {
        let mut client = ClientMonitor::new(MonitorConfig::default());
        client.accept("conn-b", inbound_batch(2_000.0, 100));
        client.accept("conn-a", inbound_batch(1_000.0, 100));

        let sample = client.create_sample();
        assert_eq!(sample.connections.len(), 2);
        assert_eq!(sample.connections[0].connection_id, "conn-a");
        assert_eq!(sample.connections[1].connection_id, "conn-b");
        assert_eq!(sample.timestamp, 2_000.0);
    }

    #[test]
    fn test_drained_events_cover_all_connections() {
        let mut client = ClientMonitor::new(MonitorConfig::default());
        client.accept("conn-a", inbound_batch(0.0, 100));
        // No anomalies yet: nothing to drain, and draining is idempotent.
        assert!(client.drain_events().is_empty());
        assert!(client.drain_issues().is_empty());
    }
}
