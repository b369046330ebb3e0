//! Real-time media connection statistics monitoring.
//!
//! Feed periodic raw stat-report batches in, get a garbage-collected
//! entity graph, per-interval derived metrics, anomaly events/issues and
//! smoothed quality scores out. Everything is synchronous and
//! cycle-driven; acquisition, transport and config loading belong to the
//! embedding application.

pub mod client;
pub mod config;
pub mod connection;
pub mod detectors;
pub mod error;
pub mod events;
pub mod monitors;
pub mod records;
pub mod sample;
pub mod scores;
pub mod store;

pub use client::{ClientMonitor, StatsSource};
pub use config::MonitorConfig;
pub use connection::{ConnectionAggregates, ConnectionCoordinator, EntityStores};
pub use error::{MonitorError, Result};
pub use events::{EventOutbox, Issue, IssueKind, MonitorEvent};
pub use records::RawRecord;
pub use sample::{ClientSample, ConnectionSample};
pub use scores::CalculatedScore;
