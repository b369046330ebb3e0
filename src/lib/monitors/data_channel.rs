//! Monitor for one data channel.

use crate::records::DataChannelStats;

use super::{counter_delta, elapsed_seconds, impl_tracked};

#[derive(Debug)]
pub struct DataChannelMonitor {
    pub stats: DataChannelStats,
    visited: bool,

    pub delta_messages_sent: u64,
    pub delta_bytes_sent: u64,
    pub delta_messages_received: u64,
    pub delta_bytes_received: u64,
}

impl DataChannelMonitor {
    pub fn new(stats: DataChannelStats) -> Self {
        Self {
            stats,
            visited: false,
            delta_messages_sent: 0,
            delta_bytes_sent: 0,
            delta_messages_received: 0,
            delta_bytes_received: 0,
        }
    }

    pub fn accept(&mut self, next: DataChannelStats) {
        if elapsed_seconds(self.stats.timestamp, next.timestamp).is_none() {
            return;
        }
        let prev = &self.stats;
        self.delta_messages_sent = counter_delta(prev.messages_sent, next.messages_sent);
        self.delta_bytes_sent = counter_delta(prev.bytes_sent, next.bytes_sent);
        self.delta_messages_received =
            counter_delta(prev.messages_received, next.messages_received);
        self.delta_bytes_received = counter_delta(prev.bytes_received, next.bytes_received);
        self.stats = next;
    }

    pub fn create_sample(&self) -> DataChannelStats {
        self.stats.clone()
    }
}

impl_tracked!(DataChannelMonitor);
