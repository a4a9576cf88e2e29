//! Statistics recording.
//!
//! The recorder keeps cumulative counters and a window-size series keyed by
//! milliseconds since the controller started. Two samples in the same
//! millisecond share a key, and the later one overwrites the earlier.

use std::collections::BTreeMap;
use std::time::Duration;

use super::state::{CongestionState, CongestionWindow};
use super::timing::RttEstimator;

/// Cumulative event counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Segments that entered the send window.
    pub packets_sent: u64,
    /// Loss events recorded.
    pub packets_lost: u64,
    /// Timeout-driven retransmissions.
    pub retransmissions: u64,
    /// Duplicate-ACK-driven retransmissions.
    pub fast_retransmits: u64,
    /// Delayed acknowledgments emitted.
    pub delayed_acks: u64,
    /// Payload bytes sent.
    pub bytes_sent: u64,
    /// Payload bytes cumulatively acknowledged.
    pub bytes_acked: u64,
}

/// Immutable view of a controller's statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TahoeStats {
    /// Segments that entered the send window.
    pub total_packets_sent: u64,
    /// Loss events recorded.
    pub total_packets_lost: u64,
    /// Timeout-driven retransmissions.
    pub total_retransmissions: u64,
    /// Congestion window in whole segments, unscaled.
    pub current_window_size: u32,
    /// Latest RTT sample in milliseconds; 0 when none since the last reset.
    pub current_rtt_ms: f64,
    /// Smoothed RTT in milliseconds.
    pub srtt_ms: f64,
    /// RTT variance in milliseconds.
    pub rttvar_ms: f64,
    /// Retransmission timeout in milliseconds.
    pub rto_ms: f64,
    /// Payload bytes sent.
    pub total_bytes_sent: u64,
    /// Payload bytes cumulatively acknowledged.
    pub total_bytes_acked: u64,
    /// Delayed acknowledgments emitted.
    pub total_delayed_acks: u64,
    /// Duplicate-ACK-driven retransmissions.
    pub total_fast_retransmits: u64,
    /// Current congestion phase.
    pub current_state: CongestionState,
    /// Milliseconds since start → effective window size.
    pub window_size_history: BTreeMap<u64, u32>,
}

/// Counters plus the window-size series.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    counters: Counters,
    latest_rtt_ms: Option<f64>,
    history: BTreeMap<u64, u32>,
}

impl StatsRecorder {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_sent(&mut self, bytes: u32) {
        self.counters.packets_sent += 1;
        self.counters.bytes_sent += u64::from(bytes);
    }

    pub(crate) fn on_lost(&mut self) {
        self.counters.packets_lost += 1;
    }

    pub(crate) fn on_retransmission(&mut self) {
        self.counters.retransmissions += 1;
    }

    pub(crate) fn on_fast_retransmit(&mut self) {
        self.counters.fast_retransmits += 1;
    }

    pub(crate) fn on_delayed_ack(&mut self) {
        self.counters.delayed_acks += 1;
    }

    pub(crate) fn on_acked(&mut self, bytes: u64) {
        self.counters.bytes_acked += bytes;
    }

    pub(crate) fn on_rtt_sample(&mut self, sample_ms: f64) {
        self.latest_rtt_ms = Some(sample_ms);
    }

    /// Record a window-size sample taken `elapsed` after the controller started.
    pub(crate) fn record_window(&mut self, elapsed: Duration, size: u32) {
        let key = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.history.insert(key, size);
    }

    /// Clear counters, the latest RTT sample and the series.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Cumulative counters.
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Window sizes in chronological order, without timestamps.
    pub fn window_sizes(&self) -> Vec<u32> {
        self.history.values().copied().collect()
    }

    /// Combine the counters with live controller state.
    pub(crate) fn snapshot(&self, window: &CongestionWindow, rtt: &RttEstimator) -> TahoeStats {
        let c = &self.counters;
        TahoeStats {
            total_packets_sent: c.packets_sent,
            total_packets_lost: c.packets_lost,
            total_retransmissions: c.retransmissions,
            current_window_size: window.cwnd().floor() as u32,
            current_rtt_ms: self.latest_rtt_ms.unwrap_or(0.0),
            srtt_ms: rtt.srtt_ms(),
            rttvar_ms: rtt.rttvar_ms(),
            rto_ms: rtt.rto_ms(),
            total_bytes_sent: c.bytes_sent,
            total_bytes_acked: c.bytes_acked,
            total_delayed_acks: c.delayed_acks,
            total_fast_retransmits: c.fast_retransmits,
            current_state: window.state(),
            window_size_history: self.history.clone(),
        }
    }
}
