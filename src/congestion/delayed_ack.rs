//! Delayed acknowledgment bookkeeping.
//!
//! Receivers hold back ACKs so one can cover several segments. An ACK goes
//! out once enough segments are pending, or once the oldest unacknowledged
//! data has waited for the delayed-ACK timeout.

use std::time::{Duration, Instant};

/// Counts received segments awaiting acknowledgment.
#[derive(Debug, Clone)]
pub struct DelayedAckTracker {
    pending: u32,
    max_pending: u32,
    timeout: Duration,
    last_ack: Instant,
}

impl DelayedAckTracker {
    /// Create a tracker whose timeout clock starts at `now`.
    pub fn new(max_pending: u32, timeout: Duration, now: Instant) -> Self {
        Self {
            pending: 0,
            max_pending,
            timeout,
            last_ack: now,
        }
    }

    /// Note one more received segment.
    pub fn on_segment_received(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Check if an ACK is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending >= self.max_pending || now.duration_since(self.last_ack) >= self.timeout
    }

    /// Emit the ACK if one is due; returns whether it was emitted.
    pub fn try_flush(&mut self, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.pending = 0;
        self.last_ack = now;
        true
    }

    /// Segments awaiting acknowledgment.
    pub fn pending(&self) -> u32 {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[test]
    fn test_nothing_pending_never_due() {
        let start = Instant::now();
        let mut tracker = DelayedAckTracker::new(2, TIMEOUT, start);
        assert!(!tracker.try_flush(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_flush_on_count() {
        let start = Instant::now();
        let mut tracker = DelayedAckTracker::new(2, TIMEOUT, start);

        tracker.on_segment_received();
        assert!(!tracker.try_flush(start));
        tracker.on_segment_received();
        assert!(tracker.try_flush(start));
        assert_eq!(tracker.pending(), 0);
    }

    #[test]
    fn test_flush_on_timeout() {
        let start = Instant::now();
        let mut tracker = DelayedAckTracker::new(4, TIMEOUT, start);
        tracker.on_segment_received();

        assert!(!tracker.is_due(start + Duration::from_millis(199)));
        assert!(tracker.try_flush(start + TIMEOUT));
    }

    #[test]
    fn test_timeout_restarts_after_flush() {
        let start = Instant::now();
        let mut tracker = DelayedAckTracker::new(4, TIMEOUT, start);
        tracker.on_segment_received();
        let flushed_at = start + TIMEOUT;
        assert!(tracker.try_flush(flushed_at));

        tracker.on_segment_received();
        assert!(!tracker.is_due(flushed_at + Duration::from_millis(100)));
        assert!(tracker.is_due(flushed_at + TIMEOUT));
    }
}
