//! RTT estimation.
//!
//! Implements the Jacobson/Karels smoothed RTT estimator with real-valued
//! intermediates, plus an exponential RTO backoff that accumulates across
//! timeouts.

use std::time::Duration;

use crate::core::constants::{RTO_BACKOFF, RTO_K, RTTVAR_BETA, SRTT_ALPHA};

/// Jacobson/Karels RTT estimator.
///
/// Maintains smoothed RTT (SRTT) and RTT variance (RTTVAR) in milliseconds,
/// and derives the Retransmission Timeout (RTO) from them.
///
/// Until the first sample arrives the estimator is seeded from the configured
/// initial RTT so that a sensible RTO exists; the first real sample replaces
/// the seed outright.
///
/// Every timeout doubles the backoff multiplier. The multiplier stays in force
/// across later samples, so `rto = (srtt + 4 * rttvar) * 2^backoffs` with no
/// upper bound.
#[derive(Debug, Clone)]
pub struct RttEstimator {
    /// Smoothed RTT in milliseconds.
    srtt: f64,
    /// RTT variance in milliseconds.
    rttvar: f64,
    /// Current retransmission timeout in milliseconds.
    rto: f64,
    /// Most recent raw sample in milliseconds.
    latest: Option<f64>,
    /// Timeouts seen so far.
    backoffs: u32,
    /// Whether we've received the first RTT sample.
    initialized: bool,
}

impl RttEstimator {
    /// Create an estimator seeded from `initial_rtt`.
    pub fn new(initial_rtt: Duration) -> Self {
        let seed = as_millis_f64(initial_rtt);
        let mut estimator = Self {
            srtt: seed,
            rttvar: seed / 2.0,
            rto: 0.0,
            latest: None,
            backoffs: 0,
            initialized: false,
        };
        estimator.recompute_rto();
        estimator
    }

    /// Update the estimate with a new sample.
    ///
    /// - First measurement: SRTT = sample, RTTVAR = sample / 2
    /// - Subsequent: RTTVAR = 0.75 * RTTVAR + 0.25 * |SRTT - sample|,
    ///   then SRTT = 0.875 * SRTT + 0.125 * sample
    pub fn update(&mut self, sample: Duration) {
        let sample_ms = as_millis_f64(sample);

        if !self.initialized {
            self.srtt = sample_ms;
            self.rttvar = sample_ms / 2.0;
            self.initialized = true;
        } else {
            // RTTVAR uses the SRTT from before this sample.
            self.rttvar =
                (1.0 - RTTVAR_BETA) * self.rttvar + RTTVAR_BETA * (self.srtt - sample_ms).abs();
            self.srtt = (1.0 - SRTT_ALPHA) * self.srtt + SRTT_ALPHA * sample_ms;
        }

        self.latest = Some(sample_ms);
        self.recompute_rto();
    }

    /// Double the RTO after a retransmission timeout.
    ///
    /// Returns the new RTO.
    pub fn backoff(&mut self) -> Duration {
        self.backoffs = self.backoffs.saturating_add(1);
        self.recompute_rto();
        self.rto()
    }

    fn recompute_rto(&mut self) {
        let base = self.srtt + RTO_K * self.rttvar;
        let exponent = i32::try_from(self.backoffs).unwrap_or(i32::MAX);
        self.rto = base * RTO_BACKOFF.powi(exponent);
    }

    /// Smoothed RTT in milliseconds.
    pub fn srtt_ms(&self) -> f64 {
        self.srtt
    }

    /// RTT variance in milliseconds.
    pub fn rttvar_ms(&self) -> f64 {
        self.rttvar
    }

    /// Retransmission timeout in milliseconds.
    pub fn rto_ms(&self) -> f64 {
        self.rto
    }

    /// Retransmission timeout, saturating at `u64::MAX` nanoseconds.
    pub fn rto(&self) -> Duration {
        let nanos = (self.rto * 1_000_000.0).round();
        if nanos >= u64::MAX as f64 {
            return Duration::from_nanos(u64::MAX);
        }
        Duration::from_nanos(nanos as u64)
    }

    /// Latest raw sample in milliseconds, if any.
    pub fn latest_ms(&self) -> Option<f64> {
        self.latest
    }

    /// Number of timeouts applied to the RTO.
    pub fn backoffs(&self) -> u32 {
        self.backoffs
    }

    /// Check if the estimator has been initialized with at least one sample.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> RttEstimator {
        RttEstimator::new(Duration::from_millis(100))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rtt_estimator_seeded() {
        let estimator = estimator();
        assert!(!estimator.is_initialized());
        assert!(approx(estimator.srtt_ms(), 100.0));
        assert!(approx(estimator.rttvar_ms(), 50.0));
        assert!(approx(estimator.rto_ms(), 300.0));
        assert_eq!(estimator.latest_ms(), None);
    }

    #[test]
    fn test_rtt_estimator_first_sample_replaces_seed() {
        let mut estimator = RttEstimator::new(Duration::from_millis(500));
        estimator.update(Duration::from_millis(100));

        assert!(estimator.is_initialized());
        assert!(approx(estimator.srtt_ms(), 100.0));
        assert!(approx(estimator.rttvar_ms(), 50.0)); // sample / 2
        assert!(approx(estimator.rto_ms(), 300.0));
        assert_eq!(estimator.latest_ms(), Some(100.0));
    }

    #[test]
    fn test_rtt_estimator_smoothing_uses_real_weights() {
        let mut estimator = estimator();
        estimator.update(Duration::from_millis(100));
        estimator.update(Duration::from_millis(150));

        // rttvar = 0.75 * 50 + 0.25 * |100 - 150|
        assert!(approx(estimator.rttvar_ms(), 50.0));
        // srtt = 0.875 * 100 + 0.125 * 150
        assert!(approx(estimator.srtt_ms(), 106.25));
        assert!(approx(estimator.rto_ms(), 306.25));
        assert_eq!(estimator.latest_ms(), Some(150.0));
    }

    #[test]
    fn test_rtt_estimator_converges() {
        let mut estimator = estimator();
        estimator.update(Duration::from_millis(200));
        for _ in 0..200 {
            estimator.update(Duration::from_millis(40));
        }
        assert!((estimator.srtt_ms() - 40.0).abs() < 0.01);
        assert!(estimator.rttvar_ms() < 0.01);
    }

    #[test]
    fn test_rtt_estimator_backoff_doubles() {
        let mut estimator = estimator();
        estimator.update(Duration::from_millis(100));

        assert_eq!(estimator.rto(), Duration::from_millis(300));
        assert_eq!(estimator.backoff(), Duration::from_millis(600));
        assert_eq!(estimator.backoff(), Duration::from_millis(1200));
        assert_eq!(estimator.backoffs(), 2);
    }

    #[test]
    fn test_rtt_estimator_backoff_survives_samples() {
        let mut estimator = estimator();
        estimator.update(Duration::from_millis(100));
        estimator.backoff();

        estimator.update(Duration::from_millis(100));
        // base = 100 + 4 * 37.5, doubled once
        assert!(approx(estimator.rto_ms(), 500.0));
    }

    #[test]
    fn test_rtt_estimator_backoff_is_unbounded() {
        let mut estimator = estimator();
        let mut previous = estimator.rto();

        for _ in 0..10 {
            let rto = estimator.backoff();
            assert_eq!(rto, previous * 2);
            previous = rto;
        }
        assert_eq!(estimator.rto(), Duration::from_millis(300 * 1024));
    }

    #[test]
    fn test_rtt_estimator_rto_saturates() {
        let mut estimator = estimator();
        for _ in 0..2000 {
            estimator.backoff();
        }

        assert!(estimator.rto_ms().is_infinite());
        assert_eq!(estimator.rto(), Duration::from_nanos(u64::MAX));
    }
}
