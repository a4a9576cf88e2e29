//! Controller configuration.

use std::time::Duration;

use super::constants::*;
use super::error::ConfigError;

/// Parameters for a [`TahoeController`](crate::congestion::TahoeController).
///
/// Every field is a plain parameter; [`Default`] supplies the values listed in
/// [`constants`](super::constants). Setters consume and return `self` so a
/// configuration can be built in one expression:
///
/// ```
/// use std::time::Duration;
/// use tahoe_cc::core::TahoeConfig;
///
/// let config = TahoeConfig::new()
///     .max_window_size(16)
///     .ssthresh(8)
///     .window_scale(2)
///     .initial_rtt(Duration::from_millis(80));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TahoeConfig {
    /// Initial congestion window (segments).
    pub initial_window_size: u32,
    /// Maximum congestion window (segments).
    pub max_window_size: u32,
    /// Maximum segment size (bytes).
    pub mss: u32,
    /// RTT assumed before the first sample.
    pub initial_rtt: Duration,
    /// Nominal retransmission timeout, carried as a plain parameter. The
    /// live RTO comes from RTT samples and backoff, and is not bounded by it.
    pub timeout: Duration,
    /// Probability in `[0, 1]` that a transmission is lost.
    pub loss_probability: f64,
    /// Initial slow-start threshold (segments).
    pub ssthresh: u32,
    /// Scale applied to `cwnd` for admission control and the window series.
    pub window_scale: u32,
    /// Longest a receiver holds back an acknowledgment.
    pub delayed_ack_timeout: Duration,
    /// Segments received before an acknowledgment is forced out.
    pub max_delayed_acks: u32,
}

impl Default for TahoeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TahoeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            initial_window_size: DEFAULT_INITIAL_WINDOW,
            max_window_size: DEFAULT_MAX_WINDOW,
            mss: DEFAULT_MSS,
            initial_rtt: DEFAULT_INITIAL_RTT,
            timeout: DEFAULT_TIMEOUT,
            loss_probability: DEFAULT_LOSS_PROBABILITY,
            ssthresh: DEFAULT_SSTHRESH,
            window_scale: DEFAULT_WINDOW_SCALE,
            delayed_ack_timeout: DEFAULT_DELAYED_ACK_TIMEOUT,
            max_delayed_acks: DEFAULT_MAX_DELAYED_ACKS,
        }
    }

    /// Set the initial congestion window.
    pub fn initial_window_size(mut self, segments: u32) -> Self {
        self.initial_window_size = segments;
        self
    }

    /// Set the maximum congestion window.
    pub fn max_window_size(mut self, segments: u32) -> Self {
        self.max_window_size = segments;
        self
    }

    /// Set the maximum segment size.
    pub fn mss(mut self, bytes: u32) -> Self {
        self.mss = bytes;
        self
    }

    /// Set the RTT assumed before the first sample.
    pub fn initial_rtt(mut self, rtt: Duration) -> Self {
        self.initial_rtt = rtt;
        self
    }

    /// Set the nominal retransmission timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the simulated loss probability.
    pub fn loss_probability(mut self, probability: f64) -> Self {
        self.loss_probability = probability;
        self
    }

    /// Set the initial slow-start threshold.
    pub fn ssthresh(mut self, segments: u32) -> Self {
        self.ssthresh = segments;
        self
    }

    /// Set the window scale.
    pub fn window_scale(mut self, scale: u32) -> Self {
        self.window_scale = scale;
        self
    }

    /// Set the delayed-ACK timeout.
    pub fn delayed_ack_timeout(mut self, timeout: Duration) -> Self {
        self.delayed_ack_timeout = timeout;
        self
    }

    /// Set how many segments may be held before an ACK is forced.
    pub fn max_delayed_acks(mut self, segments: u32) -> Self {
        self.max_delayed_acks = segments;
        self
    }

    /// Check that the controller can run with these values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_window_size == 0 {
            return Err(ConfigError::ZeroWindow {
                field: "initial_window_size",
            });
        }
        if self.max_window_size == 0 {
            return Err(ConfigError::ZeroWindow {
                field: "max_window_size",
            });
        }
        if self.initial_window_size > self.max_window_size {
            return Err(ConfigError::InitialWindowTooLarge {
                initial: self.initial_window_size,
                max: self.max_window_size,
            });
        }
        if self.mss == 0 {
            return Err(ConfigError::ZeroMss);
        }
        if self.window_scale == 0 {
            return Err(ConfigError::ZeroWindowScale);
        }
        if self.initial_rtt.is_zero() {
            return Err(ConfigError::ZeroInitialRtt);
        }
        // NaN fails the range check too.
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(ConfigError::InvalidLossProbability(self.loss_probability));
        }
        Ok(())
    }

    /// Effective admission limit in segments for a given `cwnd`.
    pub(crate) fn scaled_window(&self, cwnd: f64) -> f64 {
        cwnd * f64::from(self.window_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TahoeConfig::default();
        assert_eq!(config.initial_window_size, 1);
        assert_eq!(config.max_window_size, 64);
        assert_eq!(config.mss, 1460);
        assert_eq!(config.initial_rtt, Duration::from_millis(100));
        assert_eq!(config.timeout, Duration::from_millis(1000));
        assert_eq!(config.loss_probability, 0.1);
        assert_eq!(config.ssthresh, 16);
        assert_eq!(config.window_scale, 1);
        assert_eq!(config.delayed_ack_timeout, Duration::from_millis(200));
        assert_eq!(config.max_delayed_acks, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_setters_chain() {
        let config = TahoeConfig::new()
            .initial_window_size(2)
            .max_window_size(16)
            .mss(536)
            .loss_probability(0.0)
            .window_scale(2)
            .max_delayed_acks(4);

        assert_eq!(config.initial_window_size, 2);
        assert_eq!(config.max_window_size, 16);
        assert_eq!(config.mss, 536);
        assert_eq!(config.loss_probability, 0.0);
        assert_eq!(config.window_scale, 2);
        assert_eq!(config.max_delayed_acks, 4);
    }

    #[test]
    fn test_rejects_zero_windows() {
        assert_eq!(
            TahoeConfig::new().initial_window_size(0).validate(),
            Err(ConfigError::ZeroWindow {
                field: "initial_window_size"
            })
        );
        assert_eq!(
            TahoeConfig::new().max_window_size(0).validate(),
            Err(ConfigError::ZeroWindow {
                field: "max_window_size"
            })
        );
    }

    #[test]
    fn test_rejects_initial_above_max() {
        let err = TahoeConfig::new()
            .initial_window_size(10)
            .max_window_size(4)
            .validate();
        assert_eq!(
            err,
            Err(ConfigError::InitialWindowTooLarge { initial: 10, max: 4 })
        );
    }

    #[test]
    fn test_rejects_bad_loss_probability() {
        assert!(TahoeConfig::new().loss_probability(-0.1).validate().is_err());
        assert!(TahoeConfig::new().loss_probability(1.01).validate().is_err());
        assert!(TahoeConfig::new().loss_probability(f64::NAN).validate().is_err());
        assert!(TahoeConfig::new().loss_probability(1.0).validate().is_ok());
    }

    #[test]
    fn test_timeout_does_not_constrain_initial_rtt() {
        let config = TahoeConfig::new()
            .initial_rtt(Duration::from_millis(500))
            .timeout(Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_scale_and_mss() {
        assert_eq!(TahoeConfig::new().mss(0).validate(), Err(ConfigError::ZeroMss));
        assert_eq!(
            TahoeConfig::new().window_scale(0).validate(),
            Err(ConfigError::ZeroWindowScale)
        );
        assert_eq!(
            TahoeConfig::new().initial_rtt(Duration::ZERO).validate(),
            Err(ConfigError::ZeroInitialRtt)
        );
    }

    #[test]
    fn test_scaled_window() {
        let config = TahoeConfig::new().window_scale(2);
        assert_eq!(config.scaled_window(3.5), 7.0);
    }
}
