//! Engine constants and configuration defaults.
//!
//! The defaults mirror the classic Tahoe simulation parameters and are what
//! [`TahoeConfig::default`](super::TahoeConfig) hands out.

use std::time::Duration;

// =============================================================================
// CONFIGURATION DEFAULTS
// =============================================================================

/// Initial congestion window (segments).
pub const DEFAULT_INITIAL_WINDOW: u32 = 1;

/// Upper bound on the congestion window (segments).
pub const DEFAULT_MAX_WINDOW: u32 = 64;

/// Maximum segment size (bytes).
pub const DEFAULT_MSS: u32 = 1460;

/// RTT assumed before the first sample.
pub const DEFAULT_INITIAL_RTT: Duration = Duration::from_millis(100);

/// Ceiling on the retransmission timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Probability that a transmission is lost.
pub const DEFAULT_LOSS_PROBABILITY: f64 = 0.1;

/// Initial slow-start threshold (segments).
pub const DEFAULT_SSTHRESH: u32 = 16;

/// Window scaling factor applied to admission control.
pub const DEFAULT_WINDOW_SCALE: u32 = 1;

/// Longest a receiver holds back an acknowledgment.
pub const DEFAULT_DELAYED_ACK_TIMEOUT: Duration = Duration::from_millis(200);

/// Segments received before an acknowledgment is forced out.
pub const DEFAULT_MAX_DELAYED_ACKS: u32 = 2;

// =============================================================================
// RTT ESTIMATION (Jacobson/Karels)
// =============================================================================

/// Alpha for SRTT smoothing (0.125 = 1/8).
pub const SRTT_ALPHA: f64 = 0.125;

/// Beta for RTTVAR smoothing (0.25 = 1/4).
pub const RTTVAR_BETA: f64 = 0.25;

/// K multiplier for RTO calculation.
pub const RTO_K: f64 = 4.0;

/// Multiplier applied to the RTO on every timeout.
pub const RTO_BACKOFF: f64 = 2.0;

// =============================================================================
// CONGESTION CONTROL
// =============================================================================

/// Duplicate acknowledgments that trigger a fast retransmit.
pub const DUP_ACK_THRESHOLD: u32 = 3;

/// Smallest congestion window the controller ever holds (segments).
pub const MIN_WINDOW: f64 = 1.0;
