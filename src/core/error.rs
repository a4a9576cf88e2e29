//! Error types for the Tahoe engine.
//!
//! Flow-control outcomes (window full, simulated loss, duplicate ACKs) are not
//! errors; they are reported through
//! [`SendOutcome`](crate::congestion::SendOutcome) and
//! [`AckOutcome`](crate::congestion::AckOutcome). The types here cover caller
//! mistakes and configurations the engine cannot run with.

use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A window bound was zero.
    #[error("{field} must be at least one segment")]
    ZeroWindow {
        /// Offending field name.
        field: &'static str,
    },

    /// The initial window is larger than the maximum window.
    #[error("initial window {initial} exceeds maximum window {max}")]
    InitialWindowTooLarge {
        /// Configured initial window.
        initial: u32,
        /// Configured maximum window.
        max: u32,
    },

    /// Maximum segment size was zero.
    #[error("mss must be non-zero")]
    ZeroMss,

    /// Window scale was zero, which would close the window permanently.
    #[error("window scale must be non-zero")]
    ZeroWindowScale,

    /// Initial RTT was zero.
    #[error("initial RTT must be non-zero")]
    ZeroInitialRtt,

    /// Loss probability outside `[0, 1]`.
    #[error("loss probability {0} is outside [0, 1]")]
    InvalidLossProbability(f64),
}

/// Errors returned by controller operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TahoeError {
    /// Configuration rejected at construction.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Zero-length payloads cannot occupy sequence space.
    #[error("payload is empty")]
    EmptyPayload,

    /// Payload larger than one segment.
    #[error("payload of {len} bytes exceeds mss of {mss} bytes")]
    SegmentTooLarge {
        /// Payload length in bytes.
        len: usize,
        /// Configured maximum segment size.
        mss: u32,
    },

    /// The 32-bit byte sequence space is used up.
    #[error("sequence space exhausted")]
    SequenceSpaceExhausted,

    /// Acknowledgment for bytes that were never sent.
    #[error("ack {ack} is beyond next sequence number {next_seq}")]
    AckBeyondSent {
        /// Received acknowledgment number.
        ack: u32,
        /// Next sequence number that would be assigned.
        next_seq: u32,
    },

    /// Segment pushed out of sequence order.
    #[error("segment {seq} does not follow {last}")]
    OutOfOrderSegment {
        /// Sequence number of the rejected segment.
        seq: u32,
        /// Sequence number of the current tail.
        last: u32,
    },
}

impl TahoeError {
    /// Check if this error was caused by the caller's input to a single call,
    /// leaving the controller usable.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TahoeError::EmptyPayload
                | TahoeError::SegmentTooLarge { .. }
                | TahoeError::AckBeyondSent { .. }
        )
    }

    /// Check if this error means the connection cannot carry more data.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TahoeError::Config(_) | TahoeError::SequenceSpaceExhausted
        )
    }
}

/// Result type for controller operations.
pub type TahoeResult<T> = Result<T, TahoeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors() {
        assert!(TahoeError::EmptyPayload.is_caller_error());
        assert!(TahoeError::SegmentTooLarge { len: 2000, mss: 1460 }.is_caller_error());
        assert!(TahoeError::AckBeyondSent { ack: 10, next_seq: 5 }.is_caller_error());

        assert!(!TahoeError::SequenceSpaceExhausted.is_caller_error());
        assert!(!TahoeError::Config(ConfigError::ZeroMss).is_caller_error());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(TahoeError::SequenceSpaceExhausted.is_fatal());
        assert!(TahoeError::Config(ConfigError::ZeroWindowScale).is_fatal());

        assert!(!TahoeError::EmptyPayload.is_fatal());
        assert!(!TahoeError::OutOfOrderSegment { seq: 1, last: 5 }.is_fatal());
    }

    #[test]
    fn test_config_error_converts() {
        let err: TahoeError = ConfigError::InvalidLossProbability(1.5).into();
        assert_eq!(err, TahoeError::Config(ConfigError::InvalidLossProbability(1.5)));
        assert_eq!(
            err.to_string(),
            "configuration error: loss probability 1.5 is outside [0, 1]"
        );
    }

    #[test]
    fn test_display() {
        let err = TahoeError::AckBeyondSent { ack: 42, next_seq: 10 };
        assert_eq!(err.to_string(), "ack 42 is beyond next sequence number 10");
    }
}
