//! TCP Tahoe congestion control.
//!
//! This module implements the sender side of TCP Tahoe for one simulated
//! byte stream:
//!
//! - **State machine**: [`CongestionWindow`] with slow start, congestion
//!   avoidance and fast recovery
//! - **RTT estimation**: [`RttEstimator`] (Jacobson/Karels)
//! - **Send window**: [`SendWindow`] of in-flight [`Segment`]s
//! - **Statistics**: [`StatsRecorder`] and the [`TahoeStats`] snapshot
//! - **Controller**: [`TahoeController`], which ties them together
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │               TahoeController                 │
//! │  send_data / receive_ack / handle_timeout     │
//! ├───────────┬───────────┬───────────┬───────────┤
//! │ Congestion│    RTT    │   Send    │   Stats   │
//! │  Window   │ Estimator │  Window   │ Recorder  │
//! ├───────────┴───────────┴───────────┴───────────┤
//! │        LossSource            Clock            │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! No sockets and no framing: segments are byte ranges, and the caller
//! decides when acknowledgments and timeouts happen.

mod clock;
mod controller;
mod delayed_ack;
mod loss;
mod state;
mod stats;
mod timing;
mod window;

#[cfg(feature = "simulation")]
pub use clock::TokioClock;
pub use clock::{ManualClock, SystemClock};
pub use controller::{AckOutcome, SendOutcome, SentSegment, TahoeController};
pub use delayed_ack::DelayedAckTracker;
#[cfg(feature = "random")]
pub use loss::RandomLoss;
pub use loss::{NeverLose, ScriptedLoss};
pub use state::{CongestionEvent, CongestionState, CongestionWindow, Transition};
pub use stats::{Counters, StatsRecorder, TahoeStats};
pub use timing::RttEstimator;
pub use window::{Segment, SendWindow};
