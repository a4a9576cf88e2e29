//! # Tahoe CC
//!
//! A TCP Tahoe congestion-control engine for simulation and teaching.
//!
//! The engine tracks one logical byte stream from the sender's side. It
//! provides:
//!
//! - **Congestion control**: slow start, congestion avoidance, fast
//!   retransmit and fast recovery, with `ssthresh` halving on loss
//! - **RTT estimation**: Jacobson/Karels smoothing with exponential RTO
//!   backoff
//! - **Loss simulation**: injectable [`LossSource`](core::LossSource), seeded
//!   or scripted
//! - **Statistics**: cumulative counters plus a time-keyed window-size series
//!
//! ## Feature Flags
//!
//! - `random` (default): [`RandomLoss`](congestion::RandomLoss), backed by `rand`
//! - `simulation` (default): tokio-driven [`simulation`] rounds
//!
//! ## Modules
//!
//! - [`core`]: configuration, traits, constants and error types
//! - [`congestion`]: the state machine, RTT estimator, send window and
//!   [`TahoeController`]
//! - [`simulation`]: async round driver (requires `simulation` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use std::time::Duration;
//! use tahoe_cc::prelude::*;
//!
//! let config = TahoeConfig::new()
//!     .ssthresh(4)
//!     .loss_probability(0.0);
//! let clock = ManualClock::new();
//! let mut tcp = TahoeController::with_parts(config, NeverLose, clock.clone())?;
//!
//! for _ in 0..3 {
//!     let sent = tcp.send_data(b"hello")?.segment().expect("window open");
//!     clock.advance(Duration::from_millis(40));
//!     tcp.receive_ack(sent.end_seq)?;
//! }
//!
//! assert_eq!(tcp.state(), CongestionState::CongestionAvoidance);
//! assert_eq!(tcp.stats().total_bytes_acked, 15);
//! # Ok::<(), TahoeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Congestion control engine
pub mod congestion;

// Simulation driver (feature-gated)
#[cfg(feature = "simulation")]
#[cfg_attr(docsrs, doc(cfg(feature = "simulation")))]
pub mod simulation;

/// Prelude module for convenient imports.
pub mod prelude {
    // Configuration, traits and errors
    pub use crate::core::*;

    pub use crate::congestion::{
        AckOutcome, CongestionState, ManualClock, NeverLose, ScriptedLoss, SendOutcome,
        SentSegment, SystemClock, TahoeController, TahoeStats,
    };

    #[cfg(feature = "random")]
    pub use crate::congestion::RandomLoss;

    #[cfg(feature = "simulation")]
    pub use crate::simulation::{Simulation, SimulationConfig, SimulationReport};
}

// Re-export commonly used items at crate root
pub use congestion::{CongestionState, TahoeController, TahoeStats};
pub use core::{ConfigError, TahoeConfig, TahoeError, TahoeResult};
