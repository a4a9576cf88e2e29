//! Tahoe congestion state machine.
//!
//! [`CongestionWindow`] owns `cwnd`, `ssthresh`, the duplicate-ACK counter and
//! the current [`CongestionState`]. Each [`CongestionEvent`] has its own
//! transition function; the window clamp runs once, after whichever
//! transition fired.

use std::fmt;

use tracing::info;

use crate::core::constants::{DUP_ACK_THRESHOLD, MIN_WINDOW};

/// Congestion control phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CongestionState {
    /// Exponential growth: one segment per new ACK.
    #[default]
    SlowStart,
    /// Additive growth: `1 / cwnd` segments per new ACK.
    CongestionAvoidance,
    /// After a fast retransmit, until the next new ACK.
    FastRecovery,
}

impl fmt::Display for CongestionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CongestionState::SlowStart => "slow-start",
            CongestionState::CongestionAvoidance => "congestion-avoidance",
            CongestionState::FastRecovery => "fast-recovery",
        };
        f.write_str(name)
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionEvent {
    /// Cumulative ACK that advanced past everything acknowledged before.
    NewAck,
    /// ACK at or below the highest acknowledged sequence number.
    DuplicateAck,
    /// Retransmission timer expired.
    Timeout,
    /// Transmission lost before it entered the window.
    Loss,
}

/// What a single event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// State before the event.
    pub from: CongestionState,
    /// State after the event.
    pub to: CongestionState,
    /// Whether the event crossed the duplicate-ACK threshold.
    pub fast_retransmit: bool,
}

impl Transition {
    /// Check if the state changed.
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Congestion window and slow-start threshold, in segments.
#[derive(Debug, Clone)]
pub struct CongestionWindow {
    state: CongestionState,
    cwnd: f64,
    ssthresh: f64,
    dup_acks: u32,
    max_cwnd: f64,
}

impl CongestionWindow {
    /// Start in slow start with the given window, threshold and ceiling.
    pub fn new(initial_cwnd: u32, ssthresh: u32, max_cwnd: u32) -> Self {
        let mut window = Self {
            state: CongestionState::SlowStart,
            cwnd: f64::from(initial_cwnd),
            ssthresh: f64::from(ssthresh),
            dup_acks: 0,
            max_cwnd: f64::from(max_cwnd).max(MIN_WINDOW),
        };
        window.clamp();
        window
    }

    /// Feed one event through the state machine.
    pub fn on_event(&mut self, event: CongestionEvent) -> Transition {
        let from = self.state;
        let fast_retransmit = match event {
            CongestionEvent::NewAck => {
                self.on_new_ack();
                false
            }
            CongestionEvent::DuplicateAck => self.on_duplicate_ack(),
            CongestionEvent::Timeout | CongestionEvent::Loss => {
                self.collapse(CongestionState::SlowStart);
                false
            }
        };
        self.clamp();

        let transition = Transition {
            from,
            to: self.state,
            fast_retransmit,
        };
        if transition.changed_state() {
            info!(
                from = %transition.from,
                to = %transition.to,
                ?event,
                cwnd = self.cwnd,
                ssthresh = self.ssthresh,
                "congestion state change"
            );
        }
        transition
    }

    fn on_new_ack(&mut self) {
        self.dup_acks = 0;
        match self.state {
            CongestionState::SlowStart => {
                self.cwnd += 1.0;
                if self.cwnd >= self.ssthresh {
                    self.state = CongestionState::CongestionAvoidance;
                }
            }
            CongestionState::CongestionAvoidance => {
                self.cwnd += 1.0 / self.cwnd;
            }
            CongestionState::FastRecovery => {
                self.cwnd = self.ssthresh;
                self.state = CongestionState::CongestionAvoidance;
            }
        }
    }

    /// Returns `true` on the ACK that reaches the threshold, and only that one.
    fn on_duplicate_ack(&mut self) -> bool {
        self.dup_acks = self.dup_acks.saturating_add(1);
        if self.dup_acks == DUP_ACK_THRESHOLD {
            self.collapse(CongestionState::FastRecovery);
            true
        } else {
            false
        }
    }

    /// Halve the threshold, shrink to one segment and enter `state`.
    fn collapse(&mut self, state: CongestionState) {
        self.ssthresh = (self.cwnd / 2.0).floor();
        self.cwnd = MIN_WINDOW;
        self.state = state;
    }

    fn clamp(&mut self) {
        self.cwnd = self.cwnd.clamp(MIN_WINDOW, self.max_cwnd);
    }

    /// Current phase.
    pub fn state(&self) -> CongestionState {
        self.state
    }

    /// Congestion window in segments.
    pub fn cwnd(&self) -> f64 {
        self.cwnd
    }

    /// Slow-start threshold in segments.
    pub fn ssthresh(&self) -> f64 {
        self.ssthresh
    }

    /// Consecutive duplicate ACKs since the last new ACK.
    pub fn dup_acks(&self) -> u32 {
        self.dup_acks
    }
}
