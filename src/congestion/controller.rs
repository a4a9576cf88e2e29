//! The Tahoe congestion controller.
//!
//! [`TahoeController`] owns one connection's send window, RTT estimator,
//! congestion state, delayed-ACK tracker and statistics. Callers drive it
//! synchronously: nothing here blocks, spawns or sleeps, and timers are the
//! caller's job (see [`TahoeController::is_rto_expired`]).

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::clock::SystemClock;
use super::delayed_ack::DelayedAckTracker;
use super::state::{CongestionEvent, CongestionState, CongestionWindow};
use super::stats::{StatsRecorder, TahoeStats};
use super::timing::RttEstimator;
use super::window::{Segment, SendWindow};
use crate::core::{Clock, LossSource, TahoeConfig, TahoeError, TahoeResult};

#[cfg(feature = "random")]
type DefaultLoss = super::loss::RandomLoss;
#[cfg(not(feature = "random"))]
type DefaultLoss = super::loss::NeverLose;

/// A segment accepted by [`TahoeController::send_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentSegment {
    /// Byte offset of the first payload byte.
    pub seq: u32,
    /// Payload length in bytes.
    pub len: u32,
    /// Acknowledgment number that covers exactly this segment.
    pub end_seq: u32,
}

/// Result of offering a payload to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Segment entered the send window.
    Sent(SentSegment),
    /// Window occupancy already at `cwnd * window_scale`; nothing changed.
    WindowFull,
    /// Transmission was lost; the window collapsed and nothing was enqueued.
    LossSimulated,
}

impl SendOutcome {
    /// Check if the segment entered the send window.
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent(_))
    }

    /// The accepted segment, if any.
    pub fn segment(&self) -> Option<SentSegment> {
        match self {
            SendOutcome::Sent(segment) => Some(*segment),
            _ => None,
        }
    }
}

/// Result of processing an acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AckOutcome {
    /// New cumulative acknowledgment.
    Advanced {
        /// Payload bytes released from the send window.
        bytes_acked: u64,
        /// Segments released from the send window.
        segments_acked: usize,
        /// RTT measured for a segment ending exactly at the ACK.
        rtt_sample: Option<Duration>,
    },
    /// Non-advancing acknowledgment below the retransmit threshold.
    Duplicate {
        /// Consecutive duplicates so far, this one included.
        count: u32,
    },
    /// Third consecutive duplicate: window collapsed and head retransmitted.
    FastRetransmit {
        /// Segment handed back for retransmission, if any was in flight.
        retransmitted: Option<Segment>,
    },
}

impl AckOutcome {
    /// Check if the acknowledgment advanced the window.
    pub fn is_advancing(&self) -> bool {
        matches!(self, AckOutcome::Advanced { .. })
    }
}

/// TCP Tahoe sender for one logical byte stream.
///
/// `L` decides simulated losses and `C` supplies time; both are owned per
/// instance so connections never share hidden state.
///
/// # Example
///
/// ```
/// use tahoe_cc::congestion::{CongestionState, ManualClock, NeverLose, TahoeController};
/// use tahoe_cc::core::TahoeConfig;
///
/// let config = TahoeConfig::new().loss_probability(0.0);
/// let mut tcp = TahoeController::with_parts(config, NeverLose, ManualClock::new()).unwrap();
///
/// let sent = tcp.send_data(b"hello").unwrap().segment().unwrap();
/// assert!(tcp.receive_ack(sent.end_seq).unwrap().is_advancing());
/// assert_eq!(tcp.cwnd(), 2.0);
/// assert_eq!(tcp.state(), CongestionState::SlowStart);
/// ```
#[derive(Debug)]
pub struct TahoeController<L = DefaultLoss, C = SystemClock> {
    config: TahoeConfig,
    window: CongestionWindow,
    rtt: RttEstimator,
    send_window: SendWindow,
    delayed_acks: DelayedAckTracker,
    stats: StatsRecorder,
    /// Byte offset assigned to the next segment.
    next_seq: u32,
    /// Highest cumulative acknowledgment seen.
    last_acked_seq: u32,
    /// Last send or retransmission, for the RTO check.
    last_transmission: Option<Instant>,
    started_at: Instant,
    loss: L,
    clock: C,
}

impl TahoeController {
    /// Create a controller with the default loss source and the system clock.
    pub fn new(config: TahoeConfig) -> TahoeResult<Self> {
        Self::with_parts(config, DefaultLoss::default(), SystemClock)
    }
}

impl<L: LossSource, C: Clock> TahoeController<L, C> {
    /// Create a controller with an explicit loss source and clock.
    pub fn with_parts(config: TahoeConfig, loss: L, clock: C) -> TahoeResult<Self> {
        config.validate()?;

        let now = clock.now();
        Ok(Self {
            window: CongestionWindow::new(
                config.initial_window_size,
                config.ssthresh,
                config.max_window_size,
            ),
            rtt: RttEstimator::new(config.initial_rtt),
            send_window: SendWindow::new(),
            delayed_acks: DelayedAckTracker::new(
                config.max_delayed_acks,
                config.delayed_ack_timeout,
                now,
            ),
            stats: StatsRecorder::new(),
            next_seq: 0,
            last_acked_seq: 0,
            last_transmission: None,
            started_at: now,
            config,
            loss,
            clock,
        })
    }

    /// Offer one segment's worth of payload.
    ///
    /// Admission counts segments in flight, not bytes. A simulated loss is
    /// treated as detected immediately and collapses the window through
    /// [`handle_packet_loss`](Self::handle_packet_loss).
    pub fn send_data(&mut self, payload: &[u8]) -> TahoeResult<SendOutcome> {
        if payload.is_empty() {
            return Err(TahoeError::EmptyPayload);
        }
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|&len| len <= self.config.mss)
            .ok_or(TahoeError::SegmentTooLarge {
                len: payload.len(),
                mss: self.config.mss,
            })?;
        let end_seq = self
            .next_seq
            .checked_add(len)
            .ok_or(TahoeError::SequenceSpaceExhausted)?;

        let limit = self.config.scaled_window(self.window.cwnd());
        if self.send_window.len() as f64 >= limit {
            debug!(in_flight = self.send_window.len(), limit, "congestion window full");
            return Ok(SendOutcome::WindowFull);
        }

        if self.loss.is_lost(self.config.loss_probability) {
            warn!(seq = self.next_seq, len, "packet lost during transmission");
            self.stats.on_lost();
            // handle_packet_loss counts this loss again.
            self.handle_packet_loss();
            return Ok(SendOutcome::LossSimulated);
        }

        let now = self.clock.now();
        let seq = self.next_seq;
        self.send_window.push(Segment {
            seq,
            len,
            sent_at: now,
        })?;
        self.next_seq = end_seq;
        self.last_transmission = Some(now);
        self.stats.on_sent(len);
        self.record_window(now);

        debug!(
            seq,
            len,
            cwnd = self.config.scaled_window(self.window.cwnd()),
            state = %self.window.state(),
            "sent segment"
        );
        Ok(SendOutcome::Sent(SentSegment { seq, len, end_seq }))
    }

    /// Process a cumulative acknowledgment.
    ///
    /// ACKs at or below the highest one seen are duplicates; the third in a
    /// row triggers a single fast retransmit. An RTT sample is taken only
    /// when a segment ends exactly at `ack`.
    pub fn receive_ack(&mut self, ack: u32) -> TahoeResult<AckOutcome> {
        if ack > self.next_seq {
            return Err(TahoeError::AckBeyondSent {
                ack,
                next_seq: self.next_seq,
            });
        }

        if ack <= self.last_acked_seq {
            let transition = self.window.on_event(CongestionEvent::DuplicateAck);
            let count = self.window.dup_acks();
            debug!(ack, count, "duplicate ack");

            if transition.fast_retransmit {
                warn!(
                    ack,
                    ssthresh = self.window.ssthresh(),
                    "fast retransmit triggered"
                );
                let retransmitted = self.retransmit_head();
                self.stats.on_fast_retransmit();
                return Ok(AckOutcome::FastRetransmit { retransmitted });
            }
            return Ok(AckOutcome::Duplicate { count });
        }

        let now = self.clock.now();
        let acked = self.send_window.drain_acked(ack);

        let rtt_sample = acked
            .iter()
            .find(|segment| segment.end_seq() == ack)
            .map(|segment| now.duration_since(segment.sent_at));
        if let Some(sample) = rtt_sample {
            self.rtt.update(sample);
            if let Some(latest) = self.rtt.latest_ms() {
                self.stats.on_rtt_sample(latest);
            }
        }

        let bytes_acked: u64 = acked.iter().map(|segment| u64::from(segment.len)).sum();
        self.stats.on_acked(bytes_acked);
        self.last_acked_seq = ack;

        self.window.on_event(CongestionEvent::NewAck);
        self.record_window(now);

        debug!(
            ack,
            cwnd = self.config.scaled_window(self.window.cwnd()),
            rtt_ms = self.rtt.latest_ms(),
            "received ack"
        );
        Ok(AckOutcome::Advanced {
            bytes_acked,
            segments_acked: acked.len(),
            rtt_sample,
        })
    }

    /// Retransmission timer expired.
    ///
    /// Collapses to slow start, doubles the RTO and returns the segment to
    /// retransmit, if any is in flight.
    pub fn handle_timeout(&mut self) -> Option<Segment> {
        self.window.on_event(CongestionEvent::Timeout);
        let retransmitted = self.retransmit_head();
        self.stats.on_retransmission();
        let rto = self.rtt.backoff();

        warn!(
            ssthresh = self.window.ssthresh(),
            rto_ms = rto.as_millis() as u64,
            "retransmission timeout"
        );
        retransmitted
    }

    /// Loss detected before the segment entered the window.
    ///
    /// Collapses to slow start and counts the loss; the send window is left
    /// alone.
    pub fn handle_packet_loss(&mut self) {
        self.window.on_event(CongestionEvent::Loss);
        self.stats.on_lost();
    }

    /// Note a segment received from the peer that still needs an ACK.
    pub fn on_segment_received(&mut self) {
        self.delayed_acks.on_segment_received();
    }

    /// Emit a delayed ACK if enough segments are pending or the delayed-ACK
    /// timeout has run out. Returns whether one was emitted.
    pub fn handle_delayed_ack(&mut self) -> bool {
        let now = self.clock.now();
        if !self.delayed_acks.try_flush(now) {
            return false;
        }
        self.stats.on_delayed_ack();
        debug!("sending delayed ack");
        true
    }

    /// Check if the oldest segment has waited longer than the RTO.
    pub fn is_rto_expired(&self) -> bool {
        if self.send_window.is_empty() {
            return false;
        }
        self.last_transmission
            .is_some_and(|sent| self.clock.now().duration_since(sent) > self.rtt.rto())
    }

    /// Snapshot of counters, RTT values, state and the window series.
    pub fn stats(&self) -> TahoeStats {
        self.stats.snapshot(&self.window, &self.rtt)
    }

    /// Clear counters and the window series; congestion state is kept.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Recorded window sizes, oldest first.
    pub fn window_size_history(&self) -> Vec<u32> {
        self.stats.window_sizes()
    }

    /// Congestion window in segments.
    pub fn cwnd(&self) -> f64 {
        self.window.cwnd()
    }

    /// Slow-start threshold in segments.
    pub fn ssthresh(&self) -> f64 {
        self.window.ssthresh()
    }

    /// Current congestion phase.
    pub fn state(&self) -> CongestionState {
        self.window.state()
    }

    /// Consecutive duplicate ACKs.
    pub fn dup_ack_count(&self) -> u32 {
        self.window.dup_acks()
    }

    /// Highest cumulative acknowledgment seen.
    pub fn last_acked_seq(&self) -> u32 {
        self.last_acked_seq
    }

    /// Byte offset the next segment will get.
    pub fn next_seq(&self) -> u32 {
        self.next_seq
    }

    /// Current retransmission timeout.
    pub fn rto(&self) -> Duration {
        self.rtt.rto()
    }

    /// RTT estimator state.
    pub fn rtt(&self) -> &RttEstimator {
        &self.rtt
    }

    /// Segments in flight.
    pub fn send_window(&self) -> &SendWindow {
        &self.send_window
    }

    /// Configuration in use.
    pub fn config(&self) -> &TahoeConfig {
        &self.config
    }

    fn retransmit_head(&mut self) -> Option<Segment> {
        let segment = self.send_window.front().copied()?;
        self.last_transmission = Some(self.clock.now());
        debug!(seq = segment.seq, len = segment.len, "retransmitting segment");
        Some(segment)
    }

    fn record_window(&mut self, now: Instant) {
        let size = self.config.scaled_window(self.window.cwnd()).floor() as u32;
        self.stats
            .record_window(now.duration_since(self.started_at), size);
    }
}
