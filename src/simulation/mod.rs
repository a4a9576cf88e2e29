//! Simulation driver.
//!
//! Drives a [`TahoeController`] through rounds the way a sender talking to a
//! lossy peer would: each round offers one payload, waits a random RTT, then
//! either acknowledges the segment or, when the ACK is lost, waits out the
//! RTO, fires the timeout and acknowledges the retransmission one RTT later.
//!
//! Time comes from the tokio timer, so tests run it under paused time and get
//! exact, instant RTTs. The RTO backoff is never reset, so repeated ACK loss
//! stretches the waits quickly; run long simulations under paused time.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::congestion::{
    CongestionState, RandomLoss, SendOutcome, TahoeController, TahoeStats, TokioClock,
};
use crate::core::{TahoeConfig, TahoeError};

/// Simulation errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// Controller construction or operation failed.
    #[error("controller error: {0}")]
    Tahoe(#[from] TahoeError),

    /// Minimum RTT above maximum RTT.
    #[error("rtt range is empty: {min:?} > {max:?}")]
    EmptyRttRange {
        /// Configured minimum.
        min: Duration,
        /// Configured maximum.
        max: Duration,
    },

    /// ACK loss probability outside `[0, 1]`.
    #[error("ack loss probability {0} is outside [0, 1]")]
    InvalidAckLossProbability(f64),

    /// Payload length of zero.
    #[error("payload length must be non-zero")]
    EmptyPayload,
}

/// Parameters of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Rounds to run; each offers one payload.
    pub rounds: usize,
    /// Payload length per round in bytes.
    pub payload_len: usize,
    /// Shortest simulated RTT.
    pub min_rtt: Duration,
    /// Longest simulated RTT.
    pub max_rtt: Duration,
    /// Probability that the ACK for a delivered segment is lost.
    pub ack_loss_probability: f64,
    /// Seed for RTT draws, ACK loss and transmission loss; entropy if unset.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            payload_len: 5,
            min_rtt: Duration::from_millis(50),
            max_rtt: Duration::from_millis(150),
            ack_loss_probability: 0.2,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Check the run parameters.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.min_rtt > self.max_rtt {
            return Err(SimulationError::EmptyRttRange {
                min: self.min_rtt,
                max: self.max_rtt,
            });
        }
        if !(0.0..=1.0).contains(&self.ack_loss_probability) {
            return Err(SimulationError::InvalidAckLossProbability(
                self.ack_loss_probability,
            ));
        }
        if self.payload_len == 0 {
            return Err(SimulationError::EmptyPayload);
        }
        Ok(())
    }
}

/// What happened to a round's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// Delivered and acknowledged.
    Acked,
    /// Delivered, ACK lost, recovered by timeout and retransmission.
    RecoveredByTimeout,
    /// Lost on the way out.
    SendLost,
    /// Rejected by the congestion window.
    WindowFull,
}

/// One round's outcome and the controller state after it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    /// Zero-based round index.
    pub round: usize,
    /// What happened.
    pub event: RoundEvent,
    /// Congestion window in whole segments.
    pub window_size: u32,
    /// Latest RTT sample in milliseconds.
    pub rtt_ms: f64,
    /// Congestion phase.
    pub state: CongestionState,
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Per-round records, in order.
    pub rounds: Vec<RoundRecord>,
    /// Controller statistics at the end of the run.
    pub stats: TahoeStats,
    /// Effective window sizes recorded by the controller.
    pub window_history: Vec<u32>,
    /// Simulated time the run took.
    pub elapsed: Duration,
}

impl SimulationReport {
    /// Acknowledged payload bytes per simulated second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.stats.total_bytes_acked as f64 / secs
    }

    /// Rounds that ended with `event`.
    pub fn count(&self, event: RoundEvent) -> usize {
        self.rounds.iter().filter(|r| r.event == event).count()
    }
}

/// A controller plus the randomness that stands in for the network.
#[derive(Debug)]
pub struct Simulation {
    controller: TahoeController<RandomLoss, TokioClock>,
    config: SimulationConfig,
    rng: StdRng,
}

impl Simulation {
    /// Build a simulation; both configurations are validated.
    pub fn new(tahoe: TahoeConfig, config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let (loss, rng) = match config.seed {
            Some(seed) => (
                RandomLoss::seeded(seed),
                StdRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (RandomLoss::new(), StdRng::from_entropy()),
        };
        let controller = TahoeController::with_parts(tahoe, loss, TokioClock)?;

        Ok(Self {
            controller,
            config,
            rng,
        })
    }

    /// Controller being driven.
    pub fn controller(&self) -> &TahoeController<RandomLoss, TokioClock> {
        &self.controller
    }

    /// Run every round and report.
    pub async fn run(mut self) -> Result<SimulationReport, SimulationError> {
        let started = tokio::time::Instant::now();
        let payload = vec![0u8; self.config.payload_len];
        let mut rounds = Vec::with_capacity(self.config.rounds);

        for round in 0..self.config.rounds {
            let event = self.run_round(&payload).await?;
            let stats = self.controller.stats();
            info!(
                round,
                ?event,
                cwnd = stats.current_window_size,
                rtt_ms = stats.current_rtt_ms,
                state = %stats.current_state,
                "round complete"
            );
            rounds.push(RoundRecord {
                round,
                event,
                window_size: stats.current_window_size,
                rtt_ms: stats.current_rtt_ms,
                state: stats.current_state,
            });
        }

        Ok(SimulationReport {
            rounds,
            stats: self.controller.stats(),
            window_history: self.controller.window_size_history(),
            elapsed: started.elapsed(),
        })
    }

    async fn run_round(&mut self, payload: &[u8]) -> Result<RoundEvent, SimulationError> {
        let segment = match self.controller.send_data(payload)? {
            SendOutcome::Sent(segment) => segment,
            SendOutcome::LossSimulated => return Ok(RoundEvent::SendLost),
            SendOutcome::WindowFull => {
                if self.controller.is_rto_expired() {
                    self.controller.handle_timeout();
                }
                return Ok(RoundEvent::WindowFull);
            }
        };

        let rtt = self.draw_rtt();
        sleep(rtt).await;

        if !self.rng.gen_bool(self.config.ack_loss_probability) {
            self.controller.receive_ack(segment.end_seq)?;
            return Ok(RoundEvent::Acked);
        }

        debug!(seq = segment.seq, "ack lost, waiting for rto");
        let remaining = self.controller.rto().saturating_sub(rtt);
        sleep(remaining + Duration::from_millis(1)).await;
        if self.controller.is_rto_expired() {
            self.controller.handle_timeout();
        }

        sleep(self.draw_rtt()).await;
        self.controller.receive_ack(segment.end_seq)?;
        Ok(RoundEvent::RecoveredByTimeout)
    }

    fn draw_rtt(&mut self) -> Duration {
        self.rng.gen_range(self.config.min_rtt..=self.config.max_rtt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tahoe() -> TahoeConfig {
        TahoeConfig::new().loss_probability(0.0)
    }

    fn fixed_rtt(rounds: usize, ack_loss: f64) -> SimulationConfig {
        SimulationConfig {
            rounds,
            payload_len: 5,
            min_rtt: Duration::from_millis(100),
            max_rtt: Duration::from_millis(100),
            ack_loss_probability: ack_loss,
            seed: Some(11),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimulationConfig::default();
        assert!(config.validate().is_ok());

        config.min_rtt = Duration::from_millis(200);
        assert!(matches!(
            config.validate(),
            Err(SimulationError::EmptyRttRange { .. })
        ));

        let config = SimulationConfig {
            ack_loss_probability: 2.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimulationError::InvalidAckLossProbability(2.0))
        );

        let config = SimulationConfig {
            payload_len: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(SimulationError::EmptyPayload));
    }

    #[test]
    fn test_invalid_controller_config() {
        let err = Simulation::new(tahoe().mss(0), SimulationConfig::default()).unwrap_err();
        assert!(matches!(err, SimulationError::Tahoe(TahoeError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lossless_run() {
        let report = Simulation::new(tahoe(), fixed_rtt(20, 0.0))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.count(RoundEvent::Acked), 20);
        assert_eq!(report.stats.total_packets_sent, 20);
        assert_eq!(report.stats.total_bytes_acked, 100);
        assert_eq!(report.stats.total_retransmissions, 0);
        assert!((report.stats.srtt_ms - 100.0).abs() < 1.0);
        assert_eq!(report.stats.current_state, CongestionState::CongestionAvoidance);
        assert!(report.elapsed >= Duration::from_secs(2));
        assert!(report.elapsed < Duration::from_millis(2100));
        assert!((report.throughput() - 50.0).abs() < 3.0);

        // Slow start for the first fifteen rounds.
        let windows: Vec<u32> = report.rounds.iter().map(|r| r.window_size).collect();
        assert_eq!(&windows[..15], &(2..=16).collect::<Vec<u32>>()[..]);
        assert_eq!(report.rounds[13].state, CongestionState::SlowStart);
        assert_eq!(report.rounds[14].state, CongestionState::CongestionAvoidance);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_ack_lost() {
        let report = Simulation::new(tahoe(), fixed_rtt(4, 1.0))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.count(RoundEvent::RecoveredByTimeout), 4);
        assert_eq!(report.stats.total_retransmissions, 4);
        assert_eq!(report.stats.total_bytes_acked, 20);
        // Backoff compounds across rounds and is never reset.
        assert!(report.stats.rto_ms > 100_000.0);
        assert!(report.elapsed > Duration::from_secs(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_runs_repeat() {
        let config = SimulationConfig {
            rounds: 10,
            seed: Some(99),
            ..SimulationConfig::default()
        };
        let tahoe = TahoeConfig::new();

        let a = Simulation::new(tahoe.clone(), config.clone())
            .unwrap()
            .run()
            .await
            .unwrap();
        let b = Simulation::new(tahoe, config).unwrap().run().await.unwrap();

        assert_eq!(a.rounds, b.rounds);
        assert_eq!(a.window_history, b.window_history);
        assert_eq!(a.stats.total_packets_lost, b.stats.total_packets_lost);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_loss_is_reported() {
        let report = Simulation::new(tahoe().loss_probability(1.0), fixed_rtt(4, 0.0))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.count(RoundEvent::SendLost), 4);
        assert_eq!(report.stats.total_packets_sent, 0);
        assert_eq!(report.elapsed, Duration::ZERO);
        assert_eq!(report.throughput(), 0.0);
    }
}
