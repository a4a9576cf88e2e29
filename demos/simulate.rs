//! Tahoe simulation demo
//!
//! Runs the round driver against a lossy simulated peer and prints the
//! per-round trace and final statistics. The runtime starts with its clock
//! paused, so RTTs and RTO waits elapse in simulated time.
//!
//! Environment variables:
//! - TAHOE_ROUNDS: number of rounds (default 20)
//! - TAHOE_SEED: seed for a repeatable run (default: entropy)
//! - TAHOE_LOG_LEVEL: tracing filter, e.g. debug|info|warn (default info)

use std::time::Duration;

use tahoe_cc::prelude::*;
use tahoe_cc::simulation::SimulationError;
use tracing_subscriber::EnvFilter;

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

#[tokio::main(flavor = "current_thread", start_paused = true)]
async fn main() -> Result<(), SimulationError> {
    let filter = std::env::var("TAHOE_LOG_LEVEL").unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let tahoe = TahoeConfig::new()
        .max_window_size(16)
        .ssthresh(8)
        .window_scale(2)
        .loss_probability(0.1)
        .initial_rtt(Duration::from_millis(100));
    let config = SimulationConfig {
        rounds: env_parse("TAHOE_ROUNDS").unwrap_or(20),
        seed: env_parse("TAHOE_SEED"),
        ..SimulationConfig::default()
    };

    let report = Simulation::new(tahoe, config)?.run().await?;

    println!("round  event                 cwnd  rtt(ms)  state");
    for r in &report.rounds {
        println!(
            "{:>5}  {:<20}  {:>4}  {:>7.1}  {}",
            r.round,
            format!("{:?}", r.event),
            r.window_size,
            r.rtt_ms,
            r.state
        );
    }

    let stats = &report.stats;
    println!();
    println!("packets sent:       {}", stats.total_packets_sent);
    println!("packets lost:       {}", stats.total_packets_lost);
    println!("retransmissions:    {}", stats.total_retransmissions);
    println!("fast retransmits:   {}", stats.total_fast_retransmits);
    println!("bytes acked:        {}", stats.total_bytes_acked);
    println!(
        "srtt / rttvar / rto: {:.1} / {:.1} / {:.1} ms",
        stats.srtt_ms, stats.rttvar_ms, stats.rto_ms
    );
    println!("window history:     {:?}", report.window_history);
    println!("simulated time:     {:?}", report.elapsed);
    println!("throughput:         {:.1} B/s", report.throughput());
    Ok(())
}
