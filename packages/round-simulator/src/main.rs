//! Round simulator CLI: plays many commit-reveal rounds in one room and
//! records per-round economics.
//!
//! Rounds run back to back so rollovers from tampered or winnerless rounds
//! feed the next round's pot.

mod metrics;
mod output;
mod simulator;

use std::time::Instant;

use beat_engine::telemetry::init_tracing_with;
use beat_engine::EngineConfig;
use clap::Parser;
use metrics::{build_round_metrics, RunSummary};
use output::OutputWriter;
use rand::Rng;
use simulator::{SimulationConfig, Simulator};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "round-simulator")]
#[command(about = "In-memory commit-reveal round simulator")]
struct Args {
    /// Number of rounds to play
    #[arg(short, long, default_value = "10")]
    rounds: u32,

    /// Number of predicting wallets
    #[arg(short, long, default_value = "8")]
    players: usize,

    /// Guesses each wallet submits per round (one batch)
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u16).range(1..=64))]
    predictions_per_player: u16,

    /// Probability that the artist reveals a pattern other than the committed one
    #[arg(long, default_value = "0.1")]
    tamper_rate: f64,

    /// Probability that any step is active
    #[arg(long, default_value = "0.3")]
    density: f64,

    /// Smallest stake per guess, in micro-USDC
    #[arg(long, default_value = "100000")]
    min_stake: u64,

    /// Largest stake per guess, in micro-USDC
    #[arg(long, default_value = "5000000")]
    max_stake: u64,

    /// Run seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Gzip the JSONL output
    #[arg(long)]
    compress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the summary table and output paths to stdout
    #[arg(long)]
    show_output: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_tracing_with(if args.verbose { "debug" } else { "info" });

    for (name, rate) in [("tamper-rate", args.tamper_rate), ("density", args.density)] {
        if !(0.0..=1.0).contains(&rate) {
            return Err(format!("--{name} must be within 0.0..=1.0, got {rate}").into());
        }
    }
    if args.min_stake == 0 || args.min_stake > args.max_stake {
        return Err("--min-stake must be positive and not above --max-stake".into());
    }

    let engine = EngineConfig::from_env()?;
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let mut simulator = Simulator::new(
        engine,
        SimulationConfig {
            players: args.players,
            predictions_per_player: args.predictions_per_player as usize,
            tamper_rate: args.tamper_rate,
            min_stake_usdc: args.min_stake,
            max_stake_usdc: args.max_stake,
            density: args.density,
        },
        seed,
    )?;
    info!(seed, room_id = simulator.room_id(), rounds = args.rounds, "Starting simulation");

    let mut output_writer = OutputWriter::new(&args.output_dir, args.compress)?;
    let mut summary = RunSummary::default();
    let start = Instant::now();

    for round_number in 1..=args.rounds {
        let round_start = Instant::now();
        match simulator.run_round() {
            Ok(outcome) => {
                let duration_ms = round_start.elapsed().as_secs_f64() * 1000.0;
                let metrics = build_round_metrics(seed, &outcome, duration_ms);
                if let Err(e) = output_writer.write_round(&metrics) {
                    warn!("Failed to write metrics for round {}: {}", round_number, e);
                }
                summary.record(&metrics);
            }
            Err(e) => {
                summary.failed_rounds += 1;
                warn!(round_number, error = %e, "Round failed");
                // An unsettled round blocks the room; stop here.
                break;
            }
        }
    }

    let elapsed = start.elapsed();
    let (jsonl_path, csv_path) = output_writer.finish()?;
    info!(
        rounds = summary.rounds,
        failed = summary.failed_rounds,
        unverified = summary.unverified_rounds,
        total_staked_usdc = summary.total_staked_usdc,
        distributed_usdc = summary.total_distributed_usdc,
        slashed_usdc = summary.total_slashed_usdc,
        winner_pot_carry_usdc = summary.final_winner_pot_carry_usdc,
        liquidity_carry_usdc = summary.final_liquidity_carry_usdc,
        "Simulation complete"
    );

    if args.show_output {
        println!("Detailed results: {}", jsonl_path.display());
        println!("Summary CSV:      {}", csv_path.display());
        print_summary(&summary, elapsed);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary, elapsed: std::time::Duration) {
    println!("Rounds settled:        {}", summary.rounds);
    println!("Rounds failed:         {}", summary.failed_rounds);
    println!("Unverified reveals:    {}", summary.unverified_rounds);
    println!("Total staked (uUSDC):  {}", summary.total_staked_usdc);
    println!("Paid to winners:       {}", summary.total_distributed_usdc);
    println!("Slashed from artist:   {}", summary.total_slashed_usdc);
    println!("Pot carried forward:   {}", summary.final_winner_pot_carry_usdc);
    println!("Liquidity carried:     {}", summary.final_liquidity_carry_usdc);
    println!(
        "Elapsed:               {:.2}s ({:.2} ms/round)",
        elapsed.as_secs_f64(),
        elapsed.as_secs_f64() * 1000.0 / f64::from(summary.rounds.max(1))
    );
}
