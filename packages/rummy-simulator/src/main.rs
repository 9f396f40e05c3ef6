//! Rummy simulator CLI - plays complete two-seat games through the real
//! synchronization path against an in-memory store.

mod metrics;
mod output;
mod simulator;
mod types;

use std::time::Instant;

use clap::Parser;
use metrics::build_game_metrics;
use output::OutputWriter;
use rummy::ai::{by_name, AiPlayer};
use simulator::{GameResult, Simulator};
use tracing::{info, warn};
use types::{AiType, OutputFormat};

#[derive(Parser)]
#[command(name = "rummy-simulator")]
#[command(about = "Plays automated rummy games over the in-memory realtime store")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Rounds per game
    #[arg(long, default_value = "5")]
    rounds: u32,

    /// AI type for player1
    #[arg(long, default_value = "greedy")]
    player1: AiType,

    /// AI type for player2
    #[arg(long, default_value = "greedy")]
    player2: AiType,

    /// Base seed (game N uses seed + N) - random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON logs filtered by RUST_LOG instead of the console format
    #[arg(long)]
    json_logs: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize logging - silent by default, only show warnings/errors
    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    if args.json_logs {
        rummy::init_tracing();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    if args.show_output {
        info!(
            "Starting simulator: {} games, {} rounds, player1={:?}, player2={:?}",
            args.games, args.rounds, args.player1, args.player2
        );
    }

    let mut output_writer = OutputWriter::new(&args.output_dir, &args.output_format)?;
    let ai_types = [
        args.player1.name().to_string(),
        args.player2.name().to_string(),
    ];
    let base_seed = args.seed.unwrap_or_else(rand::random);

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0;

    for game_num in 1..=args.games {
        let game_start = Instant::now();
        let game_seed = base_seed.wrapping_add(u64::from(game_num));
        let ais = [
            create_ai_player(args.player1, game_seed.wrapping_mul(2))?,
            create_ai_player(args.player2, game_seed.wrapping_mul(2).wrapping_add(1))?,
        ];

        let simulator = Simulator::new(game_seed, args.rounds);
        match simulator.simulate_game(&ais).await {
            Ok(result) => {
                let duration_ms = game_start.elapsed().as_secs_f64() * 1000.0;
                let metrics =
                    build_game_metrics(game_num, game_seed, ai_types.clone(), &result, duration_ms);
                if let Err(e) = output_writer.write_game(&metrics) {
                    warn!("Failed to write metrics for game {}: {}", game_num, e);
                }
                if args.verbose {
                    info!("Game {} completed: scores={:?}", game_num, result.final_scores);
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!("Game {} failed: {}", game_num, e);
            }
        }
    }

    let elapsed = start.elapsed();
    let (detail_path, csv_path) = output_writer.output_paths();
    let (detail_path, csv_path) = (detail_path.clone(), csv_path.clone());
    output_writer.finish()?;

    if args.show_output {
        info!("Detailed results written to: {}", detail_path.display());
        info!("Summary CSV written to: {}", csv_path.display());
        print_summary(&results, errors, elapsed, args.games);
    }

    Ok(())
}

fn create_ai_player(
    ai_type: AiType,
    seed: u64,
) -> Result<Box<dyn AiPlayer + Send + Sync>, Box<dyn std::error::Error>> {
    let factory = by_name(ai_type.name())
        .ok_or_else(|| format!("Unknown AI type: {}", ai_type.name()))?;
    Ok((factory.make)(Some(seed)))
}

fn print_summary(results: &[GameResult], errors: u32, elapsed: std::time::Duration, total: u32) {
    println!("\n=== Simulation Summary ===");
    println!("Games completed: {}/{}", results.len(), total);
    if errors > 0 {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:?}", elapsed);
    if results.is_empty() {
        return;
    }
    println!(
        "Average time per game: {:?}",
        elapsed / results.len() as u32
    );

    let mut wins = [0u32; 2];
    let mut ties = 0u32;
    let mut total_scores = [0i64; 2];
    let mut stalled = 0usize;
    for result in results {
        for (seat, &score) in result.final_scores.iter().enumerate() {
            total_scores[seat] += i64::from(score);
        }
        match result.winner() {
            Some(slot) => wins[slot.index()] += 1,
            None => ties += 1,
        }
        stalled += result.rounds.iter().filter(|r| r.stalled).count();
    }

    println!("\n=== Results by Seat ===");
    for seat in 0..2 {
        let avg_score = total_scores[seat] as f64 / results.len() as f64;
        let win_rate = (wins[seat] as f64 / results.len() as f64) * 100.0;
        println!(
            "player{}: avg={:.1}, wins={} ({:.1}%)",
            seat + 1,
            avg_score,
            wins[seat],
            win_rate
        );
    }
    println!("Ties: {ties}, stalled rounds: {stalled}");
}
