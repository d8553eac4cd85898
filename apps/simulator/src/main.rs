//! Konchina simulator CLI - plays complete matches between two concurrent
//! peers through the synchronization layer.
//!
//! Each game gets its own in-memory store, so every write conflict counted
//! in the output comes from the two peers of that game racing each other.

mod output;
mod simulator;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use output::ReportWriter;
use room_sync::telemetry::{init_tracing, LogFormat};
use room_sync::SyncConfig;
use simulator::{GameReport, Simulator};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "konchina-simulator")]
#[command(about = "Headless two-peer Konchina match simulator")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Base seed; game N uses seed + N for dealing and peer choices
    #[arg(long)]
    seed: Option<u64>,

    /// Points needed to win (overrides KONCHINA_WIN_THRESHOLD)
    #[arg(long)]
    win_threshold: Option<u32>,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Text logs go to stderr; stdout carries the results.
    let filter = if args.verbose { "debug" } else { "warn" };
    init_tracing(LogFormat::Text, filter);

    let mut config = SyncConfig::from_env()?;
    if let Some(threshold) = args.win_threshold {
        if threshold == 0 {
            return Err("--win-threshold must be at least 1".into());
        }
        config.rules = config.rules.with_win_threshold(threshold);
    }
    info!(games = args.games, seed = ?args.seed, threshold = config.rules.win_threshold, "Starting simulator");

    let mut writer = ReportWriter::new(args.output.as_deref())?;
    let simulator = Simulator::new(config);

    let start = Instant::now();
    let mut reports = Vec::new();
    let mut errors = 0;

    for game in 1..=args.games {
        let seed = args.seed.map(|s| s.wrapping_add(u64::from(game)));
        match simulator.run_game(game, seed).await {
            Ok(report) => {
                if let Err(e) = writer.write_game(&report) {
                    warn!("Failed to write result for game {}: {}", game, e);
                }
                reports.push(report);
            }
            Err(e) => {
                errors += 1;
                warn!(game, code = %e.code(), "Game failed: {}", e);
            }
        }
    }

    if let Some(path) = writer.finish()? {
        info!("Results written to: {}", path.display());
    }
    print_summary(&reports, errors, start.elapsed(), args.games);

    Ok(())
}

fn print_summary(reports: &[GameReport], errors: u32, elapsed: Duration, total: u32) {
    eprintln!("\n=== Simulation Summary ===");
    eprintln!("Games completed: {}/{}", reports.len(), total);
    if errors > 0 {
        eprintln!("Errors: {}", errors);
    }
    eprintln!("Total time: {:?}", elapsed);
    if reports.is_empty() {
        return;
    }

    let games = reports.len() as f64;
    let mut wins = [0u32; 2];
    let mut conflicts = 0u64;
    let mut rounds = 0u64;
    let mut moves = 0u64;
    for report in reports {
        conflicts += report.conflicts;
        rounds += report.rounds;
        moves += u64::from(report.moves);
        match report.winner.as_deref() {
            Some("host") => wins[0] += 1,
            Some(_) => wins[1] += 1,
            None => {}
        }
    }

    eprintln!("Average rounds per game: {:.1}", rounds as f64 / games);
    eprintln!("Average moves per game: {:.1}", moves as f64 / games);
    eprintln!("Write conflicts: {} ({:.2} per game)", conflicts, conflicts as f64 / games);
    for (seat, name) in ["host", "guest"].iter().enumerate() {
        eprintln!(
            "{}: wins={} ({:.1}%)",
            name,
            wins[seat],
            wins[seat] as f64 / games * 100.0
        );
    }
}
