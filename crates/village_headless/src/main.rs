//! Headless village simulation runner.
//!
//! This binary drives the simulation without a renderer. Designed for soak
//! testing, CI determinism checks, and quick worldgen review.
//!
//! # Usage
//!
//! ```bash
//! # Simulate three days with the scripted build-out
//! cargo run -p village_headless -- run --days 3
//!
//! # Same run as a JSON report on stdout, plus a state snapshot
//! cargo run -p village_headless -- run --days 3 --json --snapshot final.json
//!
//! # Preview world generation for a seed
//! cargo run -p village_headless -- map --seed 7 --width 96 --height 48
//!
//! # Sweep 32 seeds for determinism regressions (CI gate)
//! cargo run -p village_headless -- verify --seeds 32 --ticks 4000
//! ```
//!
//! Output (stdout): JSON reports and rendered maps
//! Logs (stderr): human-readable progress

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use village_core::state::{GameConfig, Speed};
use village_headless::{
    ascii_map::{render_map, AsciiConfig},
    runner::{run, RunConfig},
    verify::{verify_seeds, VerifyConfig},
};

#[derive(Parser)]
#[command(name = "village_headless")]
#[command(about = "Headless village simulation runner for soak tests and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate whole days under a scripted build-out
    Run {
        /// World seed
        #[arg(long, default_value = "42")]
        seed: u32,

        /// Days to simulate
        #[arg(short, long, default_value = "3")]
        days: u32,

        /// Simulation speed multiplier (1 or 2)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=2))]
        speed: u8,

        /// Leave the village unmanaged (no scripted commands)
        #[arg(long)]
        idle: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the final state as a JSON snapshot
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Render a generated world as ASCII art
    Map {
        /// World seed
        #[arg(long, default_value = "42")]
        seed: u32,

        /// Grid width in tiles
        #[arg(long, default_value = "128")]
        width: u32,

        /// Grid height in tiles
        #[arg(long, default_value = "64")]
        height: u32,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Skip the legend under the map
        #[arg(long)]
        no_legend: bool,
    },

    /// Verify determinism by replaying seeds and comparing state hashes
    Verify {
        /// First seed in the sweep
        #[arg(long, default_value = "1")]
        seed: u32,

        /// Number of consecutive seeds to check
        #[arg(short = 'n', long, default_value = "16")]
        seeds: u32,

        /// Frames to simulate per run
        #[arg(short, long, default_value = "2000")]
        ticks: u32,

        /// Runs per seed
        #[arg(short, long, default_value = "3")]
        runs: u32,

        /// Worker threads (0 = rayon default)
        #[arg(short, long, default_value = "0")]
        parallel: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout is for reports and maps.
    // RUST_LOG overrides the default; --verbose bumps it to debug.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            seed,
            days,
            speed,
            idle,
            json,
            snapshot,
        }) => {
            cmd_run(seed, days, speed, idle, json, snapshot);
        }
        Some(Commands::Map {
            seed,
            width,
            height,
            no_color,
            no_legend,
        }) => {
            cmd_map(seed, width, height, no_color, no_legend);
        }
        Some(Commands::Verify {
            seed,
            seeds,
            ticks,
            runs,
            parallel,
        }) => {
            cmd_verify(seed, seeds, ticks, runs, parallel);
        }
        None => {
            // Default: a short scripted run
            cmd_run(42, 3, 1, false, false, None);
        }
    }
}

/// Simulate days and print a summary
fn cmd_run(seed: u32, days: u32, speed: u8, idle: bool, json: bool, snapshot: Option<PathBuf>) {
    let config = RunConfig {
        game: GameConfig::default().with_seed(seed),
        days,
        speed: if speed == 2 { Speed::Two } else { Speed::One },
        script: !idle,
    };

    let outcome = run(&config);
    let report = &outcome.report;

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("RUN COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!(
        "Seed: {} | Days: {}/{} | Ticks: {}",
        report.seed, report.days_completed, report.days_requested, report.ticks
    );
    for day in &report.days {
        eprintln!(
            "  Day {}: {} alive | hunger {:.2} | morale {:.2} | {} shortages | {} buildings",
            day.day, day.living, day.hunger_avg, day.morale_avg, day.shortages, day.buildings
        );
    }
    eprintln!(
        "Stock: {} wood, {} stone, {} berries, {} mushrooms",
        report.final_inventory.wood,
        report.final_inventory.stone,
        report.final_inventory.berries,
        report.final_inventory.mushrooms
    );
    eprintln!("Quests: {}/{} complete", report.quests_done, report.quests_total);
    eprintln!("State hash: {:016x}", report.state_hash);

    if let Some(path) = snapshot {
        let encoded = match serde_json::to_string(&outcome.state) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("FATAL: Failed to encode snapshot: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = std::fs::write(&path, encoded) {
            eprintln!("FATAL: Failed to write '{}': {}", path.display(), e);
            std::process::exit(1);
        }
        eprintln!("Snapshot saved to: {}", path.display());
    }

    if json {
        match serde_json::to_string_pretty(report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("FATAL: Failed to encode report: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Render a fresh world for a seed
fn cmd_map(seed: u32, width: u32, height: u32, no_color: bool, no_legend: bool) {
    let mut game = GameConfig::default().with_seed(seed);
    game.world.width = width;
    game.world.height = height;

    tracing::info!(seed, width, height, "Generating world");
    let state = village_core::simulation::create_game_with_config(game);

    let config = AsciiConfig {
        use_color: !no_color,
        show_legend: !no_legend,
    };
    println!("{}", render_map(&state, &config));
}

/// Run a determinism sweep and exit non-zero on any divergence
fn cmd_verify(seed: u32, seeds: u32, ticks: u32, runs: u32, parallel: u32) {
    let config = VerifyConfig {
        seed_start: seed,
        seeds,
        ticks,
        runs,
        parallel,
    };

    let report = verify_seeds(&config);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("DETERMINISM SWEEP");
    eprintln!("{}", "=".repeat(50));
    eprintln!(
        "Seeds checked: {} ({} ticks x {} runs each)",
        report.checked, ticks, runs
    );

    if report.passed() {
        eprintln!("PASS: All seeds replayed identically");
    } else {
        eprintln!("FAIL: {} seed(s) diverged between runs", report.failures.len());
        for failure in &report.failures {
            let hashes: Vec<String> = failure
                .hashes
                .iter()
                .map(|h| format!("{:016x}", h))
                .collect();
            eprintln!("  seed {}: {}", failure.seed, hashes.join(" != "));
        }
        std::process::exit(1);
    }
}
