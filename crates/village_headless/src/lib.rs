//! Headless village runner for soak testing and CI verification.
//!
//! This crate drives [`village_core`] without a renderer. It covers three
//! workflows:
//!
//! - **Soak runs**: simulate whole days under a scripted build-out and
//!   collect per-day summaries
//! - **Map previews**: render generated worlds and live villages as ASCII
//! - **Determinism sweeps**: replay seeds in parallel and compare state
//!   hashes
//!
//! # Usage
//!
//! ```bash
//! # Simulate three days and print a JSON report
//! cargo run -p village_headless -- run --days 3 --json
//!
//! # Preview world generation for a seed
//! cargo run -p village_headless -- map --seed 7
//!
//! # Sweep 32 seeds for determinism regressions
//! cargo run -p village_headless -- verify --seeds 32 --ticks 4000
//! ```
//!
//! Logs go to stderr; stdout is reserved for machine-readable output
//! (JSON reports, rendered maps).

pub mod ascii_map;
pub mod runner;
pub mod verify;
