//! Elo ratings for league football.
//!
//! Replays a chronological list of results, forecasts every fixture before
//! it is played, and scores those forecasts against the real outcomes.

pub mod calibration;
pub mod config;
pub mod elo;
pub mod engine;
pub mod error;
pub mod export;
pub mod history_store;
pub mod match_data;
pub mod preview;

pub use calibration::{BacktestMetrics, Outcome, Prob3};
pub use elo::EloConfig;
pub use engine::{EloRun, RatingEngine, RatingsSnapshot, TraceEntry, process};
pub use error::EloError;
pub use match_data::MatchRecord;

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
