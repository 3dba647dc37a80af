use std::io;

use thiserror::Error;

/// Invalid rating system configuration, detected when building a
/// [`RatingSystem`](crate::RatingSystem).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("decay_periods must be positive, got {0}")]
    NonPositiveDecayPeriods(f64),
    #[error("avg_deviation ({avg}) must not exceed default_deviation ({default})")]
    AvgDeviationAboveDefault { avg: f64, default: f64 },
    #[error("min_deviation ({min}) must not exceed default_deviation ({default})")]
    MinDeviationAboveDefault { min: f64, default: f64 },
}

/// Any fatal error of a training or prediction run. There are no
/// recoverable errors: a run either completes deterministically or aborts.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record: {0}")]
    Parse(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("player {0} has no rating from training")]
    MissingPlayer(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
