use std::{error::Error as StdError, fs::File, io, path::PathBuf};

use chess_glicko::{dataset, RatingEngine, RatingSystem};
use clap::Parser as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train Glicko ratings on one file of game results and write outcome
/// predictions for a second file.
#[derive(clap::Parser)]
struct Opt {
    /// Training games: period,playerA,playerB,outcome (header line skipped)
    training: PathBuf,
    /// Held-out games: period,playerA,playerB (header line skipped)
    test: PathBuf,
    /// Update each player once per period from all of that period's games,
    /// instead of after every game
    #[clap(long)]
    batch_mode: bool,
    /// Keep advancing ratings while predicting, using expected scores as
    /// synthetic outcomes
    #[clap(long)]
    update_during_evaluation: bool,
    #[clap(long, default_value = "1500")]
    default_rating: f64,
    #[clap(long, default_value = "350")]
    default_deviation: f64,
    #[clap(long, default_value = "30")]
    min_deviation: f64,
    #[clap(long, default_value = "200")]
    avg_deviation: f64,
    #[clap(long, default_value = "30")]
    decay_periods: f64,
    /// Predictions file
    #[clap(long, default_value = "submission.csv")]
    out: PathBuf,
}

fn main() -> Result<(), Box<dyn StdError>> {
    let opt = Opt::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let system = RatingSystem::builder()
        .default_rating(opt.default_rating)
        .default_deviation(opt.default_deviation)
        .min_deviation(opt.min_deviation)
        .avg_deviation(opt.avg_deviation)
        .decay_periods(opt.decay_periods)
        .batch_mode(opt.batch_mode)
        .update_during_evaluation(opt.update_during_evaluation)
        .build()?;

    let training = dataset::read_games(File::open(&opt.training)?)?;
    let mut engine = RatingEngine::new(system);
    engine.train(&training);
    info!(
        games = training.len(),
        players = engine.store().len(),
        batch_mode = opt.batch_mode,
        "training complete"
    );

    let test = dataset::read_games(File::open(&opt.test)?)?;
    let predictions = engine.evaluate(&test)?;

    // The output file is created only once every prediction has succeeded.
    dataset::write_predictions(File::create(&opt.out)?, &test, &predictions)?;
    info!(rows = predictions.len(), path = %opt.out.display(), "wrote predictions");

    Ok(())
}
