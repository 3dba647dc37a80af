//! The CSV boundary: rows of a known shape in, rows of a known shape out.

use std::io::{Read, Write};

use serde::Deserialize;

use crate::{error::Error, Period, Score};

/// One observed (training) or held-out (test) game. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub period: Period,
    /// The first-listed participant (historically "white").
    pub white: String,
    /// The second-listed participant ("black").
    pub black: String,
    /// The result from the first player's perspective. Absent for
    /// held-out games.
    pub score: Option<Score>,
}

// Rows are positional, so headers are skipped without inspecting them.
#[derive(Deserialize)]
struct RawGame(f64, String, String, #[serde(default)] Option<f64>);

/// Header of the predictions table.
pub const PREDICTIONS_HEADER: [&str; 4] = ["Period", "Player A", "Player B", "Score"];

/// Reads `period,playerA,playerB[,outcome]` rows. The first line is
/// treated as a header and skipped regardless of content. Any malformed
/// row aborts the whole load.
pub fn read_games<R: Read>(reader: R) -> Result<Vec<GameRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let mut games = Vec::new();
    for raw in reader.deserialize() {
        let RawGame(period, white, black, score) = raw?;
        games.push(GameRecord {
            period: Period(period),
            white,
            black,
            score: score.map(Score),
        });
    }
    Ok(games)
}

/// Writes the predictions table, one row per test row in the same order.
///
/// Callers compute all predictions before opening the output file, so a
/// failed run never leaves a partial table behind.
pub fn write_predictions<W: Write>(
    writer: W,
    games: &[GameRecord],
    predictions: &[Score],
) -> Result<(), Error> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(writer);

    writer.write_record(PREDICTIONS_HEADER)?;
    for (game, prediction) in games.iter().zip(predictions) {
        writer.write_record(&[
            f64::from(game.period).to_string(),
            game.white.clone(),
            game.black.clone(),
            prediction.value().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
