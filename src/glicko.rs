//! The Glicko formulas as pure functions over plain floats.
//!
//! Nothing in this module clamps or floors its results. Bounds like the
//! minimum and default deviation are configuration, and are applied by
//! [`RatingSystem`](crate::RatingSystem) on top of these formulas.
//!
//! See <http://www.glicko.net/glicko/glicko.pdf> for the derivations.

use std::f64::consts::{LN_10, PI};

use crate::Score;

/// The fixed Glicko scaling constant, `ln(10) / 400 ≈ 0.0057565`.
#[inline]
pub fn q() -> f64 {
    LN_10 / 400.0
}

/// Weighting factor `g(RD)` in `(0, 1]`, down-weighting games against
/// opponents with uncertain ratings. Strictly decreasing in the deviation.
#[inline]
pub fn g(deviation: f64) -> f64 {
    1.0 / (1.0 + 3.0 * q() * q() * deviation * deviation / (PI * PI)).sqrt()
}

/// Expected score for a player against a single opponent, in `0.0..=1.0`.
///
/// Note that only the opponent's deviation enters the formula, so
/// `expected_score(a, b, d) + expected_score(b, a, d)` is not `1.0` in
/// general.
#[inline]
pub fn expected_score(rating: f64, opponent_rating: f64, opponent_deviation: f64) -> Score {
    Score(
        1.0 / (1.0
            + f64::powf(
                10.0,
                -g(opponent_deviation) * (rating - opponent_rating) / 400.0,
            )),
    )
}

/// The estimated variance `d²` of a player's performance over a set of
/// games.
///
/// Infinite when `opponent_ratings` is empty or when every expected score
/// is exactly 0 or 1. Callers are responsible for never rating a player
/// with zero opponents.
pub fn d_squared(rating: f64, opponent_ratings: &[f64], opponent_deviations: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (&opponent_rating, &opponent_deviation) in
        opponent_ratings.iter().zip(opponent_deviations)
    {
        let g = g(opponent_deviation);
        let e = expected_score(rating, opponent_rating, opponent_deviation).value();
        sum += g * g * e * (1.0 - e);
    }
    1.0 / (q() * q() * sum)
}

/// Deviation grown by `t` periods of inactivity, `sqrt(RD² + c²t)`.
/// Uncapped; the caller caps at the default deviation.
#[inline]
pub fn decayed_deviation(deviation: f64, c: f64, elapsed_periods: f64) -> f64 {
    (deviation * deviation + c * c * elapsed_periods).sqrt()
}

/// Post-period rating given all of the period's opponents and scores.
/// The deviation passed in is the already-decayed pre-period deviation.
pub fn new_rating(
    rating: f64,
    deviation: f64,
    opponent_ratings: &[f64],
    opponent_deviations: &[f64],
    scores: &[f64],
) -> f64 {
    let d_squared = d_squared(rating, opponent_ratings, opponent_deviations);
    let weight = q() / (1.0 / (deviation * deviation) + 1.0 / d_squared);

    let mut sum = 0.0;
    for ((&opponent_rating, &opponent_deviation), &score) in opponent_ratings
        .iter()
        .zip(opponent_deviations)
        .zip(scores)
    {
        let e = expected_score(rating, opponent_rating, opponent_deviation).value();
        sum += g(opponent_deviation) * (score - e);
    }

    rating + weight * sum
}

/// Post-period deviation, `sqrt((1/RD² + 1/d²)⁻¹)`. Unfloored; the caller
/// floors at the minimum deviation.
pub fn new_deviation(
    rating: f64,
    deviation: f64,
    opponent_ratings: &[f64],
    opponent_deviations: &[f64],
) -> f64 {
    let d_squared = d_squared(rating, opponent_ratings, opponent_deviations);
    (1.0 / (1.0 / (deviation * deviation) + 1.0 / d_squared)).sqrt()
}

/// Log likelihood deviance metric that can be used to evaluate the quality
/// of rating system predictions.
///
/// Lower is better.
///
/// See <https://www.kaggle.com/c/ChessRatings2/overview/evaluation>.
pub fn deviance(Score(expected): Score, Score(actual): Score) -> f64 {
    let expected = expected.clamp(0.01, 0.99);
    -(actual * expected.log10() + (1.0 - actual) * (1.0 - expected).log10())
}
