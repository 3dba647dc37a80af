use crate::{
    error::ConfigError,
    glicko,
    store::{PlayerRating, StagedRating},
    Period, Score,
};

/// Configures and builds a [`RatingSystem`].
#[derive(Debug, Clone)]
pub struct RatingSystemBuilder {
    default_rating: f64,
    default_deviation: f64,
    min_deviation: f64,
    avg_deviation: f64,
    decay_periods: f64,
    batch_mode: bool,
    update_during_evaluation: bool,
}

impl Default for RatingSystemBuilder {
    fn default() -> RatingSystemBuilder {
        RatingSystemBuilder::new()
    }
}

impl RatingSystemBuilder {
    pub fn new() -> RatingSystemBuilder {
        RatingSystemBuilder {
            default_rating: 1500.0,
            default_deviation: 350.0,
            min_deviation: 30.0,
            avg_deviation: 200.0,
            decay_periods: 30.0,
            batch_mode: false,
            update_during_evaluation: false,
        }
    }

    /// Rating assigned to a player seen for the first time.
    pub fn default_rating(&mut self, default_rating: f64) -> &mut Self {
        self.default_rating = default_rating;
        self
    }

    /// Deviation assigned to a player seen for the first time. Also the
    /// upper bound that inactivity decay is capped at.
    pub fn default_deviation(&mut self, default_deviation: f64) -> &mut Self {
        self.default_deviation = default_deviation;
        self
    }

    /// Floor for post-update deviations, so that established ratings keep
    /// moving at least a little.
    pub fn min_deviation(&mut self, min_deviation: f64) -> &mut Self {
        self.min_deviation = min_deviation;
        self
    }

    /// Typical deviation of an active player, used to derive the
    /// uncertainty growth constant `c`.
    pub fn avg_deviation(&mut self, avg_deviation: f64) -> &mut Self {
        self.avg_deviation = avg_deviation;
        self
    }

    /// Number of idle periods after which an average player's deviation
    /// grows back to the default.
    pub fn decay_periods(&mut self, decay_periods: f64) -> &mut Self {
        self.decay_periods = decay_periods;
        self
    }

    /// Update each player once per period from all of that period's games
    /// (classic Glicko), instead of game by game.
    pub fn batch_mode(&mut self, batch_mode: bool) -> &mut Self {
        self.batch_mode = batch_mode;
        self
    }

    /// Keep advancing ratings while predicting held-out games, using
    /// expected scores as synthetic outcomes.
    pub fn update_during_evaluation(&mut self, update_during_evaluation: bool) -> &mut Self {
        self.update_during_evaluation = update_during_evaluation;
        self
    }

    pub fn build(&self) -> Result<RatingSystem, ConfigError> {
        if self.decay_periods <= 0.0 {
            return Err(ConfigError::NonPositiveDecayPeriods(self.decay_periods));
        }
        if self.avg_deviation > self.default_deviation {
            return Err(ConfigError::AvgDeviationAboveDefault {
                avg: self.avg_deviation,
                default: self.default_deviation,
            });
        }
        if self.min_deviation > self.default_deviation {
            return Err(ConfigError::MinDeviationAboveDefault {
                min: self.min_deviation,
                default: self.default_deviation,
            });
        }

        Ok(RatingSystem {
            default_rating: self.default_rating,
            default_deviation: self.default_deviation,
            min_deviation: self.min_deviation,
            avg_deviation: self.avg_deviation,
            decay_periods: self.decay_periods,
            batch_mode: self.batch_mode,
            update_during_evaluation: self.update_during_evaluation,
            c: ((self.default_deviation * self.default_deviation
                - self.avg_deviation * self.avg_deviation)
                / self.decay_periods)
                .sqrt(),
        })
    }
}

/// A Glicko rating system configuration. Applies the bounds that the pure
/// formulas in [`glicko`] leave to the caller: inactivity decay is capped
/// at the default deviation, post-update deviations are floored at the
/// minimum deviation.
#[derive(Debug, Clone)]
pub struct RatingSystem {
    default_rating: f64,
    default_deviation: f64,
    min_deviation: f64,
    avg_deviation: f64,
    decay_periods: f64,
    batch_mode: bool,
    update_during_evaluation: bool,
    c: f64,
}

impl RatingSystem {
    pub fn builder() -> RatingSystemBuilder {
        RatingSystemBuilder::new()
    }

    pub fn default_rating(&self) -> f64 {
        self.default_rating
    }

    pub fn default_deviation(&self) -> f64 {
        self.default_deviation
    }

    pub fn min_deviation(&self) -> f64 {
        self.min_deviation
    }

    pub fn avg_deviation(&self) -> f64 {
        self.avg_deviation
    }

    pub fn decay_periods(&self) -> f64 {
        self.decay_periods
    }

    pub fn batch_mode(&self) -> bool {
        self.batch_mode
    }

    pub fn update_during_evaluation(&self) -> bool {
        self.update_during_evaluation
    }

    /// The deviation growth constant,
    /// `c = sqrt((default_deviation² − avg_deviation²) / decay_periods)`.
    pub fn c(&self) -> f64 {
        self.c
    }

    /// The belief state for a player who has never competed.
    pub fn seed_rating(&self) -> PlayerRating {
        PlayerRating {
            rating: self.default_rating,
            deviation: self.default_deviation,
            last_active: None,
        }
    }

    /// The player's deviation entering `period`, grown for inactivity and
    /// capped at the default deviation.
    pub fn deviation_at(&self, player: &PlayerRating, period: Period) -> f64 {
        let elapsed = period.periods_since(player.last_active);
        f64::min(
            self.default_deviation,
            glicko::decayed_deviation(player.deviation, self.c, elapsed),
        )
    }

    /// Expected score for `player` against `opponent`. Only the opponent's
    /// deviation enters the estimate.
    pub fn expected_score(&self, player: &PlayerRating, opponent: &PlayerRating) -> Score {
        glicko::expected_score(player.rating, opponent.rating, opponent.deviation)
    }

    /// One combined Glicko update for a player against all listed
    /// opponents, producing a staged result for the caller to commit.
    ///
    /// Must not be called with zero opponents.
    pub fn rate(
        &self,
        player: &PlayerRating,
        period: Period,
        opponent_ratings: &[f64],
        opponent_deviations: &[f64],
        scores: &[f64],
    ) -> StagedRating {
        let deviation = self.deviation_at(player, period);
        StagedRating {
            rating: glicko::new_rating(
                player.rating,
                deviation,
                opponent_ratings,
                opponent_deviations,
                scores,
            ),
            deviation: f64::max(
                self.min_deviation,
                glicko::new_deviation(
                    player.rating,
                    deviation,
                    opponent_ratings,
                    opponent_deviations,
                ),
            ),
        }
    }
}
