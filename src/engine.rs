//! Orchestrates rating updates over periods and predicts held-out games.

use rustc_hash::FxHashMap;
use tracing::{debug, enabled, Level};

use crate::{
    dataset::GameRecord,
    error::Error,
    schedule::{self, Encounter},
    store::{PlayerId, RatingStore, StagedRating},
    Period, RatingSystem, Score,
};

/// Replays games through a [`RatingStore`] and predicts outcomes of
/// held-out games.
///
/// Two update disciplines are supported, selected by the system
/// configuration:
///
/// - per-game: both players of a game are updated and committed
///   immediately, so later games in the same period see earlier results;
/// - batch: every player active in a period gets one combined update
///   computed from the pre-period snapshot, staged, and committed only
///   after all of the period's updates are computed.
pub struct RatingEngine {
    system: RatingSystem,
    store: RatingStore,
}

impl RatingEngine {
    pub fn new(system: RatingSystem) -> RatingEngine {
        RatingEngine {
            system,
            store: RatingStore::default(),
        }
    }

    pub fn system(&self) -> &RatingSystem {
        &self.system
    }

    pub fn store(&self) -> &RatingStore {
        &self.store
    }

    /// Replays training games in ascending period order, seeding a default
    /// rating record for every player on first sight.
    pub fn train(&mut self, games: &[GameRecord]) {
        let encounters: Vec<Encounter> = games
            .iter()
            .enumerate()
            .map(|(row, game)| Encounter {
                white: self.store.get_or_seed(&game.white, &self.system),
                black: self.store.get_or_seed(&game.black, &self.system),
                score: game.score,
                period: game.period,
                row,
            })
            .collect();

        let mut predictions = vec![Score::default(); games.len()];
        self.replay(&encounters, &mut predictions);
    }

    /// Outcome probability for one held-out game, from the current rating
    /// records. No state is mutated.
    pub fn predict(&self, game: &GameRecord) -> Result<Score, Error> {
        let white = self.lookup(&game.white)?;
        let black = self.lookup(&game.black)?;
        Ok(self
            .system
            .expected_score(self.store.rating(white), self.store.rating(black)))
    }

    /// Predicts every held-out game, one probability per input row in
    /// input row order.
    ///
    /// Without `update_during_evaluation` every prediction comes from the
    /// final trained ratings. With it, the held-out games are replayed
    /// through the regular update engine, with expected scores standing in
    /// for absent outcomes, so ratings keep adapting as evaluation
    /// proceeds; each prediction is taken before the game's own update.
    ///
    /// Fails with [`Error::MissingPlayer`] if any participant was never
    /// seen in training.
    pub fn evaluate(&mut self, games: &[GameRecord]) -> Result<Vec<Score>, Error> {
        if !self.system.update_during_evaluation() {
            return games.iter().map(|game| self.predict(game)).collect();
        }

        let encounters = games
            .iter()
            .enumerate()
            .map(|(row, game)| {
                Ok(Encounter {
                    white: self.lookup(&game.white)?,
                    black: self.lookup(&game.black)?,
                    score: game.score,
                    period: game.period,
                    row,
                })
            })
            .collect::<Result<Vec<Encounter>, Error>>()?;

        let mut predictions = vec![Score::default(); games.len()];
        self.replay(&encounters, &mut predictions);
        Ok(predictions)
    }

    fn lookup(&self, name: &str) -> Result<PlayerId, Error> {
        self.store
            .id(name)
            .ok_or_else(|| Error::MissingPlayer(name.to_owned()))
    }

    fn replay(&mut self, encounters: &[Encounter], predictions: &mut [Score]) {
        for (period, games) in schedule::by_period(encounters) {
            let period = Period(period.into_inner());
            if self.system.batch_mode() {
                self.batch_period(period, &games, predictions);
            } else {
                self.per_game_period(period, &games, predictions);
            }
            self.log_period_summary(period);
        }
    }

    /// Sequential updates: each game is rated from both players' current
    /// records and committed before the next game is looked at.
    fn per_game_period(&mut self, period: Period, games: &[&Encounter], predictions: &mut [Score]) {
        for &game in games {
            let white = self.store.rating(game.white).clone();
            let black = self.store.rating(game.black).clone();

            let white_expected = self.system.expected_score(&white, &black);
            predictions[game.row] = white_expected;

            let white_score = game.score.unwrap_or(white_expected);
            let black_score = match game.score {
                Some(score) => score.opposite(),
                // Estimated independently per side, like the true-outcome
                // case is split; the two estimates do not sum to 1.
                None => self.system.expected_score(&black, &white),
            };

            let staged_white = self.system.rate(
                &white,
                period,
                &[black.rating],
                &[black.deviation],
                &[white_score.value()],
            );
            let staged_black = self.system.rate(
                &black,
                period,
                &[white.rating],
                &[white.deviation],
                &[black_score.value()],
            );

            self.store.commit(game.white, staged_white, period);
            self.store.commit(game.black, staged_black, period);
        }
    }

    /// Batched updates: one combined update per active player, computed
    /// entirely from the pre-period snapshot. Nothing is committed until
    /// every player of the period has been staged, so iteration order over
    /// players cannot leak into the results.
    fn batch_period(&mut self, period: Period, games: &[&Encounter], predictions: &mut [Score]) {
        for &game in games {
            predictions[game.row] = self
                .system
                .expected_score(self.store.rating(game.white), self.store.rating(game.black));
        }

        let mut staged: FxHashMap<PlayerId, StagedRating> = FxHashMap::default();

        for (player, games) in schedule::by_player(games) {
            let record = self.store.rating(player);

            let mut opponent_ratings = Vec::with_capacity(games.len());
            let mut opponent_deviations = Vec::with_capacity(games.len());
            let mut scores = Vec::with_capacity(games.len());

            for game in games {
                let (opponent, score) = if game.white == player {
                    (game.black, game.score)
                } else {
                    (game.white, game.score.map(Score::opposite))
                };
                let opponent = self.store.rating(opponent);

                opponent_ratings.push(opponent.rating);
                opponent_deviations.push(opponent.deviation);
                scores.push(
                    score
                        .unwrap_or_else(|| self.system.expected_score(record, opponent))
                        .value(),
                );
            }

            staged.insert(
                player,
                self.system.rate(
                    record,
                    period,
                    &opponent_ratings,
                    &opponent_deviations,
                    &scores,
                ),
            );
        }

        for (player, pending) in staged {
            self.store.commit(player, pending, period);
        }
    }

    fn log_period_summary(&self, period: Period) {
        if !enabled!(Level::DEBUG) {
            return;
        }

        let mut min_rating = f64::INFINITY;
        let mut max_rating = f64::NEG_INFINITY;
        let mut min_deviation = f64::INFINITY;
        let mut max_deviation = f64::NEG_INFINITY;
        let mut rating_sum = 0.0;
        let mut deviation_sum = 0.0;

        for record in self.store.ratings() {
            min_rating = min_rating.min(record.rating);
            max_rating = max_rating.max(record.rating);
            min_deviation = min_deviation.min(record.deviation);
            max_deviation = max_deviation.max(record.deviation);
            rating_sum += record.rating;
            deviation_sum += record.deviation;
        }

        let players = self.store.len().max(1) as f64;
        debug!(
            period = f64::from(period),
            players = self.store.len(),
            min_rating,
            avg_rating = rating_sum / players,
            max_rating,
            min_deviation,
            avg_deviation = deviation_sum / players,
            max_deviation,
            "period committed"
        );
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::PlayerRating;

    fn game(period: f64, white: &str, black: &str, score: Option<f64>) -> GameRecord {
        GameRecord {
            period: Period(period),
            white: white.to_owned(),
            black: black.to_owned(),
            score: score.map(Score),
        }
    }

    fn engine(batch_mode: bool, update_during_evaluation: bool) -> RatingEngine {
        RatingEngine::new(
            RatingSystem::builder()
                .batch_mode(batch_mode)
                .update_during_evaluation(update_during_evaluation)
                .build()
                .unwrap(),
        )
    }

    fn trained(batch_mode: bool, games: &[GameRecord]) -> RatingEngine {
        let mut engine = engine(batch_mode, false);
        engine.train(games);
        engine
    }

    fn rating_of(engine: &RatingEngine, name: &str) -> PlayerRating {
        engine
            .store()
            .rating(engine.store().id(name).unwrap())
            .clone()
    }

    #[test]
    fn winner_gains_and_loser_drops() {
        for batch_mode in [false, true] {
            let engine = trained(batch_mode, &[game(1.0, "8", "472", Some(1.0))]);
            let winner = rating_of(&engine, "8");
            let loser = rating_of(&engine, "472");

            assert!(winner.rating > 1500.0);
            assert!(loser.rating < 1500.0);
            assert!(winner.deviation < 350.0);
            assert_eq!(winner.last_active, Some(Period(1.0)));
        }
    }

    #[test]
    fn both_modes_agree_on_a_single_game() {
        let per_game = trained(false, &[game(1.0, "8", "472", Some(1.0))]);
        let batch = trained(true, &[game(1.0, "8", "472", Some(1.0))]);
        assert_eq!(rating_of(&per_game, "8"), rating_of(&batch, "8"));
        assert_eq!(rating_of(&per_game, "472"), rating_of(&batch, "472"));
    }

    #[test]
    fn batch_updates_are_snapshot_isolated() {
        // "8" beats "472" and then "305" in the same period. In batch mode
        // both opponents face the same pre-period "8", so their updates
        // are identical.
        let games = [
            game(1.0, "8", "472", Some(1.0)),
            game(1.0, "8", "305", Some(1.0)),
        ];
        let batch = trained(true, &games);
        assert_eq!(rating_of(&batch, "472"), rating_of(&batch, "305"));
    }

    #[test]
    fn per_game_updates_propagate_within_a_period() {
        // Same input as the batch isolation test: in per-game mode the
        // second opponent faces an "8" already strengthened by the first
        // win, so the two modes provably diverge.
        let games = [
            game(1.0, "8", "472", Some(1.0)),
            game(1.0, "8", "305", Some(1.0)),
        ];
        let per_game = trained(false, &games);
        let batch = trained(true, &games);

        assert_ne!(rating_of(&per_game, "305"), rating_of(&per_game, "472"));
        assert_ne!(rating_of(&per_game, "8"), rating_of(&batch, "8"));
        assert_ne!(rating_of(&per_game, "305"), rating_of(&batch, "305"));
    }

    #[test]
    fn per_game_mode_is_order_dependent() {
        let forward = trained(
            false,
            &[
                game(1.0, "8", "472", Some(1.0)),
                game(1.0, "8", "305", Some(1.0)),
            ],
        );
        let reversed = trained(
            false,
            &[
                game(1.0, "8", "305", Some(1.0)),
                game(1.0, "8", "472", Some(1.0)),
            ],
        );
        assert_ne!(rating_of(&forward, "305"), rating_of(&reversed, "305"));
    }

    #[test]
    fn batch_commit_is_order_independent() {
        // Every player competes exactly once, each against a different
        // opponent, so any permutation must stage identical updates.
        let games = [
            game(1.0, "1", "2", Some(1.0)),
            game(1.0, "3", "4", Some(0.0)),
            game(1.0, "5", "6", Some(0.5)),
        ];
        let permuted = [games[2].clone(), games[0].clone(), games[1].clone()];

        let a = trained(true, &games);
        let b = trained(true, &permuted);
        for name in ["1", "2", "3", "4", "5", "6"] {
            assert_eq!(rating_of(&a, name), rating_of(&b, name));
        }
    }

    #[test]
    fn draws_between_equals_leave_ratings_pinned() {
        // Two equally rated players drawing repeatedly: deviations shrink,
        // ratings stay exactly at the default.
        let mut engine = engine(true, false);
        engine.train(&[
            game(1.0, "hero", "sparring", Some(0.5)),
            game(2.0, "hero", "sparring", Some(0.5)),
        ]);
        let hero = rating_of(&engine, "hero");
        assert!(hero.deviation < 350.0);
        assert_abs_diff_eq!(hero.rating, 1500.0, epsilon = 1e-9);
    }

    #[test]
    fn inactive_players_are_skipped_not_decayed_in_place() {
        let engine = trained(
            false,
            &[
                game(1.0, "8", "472", Some(1.0)),
                game(2.0, "305", "1024", Some(0.0)),
                game(3.0, "305", "1024", Some(0.0)),
            ],
        );
        // "472" sat out periods 2 and 3: no commits happened, the stored
        // record still shows period 1. Inflation is applied lazily when
        // the player next appears.
        assert_eq!(rating_of(&engine, "472").last_active, Some(Period(1.0)));
    }

    #[test]
    fn lazy_inflation_matches_elapsed_gap() {
        // Same history for "a" except for the length of the idle gap
        // before the comeback game; the longer gap must leave more
        // uncertainty afterwards.
        let short_gap = trained(
            false,
            &[
                game(1.0, "a", "b", Some(1.0)),
                game(2.0, "a", "b", Some(1.0)),
            ],
        );
        let long_gap = trained(
            false,
            &[
                game(1.0, "a", "b", Some(1.0)),
                game(20.0, "a", "b", Some(1.0)),
            ],
        );
        assert!(rating_of(&long_gap, "a").deviation > rating_of(&short_gap, "a").deviation);
    }

    #[test]
    fn prediction_uses_opponent_deviation_only() {
        let engine = trained(false, &[game(1.0, "8", "472", Some(1.0))]);
        let predicted = engine.predict(&game(2.0, "8", "472", None)).unwrap();

        let white = rating_of(&engine, "8");
        let black = rating_of(&engine, "472");
        assert_eq!(
            predicted,
            crate::glicko::expected_score(white.rating, black.rating, black.deviation)
        );
        assert!(predicted.value() > 0.5);
    }

    #[test]
    fn unknown_player_is_a_missing_player_error() {
        let engine = trained(false, &[game(1.0, "8", "472", Some(1.0))]);
        assert!(matches!(
            engine.predict(&game(2.0, "8", "31337", None)),
            Err(Error::MissingPlayer(name)) if name == "31337"
        ));
    }

    #[test]
    fn static_evaluation_does_not_move_ratings() {
        let mut engine = trained(false, &[game(1.0, "8", "472", Some(1.0))]);
        let before = rating_of(&engine, "8");

        let test_games = [game(2.0, "8", "472", None), game(2.0, "472", "8", None)];
        let first = engine.evaluate(&test_games).unwrap();
        let second = engine.evaluate(&test_games).unwrap();

        assert_eq!(first, second);
        assert_eq!(rating_of(&engine, "8"), before);
    }

    #[test]
    fn evolving_evaluation_moves_ratings() {
        let training = [game(1.0, "8", "472", Some(1.0))];
        let test_games = [
            game(2.0, "8", "472", None),
            game(3.0, "8", "472", None),
            game(4.0, "8", "472", None),
        ];

        let mut evolving = engine(false, true);
        evolving.train(&training);
        let before = rating_of(&evolving, "8");
        let evolving_predictions = evolving.evaluate(&test_games).unwrap();
        assert_ne!(rating_of(&evolving, "8"), before);

        let mut fixed = engine(false, false);
        fixed.train(&training);
        let static_predictions = fixed.evaluate(&test_games).unwrap();

        // First prediction predates any evaluation-time update.
        assert_eq!(evolving_predictions[0], static_predictions[0]);
        assert_ne!(evolving_predictions[2], static_predictions[2]);
    }

    #[test]
    fn evolving_evaluation_requires_known_players() {
        let mut evolving = engine(true, true);
        evolving.train(&[game(1.0, "8", "472", Some(1.0))]);
        assert!(matches!(
            evolving.evaluate(&[game(2.0, "8", "31337", None)]),
            Err(Error::MissingPlayer(_))
        ));
    }

    #[test]
    fn training_periods_replay_in_ascending_order_regardless_of_input() {
        // The period-2 game must see the decayed state from period 1 even
        // when the rows arrive reversed.
        let chronological = trained(
            false,
            &[
                game(1.0, "8", "472", Some(1.0)),
                game(2.0, "8", "472", Some(0.0)),
            ],
        );
        let shuffled = trained(
            false,
            &[
                game(2.0, "8", "472", Some(0.0)),
                game(1.0, "8", "472", Some(1.0)),
            ],
        );
        assert_eq!(rating_of(&chronological, "8"), rating_of(&shuffled, "8"));
    }
}
