#![no_main]

use arbitrary::Arbitrary;
use chess_glicko::{Period, PlayerRating, RatingSystem};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ArbitraryPlayer {
    rating: f64,
    deviation: f64,
    last_active: Option<f64>,
}

impl ArbitraryPlayer {
    fn into_clamped(self) -> Option<PlayerRating> {
        if self.rating.is_nan()
            || self.deviation.is_nan()
            || self.last_active.is_some_and(f64::is_nan)
        {
            None
        } else {
            Some(PlayerRating {
                rating: self.rating.clamp(-10000.0, 10000.0),
                deviation: self.deviation.clamp(0.0, 1000.0),
                last_active: self
                    .last_active
                    .map(|period| Period(period.clamp(-1_000_000.0, 1_000_000.0))),
            })
        }
    }
}

#[derive(Arbitrary, Debug)]
struct ArbitraryEncounter {
    white: ArbitraryPlayer,
    black: ArbitraryPlayer,
    score: f64,
    period: f64,
}

fn assert_staged(rating: f64, deviation: f64) {
    assert!(!rating.is_nan());
    assert!(!deviation.is_nan());
}

fuzz_target!(|encounter: ArbitraryEncounter| {
    let (Some(white), Some(black)) = (
        encounter.white.into_clamped(),
        encounter.black.into_clamped(),
    ) else {
        return;
    };
    if encounter.score.is_nan() || encounter.period.is_nan() {
        return;
    }

    let period = Period(encounter.period.clamp(-1_000_000.0, 1_000_000.0));

    // Periods are replayed in ascending order, so activity never postdates
    // the period being rated.
    if white.last_active.is_some_and(|last| last > period)
        || black.last_active.is_some_and(|last| last > period)
    {
        return;
    }

    let system = RatingSystem::builder().build().unwrap();
    let score = encounter.score.clamp(0.0, 1.0);

    let staged_white = system.rate(
        &white,
        period,
        &[black.rating],
        &[black.deviation],
        &[score],
    );
    let staged_black = system.rate(
        &black,
        period,
        &[white.rating],
        &[white.deviation],
        &[1.0 - score],
    );

    assert_staged(staged_white.rating, staged_white.deviation);
    assert_staged(staged_black.rating, staged_black.deviation);
});
