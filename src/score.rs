/// A score or expectation value in the range `0.0..=1.0`, where `0.0` is a
/// loss and `1.0` is a win, always from the first-listed player's
/// perspective.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct Score(pub f64);

impl From<Score> for f64 {
    #[inline]
    fn from(Score(score): Score) -> f64 {
        score
    }
}

impl From<f64> for Score {
    #[inline]
    fn from(score: f64) -> Score {
        Score(score)
    }
}

impl Score {
    pub const LOSS: Score = Score(0.0);
    pub const DRAW: Score = Score(0.5);
    pub const WIN: Score = Score(1.0);

    /// The same game result seen from the other player's side.
    #[inline]
    pub fn opposite(self) -> Score {
        Score(1.0 - self.0)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    #[inline]
    pub fn clamp(self, Score(min): Score, Score(max): Score) -> Score {
        Score(self.0.clamp(min, max))
    }
}
