use std::ops::Sub;

/// A rating period. Games are grouped into periods, and periods are
/// processed in ascending numeric order. A difference of `1.0` represents
/// one full rating period of elapsed time.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Default)]
pub struct Period(pub f64);

impl From<Period> for f64 {
    #[inline]
    fn from(Period(period): Period) -> f64 {
        period
    }
}

impl From<f64> for Period {
    #[inline]
    fn from(period: f64) -> Period {
        Period(period)
    }
}

impl Period {
    /// Number of rating periods since the player last competed, for the
    /// purpose of deviation decay. A player active in the most recent
    /// period gets `t = 1`; a player who has never competed also gets
    /// `t = 1` (their first game).
    #[inline]
    pub fn periods_since(self, last_active: Option<Period>) -> f64 {
        match last_active {
            Some(Period(last)) => 1.0 + (self.0 - last),
            None => 1.0,
        }
    }
}

impl Sub for Period {
    type Output = f64;

    #[inline]
    fn sub(self, Period(rhs): Period) -> f64 {
        self.0 - rhs
    }
}
