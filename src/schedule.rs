//! Grouping of games into rating periods and, within a period, by player.
//!
//! Periods are processed in ascending numeric order; processing them out
//! of order would misattribute elapsed-time deviation growth. Within a
//! period, input order is preserved.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

use crate::{store::PlayerId, Period, Score};

/// A game with both participants resolved against the rating store.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub white: PlayerId,
    pub black: PlayerId,
    pub score: Option<Score>,
    pub period: Period,
    /// Index of the originating input row, so predictions can be emitted
    /// in input order.
    pub row: usize,
}

/// Groups encounters by ascending period.
pub fn by_period(encounters: &[Encounter]) -> BTreeMap<OrderedFloat<f64>, Vec<&Encounter>> {
    let mut periods: BTreeMap<OrderedFloat<f64>, Vec<&Encounter>> = BTreeMap::new();
    for encounter in encounters {
        periods
            .entry(OrderedFloat(f64::from(encounter.period)))
            .or_default()
            .push(encounter);
    }
    periods
}

/// Groups one period's encounters by participant. Iteration order over
/// players is arbitrary; each player's own games stay in input order.
pub fn by_player<'a>(encounters: &[&'a Encounter]) -> FxHashMap<PlayerId, Vec<&'a Encounter>> {
    let mut players: FxHashMap<PlayerId, Vec<&'a Encounter>> = FxHashMap::default();
    for &encounter in encounters {
        players.entry(encounter.white).or_default().push(encounter);
        players.entry(encounter.black).or_default().push(encounter);
    }
    players
}
