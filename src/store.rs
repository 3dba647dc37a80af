use rustc_hash::FxHashMap;

use crate::{Period, RatingSystem};

/// Dense index of a known player. Identifiers from the input data are
/// interned into consecutive ids so per-player state can live in plain
/// vectors.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PlayerId(pub usize);

/// The current belief state for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRating {
    pub rating: f64,
    pub deviation: f64,
    /// Period of the player's last committed update. `None` until the
    /// first commit.
    pub last_active: Option<Period>,
}

/// A computed but not yet committed update. Staged values are invisible to
/// every other player's computation until [`RatingStore::commit`] runs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StagedRating {
    pub rating: f64,
    pub deviation: f64,
}

/// Owns the rating records of every player seen in training. Records are
/// created lazily with default values, mutated only through [`commit`],
/// and never destroyed.
///
/// [`commit`]: RatingStore::commit
#[derive(Default)]
pub struct RatingStore {
    ids: FxHashMap<Box<str>, PlayerId>,
    ratings: Vec<PlayerRating>,
}

impl RatingStore {
    /// Looks up a player, seeding a default rating record on first sight.
    /// Training only; evaluation goes through [`RatingStore::id`].
    pub fn get_or_seed(&mut self, name: &str, system: &RatingSystem) -> PlayerId {
        match self.ids.get(name) {
            Some(&id) => id,
            None => {
                let id = PlayerId(self.ratings.len());
                self.ids.insert(Box::from(name), id);
                self.ratings.push(system.seed_rating());
                id
            }
        }
    }

    /// Looks up a player seen in training, or `None`.
    pub fn id(&self, name: &str) -> Option<PlayerId> {
        self.ids.get(name).copied()
    }

    pub fn rating(&self, PlayerId(id): PlayerId) -> &PlayerRating {
        &self.ratings[id]
    }

    /// Copies staged values into the live record and marks the player
    /// active in `period`.
    pub fn commit(&mut self, PlayerId(id): PlayerId, staged: StagedRating, period: Period) {
        let record = &mut self.ratings[id];
        record.rating = staged.rating;
        record.deviation = staged.deviation;
        record.last_active = Some(period);
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn ratings(&self) -> impl Iterator<Item = &PlayerRating> {
        self.ratings.iter()
    }
}
