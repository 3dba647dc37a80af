//! Glicko ratings for two-player games, replayed over discrete rating
//! periods, with outcome prediction for held-out games.
//!
//! Games are grouped by rating period and processed in ascending period
//! order. Within a period, updates are applied either game by game (as
//! real-time rating servers do) or once per player per period from a
//! shared pre-period snapshot (the historically faithful Glicko model).
//! See [`RatingSystemBuilder`] for the configuration surface and
//! [`RatingEngine`] for the two update disciplines.
//!
//! ```
//! use chess_glicko::{GameRecord, Period, RatingEngine, RatingSystem, Score};
//!
//! let system = RatingSystem::builder().batch_mode(true).build()?;
//! let mut engine = RatingEngine::new(system);
//!
//! engine.train(&[GameRecord {
//!     period: Period(1.0),
//!     white: "8".to_owned(),
//!     black: "472".to_owned(),
//!     score: Some(Score::WIN),
//! }]);
//!
//! let probability = engine.predict(&GameRecord {
//!     period: Period(2.0),
//!     white: "8".to_owned(),
//!     black: "472".to_owned(),
//!     score: None,
//! })?;
//! assert!(probability.value() > 0.5);
//! # Ok::<_, chess_glicko::Error>(())
//! ```

pub mod dataset;
pub mod glicko;

mod engine;
mod error;
mod period;
mod schedule;
mod score;
mod store;
mod system;

pub use dataset::GameRecord;
pub use engine::RatingEngine;
pub use error::{ConfigError, Error};
pub use period::Period;
pub use score::Score;
pub use store::{PlayerId, PlayerRating, RatingStore, StagedRating};
pub use system::{RatingSystem, RatingSystemBuilder};
