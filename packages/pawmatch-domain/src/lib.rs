pub mod explanation;
pub mod pet;
pub mod query;
pub mod relevance;
pub mod structured_output;

pub use pet::{EnergyLevel, Pet, Sex, Size, Species};
pub use query::{Candidate, MatchQuery};
pub use relevance::{BatchScores, CountAdjustment, ScoreShapeError};
pub use structured_output::MalformedOutput;
