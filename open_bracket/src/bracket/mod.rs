//! Bracket construction, progression, and score recording.
//!
//! A bracket is the full elimination tree for one competition class.
//! [`BracketBuilder`] turns a seeded competitor list into round-1 pairings
//! (including byes) plus empty placeholder matches for every later round.
//! [`ScoreRecorder`] commits results and [`ProgressionEngine`] moves each
//! winner into its downstream slot until the final resolves.

pub mod builder;
pub mod errors;
pub mod models;
pub mod progression;
pub mod scoring;

pub use builder::{BracketBuilder, ByePlacement};
pub use errors::{BracketError, BracketResult};
pub use models::{
    ActorId, AuditAction, AuditEntry, Bracket, ClassId, Match, MatchId, MatchStatus, Round,
};
pub use progression::{Progression, ProgressionEngine};
pub use scoring::{ScoreOutcome, ScoreRecorder};
