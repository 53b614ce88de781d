//! # Open Bracket
//!
//! A single-elimination tournament bracket engine for competition classes.
//!
//! This library turns an approved list of registrants into a seeded
//! elimination bracket, assigns byes, records match results, and propagates
//! winners round by round until a champion is produced. Every mutation of a
//! match is captured in an append-only audit trail.
//!
//! ## Architecture
//!
//! The engine is split into pure in-memory computations and a narrow
//! persistence boundary:
//!
//! - **ParticipantPool**: normalizes approved registrants into a competitor list
//! - **Seeder**: assigns draw positions under a configurable policy
//! - **BracketBuilder**: computes rounds, round-1 pairings, and byes
//! - **ProgressionEngine**: moves winners into their downstream slots
//! - **ScoreRecorder**: validates and commits results, emitting audit entries
//! - **BracketStore**: load/save boundary backed by PostgreSQL (or memory in tests)
//!
//! Each bracket is mutated under a per-class lock held by [`BracketManager`];
//! distinct competition classes progress fully in parallel.
//!
//! ## Example
//!
//! ```
//! use open_bracket::bracket::{BracketBuilder, ByePlacement};
//! use open_bracket::draw::{ParticipantPool, Registrant, SeedPolicy, Seeder};
//!
//! let approved: Vec<Registrant> = (1..=7)
//!     .map(|id| Registrant::individual(id, format!("competitor {id}"), None))
//!     .collect();
//!
//! let competitors = ParticipantPool::build(&approved).unwrap();
//! let seeds = Seeder::seed(&competitors, &SeedPolicy::Random, 42).unwrap();
//! let ordered = Seeder::ordered_by_seed(&competitors, &seeds).unwrap();
//! let bracket = BracketBuilder::build(1, ordered, ByePlacement::TopSeeds, 42).unwrap();
//! assert_eq!(bracket.total_rounds, 3);
//! ```

/// Participant pool normalization and seed assignment.
pub mod draw;
pub use draw::{ParticipantPool, Registrant, SeedPolicy, Seeder};

/// Bracket data model, construction, progression, and score recording.
pub mod bracket;
pub use bracket::{
    AuditAction, AuditEntry, Bracket, BracketBuilder, BracketError, BracketResult, ByePlacement,
    Match, MatchStatus, ProgressionEngine, Round, ScoreRecorder,
};

/// Persistence boundary: store traits and PostgreSQL/in-memory implementations.
pub mod store;
pub use store::{
    BracketStore, Database, DatabaseConfig, MemoryBracketStore, ParticipantSource, PgBracketStore,
};

/// Per-class orchestration under a logical bracket lock.
pub mod manager;
pub use manager::{BracketManager, GenerateOptions};
