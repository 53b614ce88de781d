//! Draw phase: participant pool normalization and seed assignment.
//!
//! The draw turns the externally supplied approved-registrant list into an
//! ordered competitor list and assigns each competitor a seed number under a
//! configurable policy. Both steps are pure in-memory computations; the
//! registration and approval workflow itself is an external collaborator.

pub mod pool;
pub mod seeder;

pub use pool::{Competitor, CompetitorId, ParticipantPool, Registrant};
pub use seeder::{Seed, SeedAssignment, SeedPolicy, Seeder};
