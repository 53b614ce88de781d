//! Bracket data model.
//!
//! Matches are addressed arena-style by `(round, position)` rather than
//! through nested parent/child references; the uuid on each match is its
//! external identity for score submission and audit lookups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::draw::{Competitor, CompetitorId, Seed};

/// Competition class ID type
pub type ClassId = i64;

/// Match ID type
pub type MatchId = Uuid;

/// Actor (operator) ID type, supplied by the authentication collaborator
pub type ActorId = i64;

/// Match lifecycle state.
///
/// `Scheduled -> InProgress -> Completed`; `Bye` is terminal and reached
/// directly at creation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    /// Waiting for both slots, or ready to play
    Scheduled,
    /// Automatic advance, no opponent in this round
    Bye,
    /// Play has started
    InProgress,
    /// Result recorded
    Completed,
}

/// One pairing within one round
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Round number, 1-indexed
    pub round: u32,
    /// Position within the round, 1-indexed
    pub position: u32,
    /// First slot; byes fill only this one
    pub slot_a: Option<CompetitorId>,
    /// Second slot
    pub slot_b: Option<CompetitorId>,
    /// Score for slot A, defaults to 0 until recorded
    pub score_a: i64,
    /// Score for slot B, defaults to 0 until recorded
    pub score_b: i64,
    /// Lifecycle state
    pub status: MatchStatus,
}

impl Match {
    /// Create an empty scheduled match
    pub fn empty(round: u32, position: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            position,
            slot_a: None,
            slot_b: None,
            score_a: 0,
            score_b: 0,
            status: MatchStatus::Scheduled,
        }
    }

    /// Create a round pairing with both slots filled
    pub fn pairing(round: u32, position: u32, a: CompetitorId, b: CompetitorId) -> Self {
        Self {
            slot_a: Some(a),
            slot_b: Some(b),
            ..Self::empty(round, position)
        }
    }

    /// Create a bye match, treated as already won by its single competitor
    pub fn bye(round: u32, position: u32, competitor: CompetitorId) -> Self {
        Self {
            slot_a: Some(competitor),
            status: MatchStatus::Bye,
            ..Self::empty(round, position)
        }
    }

    /// Whether the match has reached a terminal state
    pub fn is_resolved(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Bye)
    }

    /// The winner, if the match is resolved.
    ///
    /// A completed match's winner is the higher-scoring slot (ties are
    /// rejected before completion); a bye's winner is its single competitor.
    pub fn winner(&self) -> Option<CompetitorId> {
        match self.status {
            MatchStatus::Bye => self.slot_a.or(self.slot_b),
            MatchStatus::Completed => {
                if self.score_a > self.score_b {
                    self.slot_a
                } else {
                    self.slot_b
                }
            }
            _ => None,
        }
    }

    /// The loser of a completed match
    pub fn loser(&self) -> Option<CompetitorId> {
        match self.status {
            MatchStatus::Completed => {
                if self.score_a > self.score_b {
                    self.slot_b
                } else {
                    self.slot_a
                }
            }
            _ => None,
        }
    }
}

/// One generation layer of the bracket
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Round {
    /// Round number, 1-indexed; the last round is the final
    pub number: u32,
    /// Matches in position order
    pub matches: Vec<Match>,
}

/// Record of a mutation to a match. Append-only, never updated or deleted.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Entry ID
    pub id: Uuid,
    /// Match the mutation applied to
    pub match_id: MatchId,
    /// Operator who performed the mutation
    pub actor_id: ActorId,
    /// What happened
    pub action: AuditAction,
    /// Action-specific payload (scores, superseded results)
    pub payload: serde_json::Value,
    /// When the mutation happened
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Create an entry stamped with the current time
    pub fn new(
        match_id: MatchId,
        actor_id: ActorId,
        action: AuditAction,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id,
            actor_id,
            action,
            payload,
            timestamp: Utc::now(),
        }
    }
}

/// Audited mutation kinds
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// First result recorded on a match
    SetScore,
    /// Completed result replaced under the correction flag
    CorrectScore,
    /// Match moved to in-progress
    StartMatch,
    /// Match superseded by a forced bracket regeneration
    Regenerate,
}

/// The whole elimination tree for one competition class
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Bracket {
    /// Competition class this bracket belongs to
    pub class_id: ClassId,
    /// Bye placement policy the bracket was built with
    pub bye_placement: super::builder::ByePlacement,
    /// Seed fed to the random source; makes the draw reproducible
    pub draw_seed: u64,
    /// Number of rounds, `ceil(log2(N))`
    pub total_rounds: u32,
    /// Competitors in seed order (seed 1 first)
    pub competitors: Vec<Competitor>,
    /// Seed assignment the bracket was built from
    pub seeds: Vec<Seed>,
    /// Rounds in order; round 1 first
    pub rounds: Vec<Round>,
    /// When the bracket was generated
    pub generated_at: DateTime<Utc>,
}

impl Bracket {
    /// Look up a match by round and position (both 1-indexed)
    pub fn match_at(&self, round: u32, position: u32) -> Option<&Match> {
        self.rounds
            .get(round as usize - 1)?
            .matches
            .get(position as usize - 1)
    }

    /// Mutable variant of [`Bracket::match_at`]
    pub fn match_at_mut(&mut self, round: u32, position: u32) -> Option<&mut Match> {
        self.rounds
            .get_mut(round as usize - 1)?
            .matches
            .get_mut(position as usize - 1)
    }

    /// Look up a match by its external id
    pub fn find_match(&self, match_id: MatchId) -> Option<&Match> {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .find(|m| m.id == match_id)
    }

    /// Mutable variant of [`Bracket::find_match`]
    pub fn find_match_mut(&mut self, match_id: MatchId) -> Option<&mut Match> {
        self.rounds
            .iter_mut()
            .flat_map(|r| r.matches.iter_mut())
            .find(|m| m.id == match_id)
    }

    /// Number of matches in the given round
    pub fn matches_in_round(&self, round: u32) -> usize {
        self.rounds
            .get(round as usize - 1)
            .map_or(0, |r| r.matches.len())
    }

    /// Look up a competitor by id
    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.competitors.iter().find(|c| c.id == id)
    }

    /// Whether any match has a recorded result
    pub fn has_completed_matches(&self) -> bool {
        self.rounds
            .iter()
            .flat_map(|r| r.matches.iter())
            .any(|m| m.status == MatchStatus::Completed)
    }

    /// The single match of the final round
    pub fn final_match(&self) -> Option<&Match> {
        self.rounds.last().and_then(|r| r.matches.first())
    }

    /// Whether every match of the given round is resolved
    pub fn round_complete(&self, round: u32) -> bool {
        self.rounds
            .get(round as usize - 1)
            .is_some_and(|r| r.matches.iter().all(Match::is_resolved))
    }

    /// Whether the final has been played
    pub fn is_complete(&self) -> bool {
        self.final_match()
            .is_some_and(|m| m.status == MatchStatus::Completed)
    }

    /// The champion, derivable once the final is completed
    pub fn champion(&self) -> Option<&Competitor> {
        let winner = self.final_match().filter(|m| m.is_resolved())?.winner()?;
        self.competitor(winner)
    }

    /// The runner-up, derivable once the final is completed
    pub fn runner_up(&self) -> Option<&Competitor> {
        let loser = self.final_match()?.loser()?;
        self.competitor(loser)
    }
}
