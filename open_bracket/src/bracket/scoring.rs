//! Score recording: validates and commits results, emitting audit entries.

use serde_json::json;

use super::errors::{BracketError, BracketResult};
use super::models::{ActorId, AuditAction, AuditEntry, Bracket, MatchId, MatchStatus};
use super::progression::{Progression, ProgressionEngine};

/// Outcome of one score submission
#[derive(Clone, Debug)]
pub struct ScoreOutcome {
    /// Match the score applied to
    pub match_id: MatchId,
    /// Where the winner went
    pub progression: Progression,
    /// Audit entry to persist; `None` for an idempotent no-op
    pub audit: Option<AuditEntry>,
}

/// Score recorder
pub struct ScoreRecorder;

impl ScoreRecorder {
    /// Validate and commit a score, complete the match, and propagate the
    /// winner.
    ///
    /// Re-submitting the identical score on a completed match is a
    /// successful no-op, tolerating retries. A different score on a
    /// completed match requires `correction`, and is only accepted while the
    /// prior winner's downstream match is still untouched; undoing a result
    /// whose winner has already played forward would corrupt the tree.
    ///
    /// # Errors
    ///
    /// - [`BracketError::Validation`] for negative or equal scores
    /// - [`BracketError::NotFound`] for an unknown match id
    /// - [`BracketError::Conflict`] for byes, matches missing a competitor,
    ///   completed matches without `correction`, or corrections whose prior
    ///   result has propagated further
    pub fn record_score(
        bracket: &mut Bracket,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
        actor: ActorId,
        correction: bool,
    ) -> BracketResult<ScoreOutcome> {
        if score_a < 0 || score_b < 0 {
            return Err(BracketError::Validation(format!(
                "scores must be non-negative integers, got {score_a}:{score_b}"
            )));
        }
        if score_a == score_b {
            return Err(BracketError::Validation(format!(
                "draws are not permitted in single elimination, got {score_a}:{score_b}"
            )));
        }

        let snapshot = bracket
            .find_match(match_id)
            .ok_or_else(|| BracketError::NotFound(format!("unknown match {match_id}")))?
            .clone();
        let (round, position) = (snapshot.round, snapshot.position);

        match snapshot.status {
            MatchStatus::Bye => {
                return Err(BracketError::Conflict(format!(
                    "match {match_id} is a bye and cannot be scored"
                )));
            }
            MatchStatus::Completed => {
                if snapshot.score_a == score_a && snapshot.score_b == score_b {
                    // duplicate submission, tolerate the retry
                    return Ok(ScoreOutcome {
                        match_id,
                        progression: Progression::AlreadyApplied,
                        audit: None,
                    });
                }
                if !correction {
                    return Err(BracketError::Conflict(format!(
                        "match {match_id} is already completed; pass the correction flag to amend the result"
                    )));
                }
                Self::retract_prior_result(bracket, round, position)?;
            }
            MatchStatus::Scheduled | MatchStatus::InProgress => {
                if snapshot.slot_a.is_none() || snapshot.slot_b.is_none() {
                    return Err(BracketError::Conflict(format!(
                        "match {match_id} is not ready: both slots must be filled"
                    )));
                }
            }
        }

        let correcting = snapshot.status == MatchStatus::Completed;
        let m = bracket
            .find_match_mut(match_id)
            .ok_or_else(|| BracketError::NotFound(format!("unknown match {match_id}")))?;
        m.score_a = score_a;
        m.score_b = score_b;
        m.status = MatchStatus::Completed;

        let (action, payload) = if correcting {
            (
                AuditAction::CorrectScore,
                json!({
                    "score_a": score_a,
                    "score_b": score_b,
                    "superseded": { "score_a": snapshot.score_a, "score_b": snapshot.score_b },
                }),
            )
        } else {
            (
                AuditAction::SetScore,
                json!({ "score_a": score_a, "score_b": score_b }),
            )
        };
        let audit = AuditEntry::new(match_id, actor, action, payload);

        let progression = ProgressionEngine::propagate(bracket, round, position)?;
        log::info!(
            "recorded {score_a}:{score_b} on match {match_id} (round {round} position {position}) by actor {actor}"
        );

        Ok(ScoreOutcome {
            match_id,
            progression,
            audit: Some(audit),
        })
    }

    /// Mark a scheduled match as in progress.
    ///
    /// Starting an already started match is a no-op (returns `None`).
    ///
    /// # Errors
    ///
    /// [`BracketError::Conflict`] for byes, completed matches, or matches
    /// missing a competitor; [`BracketError::NotFound`] for unknown ids.
    pub fn start_match(
        bracket: &mut Bracket,
        match_id: MatchId,
        actor: ActorId,
    ) -> BracketResult<Option<AuditEntry>> {
        let m = bracket
            .find_match_mut(match_id)
            .ok_or_else(|| BracketError::NotFound(format!("unknown match {match_id}")))?;

        match m.status {
            MatchStatus::InProgress => Ok(None),
            MatchStatus::Bye => Err(BracketError::Conflict(format!(
                "match {match_id} is a bye and cannot be started"
            ))),
            MatchStatus::Completed => Err(BracketError::Conflict(format!(
                "match {match_id} is already completed"
            ))),
            MatchStatus::Scheduled => {
                if m.slot_a.is_none() || m.slot_b.is_none() {
                    return Err(BracketError::Conflict(format!(
                        "match {match_id} is not ready: both slots must be filled"
                    )));
                }
                m.status = MatchStatus::InProgress;
                Ok(Some(AuditEntry::new(
                    match_id,
                    actor,
                    AuditAction::StartMatch,
                    json!({ "slot_a": m.slot_a, "slot_b": m.slot_b }),
                )))
            }
        }
    }

    /// Undo the downstream effect of a completed match before a correction.
    ///
    /// The prior winner's downstream slot is cleared, but only while the
    /// downstream match is still scheduled with no result of its own.
    fn retract_prior_result(
        bracket: &mut Bracket,
        round: u32,
        position: u32,
    ) -> BracketResult<()> {
        if round == bracket.total_rounds {
            // the final has no downstream match to unwind
            return Ok(());
        }

        let prior_winner = bracket
            .match_at(round, position)
            .and_then(super::models::Match::winner)
            .ok_or_else(|| {
                BracketError::Conflict(format!(
                    "completed match at round {round} position {position} has no winner"
                ))
            })?;

        let to_round = round + 1;
        let to_position = position.div_ceil(2);
        let fills_slot_a = position % 2 == 1;
        let downstream = bracket
            .match_at_mut(to_round, to_position)
            .ok_or_else(|| {
                BracketError::NotFound(format!(
                    "no downstream match at round {to_round} position {to_position}"
                ))
            })?;

        if downstream.status != MatchStatus::Scheduled {
            return Err(BracketError::Conflict(format!(
                "result at round {round} position {position} has already propagated further and can no longer be corrected"
            )));
        }

        let slot = if fills_slot_a {
            &mut downstream.slot_a
        } else {
            &mut downstream.slot_b
        };
        match slot {
            Some(existing) if *existing == prior_winner => {
                *slot = None;
                Ok(())
            }
            Some(existing) => Err(BracketError::Conflict(format!(
                "downstream slot holds competitor {existing}, expected {prior_winner}"
            ))),
            // winner was never propagated; nothing to unwind
            None => Ok(()),
        }
    }
}
