//! Winner propagation: the single state machine that advances a bracket.
//!
//! A match winner at position `p` of round `r` lands in round `r + 1` at
//! position `ceil(p / 2)`, slot A if `p` is odd and slot B if even. All
//! "winner advances" decisions live here; score validation and commits live
//! in [`scoring`](super::scoring).

use super::errors::{BracketError, BracketResult};
use super::models::{Bracket, MatchStatus};
use crate::draw::CompetitorId;

/// Result of propagating one resolved match
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Progression {
    /// Winner written into its downstream slot
    Advanced {
        winner: CompetitorId,
        to_round: u32,
        to_position: u32,
    },
    /// The final resolved; the bracket has a champion
    Champion {
        champion: CompetitorId,
        runner_up: Option<CompetitorId>,
    },
    /// The winner was already in its downstream slot; duplicate delivery
    AlreadyApplied,
}

/// Progression engine
pub struct ProgressionEngine;

impl ProgressionEngine {
    /// Move the winner of the resolved match at `(round, position)` into the
    /// correct slot of the next round.
    ///
    /// Re-invoking for an already-propagated match is a no-op
    /// ([`Progression::AlreadyApplied`]), which guards against duplicate
    /// event delivery. If the downstream match has no sibling feeder
    /// position (odd match count in this round), it auto-resolves as a bye
    /// and propagation continues recursively. Two competitors who both
    /// advanced on byes still have to play; only a structurally empty slot
    /// makes the downstream match a bye.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError::NotFound`] for an unknown `(round, position)`
    /// and [`BracketError::Conflict`] if the source match is unresolved or
    /// the downstream slot already holds a different competitor.
    pub fn propagate(
        bracket: &mut Bracket,
        round: u32,
        position: u32,
    ) -> BracketResult<Progression> {
        let source = bracket.match_at(round, position).ok_or_else(|| {
            BracketError::NotFound(format!("no match at round {round} position {position}"))
        })?;
        if !source.is_resolved() {
            return Err(BracketError::Conflict(format!(
                "cannot propagate round {round} position {position}: match is not resolved"
            )));
        }
        let winner = source.winner().ok_or_else(|| {
            BracketError::Conflict(format!(
                "resolved match at round {round} position {position} has no winner"
            ))
        })?;

        if round == bracket.total_rounds {
            // no downstream match: the bracket is decided
            let runner_up = source.loser();
            return Ok(Progression::Champion {
                champion: winner,
                runner_up,
            });
        }

        let to_round = round + 1;
        let to_position = position.div_ceil(2);
        let fills_slot_a = position % 2 == 1;
        let sibling = if fills_slot_a { position + 1 } else { position - 1 };
        let sibling_exists = sibling >= 1 && sibling as usize <= bracket.matches_in_round(round);

        let downstream = bracket.match_at_mut(to_round, to_position).ok_or_else(|| {
            BracketError::NotFound(format!(
                "no downstream match at round {to_round} position {to_position}"
            ))
        })?;
        let slot = if fills_slot_a {
            &mut downstream.slot_a
        } else {
            &mut downstream.slot_b
        };
        match slot {
            Some(existing) if *existing == winner => return Ok(Progression::AlreadyApplied),
            Some(existing) => {
                return Err(BracketError::Conflict(format!(
                    "downstream slot at round {to_round} position {to_position} already holds competitor {existing}"
                )));
            }
            None => *slot = Some(winner),
        }

        if !sibling_exists {
            // no feeder exists for the other slot: structural bye
            downstream.status = MatchStatus::Bye;
            log::debug!(
                "round {to_round} position {to_position} has no sibling feeder, advancing {winner} on a bye"
            );
            return Self::propagate(bracket, to_round, to_position);
        }

        log::debug!("competitor {winner} advanced to round {to_round} position {to_position}");
        Ok(Progression::Advanced {
            winner,
            to_round,
            to_position,
        })
    }
}
