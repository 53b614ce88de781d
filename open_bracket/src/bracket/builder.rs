//! Bracket construction: round count, round-1 pairings, and byes.

use std::collections::HashSet;

use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::errors::{BracketError, BracketResult};
use super::models::{Bracket, ClassId, Match, MatchStatus, Round};
use super::progression::ProgressionEngine;
use crate::draw::{Competitor, Seed};

/// Policy deciding which seed positions receive a round-1 bye
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ByePlacement {
    /// Best seeds skip round 1
    TopSeeds,
    /// Worst seeds skip round 1
    BottomSeeds,
    /// Byes spread evenly over the seed order and the round positions,
    /// so they don't cluster by club or seed tier
    Distributed,
    /// Recipients and positions drawn from the bracket's random source
    Random,
}

/// Bracket builder
pub struct BracketBuilder;

impl BracketBuilder {
    /// Build a bracket from competitors already in seed order (seed 1 first).
    ///
    /// Round 1 holds `2^(total_rounds - 1)` matches: one single-slot bye per
    /// competitor without an opponent, plus the remaining competitors paired
    /// two at a time in seed order. Every later round is created with both
    /// slots empty, to be filled by the progression engine. Byes are treated
    /// as already won, so their competitors land in round 2 immediately.
    ///
    /// `draw_seed` feeds the random source for [`ByePlacement::Random`] and
    /// is recorded on the bracket for reproducible regeneration.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError::Validation`] if fewer than 2 competitors are
    /// supplied.
    pub fn build(
        class_id: ClassId,
        seeded: Vec<Competitor>,
        bye_placement: ByePlacement,
        draw_seed: u64,
    ) -> BracketResult<Bracket> {
        let n = seeded.len();
        if n < 2 {
            return Err(BracketError::Validation(format!(
                "need at least 2 competitors to build a bracket, have {n}"
            )));
        }

        let total_rounds = usize::BITS - (n - 1).leading_zeros();
        let slots = 1usize << total_rounds;
        let bye_count = slots - n;
        let round1_len = slots / 2;

        let mut rng = StdRng::seed_from_u64(draw_seed);
        let recipients = bye_recipients(n, bye_count, bye_placement, &mut rng);
        let positions = bye_positions(round1_len, bye_count, bye_placement, &mut rng);

        let recipient_set: HashSet<usize> = recipients.iter().copied().collect();
        let remaining: Vec<&Competitor> = seeded
            .iter()
            .enumerate()
            .filter(|(i, _)| !recipient_set.contains(i))
            .map(|(_, c)| c)
            .collect();

        let mut matches: Vec<Option<Match>> = (0..round1_len).map(|_| None).collect();
        for (recipient, position) in recipients.iter().zip(positions.iter()) {
            matches[*position] = Some(Match::bye(
                1,
                *position as u32 + 1,
                seeded[*recipient].id,
            ));
        }
        let mut pairs = remaining.chunks_exact(2);
        for position in 0..round1_len {
            if matches[position].is_none() {
                let pair = pairs
                    .next()
                    .ok_or_else(|| BracketError::Validation("round 1 pairing underflow".into()))?;
                matches[position] = Some(Match::pairing(
                    1,
                    position as u32 + 1,
                    pair[0].id,
                    pair[1].id,
                ));
            }
        }

        let mut rounds = vec![Round {
            number: 1,
            matches: matches.into_iter().flatten().collect(),
        }];
        let mut previous = round1_len;
        for number in 2..=total_rounds {
            let count = previous.div_ceil(2);
            rounds.push(Round {
                number,
                matches: (1..=count as u32).map(|p| Match::empty(number, p)).collect(),
            });
            previous = count;
        }

        let seeds: Vec<Seed> = seeded
            .iter()
            .enumerate()
            .map(|(i, c)| Seed {
                competitor_id: c.id,
                number: i as u32 + 1,
            })
            .collect();

        let mut bracket = Bracket {
            class_id,
            bye_placement,
            draw_seed,
            total_rounds,
            competitors: seeded,
            seeds,
            rounds,
            generated_at: Utc::now(),
        };

        let byes: Vec<u32> = bracket.rounds[0]
            .matches
            .iter()
            .filter(|m| m.status == MatchStatus::Bye)
            .map(|m| m.position)
            .collect();
        for position in byes {
            ProgressionEngine::propagate(&mut bracket, 1, position)?;
        }

        log::info!(
            "built bracket for class {class_id}: {n} competitors, {total_rounds} rounds, {bye_count} byes"
        );
        Ok(bracket)
    }
}

/// Indices into the seed order that receive a bye, ascending
fn bye_recipients(
    n: usize,
    bye_count: usize,
    placement: ByePlacement,
    rng: &mut StdRng,
) -> Vec<usize> {
    if bye_count == 0 {
        return Vec::new();
    }
    match placement {
        ByePlacement::TopSeeds => (0..bye_count).collect(),
        ByePlacement::BottomSeeds => (n - bye_count..n).collect(),
        ByePlacement::Distributed => (0..bye_count).map(|i| i * n / bye_count).collect(),
        ByePlacement::Random => {
            let mut indices: Vec<usize> = (0..n).collect();
            indices.shuffle(rng);
            let mut picked: Vec<usize> = indices.into_iter().take(bye_count).collect();
            picked.sort_unstable();
            picked
        }
    }
}

/// 0-based round-1 positions the bye matches occupy, ascending
fn bye_positions(
    round1_len: usize,
    bye_count: usize,
    placement: ByePlacement,
    rng: &mut StdRng,
) -> Vec<usize> {
    if bye_count == 0 {
        return Vec::new();
    }
    match placement {
        ByePlacement::TopSeeds => (0..bye_count).collect(),
        ByePlacement::BottomSeeds => (round1_len - bye_count..round1_len).collect(),
        ByePlacement::Distributed => (0..bye_count)
            .map(|i| i * round1_len / bye_count)
            .collect(),
        ByePlacement::Random => {
            let mut positions: Vec<usize> = (0..round1_len).collect();
            positions.shuffle(rng);
            let mut picked: Vec<usize> = positions.into_iter().take(bye_count).collect();
            picked.sort_unstable();
            picked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(n: usize) -> Vec<Competitor> {
        (1..=n as i64)
            .map(|id| Competitor {
                id,
                display_name: format!("competitor {id}"),
                club_name: None,
                is_team: false,
                members: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_total_rounds_is_ceil_log2() {
        for (n, expected) in [(2usize, 1u32), (3, 2), (4, 2), (5, 3), (7, 3), (8, 3), (9, 4)] {
            let bracket =
                BracketBuilder::build(1, seeded(n), ByePlacement::TopSeeds, 0).unwrap();
            assert_eq!(bracket.total_rounds, expected, "N = {n}");
        }
    }

    #[test]
    fn test_bye_count_fills_the_power_of_two() {
        for n in 2..=17usize {
            let bracket =
                BracketBuilder::build(1, seeded(n), ByePlacement::TopSeeds, 0).unwrap();
            let byes = bracket.rounds[0]
                .matches
                .iter()
                .filter(|m| m.status == MatchStatus::Bye)
                .count();
            let expected = (1usize << bracket.total_rounds) - n;
            assert_eq!(byes, expected, "N = {n}");
        }
    }

    #[test]
    fn test_seven_competitors_top_seeds() {
        let bracket = BracketBuilder::build(1, seeded(7), ByePlacement::TopSeeds, 0).unwrap();
        assert_eq!(bracket.total_rounds, 3);
        assert_eq!(bracket.rounds[0].matches.len(), 4);
        assert_eq!(bracket.rounds[1].matches.len(), 2);
        assert_eq!(bracket.rounds[2].matches.len(), 1);

        // seed 1 has the bye and advances automatically into round 2
        let bye = &bracket.rounds[0].matches[0];
        assert_eq!(bye.status, MatchStatus::Bye);
        assert_eq!(bye.slot_a, Some(1));
        assert_eq!(bracket.rounds[1].matches[0].slot_a, Some(1));

        // remaining seeds pair two at a time in seed order
        let second = &bracket.rounds[0].matches[1];
        assert_eq!((second.slot_a, second.slot_b), (Some(2), Some(3)));
        let last = &bracket.rounds[0].matches[3];
        assert_eq!((last.slot_a, last.slot_b), (Some(6), Some(7)));
    }

    #[test]
    fn test_two_competitors_single_final() {
        let bracket = BracketBuilder::build(1, seeded(2), ByePlacement::TopSeeds, 0).unwrap();
        assert_eq!(bracket.total_rounds, 1);
        assert_eq!(bracket.rounds.len(), 1);
        let only = &bracket.rounds[0].matches[0];
        assert_eq!((only.slot_a, only.slot_b), (Some(1), Some(2)));
        assert_eq!(only.status, MatchStatus::Scheduled);
    }

    #[test]
    fn test_bottom_seeds_byes_go_to_worst_seeds() {
        let bracket = BracketBuilder::build(1, seeded(6), ByePlacement::BottomSeeds, 0).unwrap();
        let byes: Vec<_> = bracket.rounds[0]
            .matches
            .iter()
            .filter(|m| m.status == MatchStatus::Bye)
            .map(|m| m.slot_a.unwrap())
            .collect();
        assert_eq!(byes, vec![5, 6]);
        // bye matches trail the played matches
        assert_eq!(bracket.rounds[0].matches[0].status, MatchStatus::Scheduled);
        assert_eq!(bracket.rounds[0].matches[3].status, MatchStatus::Bye);
    }

    #[test]
    fn test_distributed_byes_do_not_cluster() {
        let bracket = BracketBuilder::build(1, seeded(12), ByePlacement::Distributed, 0).unwrap();
        let bye_positions: Vec<u32> = bracket.rounds[0]
            .matches
            .iter()
            .filter(|m| m.status == MatchStatus::Bye)
            .map(|m| m.position)
            .collect();
        // 4 byes over 8 positions: every other position
        assert_eq!(bye_positions, vec![1, 3, 5, 7]);
    }

    #[test]
    fn test_random_placement_is_reproducible() {
        let first = BracketBuilder::build(1, seeded(11), ByePlacement::Random, 77).unwrap();
        let second = BracketBuilder::build(1, seeded(11), ByePlacement::Random, 77).unwrap();
        let shape = |b: &Bracket| -> Vec<(u32, Option<i64>, Option<i64>)> {
            b.rounds[0]
                .matches
                .iter()
                .map(|m| (m.position, m.slot_a, m.slot_b))
                .collect()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_later_rounds_are_empty_and_scheduled() {
        let bracket = BracketBuilder::build(1, seeded(8), ByePlacement::TopSeeds, 0).unwrap();
        for round in &bracket.rounds[1..] {
            for m in &round.matches {
                assert_eq!(m.status, MatchStatus::Scheduled);
                assert_eq!(m.slot_a, None);
                assert_eq!(m.slot_b, None);
            }
        }
    }

    #[test]
    fn test_single_competitor_is_rejected() {
        let err = BracketBuilder::build(1, seeded(1), ByePlacement::TopSeeds, 0).unwrap_err();
        assert!(matches!(err, BracketError::Validation(_)));
    }

    #[test]
    fn test_round_shapes_follow_ceil_halving() {
        let bracket = BracketBuilder::build(1, seeded(13), ByePlacement::TopSeeds, 0).unwrap();
        for window in bracket.rounds.windows(2) {
            assert_eq!(
                window[1].matches.len(),
                window[0].matches.len().div_ceil(2)
            );
        }
    }
}
