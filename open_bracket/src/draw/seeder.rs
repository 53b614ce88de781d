//! Seed assignment under configurable draw policies.

use std::collections::{HashMap, HashSet};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use super::pool::{Competitor, CompetitorId};
use crate::bracket::errors::{BracketError, BracketResult};

/// A competitor's draw position within one bracket
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seed {
    /// Competitor the seed belongs to
    pub competitor_id: CompetitorId,
    /// Seed number, 1..N
    pub number: u32,
}

/// A caller-supplied seed number for the manual policy
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeedAssignment {
    pub competitor_id: CompetitorId,
    pub number: u32,
}

/// Seeding policy for one draw.
///
/// The random policy draws from a reproducible source: the caller passes a
/// draw seed, which is recorded on the bracket so a regeneration can be
/// replayed bit-identically.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeedPolicy {
    /// Uniform permutation (Fisher-Yates) of all competitors
    Random,
    /// Stable sort by an externally supplied ranking key, best rank first
    ByRank { keys: HashMap<CompetitorId, u32> },
    /// Stable sort by an externally supplied experience key, most first
    ByExperience { keys: HashMap<CompetitorId, u32> },
    /// Seed numbers supplied by the caller, validated as a 1..N permutation
    Manual { numbers: Vec<SeedAssignment> },
}

/// Seed assigner
pub struct Seeder;

impl Seeder {
    /// Assign a seed number to each competitor under the given policy.
    ///
    /// `draw_seed` feeds the random source for [`SeedPolicy::Random`] and is
    /// ignored by the deterministic policies.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError::Validation`] if a manual assignment does not
    /// cover every competitor exactly once or its numbers are not a
    /// permutation of 1..N.
    pub fn seed(
        competitors: &[Competitor],
        policy: &SeedPolicy,
        draw_seed: u64,
    ) -> BracketResult<Vec<Seed>> {
        match policy {
            SeedPolicy::Random => Ok(Self::seed_random(competitors, draw_seed)),
            SeedPolicy::ByRank { keys } | SeedPolicy::ByExperience { keys } => {
                Ok(Self::seed_by_key(competitors, keys))
            }
            SeedPolicy::Manual { numbers } => Self::seed_manual(competitors, numbers),
        }
    }

    /// Return the competitors reordered by seed number (seed 1 first).
    ///
    /// # Errors
    ///
    /// Returns [`BracketError::Validation`] if the seeds do not form a
    /// permutation of 1..N over exactly these competitors.
    pub fn ordered_by_seed(
        competitors: &[Competitor],
        seeds: &[Seed],
    ) -> BracketResult<Vec<Competitor>> {
        let n = competitors.len();
        validate_permutation(seeds.iter().map(|s| s.number), n)?;

        let by_id: HashMap<CompetitorId, &Competitor> =
            competitors.iter().map(|c| (c.id, c)).collect();

        let mut ordered: Vec<Option<Competitor>> = vec![None; n];
        for seed in seeds {
            let competitor = by_id.get(&seed.competitor_id).ok_or_else(|| {
                BracketError::Validation(format!(
                    "seed assigned to unknown competitor {}",
                    seed.competitor_id
                ))
            })?;
            let slot = &mut ordered[(seed.number - 1) as usize];
            if slot.is_some() {
                return Err(BracketError::Validation(format!(
                    "competitor {} seeded more than once",
                    seed.competitor_id
                )));
            }
            *slot = Some((*competitor).clone());
        }

        // validate_permutation plus the uniqueness check above guarantee
        // every slot is filled
        Ok(ordered.into_iter().flatten().collect())
    }

    fn seed_random(competitors: &[Competitor], draw_seed: u64) -> Vec<Seed> {
        let mut rng = StdRng::seed_from_u64(draw_seed);
        let mut order: Vec<usize> = (0..competitors.len()).collect();
        order.shuffle(&mut rng);

        order
            .into_iter()
            .enumerate()
            .map(|(position, index)| Seed {
                competitor_id: competitors[index].id,
                number: position as u32 + 1,
            })
            .collect()
    }

    fn seed_by_key(competitors: &[Competitor], keys: &HashMap<CompetitorId, u32>) -> Vec<Seed> {
        // Missing keys sort after all ranked competitors; ties break by
        // competitor id ascending.
        let mut order: Vec<&Competitor> = competitors.iter().collect();
        order.sort_by_key(|c| (keys.get(&c.id).copied().unwrap_or(u32::MAX), c.id));

        order
            .into_iter()
            .enumerate()
            .map(|(position, competitor)| Seed {
                competitor_id: competitor.id,
                number: position as u32 + 1,
            })
            .collect()
    }

    fn seed_manual(
        competitors: &[Competitor],
        numbers: &[SeedAssignment],
    ) -> BracketResult<Vec<Seed>> {
        let n = competitors.len();
        if numbers.len() != n {
            return Err(BracketError::Validation(format!(
                "seed count {} does not match competitor count {n}",
                numbers.len()
            )));
        }

        let ids: HashSet<CompetitorId> = competitors.iter().map(|c| c.id).collect();
        let mut assigned = HashSet::with_capacity(n);
        for assignment in numbers {
            if !ids.contains(&assignment.competitor_id) {
                return Err(BracketError::Validation(format!(
                    "seed assigned to unknown competitor {}",
                    assignment.competitor_id
                )));
            }
            if !assigned.insert(assignment.competitor_id) {
                return Err(BracketError::Validation(format!(
                    "competitor {} seeded more than once",
                    assignment.competitor_id
                )));
            }
        }
        validate_permutation(numbers.iter().map(|a| a.number), n)?;

        Ok(numbers
            .iter()
            .map(|a| Seed {
                competitor_id: a.competitor_id,
                number: a.number,
            })
            .collect())
    }
}

fn validate_permutation(numbers: impl Iterator<Item = u32>, n: usize) -> BracketResult<()> {
    let mut seen = vec![false; n];
    let mut count = 0usize;
    for number in numbers {
        count += 1;
        if number < 1 || number as usize > n || seen[(number - 1) as usize] {
            return Err(BracketError::Validation(format!(
                "seed numbers not a permutation of 1..{n}"
            )));
        }
        seen[(number - 1) as usize] = true;
    }
    if count != n {
        return Err(BracketError::Validation(format!(
            "seed numbers not a permutation of 1..{n}"
        )));
    }
    Ok(())
}
