//! Participant pool: normalizes approved registrants into competitors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::bracket::errors::{BracketError, BracketResult};

/// Competitor ID type
pub type CompetitorId = i64;

/// An approved registration entry as supplied by the registration
/// collaborator. Individual entries have an empty member list.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Registrant {
    /// Competitor ID
    pub competitor_id: CompetitorId,
    /// Display name shown in the bracket
    pub display_name: String,
    /// Club the competitor represents
    pub club_name: Option<String>,
    /// Whether this entry is a team
    pub is_team: bool,
    /// Team member names (empty for individuals)
    pub members: Vec<String>,
}

impl Registrant {
    /// Create an individual registrant
    pub fn individual(
        competitor_id: CompetitorId,
        display_name: impl Into<String>,
        club_name: Option<String>,
    ) -> Self {
        Self {
            competitor_id,
            display_name: display_name.into(),
            club_name,
            is_team: false,
            members: Vec::new(),
        }
    }

    /// Create a team registrant
    pub fn team(
        competitor_id: CompetitorId,
        display_name: impl Into<String>,
        club_name: Option<String>,
        members: Vec<String>,
    ) -> Self {
        Self {
            competitor_id,
            display_name: display_name.into(),
            club_name,
            is_team: true,
            members,
        }
    }
}

/// A competitor occupying one bracket slot, individual or team
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Competitor {
    /// Competitor ID, unique per bracket
    pub id: CompetitorId,
    /// Display name
    pub display_name: String,
    /// Club the competitor represents
    pub club_name: Option<String>,
    /// Whether this competitor is a team
    pub is_team: bool,
    /// Team member names (empty for individuals)
    pub members: Vec<String>,
}

impl From<&Registrant> for Competitor {
    fn from(registrant: &Registrant) -> Self {
        Self {
            id: registrant.competitor_id,
            display_name: registrant.display_name.clone(),
            club_name: registrant.club_name.clone(),
            is_team: registrant.is_team,
            members: registrant.members.clone(),
        }
    }
}

/// Participant pool builder
pub struct ParticipantPool;

impl ParticipantPool {
    /// Normalize an approved registrant list into an ordered competitor list.
    ///
    /// The output keeps insertion order; the input is never mutated. The
    /// [`Seeder`](crate::draw::Seeder) decides the actual draw order later.
    ///
    /// # Errors
    ///
    /// Returns [`BracketError::Validation`] if the list contains duplicate
    /// competitor ids or fewer than 2 entries.
    pub fn build(approved: &[Registrant]) -> BracketResult<Vec<Competitor>> {
        if approved.len() < 2 {
            return Err(BracketError::Validation(format!(
                "need at least 2 approved participants, have {}",
                approved.len()
            )));
        }

        let mut seen = HashSet::with_capacity(approved.len());
        for registrant in approved {
            if !seen.insert(registrant.competitor_id) {
                return Err(BracketError::Validation(format!(
                    "duplicate competitor id {} in participant list",
                    registrant.competitor_id
                )));
            }
        }

        Ok(approved.iter().map(Competitor::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(n: usize) -> Vec<Registrant> {
        (1..=n as i64)
            .map(|id| Registrant::individual(id, format!("competitor {id}"), None))
            .collect()
    }

    #[test]
    fn test_build_keeps_insertion_order() {
        let list = approved(4);
        let competitors = ParticipantPool::build(&list).unwrap();
        let ids: Vec<_> = competitors.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_build_rejects_single_entry() {
        let list = approved(1);
        let err = ParticipantPool::build(&list).unwrap_err();
        assert!(matches!(err, BracketError::Validation(_)));
        assert!(err.to_string().contains("at least 2"));
    }

    #[test]
    fn test_build_rejects_duplicate_ids() {
        let mut list = approved(3);
        list.push(Registrant::individual(2, "duplicate", None));
        let err = ParticipantPool::build(&list).unwrap_err();
        assert!(err.to_string().contains("duplicate competitor id 2"));
    }

    #[test]
    fn test_build_does_not_mutate_input() {
        let list = approved(3);
        let snapshot = list.clone();
        let _ = ParticipantPool::build(&list).unwrap();
        assert_eq!(list, snapshot);
    }

    #[test]
    fn test_team_registrant_carries_members() {
        let mut list = approved(2);
        list.push(Registrant::team(
            3,
            "relay team",
            Some("north club".to_string()),
            vec!["anna".to_string(), "ben".to_string()],
        ));
        let competitors = ParticipantPool::build(&list).unwrap();
        let team = competitors.iter().find(|c| c.id == 3).unwrap();
        assert!(team.is_team);
        assert_eq!(team.members.len(), 2);
    }
}
