//! In-memory store backing unit and server tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{BracketStore, ParticipantSource};
use crate::bracket::{AuditEntry, Bracket, BracketResult, ClassId, MatchId};
use crate::draw::Registrant;

/// In-memory implementation of [`BracketStore`] and [`ParticipantSource`]
#[derive(Default)]
pub struct MemoryBracketStore {
    brackets: RwLock<HashMap<ClassId, Bracket>>,
    audit: RwLock<Vec<AuditEntry>>,
    registrants: RwLock<HashMap<ClassId, Vec<Registrant>>>,
}

impl MemoryBracketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the approved participant list for a class
    pub async fn set_registrants(&self, class_id: ClassId, registrants: Vec<Registrant>) {
        self.registrants.write().await.insert(class_id, registrants);
    }

    /// Total number of audit entries across all matches
    pub async fn audit_len(&self) -> usize {
        self.audit.read().await.len()
    }
}

#[async_trait]
impl BracketStore for MemoryBracketStore {
    async fn load_bracket(&self, class_id: ClassId) -> BracketResult<Option<Bracket>> {
        Ok(self.brackets.read().await.get(&class_id).cloned())
    }

    async fn load_bracket_for_match(&self, match_id: MatchId) -> BracketResult<Option<Bracket>> {
        Ok(self
            .brackets
            .read()
            .await
            .values()
            .find(|b| b.find_match(match_id).is_some())
            .cloned())
    }

    async fn save_bracket(&self, bracket: &Bracket) -> BracketResult<()> {
        self.brackets
            .write()
            .await
            .insert(bracket.class_id, bracket.clone());
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> BracketResult<()> {
        self.audit.write().await.push(entry.clone());
        Ok(())
    }

    async fn audit_for_match(&self, match_id: MatchId) -> BracketResult<Vec<AuditEntry>> {
        Ok(self
            .audit
            .read()
            .await
            .iter()
            .filter(|e| e.match_id == match_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ParticipantSource for MemoryBracketStore {
    async fn approved_registrants(&self, class_id: ClassId) -> BracketResult<Vec<Registrant>> {
        Ok(self
            .registrants
            .read()
            .await
            .get(&class_id)
            .cloned()
            .unwrap_or_default())
    }
}
