//! Bracket manager: orchestrates all bracket mutations under per-class locks.
//!
//! Each bracket is mutated under a single logical lock keyed by its
//! competition class; within that lock, operations apply in arrival order
//! and the lock is released only after state and audit entry are durable.
//! Distinct competition classes progress fully in parallel; there is no
//! cross-bracket shared state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{Mutex, RwLock};

use crate::bracket::{
    ActorId, AuditAction, AuditEntry, Bracket, BracketBuilder, BracketError, BracketResult,
    ByePlacement, ClassId, MatchId, MatchStatus, ScoreOutcome, ScoreRecorder,
};
use crate::draw::{ParticipantPool, SeedPolicy, Seeder};
use crate::store::{BracketStore, ParticipantSource};

/// Options for one bracket generation
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Seeding policy
    pub seed_policy: SeedPolicy,
    /// Bye placement policy
    pub bye_placement: ByePlacement,
    /// Explicit random-source seed; drawn from entropy when absent and
    /// recorded on the bracket either way
    pub draw_seed: Option<u64>,
    /// Allow regeneration over a bracket that already has completed matches
    pub force: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            seed_policy: SeedPolicy::Random,
            bye_placement: ByePlacement::TopSeeds,
            draw_seed: None,
            force: false,
        }
    }
}

/// Bracket manager
#[derive(Clone)]
pub struct BracketManager {
    store: Arc<dyn BracketStore>,
    participants: Arc<dyn ParticipantSource>,
    locks: Arc<RwLock<HashMap<ClassId, Arc<Mutex<()>>>>>,
}

impl BracketManager {
    /// Create a new bracket manager over the given persistence boundary
    pub fn new(store: Arc<dyn BracketStore>, participants: Arc<dyn ParticipantSource>) -> Self {
        Self {
            store,
            participants,
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Generate (or with `force`, regenerate) the bracket for a class.
    ///
    /// Loads the approved participant list, builds the pool, assigns seeds,
    /// and constructs the bracket. Regeneration over a bracket that already
    /// has completed matches is rejected unless `force` is passed, in which
    /// case every superseded completed match gets a `REGENERATE` audit entry
    /// before the replacement is saved; nothing is silently deleted.
    pub async fn generate(
        &self,
        class_id: ClassId,
        actor: ActorId,
        options: GenerateOptions,
    ) -> BracketResult<Bracket> {
        let lock = self.lock_for(class_id).await;
        let _guard = lock.lock().await;

        let existing = self.store.load_bracket(class_id).await?;
        if let Some(old) = &existing {
            if old.has_completed_matches() && !options.force {
                return Err(BracketError::Conflict(format!(
                    "bracket for class {class_id} already has completed matches; pass force to regenerate"
                )));
            }
        }

        let approved = self.participants.approved_registrants(class_id).await?;
        let competitors = ParticipantPool::build(&approved)?;
        let draw_seed = options.draw_seed.unwrap_or_else(rand::random);
        let seeds = Seeder::seed(&competitors, &options.seed_policy, draw_seed)?;
        let ordered = Seeder::ordered_by_seed(&competitors, &seeds)?;
        let bracket = BracketBuilder::build(class_id, ordered, options.bye_placement, draw_seed)?;

        if let Some(old) = existing {
            for superseded in old
                .rounds
                .iter()
                .flat_map(|r| r.matches.iter())
                .filter(|m| m.status == MatchStatus::Completed)
            {
                let entry = AuditEntry::new(
                    superseded.id,
                    actor,
                    AuditAction::Regenerate,
                    json!({
                        "superseded": {
                            "score_a": superseded.score_a,
                            "score_b": superseded.score_b,
                        },
                    }),
                );
                self.store.append_audit(&entry).await?;
            }
        }

        self.store.save_bracket(&bracket).await?;
        log::info!(
            "bracket for class {class_id} generated by actor {actor}: {} competitors, {} rounds",
            bracket.competitors.len(),
            bracket.total_rounds
        );
        Ok(bracket)
    }

    /// Load the bracket for a class
    pub async fn get(&self, class_id: ClassId) -> BracketResult<Bracket> {
        self.store
            .load_bracket(class_id)
            .await?
            .ok_or_else(|| BracketError::NotFound(format!("no bracket for class {class_id}")))
    }

    /// Record a score on a match and propagate the winner.
    ///
    /// The owning bracket is resolved by match id, then reloaded under its
    /// class lock before the mutation, so score updates for one bracket
    /// apply strictly in arrival order. An idempotent resubmission skips the
    /// write entirely.
    pub async fn record_score(
        &self,
        match_id: MatchId,
        score_a: i64,
        score_b: i64,
        actor: ActorId,
        correction: bool,
    ) -> BracketResult<(Bracket, ScoreOutcome)> {
        let class_id = self.class_of_match(match_id).await?;
        let lock = self.lock_for(class_id).await;
        let _guard = lock.lock().await;

        let mut bracket = self.get(class_id).await?;
        let outcome =
            ScoreRecorder::record_score(&mut bracket, match_id, score_a, score_b, actor, correction)?;

        if let Some(entry) = &outcome.audit {
            self.store.save_bracket(&bracket).await?;
            self.store.append_audit(entry).await?;
        }
        Ok((bracket, outcome))
    }

    /// Mark a match as in progress
    pub async fn start_match(&self, match_id: MatchId, actor: ActorId) -> BracketResult<Bracket> {
        let class_id = self.class_of_match(match_id).await?;
        let lock = self.lock_for(class_id).await;
        let _guard = lock.lock().await;

        let mut bracket = self.get(class_id).await?;
        if let Some(entry) = ScoreRecorder::start_match(&mut bracket, match_id, actor)? {
            self.store.save_bracket(&bracket).await?;
            self.store.append_audit(&entry).await?;
        }
        Ok(bracket)
    }

    /// Ordered audit trail for a match
    pub async fn audit_trail(&self, match_id: MatchId) -> BracketResult<Vec<AuditEntry>> {
        // audit survives regeneration, so entries may exist for matches no
        // current bracket owns; only a completely unknown id is an error
        let entries = self.store.audit_for_match(match_id).await?;
        if entries.is_empty() && self.store.load_bracket_for_match(match_id).await?.is_none() {
            return Err(BracketError::NotFound(format!("unknown match {match_id}")));
        }
        Ok(entries)
    }

    /// Whether the backing store is reachable
    pub async fn healthy(&self) -> bool {
        self.store.healthy().await
    }

    async fn class_of_match(&self, match_id: MatchId) -> BracketResult<ClassId> {
        Ok(self
            .store
            .load_bracket_for_match(match_id)
            .await?
            .ok_or_else(|| BracketError::NotFound(format!("unknown match {match_id}")))?
            .class_id)
    }

    async fn lock_for(&self, class_id: ClassId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.read().await.get(&class_id) {
            return lock.clone();
        }
        let mut locks = self.locks.write().await;
        locks
            .entry(class_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
