//! Store trait definitions and the PostgreSQL implementation.
//!
//! Brackets persist as one JSONB document per competition class plus a
//! match-id index table, so a score submission addressed by match id can
//! find its owning bracket in one query. Audit entries live in an
//! append-only table that is never updated or deleted.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::bracket::{AuditEntry, Bracket, BracketResult, ClassId, MatchId};
use crate::draw::Registrant;

/// Load/save boundary for brackets, matches, and audit entries.
///
/// Each call is atomic: a bracket save either lands fully (document plus
/// match index) or not at all.
#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Load the bracket for a competition class, if one was generated
    async fn load_bracket(&self, class_id: ClassId) -> BracketResult<Option<Bracket>>;

    /// Load the bracket that owns the given match
    async fn load_bracket_for_match(&self, match_id: MatchId) -> BracketResult<Option<Bracket>>;

    /// Persist a bracket, replacing any previous one for its class
    async fn save_bracket(&self, bracket: &Bracket) -> BracketResult<()>;

    /// Append one audit entry
    async fn append_audit(&self, entry: &AuditEntry) -> BracketResult<()>;

    /// All audit entries for a match, oldest first
    async fn audit_for_match(&self, match_id: MatchId) -> BracketResult<Vec<AuditEntry>>;

    /// Whether the backing storage is reachable
    async fn healthy(&self) -> bool {
        true
    }
}

/// Read boundary to the registration collaborator: the approved participant
/// list for one competition class.
#[async_trait]
pub trait ParticipantSource: Send + Sync {
    /// Approved registrants in approval order
    async fn approved_registrants(&self, class_id: ClassId) -> BracketResult<Vec<Registrant>>;
}

/// PostgreSQL implementation of [`BracketStore`] and [`ParticipantSource`]
pub struct PgBracketStore {
    pool: PgPool,
}

impl PgBracketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BracketStore for PgBracketStore {
    async fn load_bracket(&self, class_id: ClassId) -> BracketResult<Option<Bracket>> {
        let row = sqlx::query("SELECT data FROM brackets WHERE competition_class_id = $1")
            .bind(class_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.get("data");
                Ok(Some(serde_json::from_value(data)?))
            }
            None => Ok(None),
        }
    }

    async fn load_bracket_for_match(&self, match_id: MatchId) -> BracketResult<Option<Bracket>> {
        let row = sqlx::query(
            r#"
            SELECT b.data
            FROM brackets b
            JOIN bracket_matches m ON m.competition_class_id = b.competition_class_id
            WHERE m.match_id = $1
            "#,
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let data: serde_json::Value = row.get("data");
                Ok(Some(serde_json::from_value(data)?))
            }
            None => Ok(None),
        }
    }

    async fn save_bracket(&self, bracket: &Bracket) -> BracketResult<()> {
        let data = serde_json::to_value(bracket)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO brackets (competition_class_id, total_rounds, draw_seed, data, generated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (competition_class_id)
            DO UPDATE SET total_rounds = $2, draw_seed = $3, data = $4, generated_at = $5
            "#,
        )
        .bind(bracket.class_id)
        .bind(bracket.total_rounds as i32)
        .bind(bracket.draw_seed as i64)
        .bind(&data)
        .bind(bracket.generated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM bracket_matches WHERE competition_class_id = $1")
            .bind(bracket.class_id)
            .execute(&mut *tx)
            .await?;

        for m in bracket.rounds.iter().flat_map(|r| r.matches.iter()) {
            sqlx::query(
                "INSERT INTO bracket_matches (match_id, competition_class_id) VALUES ($1, $2)",
            )
            .bind(m.id)
            .bind(bracket.class_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn append_audit(&self, entry: &AuditEntry) -> BracketResult<()> {
        let action = serde_json::to_value(entry.action)?;
        let action = action.as_str().unwrap_or_default().to_string();

        sqlx::query(
            r#"
            INSERT INTO match_audit (id, match_id, actor_id, action, payload, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.match_id)
        .bind(entry.actor_id)
        .bind(action)
        .bind(&entry.payload)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn audit_for_match(&self, match_id: MatchId) -> BracketResult<Vec<AuditEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, match_id, actor_id, action, payload, created_at
            FROM match_audit
            WHERE match_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let action: String = row.get("action");
                Ok(AuditEntry {
                    id: row.get("id"),
                    match_id: row.get("match_id"),
                    actor_id: row.get("actor_id"),
                    action: serde_json::from_value(serde_json::Value::String(action))?,
                    payload: row.get("payload"),
                    timestamp: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[async_trait]
impl ParticipantSource for PgBracketStore {
    async fn approved_registrants(&self, class_id: ClassId) -> BracketResult<Vec<Registrant>> {
        let rows = sqlx::query(
            r#"
            SELECT competitor_id, display_name, club_name, is_team, members
            FROM approved_registrations
            WHERE competition_class_id = $1
            ORDER BY approved_at ASC, competitor_id ASC
            "#,
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let members: serde_json::Value = row.get("members");
                Ok(Registrant {
                    competitor_id: row.get("competitor_id"),
                    display_name: row.get("display_name"),
                    club_name: row.get("club_name"),
                    is_team: row.get("is_team"),
                    members: serde_json::from_value(members)?,
                })
            })
            .collect()
    }
}
