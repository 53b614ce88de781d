//! Match result and audit-trail handlers.
//!
//! Record a result:
//! ```bash
//! curl -X PUT http://localhost:3000/api/v1/matches/<uuid> \
//!   -H "x-actor-id: 42" \
//!   -H "Content-Type: application/json" \
//!   -d '{"score_a": 21, "score_b": 15}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use open_bracket::{
    Match,
    bracket::{AuditEntry, BracketError, MatchId},
    draw::Competitor,
};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse, error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct RecordScoreRequest {
    pub score_a: i64,
    pub score_b: i64,
    /// Required to amend a result that was already recorded
    #[serde(default)]
    pub correction: bool,
}

/// The updated match, plus the derived champion when this result decided the
/// final
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    #[serde(flatten)]
    pub result: Match,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<Competitor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<Competitor>,
}

/// Record a score on a match; completes it and propagates the winner.
///
/// Re-submitting an identical completed score is a successful no-op. A
/// different score on a completed match requires `"correction": true` and is
/// rejected once the prior winner has already played forward.
///
/// # Errors
///
/// - `400 Bad Request`: negative or equal scores (draws are not permitted)
/// - `401 Unauthorized`: missing `x-actor-id` header
/// - `404 Not Found`: unknown match id
/// - `409 Conflict`: match already completed without the correction flag,
///   bye matches, matches still missing a competitor, or a correction whose
///   prior result has propagated further
pub async fn record_score(
    State(state): State<AppState>,
    Extension(actor_id): Extension<i64>,
    Path(match_id): Path<MatchId>,
    Json(request): Json<RecordScoreRequest>,
) -> Result<Json<MatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state
        .manager
        .record_score(
            match_id,
            request.score_a,
            request.score_b,
            actor_id,
            request.correction,
        )
        .await
    {
        Ok((bracket, _outcome)) => {
            metrics::scores_recorded_total(request.correction);
            match_response(bracket, match_id).map(Json)
        }
        Err(e) => Err(error_response(&e)),
    }
}

/// Mark a scheduled match as in progress.
///
/// # Errors
///
/// - `401 Unauthorized`: missing `x-actor-id` header
/// - `404 Not Found`: unknown match id
/// - `409 Conflict`: byes, completed matches, or matches missing a competitor
pub async fn start_match(
    State(state): State<AppState>,
    Extension(actor_id): Extension<i64>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<MatchResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.start_match(match_id, actor_id).await {
        Ok(bracket) => {
            metrics::matches_started_total();
            match_response(bracket, match_id).map(Json)
        }
        Err(e) => Err(error_response(&e)),
    }
}

/// Ordered audit trail for a match, oldest entry first.
///
/// Entries survive forced regeneration; a superseded match keeps its trail
/// plus the closing `REGENERATE` entry.
///
/// # Errors
///
/// - `404 Not Found`: the match id is completely unknown
pub async fn match_audit(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> Result<Json<Vec<AuditEntry>>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.audit_trail(match_id).await {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => Err(error_response(&e)),
    }
}

fn match_response(
    bracket: open_bracket::Bracket,
    match_id: MatchId,
) -> Result<MatchResponse, (StatusCode, Json<ErrorResponse>)> {
    let result = bracket.find_match(match_id).cloned().ok_or_else(|| {
        error_response(&BracketError::NotFound(format!("unknown match {match_id}")))
    })?;
    Ok(MatchResponse {
        result,
        champion: bracket.champion().cloned(),
        runner_up: bracket.runner_up().cloned(),
    })
}
