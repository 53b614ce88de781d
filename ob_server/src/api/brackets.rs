//! Bracket generation and retrieval handlers.
//!
//! Generate a bracket:
//! ```bash
//! curl -X POST http://localhost:3000/api/v1/brackets \
//!   -H "x-actor-id: 42" \
//!   -H "Content-Type: application/json" \
//!   -d '{"competition_class_id": 12, "seed_policy": {"policy": "RANDOM"}, "bye_placement": "TOP_SEEDS"}'
//! ```

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use open_bracket::{
    Bracket, BracketResult, ByePlacement,
    draw::{Competitor, SeedPolicy},
    manager::GenerateOptions,
};
use serde::{Deserialize, Serialize};

use super::{AppState, ErrorResponse, error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct GenerateBracketRequest {
    pub competition_class_id: i64,
    #[serde(default = "default_seed_policy")]
    pub seed_policy: SeedPolicy,
    #[serde(default = "default_bye_placement")]
    pub bye_placement: ByePlacement,
    /// Explicit random-source seed for a reproducible draw
    #[serde(default)]
    pub draw_seed: Option<u64>,
    /// Required to regenerate a bracket that already has completed matches
    #[serde(default)]
    pub force: bool,
}

fn default_seed_policy() -> SeedPolicy {
    SeedPolicy::Random
}

fn default_bye_placement() -> ByePlacement {
    ByePlacement::TopSeeds
}

/// Full bracket plus the derived champion once the final is played
#[derive(Debug, Serialize)]
pub struct BracketResponse {
    #[serde(flatten)]
    pub bracket: Bracket,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub champion: Option<Competitor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<Competitor>,
}

impl From<Bracket> for BracketResponse {
    fn from(bracket: Bracket) -> Self {
        let champion = bracket.champion().cloned();
        let runner_up = bracket.runner_up().cloned();
        Self {
            bracket,
            champion,
            runner_up,
        }
    }
}

/// Generate (or with `force`, regenerate) the bracket for a competition class.
///
/// # Request Body
///
/// ```json
/// {
///   "competition_class_id": 12,
///   "seed_policy": {"policy": "RANDOM"},
///   "bye_placement": "TOP_SEEDS",
///   "draw_seed": 4242,
///   "force": false
/// }
/// ```
///
/// Seed policies: `RANDOM`, `BY_RANK` / `BY_EXPERIENCE` (with a `keys` map of
/// competitor id to ranking key), `MANUAL` (with `numbers`, a 1..N
/// permutation). Bye placements: `TOP_SEEDS`, `BOTTOM_SEEDS`, `DISTRIBUTED`,
/// `RANDOM`.
///
/// # Errors
///
/// - `400 Bad Request`: fewer than 2 approved participants, or an invalid
///   manual seed permutation
/// - `401 Unauthorized`: missing `x-actor-id` header
/// - `409 Conflict`: unforced regeneration over a bracket with completed
///   matches
pub async fn generate_bracket(
    State(state): State<AppState>,
    Extension(actor_id): Extension<i64>,
    Json(request): Json<GenerateBracketRequest>,
) -> Result<(StatusCode, Json<BracketResponse>), (StatusCode, Json<ErrorResponse>)> {
    let options = GenerateOptions {
        seed_policy: request.seed_policy,
        bye_placement: request.bye_placement,
        draw_seed: request.draw_seed,
        force: request.force,
    };

    let result: BracketResult<Bracket> = state
        .manager
        .generate(request.competition_class_id, actor_id, options)
        .await;

    match result {
        Ok(bracket) => {
            metrics::brackets_generated_total(request.force);
            Ok((StatusCode::CREATED, Json(bracket.into())))
        }
        Err(e) => Err(error_response(&e)),
    }
}

/// Get the full bracket for a competition class, rounds and matches included.
///
/// Once the final round's match is completed the response also carries the
/// derived `champion` and `runner_up`.
///
/// # Errors
///
/// - `404 Not Found`: no bracket was generated for this class
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(class_id): Path<i64>,
) -> Result<Json<BracketResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.get(class_id).await {
        Ok(bracket) => Ok(Json(bracket.into())),
        Err(e) => Err(error_response(&e)),
    }
}
