//! HTTP API for the bracket server.
//!
//! This module provides the REST surface over the bracket engine: bracket
//! generation and retrieval, score recording with winner propagation, and
//! the per-match audit trail.
//!
//! # Architecture
//!
//! - **Axum**: async web framework for the HTTP surface
//! - **Per-class locks**: all mutations go through the
//!   [`BracketManager`](open_bracket::BracketManager), which serializes
//!   operations per competition class
//! - **Actor header**: authentication is handled upstream; the gateway
//!   forwards the operator identity in `x-actor-id`, which the middleware
//!   injects into mutating handlers for the audit trail
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                              - Health check (public)
//! POST /api/v1/brackets                     - Generate or regenerate a bracket (actor required)
//! GET  /api/v1/brackets/{class_id}          - Get full bracket (public)
//! PUT  /api/v1/matches/{match_id}           - Record a score (actor required)
//! POST /api/v1/matches/{match_id}/start     - Mark a match in progress (actor required)
//! GET  /api/v1/matches/{match_id}/audit     - Ordered audit entries (public)
//! ```
//!
//! # Error Bodies
//!
//! Every rejected operation returns `{"error": "<message>"}` naming the
//! violated invariant: validation failures map to `400`, conflicts to
//! `409`, unknown ids to `404`, storage failures to a sanitized `500`.

pub mod brackets;
pub mod matches;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use open_bracket::{BracketError, BracketManager};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request (cheap due to the Arc wrapper); the manager owns the
/// persistence boundary and the per-class locks.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<BracketManager>,
}

/// JSON error body returned by every failing endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a bracket error onto its HTTP status and client-safe body.
///
/// Storage and serialization failures are logged server-side and collapsed
/// to a generic 500; domain errors pass their message through.
pub(crate) fn error_response(err: &BracketError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match err {
        BracketError::Validation(_) => StatusCode::BAD_REQUEST,
        BracketError::Conflict(_) => StatusCode::CONFLICT,
        BracketError::NotFound(_) => StatusCode::NOT_FOUND,
        BracketError::Database(_) | BracketError::Serialization(_) => {
            tracing::error!(error = %err, "storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

/// Create the complete API router with all endpoints and middleware.
///
/// Read endpoints are public; mutating endpoints sit behind the actor
/// middleware so every mutation carries an operator identity for the audit
/// trail. All routes get the request-id middleware and a CORS layer.
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create the versioned v1 router.
///
/// Versioning allows future API evolution while keeping existing clients
/// working.
fn create_v1_router() -> Router<AppState> {
    let public_routes = Router::new()
        .route("/brackets/{class_id}", get(brackets::get_bracket))
        .route("/matches/{match_id}/audit", get(matches::match_audit));

    let actor_routes = Router::new()
        .route("/brackets", post(brackets::generate_bracket))
        .route("/matches/{match_id}", put(matches::record_score))
        .route("/matches/{match_id}/start", post(matches::start_match))
        .layer(axum::middleware::from_fn(middleware::actor_middleware));

    Router::new().merge(public_routes).merge(actor_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the backing store is reachable, `503` otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","database":true,"timestamp":"2026-08-06T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.manager.healthy().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
