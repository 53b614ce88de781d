//! Actor-identity middleware for mutating endpoints.
//!
//! Authentication and authorization are handled by the upstream gateway; by
//! the time a request reaches this server the operator is already
//! authenticated, and the gateway forwards their identity in the
//! `x-actor-id` header. This middleware extracts that identity and injects
//! it into request extensions so mutating handlers can stamp the audit
//! trail.
//!
//! In handler functions, extract the actor from request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//!
//! async fn protected_handler(Extension(actor_id): Extension<i64>) -> String {
//!     format!("acting as operator {}", actor_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use super::ErrorResponse;

/// Header carrying the authenticated operator id
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Middleware that requires an operator identity on mutating routes.
///
/// - **Success**: header present and numeric, actor id injected into
///   request extensions, next handler called
/// - **Missing or malformed header**: `401 Unauthorized`
pub async fn actor_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let actor_id: Option<i64> = request
        .headers()
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok());

    match actor_id {
        Some(actor_id) => {
            request.extensions_mut().insert(actor_id);
            Ok(next.run(request).await)
        }
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: format!("missing or invalid {ACTOR_ID_HEADER} header"),
            }),
        )),
    }
}
