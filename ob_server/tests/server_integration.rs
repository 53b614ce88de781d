//! Integration tests for the HTTP API.
//!
//! These tests drive the real router against the in-memory store, covering
//! the REST status mapping: 201/200 happy paths, 400 validation, 401
//! missing actor, 404 unknown ids, and 409 conflicts.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ob_server::api::{AppState, create_router};
use open_bracket::BracketManager;
use open_bracket::draw::Registrant;
use open_bracket::store::MemoryBracketStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For `oneshot` method

const CLASS: i64 = 12;

/// Build a router over an in-memory store seeded with `n` approved
/// registrants for [`CLASS`]
async fn test_app(n: usize) -> axum::Router {
    let store = Arc::new(MemoryBracketStore::new());
    store
        .set_registrants(
            CLASS,
            (1..=n as i64)
                .map(|id| Registrant::individual(id, format!("competitor {id}"), None))
                .collect(),
        )
        .await;
    let manager = Arc::new(BracketManager::new(store.clone(), store));
    create_router(AppState { manager })
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    actor: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        request = request.header("x-actor-id", actor.to_string());
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn generate_body(force: bool) -> Value {
    json!({
        "competition_class_id": CLASS,
        "seed_policy": {"policy": "RANDOM"},
        "bye_placement": "TOP_SEEDS",
        "draw_seed": 4242,
        "force": force,
    })
}

/// First scheduled (non-bye) match id in the bracket JSON
fn first_scheduled(bracket: &Value) -> String {
    bracket["rounds"][0]["matches"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["status"] == "SCHEDULED")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = test_app(2).await;
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn generate_bracket_returns_created_with_rounds() {
    let app = test_app(7).await;
    let (status, body) = send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_rounds"], 3);
    assert_eq!(body["rounds"].as_array().unwrap().len(), 3);
    assert_eq!(body["rounds"][0]["matches"].as_array().unwrap().len(), 4);
    assert_eq!(body["draw_seed"], 4242);

    let byes = body["rounds"][0]["matches"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["status"] == "BYE")
        .count();
    assert_eq!(byes, 1);
}

#[tokio::test]
async fn generate_without_actor_header_is_unauthorized() {
    let app = test_app(4).await;
    let (status, body) = send(&app, "POST", "/api/v1/brackets", None, Some(generate_body(false))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-actor-id"));
}

#[tokio::test]
async fn generate_with_one_participant_is_bad_request() {
    let app = test_app(1).await;
    let (status, body) = send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least 2"));
}

#[tokio::test]
async fn get_bracket_round_trips_and_unknown_class_is_not_found() {
    let app = test_app(4).await;
    send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;

    let (status, body) = send(&app, "GET", &format!("/api/v1/brackets/{CLASS}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["class_id"], CLASS);
    assert_eq!(body["total_rounds"], 2);

    let (status, _) = send(&app, "GET", "/api/v1/brackets/9999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn score_flow_records_propagates_and_audits() {
    let app = test_app(4).await;
    let (_, bracket) =
        send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    let match_id = first_scheduled(&bracket);

    // equal scores are a validation failure
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(42),
        Some(json!({"score_a": 2, "score_b": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("draws"));

    // a proper result completes the match
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(42),
        Some(json!({"score_a": 21, "score_b": 15})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["score_a"], 21);

    // a different score without the correction flag conflicts
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(42),
        Some(json!({"score_a": 15, "score_b": 21})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // the mutation trail is exposed per match
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/matches/{match_id}/audit"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "SET_SCORE");
    assert_eq!(entries[0]["actor_id"], 42);
    assert_eq!(entries[0]["payload"]["score_a"], 21);
}

#[tokio::test]
async fn completing_a_two_competitor_bracket_names_a_champion() {
    let app = test_app(2).await;
    let (_, bracket) =
        send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    let match_id = first_scheduled(&bracket);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(1),
        Some(json!({"score_a": 3, "score_b": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["champion"].is_object());
    assert!(body["runner_up"].is_object());

    let (_, bracket) = send(&app, "GET", &format!("/api/v1/brackets/{CLASS}"), None, None).await;
    assert!(bracket["champion"]["display_name"].is_string());
}

#[tokio::test]
async fn start_match_marks_in_progress() {
    let app = test_app(4).await;
    let (_, bracket) =
        send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    let match_id = first_scheduled(&bracket);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/matches/{match_id}/start"),
        Some(5),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn unknown_match_is_not_found() {
    let app = test_app(4).await;
    send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;

    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{missing}"),
        Some(1),
        Some(json!({"score_a": 1, "score_b": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/v1/matches/{missing}/audit"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn regeneration_over_a_started_bracket_needs_force() {
    let app = test_app(4).await;
    let (_, bracket) =
        send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    let match_id = first_scheduled(&bracket);

    send(
        &app,
        "PUT",
        &format!("/api/v1/matches/{match_id}"),
        Some(1),
        Some(json!({"score_a": 2, "score_b": 0})),
    )
    .await;

    let (status, body) = send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(false))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("force"));

    let (status, _) = send(&app, "POST", "/api/v1/brackets", Some(1), Some(generate_body(true))).await;
    assert_eq!(status, StatusCode::CREATED);

    // the superseded match keeps its audit trail plus the REGENERATE entry
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/matches/{match_id}/audit"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"SET_SCORE"));
    assert!(actions.contains(&"REGENERATE"));
}

#[tokio::test]
async fn manual_seed_policy_rejects_bad_permutations() {
    let app = test_app(3).await;
    let body = json!({
        "competition_class_id": CLASS,
        "seed_policy": {
            "policy": "MANUAL",
            "numbers": [
                {"competitor_id": 1, "number": 1},
                {"competitor_id": 2, "number": 2},
                {"competitor_id": 3, "number": 5},
            ],
        },
    });
    let (status, body) = send(&app, "POST", "/api/v1/brackets", Some(1), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("not a permutation of 1..3")
    );
}
