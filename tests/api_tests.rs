use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use vettr::config::Config;
use vettr::db::NewCheck;
use vettr::models::idea::IdeaQuery;
use vettr::models::sources::AggregateSources;
use vettr::services::synthesis::heuristic_analysis;
use vettr::state::SharedState;

fn offline_config() -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // No model calls in tests; synthesis uses the heuristic.
    config.ai.enabled = false;
    config
}

async fn spawn_app() -> Router {
    let state = vettr::api::create_app_state_from_config(offline_config(), None)
        .await
        .expect("Failed to create app state");
    vettr::api::router(state).await
}

/// App plus its shared state, with one idea pre-seeded into the cache
/// so check requests never leave the process.
async fn spawn_app_with_cached_idea(config: Config, idea: &str) -> (Router, Arc<SharedState>) {
    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );

    let query = IdeaQuery::new(idea);
    let sources = AggregateSources::default();
    let analysis = heuristic_analysis(&sources);
    shared
        .store
        .insert_check(NewCheck {
            id: "check_seeded",
            fingerprint: &query.fingerprint,
            idea: &query.raw,
            sources: &sources,
            analysis: &analysis,
            user_id: None,
        })
        .await
        .expect("Failed to seed cache");

    let state = vettr::api::create_app_state(shared.clone(), None);
    (vettr::api::router(state).await, shared)
}

fn check_request(body: &serde_json::Value, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/check-idea")
        .header("Content-Type", "application/json");

    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }

    builder
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_rejects_too_short_idea() {
    let app = spawn_app().await;

    let response = app
        .oneshot(check_request(&serde_json::json!({ "idea": "ab" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(
        body_json["error"]
            .as_str()
            .unwrap()
            .contains("at least 3 characters")
    );
}

#[tokio::test]
async fn test_rejects_too_long_idea() {
    let app = spawn_app().await;

    let long_idea = "a".repeat(501);
    let response = app
        .oneshot(check_request(&serde_json::json!({ "idea": long_idea }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejects_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/check-idea")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"nonsense\": true}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/check-idea")
                .header("Content-Type", "application/json")
                .body(Body::from("not json at all"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_cached_idea_served_with_hit_header_and_counter_bump() {
    let (app, shared) = spawn_app_with_cached_idea(offline_config(), "ai meal planner").await;

    // Different casing and whitespace must map to the same fingerprint.
    let response = app
        .clone()
        .oneshot(check_request(
            &serde_json::json!({ "idea": "AI Meal Planner " }),
            Some("1.2.3.4"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("X-Cache").unwrap(), "HIT");
    assert!(response.headers().contains_key("X-RateLimit-Remaining"));
    assert!(response.headers().contains_key("X-Response-Time"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["cached"], true);
    assert_eq!(body_json["id"], "check_seeded");
    assert_eq!(body_json["analysis"]["overallScore"], 100);
    assert_eq!(body_json["analysis"]["verdict"], "Wide Open");

    // Second request: counter has been bumped once per hit.
    let response = app
        .oneshot(check_request(
            &serde_json::json!({ "idea": "ai meal planner" }),
            Some("1.2.3.4"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fingerprint = IdeaQuery::new("ai meal planner").fingerprint;
    let cached = shared
        .store
        .find_check(&fingerprint)
        .await
        .unwrap()
        .expect("seeded check present");
    assert_eq!(cached.times_requested, 3);
}

#[tokio::test]
async fn test_anonymous_rate_limit_rejects_with_retry_hint() {
    let mut config = offline_config();
    config.limits.anon_ceiling = 2;
    let (app, _shared) = spawn_app_with_cached_idea(config, "pet insurance").await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(check_request(
                &serde_json::json!({ "idea": "pet insurance" }),
                Some("9.9.9.9"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(check_request(
            &serde_json::json!({ "idea": "pet insurance" }),
            Some("9.9.9.9"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("Retry-After"));
    assert_eq!(
        response.headers().get("X-RateLimit-Remaining").unwrap(),
        "0"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body_json["retryAfter"].as_u64().unwrap() >= 1);

    // A different identity is unaffected.
    let response = app
        .oneshot(check_request(
            &serde_json::json!({ "idea": "pet insurance" }),
            Some("8.8.8.8"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_challenge_falls_back_to_heuristic() {
    let app = spawn_app().await;

    let request_body = serde_json::json!({
        "idea": "ai meal planner",
        "sources": {},
        "userChallenge": "you missed that nobody personalizes for allergies",
        "previousAnalysis": { "overallScore": 40, "verdict": "Crowded" },
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/challenge")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // With AI disabled and empty sources the heuristic yields a clean
    // slate regardless of the previous analysis.
    assert_eq!(body_json["analysis"]["overallScore"], 100);
    assert_eq!(body_json["analysis"]["verdict"], "Wide Open");
}

#[tokio::test]
async fn test_challenge_requires_text() {
    let app = spawn_app().await;

    let request_body = serde_json::json!({
        "idea": "ai meal planner",
        "sources": {},
        "userChallenge": "   ",
        "previousAnalysis": {},
    });

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/challenge")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&request_body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_popular_ideas_and_status() {
    let (app, _shared) = spawn_app_with_cached_idea(offline_config(), "habit tracker").await;

    // One cache hit so the idea qualifies as popular (> 1 request).
    let response = app
        .clone()
        .oneshot(check_request(
            &serde_json::json!({ "idea": "habit tracker" }),
            Some("4.4.4.4"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/ideas/popular")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["success"], true);
    assert_eq!(body_json["data"][0]["idea"], "habit tracker");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["data"]["databaseOk"], true);
    assert_eq!(body_json["data"]["aiEnabled"], false);
}
