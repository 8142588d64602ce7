use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{ApiError, AppState, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIdeaRequest {
    pub idea: String,
    pub user_id: Option<String>,
}

/// `POST /api/check-idea` — the core entry point.
pub async fn check_idea(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CheckIdeaRequest>,
) -> Result<Response, ApiError> {
    let start = Instant::now();

    let idea = validation::validate_idea_text(&request.idea)?;
    let identity = validation::network_identity(&headers);

    let outcome = state
        .check_service()
        .run(idea, request.user_id.as_deref(), &identity)
        .await?;

    let cache_state = if outcome.result.cached { "HIT" } else { "MISS" };
    let elapsed_ms = start.elapsed().as_millis();

    let mut response = Json(&outcome.result).into_response();
    let response_headers = response.headers_mut();
    if let Ok(value) = cache_state.parse() {
        response_headers.insert("X-Cache", value);
    }
    if let Ok(value) = outcome.rate_remaining.to_string().parse() {
        response_headers.insert("X-RateLimit-Remaining", value);
    }
    if let Ok(value) = format!("{elapsed_ms}ms").parse() {
        response_headers.insert("X-Response-Time", value);
    }

    Ok(response)
}
