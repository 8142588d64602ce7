use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::domain::events::NotificationEvent;
use crate::models::analysis::Analysis;
use crate::models::sources::AggregateSources;

use super::{ApiError, AppState, validation};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub idea: String,
    #[serde(default)]
    pub sources: AggregateSources,
    pub user_challenge: String,
    pub previous_analysis: Analysis,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChallengeResponse {
    pub analysis: Analysis,
}

/// `POST /api/challenge` — re-runs synthesis with the founder's
/// objection folded into the prompt context. The heuristic fallback
/// discipline applies unchanged.
pub async fn challenge_analysis(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChallengeRequest>,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let user_challenge = validation::validate_challenge_text(&request.user_challenge)?;

    let analysis = state
        .synthesis()
        .challenge(
            &request.idea,
            &request.sources,
            &request.previous_analysis,
            user_challenge,
        )
        .await;

    let _ = state.event_bus().send(NotificationEvent::SearchChallenged {
        idea: request.idea.clone(),
        challenge_length: user_challenge.chars().count(),
        user_id: request.user_id.clone(),
    });

    Ok(Json(ChallengeResponse { analysis }))
}
