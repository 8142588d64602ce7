use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use super::{ApiError, ApiResponse, AppState, PopularIdeaDto, SearchHistoryDto};

const DEFAULT_LIST_LIMIT: u64 = 10;
const MAX_LIST_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u64>,
}

fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

/// `GET /api/ideas/popular` — ideas requested more than once, most
/// requested first.
pub async fn popular_ideas(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<PopularIdeaDto>>>, ApiError> {
    let rows = state
        .store()
        .popular_checks(clamp_limit(params.limit))
        .await
        .map_err(|e| ApiError::internal(format!("Failed to list popular ideas: {e}")))?;

    let ideas = rows
        .into_iter()
        .map(|row| PopularIdeaDto {
            idea: row.idea,
            overall_score: row.overall_score,
            verdict: row.verdict,
            times_requested: row.times_requested,
        })
        .collect();

    Ok(Json(ApiResponse::success(ideas)))
}

/// `GET /api/ideas/history/{user_id}` — the user's recent searches.
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<ApiResponse<Vec<SearchHistoryDto>>>, ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::validation("User id cannot be empty"));
    }

    let rows = state
        .store()
        .user_search_history(&user_id, clamp_limit(params.limit))
        .await
        .map_err(|e| ApiError::internal(format!("Failed to load history: {e}")))?;

    let history = rows
        .into_iter()
        .map(|row| SearchHistoryDto {
            idea: row.idea,
            idea_check_id: row.idea_check_id,
            overall_score: row.overall_score,
            verdict: row.verdict,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(history)))
}
