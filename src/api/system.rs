use std::sync::Arc;

use axum::{Json, extract::State};

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();
    let total_checks = state.store().count_checks().await.unwrap_or(0);
    let ai_enabled = state.shared.config.read().await.ai.enabled;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        total_checks,
        database_ok,
        ai_enabled,
    };

    Ok(Json(ApiResponse::success(status)))
}
