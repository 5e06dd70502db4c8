//! System endpoints: status aggregation and masked configuration.

use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};
use crate::config::Config;

pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();
    let active_jobs = if database_ok {
        state.store().count_active_jobs().await.unwrap_or(0)
    } else {
        0
    };
    let provider_enabled = state.config().read().await.provider.enabled;

    let status = SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database_ok,
        active_jobs,
        provider_enabled,
        cache: state.search_cache().stats(),
    };

    Ok(Json(ApiResponse::success(status)))
}

/// Configuration with API credentials masked.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Config>> {
    let mut config = state.config().read().await.clone();

    if !config.provider.app_id.is_empty() {
        config.provider.app_id = "********".to_string();
    }
    if !config.provider.app_key.is_empty() {
        config.provider.app_key = "********".to_string();
    }

    Json(ApiResponse::success(config))
}
