use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, JobListResponse};
use crate::constants;
use crate::db::JobInput;
use crate::models::JobRecord;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListJobsQuery {
    pub page: u64,
    pub limit: u64,
}

impl Default for ListJobsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: constants::limits::DEFAULT_PAGE_SIZE,
        }
    }
}

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListJobsQuery>,
) -> Result<Json<ApiResponse<JobListResponse>>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let (jobs, total) = state
        .store()
        .list_jobs(page, limit)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(JobListResponse {
        jobs,
        page,
        total_pages: total.div_ceil(limit),
    })))
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<JobRecord>>, ApiError> {
    let job = state
        .store()
        .get_job(id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::job_not_found(id))?;

    Ok(Json(ApiResponse::success(job)))
}

pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(input): Json<JobInput>,
) -> Result<Json<ApiResponse<JobRecord>>, ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::validation("title must not be empty"));
    }
    if input.company.trim().is_empty() {
        return Err(ApiError::validation("company must not be empty"));
    }

    let id = state
        .store()
        .insert_job(&input)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let job = state
        .store()
        .get_job(id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::internal("inserted job disappeared"))?;

    Ok(Json(ApiResponse::success(job)))
}
