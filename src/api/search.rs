use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::config::Config;
use crate::models::SearchFilters;
use crate::services::{CacheStats, JobSearchResponse, SearchMetrics, SearchOptions};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchJobsRequest {
    pub query: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub remote_only: bool,
    pub sector: Option<String>,

    /// Comma separated skill list, e.g. `skills=rust,sql`.
    pub skills: Option<String>,

    pub page: Option<u64>,
    pub max_results: Option<usize>,
    pub cache_ttl: Option<u64>,
    pub no_cache: bool,
    pub no_external: bool,
    pub no_ranking: bool,
}

impl SearchJobsRequest {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            query: self.query.clone(),
            location: self.location.clone(),
            country: self.country.clone(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            job_type: self.job_type.clone(),
            experience_level: self.experience_level.clone(),
            remote_only: self.remote_only,
            sector: self.sector.clone(),
            skills: self
                .skills
                .as_deref()
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn options(&self, config: &Config) -> SearchOptions {
        SearchOptions {
            enable_cache: config.search.cache_enabled && !self.no_cache,
            cache_ttl_seconds: self.cache_ttl.unwrap_or(config.search.cache_ttl_seconds),
            max_results: self
                .max_results
                .map_or(config.search.max_results, |n| {
                    n.min(config.search.max_results)
                }),
            page: self.page.unwrap_or(1).max(1),
            include_external: !self.no_external,
            enable_ranking: config.ranking.is_enabled() && !self.no_ranking,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchJobsBody {
    #[serde(flatten)]
    pub response: JobSearchResponse,
    pub metrics: SearchMetrics,
}

pub async fn search_jobs(
    State(state): State<Arc<AppState>>,
    Query(request): Query<SearchJobsRequest>,
) -> Result<Json<SearchJobsBody>, ApiError> {
    let filters = request.filters();
    let options = {
        let config = state.config().read().await;
        request.options(&config)
    };

    let (response, metrics) = state.search_service().search(&filters, &options).await?;

    Ok(Json(SearchJobsBody { response, metrics }))
}

pub async fn cache_stats(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::success(state.search_cache().stats()))
}

pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ApiResponse<CacheStats>> {
    state.search_cache().clear();
    Json(ApiResponse::success(state.search_cache().stats()))
}
