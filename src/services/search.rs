//! Search orchestration: compile filters, consult the cache, fetch from the
//! local store and the external provider concurrently, rank the merged set
//! and hand back the caller-facing envelope.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clients::{JobProvider, ProviderOptions};
use crate::constants;
use crate::db::Store;
use crate::models::{JobRecord, SearchFilters};
use crate::services::cache::SearchCache;
use crate::services::filters;
use crate::services::ranking::{self, RankingWeights};

#[derive(Debug, Error)]
pub enum SearchError {
    /// Every attempted fetch branch failed, so there is nothing to serve.
    #[error("all job sources failed")]
    AllSourcesFailed,
}

/// Per-call knobs. [`Default`] gives the production behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub enable_cache: bool,
    pub cache_ttl_seconds: u64,
    pub max_results: usize,
    pub page: u64,
    pub include_external: bool,
    pub enable_ranking: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_ttl_seconds: constants::cache::DEFAULT_TTL_SECONDS,
            max_results: constants::limits::MAX_SEARCH_RESULTS,
            page: 1,
            include_external: true,
            enable_ranking: true,
        }
    }
}

/// Observability sidecar for one search call. Not cached; a cache hit gets
/// fresh timings while the payload stays as stored.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMetrics {
    pub query_time_ms: u64,
    pub cache_hit: bool,
    pub result_count: usize,
    /// Which branches actually contributed: "cache", "database", "external".
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    #[must_use]
    pub fn for_results(total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Echo of the criteria the pipeline actually applied, normalized the same
/// way the filter compiler normalizes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterEcho {
    pub query: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub remote_only: bool,
    pub sector: Option<String>,
    pub skills: Vec<String>,
}

impl FilterEcho {
    fn from_filters(f: &SearchFilters) -> Self {
        let text = |v: Option<&String>| SearchFilters::normalized(v).map(str::to_string);
        Self {
            query: text(f.query.as_ref()),
            location: text(f.location.as_ref()),
            country: text(f.country.as_ref()).map(|c| c.to_uppercase()),
            salary_min: f.salary_min,
            salary_max: f.salary_max,
            job_type: SearchFilters::selected(f.job_type.as_ref()).map(str::to_string),
            experience_level: SearchFilters::selected(f.experience_level.as_ref())
                .map(str::to_string),
            remote_only: f.remote_only,
            sector: text(f.sector.as_ref()),
            skills: f.skills.clone(),
        }
    }
}

/// Caller-facing envelope. This is what the cache stores, so repeated calls
/// with the same key serve identical payloads until the TTL lapses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSearchResponse {
    pub success: bool,
    pub jobs: Vec<JobRecord>,
    pub pagination: Pagination,
    pub filters: FilterEcho,
    pub search_time_ms: u64,
}

impl JobSearchResponse {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            success: true,
            jobs: Vec::new(),
            pagination: Pagination::for_results(
                0,
                1,
                constants::limits::MAX_SEARCH_RESULTS as u64,
            ),
            filters: FilterEcho::default(),
            search_time_ms: 0,
        }
    }
}

/// Defaults applied when a filter leaves the external query underspecified,
/// plus the hard deadline on the external call.
#[derive(Debug, Clone)]
pub struct ProviderDefaults {
    pub country: String,
    pub query: String,
    pub distance_km: u32,
    pub external_deadline: Duration,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            country: constants::provider::DEFAULT_COUNTRY.to_string(),
            query: constants::provider::DEFAULT_QUERY.to_string(),
            distance_km: constants::provider::DEFAULT_DISTANCE_KM,
            external_deadline: Duration::from_secs(10),
        }
    }
}

enum BranchOutcome {
    Fetched(Vec<JobRecord>),
    Skipped,
    Failed,
}

pub struct JobSearchService {
    store: Store,
    provider: Option<Arc<dyn JobProvider>>,
    cache: Arc<SearchCache>,
    weights: RankingWeights,
    defaults: ProviderDefaults,
}

impl JobSearchService {
    #[must_use]
    pub const fn new(
        store: Store,
        provider: Option<Arc<dyn JobProvider>>,
        cache: Arc<SearchCache>,
        weights: RankingWeights,
        defaults: ProviderDefaults,
    ) -> Self {
        Self {
            store,
            provider,
            cache,
            weights,
            defaults,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub async fn search(
        &self,
        search_filters: &SearchFilters,
        options: &SearchOptions,
    ) -> Result<(JobSearchResponse, SearchMetrics), SearchError> {
        let started = Instant::now();
        metrics::counter!("job_search_total").increment(1);

        let key = filters::cache_key(search_filters);

        if options.enable_cache
            && let Some(cached) = self
                .cache
                .get(&key, Duration::from_secs(options.cache_ttl_seconds))
        {
            metrics::counter!("job_search_cache_hits_total").increment(1);
            debug!(key, "search cache hit");
            let call_metrics = SearchMetrics {
                query_time_ms: elapsed_ms(started),
                cache_hit: true,
                result_count: cached.jobs.len(),
                sources: vec!["cache".to_string()],
            };
            return Ok((cached, call_metrics));
        }

        let condition = filters::compile(search_filters);
        let fetch_limit = options.max_results as u64;

        let (local, external) = tokio::join!(
            self.fetch_local(condition, fetch_limit),
            self.fetch_external(search_filters, options),
        );

        let mut sources = Vec::new();
        let mut attempted = 0u32;
        let mut failed = 0u32;
        let mut jobs = Vec::new();

        // Local results land first so ties in the stable sort keep them
        // ahead of external ones.
        for (name, outcome) in [("database", local), ("external", external)] {
            match outcome {
                BranchOutcome::Fetched(mut batch) => {
                    sources.push(name.to_string());
                    jobs.append(&mut batch);
                    attempted += 1;
                }
                BranchOutcome::Failed => {
                    attempted += 1;
                    failed += 1;
                }
                BranchOutcome::Skipped => {}
            }
        }

        if attempted > 0 && failed == attempted {
            return Err(SearchError::AllSourcesFailed);
        }

        if options.enable_ranking {
            ranking::rank(&mut jobs, search_filters, &self.weights, Utc::now());
        }
        jobs.truncate(options.max_results);

        let elapsed = elapsed_ms(started);
        let pagination = Pagination::for_results(jobs.len() as u64, options.page, fetch_limit);
        let response = JobSearchResponse {
            success: true,
            jobs,
            pagination,
            filters: FilterEcho::from_filters(search_filters),
            search_time_ms: elapsed,
        };

        if options.enable_cache {
            self.cache.set(&key, response.clone());
        }

        let call_metrics = SearchMetrics {
            query_time_ms: elapsed,
            cache_hit: false,
            result_count: response.jobs.len(),
            sources,
        };
        Ok((response, call_metrics))
    }

    async fn fetch_local(&self, condition: sea_orm::Condition, limit: u64) -> BranchOutcome {
        match self.store.search_jobs(condition, limit).await {
            Ok(jobs) => BranchOutcome::Fetched(jobs),
            Err(err) => {
                warn!("local job fetch failed: {err:#}");
                BranchOutcome::Failed
            }
        }
    }

    async fn fetch_external(
        &self,
        search_filters: &SearchFilters,
        options: &SearchOptions,
    ) -> BranchOutcome {
        if !options.include_external {
            return BranchOutcome::Skipped;
        }
        let Some(provider) = &self.provider else {
            return BranchOutcome::Skipped;
        };

        let query = SearchFilters::normalized(search_filters.query.as_ref())
            .unwrap_or(&self.defaults.query);
        let country = SearchFilters::normalized(search_filters.country.as_ref())
            .unwrap_or(&self.defaults.country)
            .to_lowercase();
        let opts = ProviderOptions {
            location: SearchFilters::normalized(search_filters.location.as_ref())
                .map(str::to_string),
            distance_km: Some(self.defaults.distance_km),
        };

        let call = provider.search_jobs(query, &country, 1, &opts);
        match tokio::time::timeout(self.defaults.external_deadline, call).await {
            Ok(Ok(jobs)) => BranchOutcome::Fetched(jobs),
            Ok(Err(err)) => {
                warn!(
                    provider = provider.name(),
                    "external job fetch failed: {err:#}"
                );
                BranchOutcome::Failed
            }
            Err(_) => {
                warn!(
                    provider = provider.name(),
                    deadline_ms = %self.defaults.external_deadline.as_millis(),
                    "external job fetch timed out"
                );
                BranchOutcome::Failed
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_counts_from_truncated_total() {
        let p = Pagination::for_results(5, 1, 50);
        assert_eq!(p.total, 5);
        assert_eq!(p.total_pages, 1);
        assert!(!p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::for_results(120, 2, 50);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn filter_echo_normalizes_like_the_compiler() {
        let echo = FilterEcho::from_filters(&SearchFilters {
            query: Some("  rust  ".to_string()),
            country: Some("in".to_string()),
            job_type: Some("all".to_string()),
            ..SearchFilters::default()
        });
        assert_eq!(echo.query.as_deref(), Some("rust"));
        assert_eq!(echo.country.as_deref(), Some("IN"));
        assert_eq!(echo.job_type, None);
    }
}
