use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use naukrimili::clients::{JobProvider, ProviderOptions};
use naukrimili::db::{JobInput, Store};
use naukrimili::models::{JobRecord, JobSource, SearchFilters};
use naukrimili::services::{
    CacheSettings, JobSearchService, ProviderDefaults, RankingWeights, SearchCache, SearchOptions,
};

fn external_job(id: &str, title: &str) -> JobRecord {
    JobRecord {
        id: format!("adzuna_{id}"),
        title: title.to_string(),
        company: "External Corp".to_string(),
        company_logo: None,
        location: "Mumbai".to_string(),
        country: "IN".to_string(),
        description: String::new(),
        apply_url: None,
        salary_min: None,
        salary_max: None,
        salary_currency: Some("INR".to_string()),
        job_type: None,
        experience_level: None,
        skills: Vec::new(),
        is_remote: false,
        is_hybrid: false,
        is_featured: false,
        is_urgent: false,
        sector: None,
        posted_at: Some(Utc::now()),
        created_at: Utc::now(),
        source: JobSource::External,
        application_count: 0,
        bookmark_count: 0,
    }
}

struct StaticProvider {
    jobs: Vec<JobRecord>,
}

#[async_trait]
impl JobProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn search_jobs(
        &self,
        _query: &str,
        _country: &str,
        _page: u32,
        _opts: &ProviderOptions,
    ) -> anyhow::Result<Vec<JobRecord>> {
        Ok(self.jobs.clone())
    }
}

struct FailingProvider;

#[async_trait]
impl JobProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn search_jobs(
        &self,
        _query: &str,
        _country: &str,
        _page: u32,
        _opts: &ProviderOptions,
    ) -> anyhow::Result<Vec<JobRecord>> {
        anyhow::bail!("provider unavailable")
    }
}

struct RecordingProvider {
    seen_country: std::sync::Mutex<Option<String>>,
}

#[async_trait]
impl JobProvider for RecordingProvider {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn search_jobs(
        &self,
        _query: &str,
        country: &str,
        _page: u32,
        _opts: &ProviderOptions,
    ) -> anyhow::Result<Vec<JobRecord>> {
        *self.seen_country.lock().unwrap() = Some(country.to_string());
        Ok(Vec::new())
    }
}

struct SlowProvider;

#[async_trait]
impl JobProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn search_jobs(
        &self,
        _query: &str,
        _country: &str,
        _page: u32,
        _opts: &ProviderOptions,
    ) -> anyhow::Result<Vec<JobRecord>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

async fn build_service(provider: Option<Arc<dyn JobProvider>>) -> (JobSearchService, Store) {
    let store = Store::new("sqlite::memory:")
        .await
        .expect("in-memory store");
    let cache = Arc::new(SearchCache::new(CacheSettings::default()));
    let defaults = ProviderDefaults {
        external_deadline: Duration::from_millis(200),
        ..ProviderDefaults::default()
    };
    let service = JobSearchService::new(
        store.clone(),
        provider,
        cache,
        RankingWeights::default(),
        defaults,
    );
    (service, store)
}

fn local_job(title: &str) -> JobInput {
    JobInput {
        title: title.to_string(),
        company: "Local Labs".to_string(),
        location: "Bengaluru".to_string(),
        posted_at: Some(Utc::now()),
        ..JobInput::default()
    }
}

#[tokio::test]
async fn inactive_jobs_never_surface() {
    let (service, store) = build_service(None).await;

    store.insert_job(&local_job("Visible Engineer")).await.unwrap();
    store
        .insert_job(&JobInput {
            is_active: false,
            ..local_job("Hidden Engineer")
        })
        .await
        .unwrap();

    let (response, metrics) = service
        .search(&SearchFilters::default(), &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.jobs.len(), 1);
    assert_eq!(response.jobs[0].title, "Visible Engineer");
    assert_eq!(metrics.sources, vec!["database".to_string()]);
}

#[tokio::test]
async fn inverted_salary_bounds_match_nothing() {
    let (service, store) = build_service(None).await;

    store
        .insert_job(&JobInput {
            salary_min: Some(500_000),
            salary_max: Some(900_000),
            ..local_job("Paid Engineer")
        })
        .await
        .unwrap();

    let filters = SearchFilters {
        salary_min: Some(1_000_000),
        salary_max: Some(100_000),
        ..SearchFilters::default()
    };
    let (response, _) = service
        .search(&filters, &SearchOptions::default())
        .await
        .unwrap();

    assert!(response.jobs.is_empty());
    assert_eq!(response.pagination.total, 0);
}

#[tokio::test]
async fn query_matches_title_case_insensitively() {
    let (service, store) = build_service(None).await;

    store.insert_job(&local_job("Backend ENGINEER")).await.unwrap();
    store.insert_job(&local_job("Sales Associate")).await.unwrap();

    let filters = SearchFilters {
        query: Some("engineer".to_string()),
        ..SearchFilters::default()
    };
    let (response, _) = service
        .search(&filters, &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.jobs.len(), 1);
    assert_eq!(response.jobs[0].title, "Backend ENGINEER");
}

#[tokio::test]
async fn merges_both_sources_with_featured_first() {
    let provider = Arc::new(StaticProvider {
        jobs: vec![
            external_job("1", "External Dev One"),
            external_job("2", "External Dev Two"),
            external_job("3", "External Dev Three"),
        ],
    });
    let (service, store) = build_service(Some(provider)).await;

    for title in ["Featured Remote A", "Featured Remote B"] {
        store
            .insert_job(&JobInput {
                is_featured: true,
                is_remote: true,
                ..local_job(title)
            })
            .await
            .unwrap();
    }

    let (response, metrics) = service
        .search(&SearchFilters::default(), &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.jobs.len(), 5);
    assert_eq!(response.pagination.total, 5);
    assert_eq!(
        metrics.sources,
        vec!["database".to_string(), "external".to_string()]
    );

    // Featured locals outrank the plain external postings.
    assert!(response.jobs[0].is_featured);
    assert!(response.jobs[1].is_featured);
    assert_eq!(response.jobs[2].source, JobSource::External);
}

#[tokio::test]
async fn provider_receives_the_country_in_lowercase() {
    let provider = Arc::new(RecordingProvider {
        seen_country: std::sync::Mutex::new(None),
    });
    let (service, _store) = build_service(Some(provider.clone())).await;

    let filters = SearchFilters {
        country: Some("GB".to_string()),
        ..SearchFilters::default()
    };
    service
        .search(&filters, &SearchOptions::default())
        .await
        .unwrap();

    let seen = provider.seen_country.lock().unwrap().clone();
    assert_eq!(seen.as_deref(), Some("gb"));
}

#[tokio::test]
async fn external_failure_degrades_to_local_results() {
    let (service, store) = build_service(Some(Arc::new(FailingProvider))).await;
    store.insert_job(&local_job("Resilient Engineer")).await.unwrap();

    let (response, metrics) = service
        .search(&SearchFilters::default(), &SearchOptions::default())
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.jobs.len(), 1);
    assert_eq!(metrics.sources, vec!["database".to_string()]);
}

#[tokio::test]
async fn slow_provider_hits_the_deadline() {
    let (service, store) = build_service(Some(Arc::new(SlowProvider))).await;
    store.insert_job(&local_job("Punctual Engineer")).await.unwrap();

    let (response, metrics) = service
        .search(&SearchFilters::default(), &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.jobs.len(), 1);
    assert_eq!(metrics.sources, vec!["database".to_string()]);
}

#[tokio::test]
async fn repeated_search_is_served_from_cache() {
    let (service, store) = build_service(None).await;
    store.insert_job(&local_job("Cached Engineer")).await.unwrap();

    let filters = SearchFilters {
        query: Some("cached".to_string()),
        ..SearchFilters::default()
    };
    let options = SearchOptions::default();

    let (first, first_metrics) = service.search(&filters, &options).await.unwrap();
    assert!(!first_metrics.cache_hit);

    // A job added after the first call stays invisible until the TTL lapses.
    store.insert_job(&local_job("Cached Late Engineer")).await.unwrap();

    let (second, second_metrics) = service.search(&filters, &options).await.unwrap();
    assert!(second_metrics.cache_hit);
    assert_eq!(second_metrics.sources, vec!["cache".to_string()]);
    assert_eq!(second.jobs.len(), first.jobs.len());
    assert_eq!(second.search_time_ms, first.search_time_ms);
}

#[tokio::test]
async fn disabled_cache_always_refetches() {
    let (service, store) = build_service(None).await;
    store.insert_job(&local_job("Fresh Engineer")).await.unwrap();

    let options = SearchOptions {
        enable_cache: false,
        ..SearchOptions::default()
    };
    let filters = SearchFilters::default();

    let (_, first) = service.search(&filters, &options).await.unwrap();
    store.insert_job(&local_job("Fresher Engineer")).await.unwrap();
    let (second, second_metrics) = service.search(&filters, &options).await.unwrap();

    assert!(!first.cache_hit);
    assert!(!second_metrics.cache_hit);
    assert_eq!(second.jobs.len(), 2);
}

#[tokio::test]
async fn results_are_truncated_to_max_results() {
    let (service, store) = build_service(None).await;
    for i in 0..5 {
        store
            .insert_job(&local_job(&format!("Engineer {i}")))
            .await
            .unwrap();
    }

    let options = SearchOptions {
        max_results: 3,
        ..SearchOptions::default()
    };
    let (response, _) = service
        .search(&SearchFilters::default(), &options)
        .await
        .unwrap();

    assert_eq!(response.jobs.len(), 3);
    assert_eq!(response.pagination.total, 3);
    assert_eq!(response.pagination.total_pages, 1);
}

#[tokio::test]
async fn skill_filters_do_not_change_the_cache_key() {
    let (service, store) = build_service(None).await;
    store
        .insert_job(&JobInput {
            skills: vec!["Rust".to_string()],
            ..local_job("Rust Engineer")
        })
        .await
        .unwrap();

    let options = SearchOptions::default();
    let (_, first) = service
        .search(&SearchFilters::default(), &options)
        .await
        .unwrap();
    assert!(!first.cache_hit);

    let with_skills = SearchFilters {
        skills: vec!["rust".to_string()],
        ..SearchFilters::default()
    };
    let (_, second) = service.search(&with_skills, &options).await.unwrap();
    assert!(second.cache_hit);
}

#[tokio::test]
async fn everything_failing_is_reported_as_an_error() {
    let provider: Arc<dyn JobProvider> = Arc::new(FailingProvider);
    let cache = Arc::new(SearchCache::new(CacheSettings::default()));

    let store = Store::new("sqlite::memory:").await.expect("store");
    let service = JobSearchService::new(
        store.clone(),
        Some(provider),
        cache,
        RankingWeights::default(),
        ProviderDefaults::default(),
    );

    // Drop the jobs table out from under the repository.
    use sea_orm::ConnectionTrait;
    store
        .conn
        .execute_unprepared("DROP TABLE jobs")
        .await
        .expect("drop table");

    let result = service
        .search(&SearchFilters::default(), &SearchOptions::default())
        .await;
    assert!(result.is_err());
}
