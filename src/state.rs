use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::JobProvider;
use crate::clients::adzuna::AdzunaClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{CacheSettings, JobSearchService, ProviderDefaults, SearchCache};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all HTTP-based services to enable connection pooling and
/// avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("NaukriMili/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub provider: Option<Arc<AdzunaClient>>,

    pub search_cache: Arc<SearchCache>,

    pub search_service: Arc<JobSearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let provider = if config.provider.enabled {
            let http_client =
                build_shared_http_client(config.provider.request_timeout_seconds.into())?;
            Some(Arc::new(AdzunaClient::with_shared_client(
                http_client,
                config.provider.base_url.clone(),
                config.provider.app_id.clone(),
                config.provider.app_key.clone(),
                config.provider.max_retries,
            )))
        } else {
            None
        };

        let search_cache = Arc::new(SearchCache::new(CacheSettings {
            max_entries: config.search.cache_max_entries,
        }));

        let defaults = ProviderDefaults {
            country: config.provider.default_country.clone(),
            query: config.provider.default_query.clone(),
            distance_km: config.provider.distance_km,
            external_deadline: Duration::from_millis(config.provider.external_deadline_ms),
        };

        let search_service = Arc::new(JobSearchService::new(
            store.clone(),
            provider
                .clone()
                .map(|p| p as Arc<dyn JobProvider>),
            search_cache.clone(),
            config.ranking.weights.clone(),
            defaults,
        ));

        let config = Arc::new(RwLock::new(config));

        Ok(Self {
            config,
            store,
            provider,
            search_cache,
            search_service,
        })
    }
}
