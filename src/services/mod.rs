pub mod cache;
pub use cache::{CacheSettings, CacheStats, SearchCache};

pub mod filters;

pub mod ranking;
pub use ranking::RankingWeights;

pub mod search;
pub use search::{
    JobSearchResponse, JobSearchService, Pagination, ProviderDefaults, SearchError, SearchMetrics,
    SearchOptions,
};
