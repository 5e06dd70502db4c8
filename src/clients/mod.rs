use async_trait::async_trait;

use crate::models::JobRecord;

pub mod adzuna;

/// Per-request knobs forwarded to an external job board.
#[derive(Debug, Clone, Default)]
pub struct ProviderOptions {
    pub location: Option<String>,
    pub distance_km: Option<u32>,
}

/// Seam between the search pipeline and external job boards. Implementations
/// return already-normalized [`JobRecord`]s tagged with their source.
#[async_trait]
pub trait JobProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search_jobs(
        &self,
        query: &str,
        country: &str,
        page: u32,
        opts: &ProviderOptions,
    ) -> anyhow::Result<Vec<JobRecord>>;
}
