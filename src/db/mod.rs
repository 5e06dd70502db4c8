use anyhow::Result;
use sea_orm::{Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::job::JobRecord;

pub mod migrator;
pub mod repositories;

pub use repositories::job::{JobInput, JobRepository};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn jobs(&self) -> JobRepository {
        JobRepository::new(self.conn.clone())
    }

    /// Applies a compiled predicate with the fixed priority ordering
    /// (featured, urgent, posted date, creation date) and a result limit.
    pub async fn search_jobs(&self, condition: Condition, limit: u64) -> Result<Vec<JobRecord>> {
        self.jobs().search(condition, limit).await
    }

    pub async fn get_job(&self, id: i32) -> Result<Option<JobRecord>> {
        self.jobs().get(id).await
    }

    pub async fn insert_job(&self, input: &JobInput) -> Result<i32> {
        self.jobs().insert(input).await
    }

    pub async fn list_jobs(&self, page: u64, per_page: u64) -> Result<(Vec<JobRecord>, u64)> {
        self.jobs().list_active(page, per_page).await
    }

    pub async fn count_active_jobs(&self) -> Result<u64> {
        self.jobs().count_active().await
    }
}
