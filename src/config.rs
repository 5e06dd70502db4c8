use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub provider: ProviderConfig,

    pub search: SearchConfig,

    pub ranking: RankingConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/naukrimili.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 7860,
            cors_allowed_origins: vec![
                "http://localhost:7860".to_string(),
                "http://127.0.0.1:7860".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub enabled: bool,

    /// Adzuna application id. Overridden by ADZUNA_APP_ID when set.
    pub app_id: String,

    /// Adzuna application key. Overridden by ADZUNA_APP_KEY when set.
    pub app_key: String,

    pub base_url: String,

    pub default_country: String,

    pub default_query: String,

    pub distance_km: u32,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u32,

    pub max_retries: u32,

    /// Hard deadline on the whole external fetch, including retries.
    pub external_deadline_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_id: String::new(),
            app_key: String::new(),
            base_url: "https://api.adzuna.com/v1/api/jobs".to_string(),
            default_country: constants::provider::DEFAULT_COUNTRY.to_string(),
            default_query: constants::provider::DEFAULT_QUERY.to_string(),
            distance_km: constants::provider::DEFAULT_DISTANCE_KM,
            request_timeout_seconds: 30,
            max_retries: 3,
            external_deadline_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub cache_enabled: bool,

    pub cache_ttl_seconds: u64,

    pub cache_max_entries: usize,

    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_seconds: constants::cache::DEFAULT_TTL_SECONDS,
            cache_max_entries: constants::cache::MAX_ENTRIES,
            max_results: constants::limits::MAX_SEARCH_RESULTS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub enabled: Option<bool>,

    pub weights: crate::services::RankingWeights,
}

impl RankingConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "naukrimili".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                let mut config = Self::load_from_path(path)?;
                config.apply_env_overrides();
                return Ok(config);
            }
        }

        info!("No config file found, using defaults");
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// API credentials come from the environment when present, so they stay
    /// out of the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(app_id) = std::env::var("ADZUNA_APP_ID") {
            self.provider.app_id = app_id;
        }
        if let Ok(app_key) = std::env::var("ADZUNA_APP_KEY") {
            self.provider.app_key = app_key;
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::default_config_path();
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("naukrimili").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".naukrimili").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.enabled && (self.provider.app_id.is_empty() || self.provider.app_key.is_empty()) {
            anyhow::bail!(
                "Adzuna credentials missing: set provider.app_id/app_key or ADZUNA_APP_ID/ADZUNA_APP_KEY"
            );
        }

        if self.search.max_results == 0 {
            anyhow::bail!("search.max_results must be > 0");
        }

        if self.search.cache_enabled && self.search.cache_max_entries == 0 {
            anyhow::bail!("search.cache_max_entries must be > 0 when the cache is enabled");
        }

        Ok(())
    }
}
