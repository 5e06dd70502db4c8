use serde::Serialize;

use crate::services::CacheStats;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: u64,
    pub database_ok: bool,
    pub active_jobs: u64,
    pub provider_enabled: bool,
    pub cache: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct JobListResponse {
    pub jobs: Vec<crate::models::JobRecord>,
    pub page: u64,
    pub total_pages: u64,
}
