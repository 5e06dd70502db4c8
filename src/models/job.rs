use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which backend produced a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Database,
    External,
}

impl JobSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::External => "external",
        }
    }
}

/// A single job posting, from the local store or an external provider.
///
/// The search pipeline never mutates these; it only filters, merges and
/// reorders them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_logo: Option<String>,
    pub location: String,
    pub country: String,
    #[serde(default)]
    pub description: String,
    pub apply_url: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub sector: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub source: JobSource,
    pub application_count: i64,
    pub bookmark_count: i64,
}

impl JobRecord {
    /// Timestamp used for freshness scoring: posted date when known,
    /// otherwise the ingestion date.
    #[must_use]
    pub fn effective_posted_at(&self) -> DateTime<Utc> {
        self.posted_at.unwrap_or(self.created_at)
    }
}
