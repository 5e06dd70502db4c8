use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::{JobProvider, ProviderOptions};
use crate::constants;
use crate::models::{JobRecord, JobSource};

const ADZUNA_API: &str = "https://api.adzuna.com/v1/api/jobs";

const UNKNOWN_COMPANY: &str = "Unknown Company";

/// Skill names recognized in titles and descriptions. Matched case
/// insensitively on a word boundary; the listed casing is what ends up in
/// the record.
const KNOWN_SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "Rust",
    "Go",
    "PHP",
    "Ruby",
    "Kotlin",
    "Swift",
    "React",
    "Angular",
    "Vue",
    "Node.js",
    "Django",
    "Spring",
    "SQL",
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Linux",
    "Git",
    "DevOps",
    "Machine Learning",
    "Data Science",
    "Excel",
    "Salesforce",
];

fn skill_regex() -> Option<&'static Regex> {
    static INSTANCE: OnceLock<Option<Regex>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| {
            let alternation = KNOWN_SKILLS
                .iter()
                .map(|s| regex::escape(s))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b({alternation})")).ok()
        })
        .as_ref()
}

#[derive(Debug, Deserialize)]
struct AdzunaResponse {
    #[serde(default)]
    results: Vec<AdzunaJob>,
}

#[derive(Debug, Deserialize)]
struct AdzunaJob {
    id: Option<serde_json::Value>,
    title: Option<String>,
    description: Option<String>,
    company: Option<AdzunaCompany>,
    location: Option<AdzunaLocation>,
    redirect_url: Option<String>,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    contract_type: Option<String>,
    contract_time: Option<String>,
    created: Option<String>,
    category: Option<AdzunaCategory>,
}

#[derive(Debug, Deserialize)]
struct AdzunaCompany {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdzunaLocation {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AdzunaCategory {
    label: Option<String>,
}

#[derive(Clone)]
pub struct AdzunaClient {
    client: Client,
    base_url: String,
    app_id: String,
    app_key: String,
    max_retries: u32,
}

impl AdzunaClient {
    #[must_use]
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self::with_shared_client(Client::new(), ADZUNA_API, app_id, app_key, 3)
    }

    #[must_use]
    pub fn with_shared_client(
        client: Client,
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_key: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            app_id: app_id.into(),
            app_key: app_key.into(),
            max_retries,
        }
    }

    async fn fetch_page(
        &self,
        query: &str,
        country: &str,
        page: u32,
        opts: &ProviderOptions,
    ) -> Result<AdzunaResponse> {
        let url = format!("{}/{}/search/{}", self.base_url, country, page);

        let mut params: Vec<(&str, String)> = vec![
            ("app_id", self.app_id.clone()),
            ("app_key", self.app_key.clone()),
            ("what", query.to_string()),
            (
                "results_per_page",
                constants::provider::RESULTS_PER_PAGE.to_string(),
            ),
        ];
        if let Some(location) = &opts.location {
            params.push(("where", location.clone()));
            params.push((
                "distance",
                opts.distance_km
                    .unwrap_or(constants::provider::DEFAULT_DISTANCE_KM)
                    .to_string(),
            ));
        }

        let mut attempt = 0;
        loop {
            let result = self.client.get(&url).query(&params).send().await;

            let retryable = match &result {
                Ok(response) => {
                    let status = response.status();
                    status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
                }
                Err(_) => true,
            };

            if retryable && attempt < self.max_retries {
                let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying Adzuna request");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let response = result?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(anyhow::anyhow!("Adzuna API error: {} - {}", status, body));
            }

            return Ok(response.json().await?);
        }
    }

    fn normalize(job: AdzunaJob, country: &str) -> Option<JobRecord> {
        let raw_id = match job.id? {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let title = job.title.filter(|t| !t.trim().is_empty())?;

        let description = job
            .description
            .map(|d| html_escape::decode_html_entities(&d).into_owned())
            .unwrap_or_default();
        let haystack = format!("{} {}", title.to_lowercase(), description.to_lowercase());

        let country = country.to_uppercase();
        #[allow(clippy::cast_possible_truncation)]
        let salary = |v: Option<f64>| v.map(|s| s.round() as i64).filter(|s| *s > 0);

        Some(JobRecord {
            id: format!("adzuna_{raw_id}"),
            title,
            company: job
                .company
                .and_then(|c| c.display_name)
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_COMPANY.to_string()),
            company_logo: None,
            location: job
                .location
                .and_then(|l| l.display_name)
                .unwrap_or_default(),
            description,
            apply_url: job.redirect_url,
            salary_min: salary(job.salary_min),
            salary_max: salary(job.salary_max),
            salary_currency: Some(currency_for_country(&country).to_string()),
            job_type: job_type_from_contract(
                job.contract_type.as_deref(),
                job.contract_time.as_deref(),
            ),
            experience_level: experience_level_from_text(&haystack),
            skills: extract_skills(&haystack),
            is_remote: haystack.contains("remote") || haystack.contains("work from home"),
            is_hybrid: haystack.contains("hybrid"),
            is_featured: false,
            is_urgent: haystack.contains("urgent"),
            sector: job.category.and_then(|c| c.label),
            posted_at: job
                .created
                .as_deref()
                .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
                .map(|dt| dt.with_timezone(&Utc)),
            created_at: Utc::now(),
            country,
            source: JobSource::External,
            application_count: 0,
            bookmark_count: 0,
        })
    }
}

#[async_trait]
impl JobProvider for AdzunaClient {
    fn name(&self) -> &'static str {
        "adzuna"
    }

    async fn search_jobs(
        &self,
        query: &str,
        country: &str,
        page: u32,
        opts: &ProviderOptions,
    ) -> Result<Vec<JobRecord>> {
        let response = self.fetch_page(query, country, page, opts).await?;
        let total = response.results.len();

        let jobs: Vec<JobRecord> = response
            .results
            .into_iter()
            .filter_map(|job| Self::normalize(job, country))
            .collect();

        debug!(
            fetched = total,
            normalized = jobs.len(),
            country,
            "Adzuna search complete"
        );
        Ok(jobs)
    }
}

fn currency_for_country(country: &str) -> &'static str {
    match country {
        "IN" => "INR",
        "GB" => "GBP",
        "AU" => "AUD",
        "CA" => "CAD",
        "DE" | "FR" => "EUR",
        _ => "USD",
    }
}

fn job_type_from_contract(
    contract_type: Option<&str>,
    contract_time: Option<&str>,
) -> Option<String> {
    if contract_type == Some("contract") {
        return Some("contract".to_string());
    }
    match contract_time {
        Some("full_time") => Some("full-time".to_string()),
        Some("part_time") => Some("part-time".to_string()),
        _ => None,
    }
}

fn experience_level_from_text(haystack: &str) -> Option<String> {
    if haystack.contains("senior") || haystack.contains("sr.") {
        Some("senior".to_string())
    } else if haystack.contains("lead") || haystack.contains("principal") {
        Some("lead".to_string())
    } else if haystack.contains("junior") || haystack.contains("entry level") {
        Some("entry".to_string())
    } else {
        None
    }
}

fn extract_skills(haystack: &str) -> Vec<String> {
    let Some(re) = skill_regex() else {
        return Vec::new();
    };

    let mut skills = Vec::new();
    for m in re.find_iter(haystack) {
        let found = m.as_str();
        if let Some(canonical) = KNOWN_SKILLS
            .iter()
            .find(|s| s.eq_ignore_ascii_case(found))
            && !skills.iter().any(|s| s == canonical)
        {
            skills.push((*canonical).to_string());
        }
    }
    skills
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_job(json: serde_json::Value) -> AdzunaJob {
        serde_json::from_value(json).expect("valid fixture")
    }

    #[test]
    fn normalizes_a_complete_posting() {
        let job = raw_job(serde_json::json!({
            "id": 12345,
            "title": "Senior Rust Engineer",
            "description": "Build services in Rust &amp; Docker. Remote friendly.",
            "company": { "display_name": "Acme Corp" },
            "location": { "display_name": "Bengaluru, Karnataka" },
            "redirect_url": "https://example.com/apply",
            "salary_min": 1500000.0,
            "salary_max": 2500000.5,
            "contract_time": "full_time",
            "created": "2026-08-01T09:00:00Z",
            "category": { "label": "IT Jobs" }
        }));

        let record = AdzunaClient::normalize(job, "in").expect("normalized");
        assert_eq!(record.id, "adzuna_12345");
        assert_eq!(record.company, "Acme Corp");
        assert_eq!(record.country, "IN");
        assert_eq!(record.salary_currency.as_deref(), Some("INR"));
        assert_eq!(record.salary_max, Some(2_500_001));
        assert_eq!(record.job_type.as_deref(), Some("full-time"));
        assert_eq!(record.experience_level.as_deref(), Some("senior"));
        assert!(record.is_remote);
        assert!(record.description.contains("Rust & Docker"));
        assert!(record.skills.contains(&"Rust".to_string()));
        assert!(record.skills.contains(&"Docker".to_string()));
        assert_eq!(record.source, JobSource::External);
        assert!(record.posted_at.is_some());
    }

    #[test]
    fn missing_company_falls_back_to_placeholder() {
        let job = raw_job(serde_json::json!({
            "id": "abc",
            "title": "Clerk"
        }));

        let record = AdzunaClient::normalize(job, "us").expect("normalized");
        assert_eq!(record.company, UNKNOWN_COMPANY);
        assert_eq!(record.salary_currency.as_deref(), Some("USD"));
        assert!(record.skills.is_empty());
    }

    #[test]
    fn postings_without_id_or_title_are_dropped() {
        assert!(AdzunaClient::normalize(raw_job(serde_json::json!({ "title": "X" })), "in").is_none());
        assert!(AdzunaClient::normalize(raw_job(serde_json::json!({ "id": 1 })), "in").is_none());
        assert!(
            AdzunaClient::normalize(raw_job(serde_json::json!({ "id": 1, "title": "  " })), "in")
                .is_none()
        );
    }

    #[test]
    fn skill_extraction_dedupes_case_insensitively() {
        let skills = extract_skills("python and PYTHON and node.js developers");
        assert_eq!(skills, vec!["Python".to_string(), "Node.js".to_string()]);
    }

    #[test]
    fn currency_defaults_to_usd() {
        assert_eq!(currency_for_country("BR"), "USD");
        assert_eq!(currency_for_country("GB"), "GBP");
    }
}
