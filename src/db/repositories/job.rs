use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::{applications, bookmarks, companies, jobs, prelude::*};
use crate::models::job::{JobRecord, JobSource};

/// Input shape for ingesting one job row (API, CLI import, tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobInput {
    pub title: String,
    pub company: String,
    pub location: String,
    pub country: String,
    pub description: String,
    pub apply_url: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub skills: Vec<String>,
    pub is_remote: bool,
    pub is_hybrid: bool,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub is_active: bool,
    pub sector: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Default for JobInput {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            location: String::new(),
            country: "IN".to_string(),
            description: String::new(),
            apply_url: None,
            salary_min: None,
            salary_max: None,
            salary_currency: None,
            job_type: None,
            experience_level: None,
            skills: Vec::new(),
            is_remote: false,
            is_hybrid: false,
            is_featured: false,
            is_urgent: false,
            is_active: true,
            sector: None,
            posted_at: None,
        }
    }
}

pub struct JobRepository {
    conn: DatabaseConnection,
}

impl JobRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                    .map(|naive| naive.and_utc())
                    .ok()
            })
    }

    fn map_model_to_record(
        model: jobs::Model,
        company: Option<companies::Model>,
        applications: i64,
        bookmarks: i64,
    ) -> JobRecord {
        JobRecord {
            id: model.id.to_string(),
            title: model.title,
            company: model.company,
            company_logo: company.and_then(|c| c.logo),
            location: model.location,
            country: model.country,
            description: model.description,
            apply_url: model.apply_url,
            salary_min: model.salary_min,
            salary_max: model.salary_max,
            salary_currency: model.salary_currency,
            job_type: model.job_type,
            experience_level: model.experience_level,
            skills: model
                .skills
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            is_remote: model.is_remote,
            is_hybrid: model.is_hybrid,
            is_featured: model.is_featured,
            is_urgent: model.is_urgent,
            sector: model.sector,
            posted_at: model.posted_at.as_deref().and_then(Self::parse_timestamp),
            created_at: Self::parse_timestamp(&model.created_at).unwrap_or_else(Utc::now),
            source: JobSource::Database,
            application_count: applications,
            bookmark_count: bookmarks,
        }
    }

    /// Runs the compiled predicate against the jobs table with the fixed
    /// priority ordering and result limit, then attaches company data and
    /// aggregate counters.
    pub async fn search(&self, condition: Condition, limit: u64) -> anyhow::Result<Vec<JobRecord>> {
        let rows = Jobs::find()
            .filter(condition)
            .order_by_desc(jobs::Column::IsFeatured)
            .order_by_desc(jobs::Column::IsUrgent)
            .order_by_desc(jobs::Column::PostedAt)
            .order_by_desc(jobs::Column::CreatedAt)
            .limit(limit)
            .find_also_related(Companies)
            .all(&self.conn)
            .await?;

        self.attach_counts(rows).await
    }

    pub async fn get(&self, id: i32) -> anyhow::Result<Option<JobRecord>> {
        let row = Jobs::find_by_id(id)
            .find_also_related(Companies)
            .one(&self.conn)
            .await?;

        Ok(match row {
            Some(pair) => self.attach_counts(vec![pair]).await?.into_iter().next(),
            None => None,
        })
    }

    pub async fn insert(&self, input: &JobInput) -> anyhow::Result<i32> {
        let now = Utc::now().to_rfc3339();

        let active_model = jobs::ActiveModel {
            title: Set(input.title.clone()),
            company: Set(input.company.clone()),
            location: Set(input.location.clone()),
            country: Set(input.country.to_uppercase()),
            description: Set(input.description.clone()),
            apply_url: Set(input.apply_url.clone()),
            salary_min: Set(input.salary_min),
            salary_max: Set(input.salary_max),
            salary_currency: Set(input.salary_currency.clone()),
            job_type: Set(input.job_type.clone()),
            experience_level: Set(input.experience_level.clone()),
            skills: Set(serde_json::to_string(&input.skills).ok()),
            is_remote: Set(input.is_remote),
            is_hybrid: Set(input.is_hybrid),
            is_featured: Set(input.is_featured),
            is_urgent: Set(input.is_urgent),
            is_active: Set(input.is_active),
            sector: Set(input.sector.clone()),
            posted_at: Set(input.posted_at.map(|dt| dt.to_rfc3339())),
            created_at: Set(now),
            ..Default::default()
        };

        let result = Jobs::insert(active_model).exec(&self.conn).await?;
        info!("Ingested job: {} ({})", input.title, input.company);
        Ok(result.last_insert_id)
    }

    pub async fn list_active(
        &self,
        page: u64,
        per_page: u64,
    ) -> anyhow::Result<(Vec<JobRecord>, u64)> {
        let paginator = Jobs::find()
            .filter(jobs::Column::IsActive.eq(true))
            .order_by_desc(jobs::Column::PostedAt)
            .order_by_desc(jobs::Column::CreatedAt)
            .paginate(&self.conn, per_page.max(1));

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let pairs = rows.into_iter().map(|m| (m, None)).collect();
        Ok((self.attach_counts(pairs).await?, total))
    }

    pub async fn count_active(&self) -> anyhow::Result<u64> {
        Ok(Jobs::find()
            .filter(jobs::Column::IsActive.eq(true))
            .count(&self.conn)
            .await?)
    }

    async fn attach_counts(
        &self,
        rows: Vec<(jobs::Model, Option<companies::Model>)>,
    ) -> anyhow::Result<Vec<JobRecord>> {
        let ids: Vec<i32> = rows.iter().map(|(m, _)| m.id).collect();
        let application_counts = self.grouped_application_counts(&ids).await?;
        let bookmark_counts = self.grouped_bookmark_counts(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(model, company)| {
                let applications = application_counts.get(&model.id).copied().unwrap_or(0);
                let bookmarks = bookmark_counts.get(&model.id).copied().unwrap_or(0);
                Self::map_model_to_record(model, company, applications, bookmarks)
            })
            .collect())
    }

    async fn grouped_application_counts(&self, ids: &[i32]) -> anyhow::Result<HashMap<i32, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let counts: Vec<(i32, i64)> = Applications::find()
            .select_only()
            .column(applications::Column::JobId)
            .column_as(applications::Column::Id.count(), "count")
            .filter(applications::Column::JobId.is_in(ids.iter().copied()))
            .group_by(applications::Column::JobId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(counts.into_iter().collect())
    }

    async fn grouped_bookmark_counts(&self, ids: &[i32]) -> anyhow::Result<HashMap<i32, i64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let counts: Vec<(i32, i64)> = Bookmarks::find()
            .select_only()
            .column(bookmarks::Column::JobId)
            .column_as(bookmarks::Column::Id.count(), "count")
            .filter(bookmarks::Column::JobId.is_in(ids.iter().copied()))
            .group_by(bookmarks::Column::JobId)
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(counts.into_iter().collect())
    }
}
