//! Job search command handler

use std::sync::Arc;

use crate::config::Config;
use crate::models::SearchFilters;
use crate::services::SearchOptions;
use crate::state::SharedState;

pub struct SearchArgs {
    pub query: String,
    pub location: Option<String>,
    pub country: Option<String>,
    pub skills: Option<String>,
    pub remote: bool,
    pub limit: usize,
    pub local_only: bool,
}

pub async fn cmd_search_jobs(config: &Config, args: SearchArgs) -> anyhow::Result<()> {
    let state = Arc::new(SharedState::new(config.clone()).await?);

    let filters = SearchFilters {
        query: Some(args.query.clone()).filter(|q| !q.trim().is_empty()),
        location: args.location,
        country: args.country,
        remote_only: args.remote,
        skills: args
            .skills
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        ..SearchFilters::default()
    };

    let options = SearchOptions {
        max_results: args.limit.min(config.search.max_results),
        include_external: !args.local_only,
        ..SearchOptions::default()
    };

    let (response, metrics) = state.search_service.search(&filters, &options).await?;

    if response.jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!(
        "Found {} jobs in {}ms (sources: {})",
        response.jobs.len(),
        metrics.query_time_ms,
        metrics.sources.join(", ")
    );
    println!("{:-<70}", "");

    for job in &response.jobs {
        let mut tags = Vec::new();
        if job.is_featured {
            tags.push("featured");
        }
        if job.is_urgent {
            tags.push("urgent");
        }
        if job.is_remote {
            tags.push("remote");
        }
        let tag_text = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };

        println!("• {} at {}{}", job.title, job.company, tag_text);
        println!(
            "  {} | {} | ID: {}",
            if job.location.is_empty() {
                "location n/a"
            } else {
                &job.location
            },
            job.source.as_str(),
            job.id
        );
        if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
            let currency = job.salary_currency.as_deref().unwrap_or("");
            println!("  Salary: {min}-{max} {currency}");
        }
    }

    Ok(())
}
