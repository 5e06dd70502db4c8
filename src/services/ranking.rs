//! Ranking engine: merges and orders candidates with an additive weighted
//! score. All weights live in [`RankingWeights`] so the heuristic can be
//! tuned from config and unit-tested apart from the fetch/merge logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{JobRecord, SearchFilters};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
    /// Flat bonus for featured postings.
    pub featured: f64,
    /// Flat bonus for urgent postings.
    pub urgent: f64,
    /// Maximum freshness bonus, decayed linearly to zero over the window.
    pub freshness_max: f64,
    pub freshness_window_days: f64,
    /// Bonus per candidate skill matched by a requested skill.
    pub skill_match: f64,
    /// Bonus when the candidate location contains the filter location.
    pub location_match: f64,
    /// Popularity proxy: application count, capped here.
    pub popularity_cap: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            featured: 100.0,
            urgent: 50.0,
            freshness_max: 30.0,
            freshness_window_days: 30.0,
            skill_match: 10.0,
            location_match: 20.0,
            popularity_cap: 20.0,
        }
    }
}

/// Additive score for one candidate against the active filters.
#[must_use]
pub fn score(
    job: &JobRecord,
    filters: &SearchFilters,
    weights: &RankingWeights,
    now: DateTime<Utc>,
) -> f64 {
    let mut total = 0.0;

    if job.is_featured {
        total += weights.featured;
    }
    if job.is_urgent {
        total += weights.urgent;
    }

    let age_days =
        (now - job.effective_posted_at()).num_milliseconds() as f64 / (86_400.0 * 1_000.0);
    if weights.freshness_window_days > 0.0 {
        let decay_per_day = weights.freshness_max / weights.freshness_window_days;
        total += (weights.freshness_max - age_days * decay_per_day).max(0.0);
    }

    if !filters.skills.is_empty() {
        let matched = job
            .skills
            .iter()
            .filter(|skill| {
                let skill = skill.to_lowercase();
                filters
                    .skills
                    .iter()
                    .any(|wanted| skill.contains(&wanted.to_lowercase()))
            })
            .count();
        total += matched as f64 * weights.skill_match;
    }

    if let Some(location) = SearchFilters::normalized(filters.location.as_ref())
        && job
            .location
            .to_lowercase()
            .contains(&location.to_lowercase())
    {
        total += weights.location_match;
    }

    total += (job.application_count as f64).clamp(0.0, weights.popularity_cap);

    total
}

/// Orders candidates by descending score. The sort is stable, so equal
/// scores keep their merge order (local store before external provider).
pub fn rank(
    jobs: &mut [JobRecord],
    filters: &SearchFilters,
    weights: &RankingWeights,
    now: DateTime<Utc>,
) {
    jobs.sort_by(|a, b| {
        score(b, filters, weights, now).total_cmp(&score(a, filters, weights, now))
    });
}
