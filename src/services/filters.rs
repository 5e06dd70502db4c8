//! Filter Compiler: turns a [`SearchFilters`] value into the predicate the
//! local store runs, plus the normalized cache key for the result cache.
//!
//! Pure functions, no I/O. All inputs are treated permissively: blank
//! strings mean "not specified" and unrecognized enum-ish values pass
//! through as literal equality predicates.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sea_orm::{ColumnTrait, Condition};
use serde::Serialize;

use crate::entities::jobs;
use crate::models::SearchFilters;

/// Compiles the predicate tree: AND of OR-groups, with the active-only
/// clause always present.
///
/// Substring matches rely on SQLite's ASCII-case-insensitive `LIKE`.
#[must_use]
pub fn compile(filters: &SearchFilters) -> Condition {
    let mut condition = Condition::all().add(jobs::Column::IsActive.eq(true));

    if let Some(query) = SearchFilters::normalized(filters.query.as_ref()) {
        condition = condition.add(
            Condition::any()
                .add(jobs::Column::Title.contains(query))
                .add(jobs::Column::Description.contains(query))
                .add(jobs::Column::Company.contains(query)),
        );
    }

    if let Some(location) = SearchFilters::normalized(filters.location.as_ref()) {
        // Match the full string or its first comma segment ("Pune, MH" also
        // matches rows stored as just "Pune").
        let head = location.split(',').next().unwrap_or(location).trim();
        condition = condition.add(
            Condition::any()
                .add(jobs::Column::Location.contains(location))
                .add(jobs::Column::Location.contains(head)),
        );
    }

    // Independent clauses; min > max yields zero matches by construction.
    if let Some(min) = filters.salary_min {
        condition = condition.add(jobs::Column::SalaryMin.gte(min));
    }
    if let Some(max) = filters.salary_max {
        condition = condition.add(jobs::Column::SalaryMax.lte(max));
    }

    if let Some(job_type) = SearchFilters::selected(filters.job_type.as_ref()) {
        condition = condition.add(jobs::Column::JobType.eq(job_type));
    }

    if let Some(level) = SearchFilters::selected(filters.experience_level.as_ref()) {
        condition = condition.add(jobs::Column::ExperienceLevel.eq(level));
    }

    if filters.remote_only {
        condition = condition.add(jobs::Column::IsRemote.eq(true));
    }

    if let Some(sector) = SearchFilters::normalized(filters.sector.as_ref()) {
        condition = condition.add(jobs::Column::Sector.contains(sector));
    }

    if let Some(country) = SearchFilters::normalized(filters.country.as_ref()) {
        condition = condition.add(jobs::Column::Country.eq(country.to_uppercase()));
    }

    condition
}

/// Subset of filter fields that affect result identity. Skills only change
/// ranking, not the candidate set, so they are excluded on purpose.
#[derive(Serialize)]
struct KeyFields<'a> {
    query: &'a Option<String>,
    location: &'a Option<String>,
    country: &'a Option<String>,
    job_type: &'a Option<String>,
    experience_level: &'a Option<String>,
    salary_min: Option<i64>,
    salary_max: Option<i64>,
    remote_only: bool,
    sector: &'a Option<String>,
}

/// Deterministic cache key: JSON in fixed field order, base64url-encoded so
/// arbitrary user text is safe as a map key.
#[must_use]
pub fn cache_key(filters: &SearchFilters) -> String {
    let fields = KeyFields {
        query: &filters.query,
        location: &filters.location,
        country: &filters.country,
        job_type: &filters.job_type,
        experience_level: &filters.experience_level,
        salary_min: filters.salary_min,
        salary_max: filters.salary_max,
        remote_only: filters.remote_only,
        sector: &filters.sector,
    };
    let encoded = serde_json::to_string(&fields).unwrap_or_default();
    format!("job_search_{}", URL_SAFE_NO_PAD.encode(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_still_constrain_to_active_rows() {
        let condition = compile(&SearchFilters::default());
        let rendered = format!("{condition:?}");
        assert!(rendered.contains("is_active"));
    }

    #[test]
    fn blank_strings_compile_like_unset_fields() {
        let blank = SearchFilters {
            query: Some("   ".to_string()),
            location: Some(String::new()),
            sector: Some(" ".to_string()),
            ..SearchFilters::default()
        };
        let unset = SearchFilters::default();
        assert_eq!(format!("{:?}", compile(&blank)), format!("{:?}", compile(&unset)));
    }

    #[test]
    fn all_sentinel_skips_enum_predicates() {
        let wildcard = SearchFilters {
            job_type: Some("all".to_string()),
            experience_level: Some("ALL".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(
            format!("{:?}", compile(&wildcard)),
            format!("{:?}", compile(&SearchFilters::default()))
        );
    }

    #[test]
    fn cache_key_is_deterministic() {
        let filters = SearchFilters {
            query: Some("engineer".to_string()),
            country: Some("IN".to_string()),
            remote_only: true,
            ..SearchFilters::default()
        };
        assert_eq!(cache_key(&filters), cache_key(&filters.clone()));
        assert!(cache_key(&filters).starts_with("job_search_"));
    }

    #[test]
    fn cache_key_changes_with_identity_fields() {
        let base = SearchFilters {
            query: Some("engineer".to_string()),
            ..SearchFilters::default()
        };
        let different = SearchFilters {
            query: Some("designer".to_string()),
            ..SearchFilters::default()
        };
        assert_ne!(cache_key(&base), cache_key(&different));
    }

    #[test]
    fn cache_key_ignores_skills() {
        let base = SearchFilters {
            query: Some("engineer".to_string()),
            ..SearchFilters::default()
        };
        let with_skills = SearchFilters {
            skills: vec!["rust".to_string(), "sql".to_string()],
            ..base.clone()
        };
        assert_eq!(cache_key(&base), cache_key(&with_skills));
    }
}
