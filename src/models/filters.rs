use serde::{Deserialize, Serialize};

/// Caller-supplied search criteria. All fields are optional; blank strings
/// and the `"all"` sentinel mean "not specified". Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub query: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub remote_only: bool,
    pub sector: Option<String>,
    pub skills: Vec<String>,
}

impl SearchFilters {
    /// Trims an optional text field, treating blank as unset.
    #[must_use]
    pub fn normalized(value: Option<&String>) -> Option<&str> {
        value.map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Like [`Self::normalized`], but also drops the `"all"` wildcard
    /// sentinel used by enum-ish fields.
    #[must_use]
    pub fn selected(value: Option<&String>) -> Option<&str> {
        Self::normalized(value).filter(|v| !v.eq_ignore_ascii_case("all"))
    }
}
