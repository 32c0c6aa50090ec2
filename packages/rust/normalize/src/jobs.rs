//! Job-posting payloads (Google Jobs via SerpAPI) parsed into hiring signals.

use prospector_shared::HiringSignals;
use serde_json::Value;

use crate::fields;

/// Only the first postings are inspected.
const MAX_POSTINGS: usize = 10;

/// Lowercased title fragments that mark a data role.
const DATA_ROLE_KEYWORDS: &[&str] = &[
    "data",
    "analytics",
    "scientist",
    "engineer",
    "machine learning",
    "ml",
    "ai",
    "artificial intelligence",
];

/// Whether a job title counts as a data role.
pub fn is_data_role(title: &str) -> bool {
    let title = title.to_lowercase();
    DATA_ROLE_KEYWORDS.iter().any(|k| title.contains(k))
}

pub(crate) fn hiring(payload: &Value) -> HiringSignals {
    let jobs = payload
        .get("jobs_results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let data_roles_count = jobs
        .iter()
        .take(MAX_POSTINGS)
        .filter_map(|job| fields::text(job, "title"))
        .filter(|title| is_data_role(title))
        .count();

    let data_roles_count = u32::try_from(data_roles_count).unwrap_or(u32::MAX);
    HiringSignals {
        jobs_found: u32::try_from(jobs.len()).unwrap_or(u32::MAX),
        data_roles_count,
        recent_hiring: data_roles_count > 0,
        tech_stack: fields::text_list(payload, "tech_stack"),
    }
}
