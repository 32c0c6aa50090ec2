//! Apollo organization and person payloads.

use prospector_shared::{CompanyRecord, ContactRecord, ProspectorError, Result};
use serde_json::Value;

use crate::domain::clean_domain;
use crate::fields;

/// Revenue per employee used when a source reports headcount only.
pub const REVENUE_PER_EMPLOYEE: u64 = 200_000;

/// Impute revenue from headcount. Zero headcount gives no estimate.
pub fn estimate_revenue(employee_count: u64) -> Option<u64> {
    (employee_count > 0).then(|| employee_count.saturating_mul(REVENUE_PER_EMPLOYEE))
}

pub(crate) fn organization(payload: &Value, source: &str) -> Result<CompanyRecord> {
    if !payload.is_object() {
        return Err(ProspectorError::Normalization(format!(
            "{source} organization payload is not an object"
        )));
    }

    let domain = fields::first_text(payload, &["website_url", "domain"])
        .map(|d| clean_domain(&d))
        .unwrap_or_default();
    let employee_count = fields::count(payload, "estimated_num_employees");

    Ok(CompanyRecord {
        company_name: fields::text(payload, "name").unwrap_or_default(),
        domain,
        revenue: employee_count.and_then(estimate_revenue),
        employee_count,
        industry: fields::first_text(payload, &["industry", "primary_industry"]),
        location: fields::text(payload, "city"),
        country: fields::text(payload, "country"),
        description: fields::text(payload, "short_description").unwrap_or_default(),
        linkedin_url: fields::text(payload, "linkedin_url"),
        phone: fields::text(payload, "phone"),
        founded_year: fields::count(payload, "founded_year").and_then(|y| u32::try_from(y).ok()),
        source: source.to_string(),
        raw: payload.clone(),
        ..Default::default()
    })
}

pub(crate) fn person(payload: &Value, source: &str) -> Result<ContactRecord> {
    if !payload.is_object() {
        return Err(ProspectorError::Normalization(format!(
            "{source} person payload is not an object"
        )));
    }

    let first_name = fields::text(payload, "first_name");
    let last_name = fields::text(payload, "last_name");
    let name = format!(
        "{} {}",
        first_name.as_deref().unwrap_or_default(),
        last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string();

    let email = fields::text(payload, "email").or_else(|| {
        fields::text_list(payload, "email_guesses")
            .into_iter()
            .next()
    });

    let phone = payload
        .get("phone_numbers")
        .and_then(Value::as_array)
        .and_then(|numbers| numbers.first())
        .and_then(|first| fields::text(first, "raw_number"));

    Ok(ContactRecord {
        name,
        first_name,
        last_name,
        title: fields::text(payload, "title"),
        email,
        linkedin_url: fields::text(payload, "linkedin_url"),
        phone,
        seniority: fields::text(payload, "seniority"),
        departments: fields::text_list(payload, "departments"),
        source: source.to_string(),
    })
}
