//! Crunchbase organization payloads. Most values are wrapped as `{"value": ...}`.

use prospector_shared::{CompanyRecord, FundingRound, ProspectorError, Result};
use serde_json::Value;

use crate::buckets::BucketTables;
use crate::domain::clean_domain;
use crate::fields;

pub(crate) fn organization(
    payload: &Value,
    buckets: &BucketTables,
    source: &str,
) -> Result<CompanyRecord> {
    if !payload.is_object() {
        return Err(ProspectorError::Normalization(format!(
            "{source} organization payload is not an object"
        )));
    }

    let domain = fields::wrapped_text(payload, "website")
        .map(|w| clean_domain(&w))
        .unwrap_or_default();

    let revenue = fields::wrapped_text(payload, "revenue_range").and_then(|b| buckets.revenue(&b));
    let employee_count =
        fields::wrapped_text(payload, "num_employees_enum").and_then(|b| buckets.employees(&b));

    let funding_total = payload
        .get("funding_total")
        .and_then(|f| f.get("value_usd"))
        .and_then(fields::as_count);

    let founded_year = fields::wrapped_text(payload, "founded_on")
        .and_then(|date| date.split('-').next().and_then(|y| y.trim().parse::<u32>().ok()));

    Ok(CompanyRecord {
        company_name: fields::wrapped_text(payload, "name").unwrap_or_default(),
        domain,
        revenue,
        employee_count,
        industry: fields::first_wrapped_text(payload, "categories"),
        location: fields::first_wrapped_text(payload, "location_identifiers"),
        description: fields::wrapped_text(payload, "short_description").unwrap_or_default(),
        funding_stage: fields::wrapped_text(payload, "last_funding_type"),
        funding_total,
        founded_year,
        ipo_status: fields::wrapped_text(payload, "ipo_status"),
        source: source.to_string(),
        raw: payload.clone(),
        ..Default::default()
    })
}

/// Funding-round `properties` from `searches/funding_rounds`.
pub(crate) fn funding_round(payload: &Value) -> FundingRound {
    FundingRound {
        investment_type: fields::wrapped_text(payload, "investment_type"),
        announced_on: fields::wrapped_text(payload, "announced_on"),
        money_raised_usd: payload
            .get("money_raised")
            .and_then(|m| m.get("value_usd"))
            .and_then(fields::as_count),
    }
}
