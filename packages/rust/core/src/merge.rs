//! Cross-source record merging.
//!
//! Records that share a join key collapse into one. The first record seen for
//! a key seeds the result; later records only fill fields the seed left empty.
//! Every contributing source is recorded in `sources`. The seed's `raw`
//! payload and `source` tag are kept as-is.

use std::collections::HashMap;

use prospector_shared::CompanyRecord;
use tracing::debug;

/// Which field identifies the same company across sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeKey {
    Domain,
    CompanyName,
    /// Domain when present, otherwise company name.
    #[default]
    DomainOrName,
}

impl MergeKey {
    /// Normalized key for `company`, or `None` when it has no usable key.
    pub fn key_of(&self, company: &CompanyRecord) -> Option<String> {
        let domain = normalize_key(&company.domain);
        let name = normalize_key(&company.company_name);
        match self {
            Self::Domain => domain.map(|d| format!("domain:{d}")),
            Self::CompanyName => name.map(|n| format!("name:{n}")),
            Self::DomainOrName => domain
                .map(|d| format!("domain:{d}"))
                .or_else(|| name.map(|n| format!("name:{n}"))),
        }
    }
}

fn normalize_key(value: &str) -> Option<String> {
    let key = value.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

/// Merge same-key records, preserving first-seen key order.
pub fn merge_companies(records: Vec<CompanyRecord>, key: MergeKey) -> Vec<CompanyRecord> {
    let input = records.len();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<CompanyRecord> = Vec::new();

    for record in records {
        let Some(k) = key.key_of(&record) else {
            debug!(source = %record.source, "dropping record without a join key");
            continue;
        };

        match index.get(&k) {
            Some(&i) => fill_missing(&mut merged[i], record),
            None => {
                index.insert(k, merged.len());
                merged.push(seed(record));
            }
        }
    }

    debug!(input, output = merged.len(), "merged company records");
    merged
}

fn seed(mut record: CompanyRecord) -> CompanyRecord {
    let mut sources = Vec::new();
    for tag in std::mem::take(&mut record.sources)
        .into_iter()
        .chain(std::iter::once(record.source.clone()))
    {
        push_source(&mut sources, tag);
    }
    record.sources = sources;
    record
}

fn push_source(sources: &mut Vec<String>, tag: String) {
    if !tag.trim().is_empty() && !sources.contains(&tag) {
        sources.push(tag);
    }
}

/// Fill empty fields of `existing` from `incoming`. Non-empty values are never replaced.
fn fill_missing(existing: &mut CompanyRecord, incoming: CompanyRecord) {
    fill_text(&mut existing.company_name, incoming.company_name);
    fill_text(&mut existing.domain, incoming.domain);
    fill_text(&mut existing.description, incoming.description);

    fill_opt(&mut existing.revenue, incoming.revenue);
    fill_opt(&mut existing.employee_count, incoming.employee_count);
    fill_opt(&mut existing.funding_total, incoming.funding_total);
    fill_opt(&mut existing.founded_year, incoming.founded_year);

    fill_opt_text(&mut existing.industry, incoming.industry);
    fill_opt_text(&mut existing.location, incoming.location);
    fill_opt_text(&mut existing.country, incoming.country);
    fill_opt_text(&mut existing.funding_stage, incoming.funding_stage);
    fill_opt_text(&mut existing.linkedin_url, incoming.linkedin_url);
    fill_opt_text(&mut existing.phone, incoming.phone);
    fill_opt_text(&mut existing.ipo_status, incoming.ipo_status);

    for tag in incoming.sources.into_iter().chain(std::iter::once(incoming.source)) {
        push_source(&mut existing.sources, tag);
    }
}

fn fill_text(existing: &mut String, incoming: String) {
    if existing.trim().is_empty() && !incoming.trim().is_empty() {
        *existing = incoming;
    }
}

fn fill_opt<T>(existing: &mut Option<T>, incoming: Option<T>) {
    if existing.is_none() {
        *existing = incoming;
    }
}

fn fill_opt_text(existing: &mut Option<String>, incoming: Option<String>) {
    let empty = existing.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty && incoming.as_deref().is_some_and(|s| !s.trim().is_empty()) {
        *existing = incoming;
    }
}
