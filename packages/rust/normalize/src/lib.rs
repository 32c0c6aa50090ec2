//! Normalization of heterogeneous source payloads into the unified schema.
//!
//! Every source speaks its own JSON dialect. The [`Normalizer`] dispatches on
//! [`SourceKind`] and maps each payload to a [`CompanyRecord`],
//! [`ContactRecord`], [`HiringSignals`], or [`FundingRound`]. Normalization is
//! total: a payload that cannot be mapped yields an empty record and a
//! warning, never an error.

mod apollo;
mod buckets;
mod crunchbase;
mod domain;
mod fields;
mod jobs;

use prospector_shared::{
    CompanyRecord, ContactRecord, FundingRound, HiringSignals, RawRecord, Result, SourceKind,
};
use tracing::warn;

pub use apollo::{REVENUE_PER_EMPLOYEE, estimate_revenue};
pub use buckets::BucketTables;
pub use domain::clean_domain;
pub use jobs::is_data_role;

/// Maps raw payloads into normalized records.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    buckets: BucketTables,
}

impl Normalizer {
    pub fn new(buckets: BucketTables) -> Self {
        Self { buckets }
    }

    pub fn buckets(&self) -> &BucketTables {
        &self.buckets
    }

    /// Normalize an organization payload. Returns an empty record on failure.
    pub fn company(&self, raw: &RawRecord) -> CompanyRecord {
        match self.try_company(raw) {
            Ok(company) => company,
            Err(e) => {
                warn!(source = %raw.kind, error = %e, "skipping unmappable company payload");
                CompanyRecord {
                    source: raw.kind.as_str().to_string(),
                    ..Default::default()
                }
            }
        }
    }

    /// Normalize a person payload. Returns an empty record on failure.
    pub fn contact(&self, raw: &RawRecord) -> ContactRecord {
        let result = match raw.kind {
            SourceKind::Apollo | SourceKind::Mock => apollo::person(&raw.payload, raw.kind.as_str()),
            other => Err(prospector_shared::ProspectorError::Normalization(format!(
                "{other} does not provide person payloads"
            ))),
        };

        result.unwrap_or_else(|e| {
            warn!(source = %raw.kind, error = %e, "skipping unmappable contact payload");
            ContactRecord {
                source: raw.kind.as_str().to_string(),
                ..Default::default()
            }
        })
    }

    /// Parse a job-postings payload into hiring signals.
    pub fn hiring(&self, raw: &RawRecord) -> HiringSignals {
        jobs::hiring(&raw.payload)
    }

    /// Parse funding-round payloads, keeping their order. Only Crunchbase
    /// reports rounds; other payloads are skipped with a warning.
    pub fn funding_rounds(&self, raw: &[RawRecord]) -> Vec<FundingRound> {
        raw.iter()
            .filter_map(|r| match r.kind {
                SourceKind::Crunchbase => Some(crunchbase::funding_round(&r.payload)),
                other => {
                    warn!(source = %other, "skipping non-Crunchbase funding payload");
                    None
                }
            })
            .collect()
    }

    fn try_company(&self, raw: &RawRecord) -> Result<CompanyRecord> {
        let source = raw.kind.as_str();
        match raw.kind {
            SourceKind::Apollo => apollo::organization(&raw.payload, source),
            SourceKind::Crunchbase => {
                crunchbase::organization(&raw.payload, &self.buckets, source)
            }
            SourceKind::Mock => {
                // Apollo-shaped, plus flat funding fields
                let mut company = apollo::organization(&raw.payload, source)?;
                company.funding_stage = fields::text(&raw.payload, "last_funding_type");
                company.funding_total = fields::count(&raw.payload, "funding_total");
                Ok(company)
            }
            SourceKind::SerpApi => Err(prospector_shared::ProspectorError::Normalization(
                "SerpAPI does not provide organization payloads".into(),
            )),
        }
    }
}
