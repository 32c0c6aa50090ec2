//! Core domain types for Prospector: raw payloads, normalized records, and prospects.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// SearchRunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one search run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchRunId(pub Uuid);

impl SearchRunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SearchRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SearchRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SearchRunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Raw payloads
// ---------------------------------------------------------------------------

/// Which external system produced a raw payload. Selects the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Apollo,
    Crunchbase,
    SerpApi,
    Mock,
}

impl SourceKind {
    /// Provenance tag recorded in `sources` lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apollo => "Apollo",
            Self::Crunchbase => "Crunchbase",
            Self::SerpApi => "SerpAPI",
            Self::Mock => "Mock",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unparsed payload as returned by a source collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub kind: SourceKind,
    pub payload: serde_json::Value,
}

impl RawRecord {
    pub fn new(kind: SourceKind, payload: serde_json::Value) -> Self {
        Self { kind, payload }
    }
}

// ---------------------------------------------------------------------------
// CompanyRecord
// ---------------------------------------------------------------------------

/// A company in the unified schema, after normalization.
///
/// `domain` is the primary join key when non-empty; `company_name` is the fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    /// Canonical domain: lowercase, no scheme, no `www.`.
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipo_status: Option<String>,
    /// Tag of the source that produced this record.
    #[serde(default)]
    pub source: String,
    /// Every source that contributed to this record (accumulated by the merger).
    #[serde(default)]
    pub sources: Vec<String>,
    /// Original payload, provenance only. Never read by the scorer.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl CompanyRecord {
    /// A record with neither a domain nor a name cannot be joined or deduplicated.
    pub fn is_empty(&self) -> bool {
        self.domain.trim().is_empty() && self.company_name.trim().is_empty()
    }

    /// Human-readable key for log lines: domain if present, else name.
    pub fn log_key(&self) -> &str {
        if self.domain.trim().is_empty() {
            self.company_name.as_str()
        } else {
            self.domain.as_str()
        }
    }
}

// ---------------------------------------------------------------------------
// ContactRecord
// ---------------------------------------------------------------------------

/// A person at a prospect company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Display name, "first last" with surrounding whitespace trimmed.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seniority: Option<String>,
    #[serde(default)]
    pub departments: Vec<String>,
    #[serde(default)]
    pub source: String,
}

impl ContactRecord {
    /// Non-empty email, if any.
    pub fn email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// A contact is kept only if it has an email or, failing that, a name.
    pub fn is_retainable(&self) -> bool {
        self.email().is_some() || !self.name.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// Hiring activity parsed from a job-postings payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HiringSignals {
    pub jobs_found: u32,
    pub data_roles_count: u32,
    pub recent_hiring: bool,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

/// One announced funding round, most recent first when listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    /// Round type as reported, e.g. `series_b`.
    pub investment_type: Option<String>,
    /// `YYYY-MM-DD` announcement date.
    pub announced_on: Option<String>,
    pub money_raised_usd: Option<u64>,
}

/// Buying signals attached to a prospect and fed to the scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub new_funding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    pub recent_hiring: bool,
    pub data_roles_count: u32,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

impl Signals {
    /// Seed signals from what the company record already knows (funding stage).
    pub fn seeded_from(company: &CompanyRecord) -> Self {
        let funding_stage = company
            .funding_stage
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .cloned();
        Self {
            new_funding: funding_stage.is_some(),
            funding_stage,
            ..Default::default()
        }
    }

    /// Record funding rounds found for the company. The first round with a
    /// type sets the stage. No rounds leaves the signals untouched.
    pub fn apply_funding(&mut self, rounds: &[FundingRound]) {
        if rounds.is_empty() {
            return;
        }
        self.new_funding = true;
        if let Some(stage) = rounds
            .iter()
            .filter_map(|r| r.investment_type.as_deref())
            .map(str::trim)
            .find(|t| !t.is_empty())
        {
            self.funding_stage = Some(stage.to_string());
        }
    }

    /// Layer hiring data from an enrichment collaborator on top of these signals.
    pub fn apply_hiring(&mut self, hiring: HiringSignals) {
        self.recent_hiring = hiring.recent_hiring;
        self.data_roles_count = hiring.data_roles_count;
        for tech in hiring.tech_stack {
            if !self.tech_stack.iter().any(|t| t.eq_ignore_ascii_case(&tech)) {
                self.tech_stack.push(tech);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prospect
// ---------------------------------------------------------------------------

/// Final ranked output unit: company attributes, contacts, signals, and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prospect {
    pub company_name: String,
    pub domain: String,
    pub revenue: Option<u64>,
    pub employee_count: Option<u64>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub description: String,
    pub funding_stage: Option<String>,
    pub funding_total: Option<u64>,
    pub contacts: Vec<ContactRecord>,
    pub signals: Signals,
    pub sources: Vec<String>,
    /// Weighted ICP fit in [0, 1], two decimal places.
    pub confidence: f64,
}

impl Prospect {
    /// Wrap a scored company. Source-specific fields and the raw payload are dropped here.
    pub fn from_company(
        company: CompanyRecord,
        contacts: Vec<ContactRecord>,
        signals: Signals,
        confidence: f64,
    ) -> Self {
        Self {
            company_name: company.company_name,
            domain: company.domain,
            revenue: company.revenue,
            employee_count: company.employee_count,
            industry: company.industry,
            location: company.location,
            description: company.description,
            funding_stage: company.funding_stage,
            funding_total: company.funding_total,
            contacts,
            signals,
            sources: company.sources,
            confidence,
        }
    }
}
