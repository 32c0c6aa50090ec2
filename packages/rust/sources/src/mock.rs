//! Deterministic synthetic data used when live sources are unavailable.
//!
//! Every generated value is derived from a SHA-256 digest of the company name,
//! so repeated runs produce identical prospects.

use async_trait::async_trait;
use prospector_shared::{CompanyRecord, IcpSpec, RawRecord, Result, SourceKind};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{CompanySource, ContactSource, SignalSource};

struct CompanyTemplate {
    name: &'static str,
    domain: &'static str,
    industry: &'static str,
}

const COMPANIES: &[CompanyTemplate] = &[
    CompanyTemplate { name: "DataMetrics Pro", domain: "datametrics.io", industry: "B2B Software" },
    CompanyTemplate { name: "CloudAnalytics Inc", domain: "cloudanalytics.com", industry: "Enterprise Software" },
    CompanyTemplate { name: "FinTech Insights", domain: "fintechinsights.com", industry: "FinTech" },
    CompanyTemplate { name: "AI Solutions Group", domain: "aisolutions.io", industry: "B2B Software" },
    CompanyTemplate { name: "DataDriven Technologies", domain: "datadriven.com", industry: "Enterprise Software" },
    CompanyTemplate { name: "SmartAutomation Labs", domain: "smartautomation.io", industry: "B2B Software" },
    CompanyTemplate { name: "AnalytiX Financial", domain: "analytixfinancial.com", industry: "FinTech" },
    CompanyTemplate { name: "CloudMetrics Solutions", domain: "cloudmetrics.com", industry: "Enterprise Software" },
    CompanyTemplate { name: "AI Analytics Corp", domain: "aianalytics.io", industry: "B2B Software" },
    CompanyTemplate { name: "DataFlow Systems", domain: "dataflow.com", industry: "Enterprise Software" },
];

const CONTACTS: &[(&str, &str, &str)] = &[
    ("Sarah", "Johnson", "VP Data Science"),
    ("Michael", "Chen", "Chief Data Officer"),
    ("Emily", "Rodriguez", "Head of Analytics"),
    ("David", "Kim", "Director of Engineering"),
    ("Jennifer", "Martinez", "VP Engineering"),
    ("Robert", "Wilson", "CTO"),
    ("Lisa", "Anderson", "Head of Data Science"),
    ("James", "Taylor", "VP Product"),
];

const CITIES: &[&str] = &["San Francisco", "New York", "Austin", "Seattle", "Boston", "Chicago"];

/// Funding stage with its (min, max) total raised.
const FUNDING_STAGES: &[(&str, u64, u64)] = &[
    ("Seed", 1_000_000, 5_000_000),
    ("Series A", 5_000_000, 20_000_000),
    ("Series B", 20_000_000, 50_000_000),
    ("Series C", 50_000_000, 150_000_000),
];

const DATA_JOB_TITLES: &[&str] = &[
    "Senior Data Scientist",
    "ML Engineer",
    "Analytics Engineer",
    "Data Platform Lead",
    "Machine Learning Researcher",
];

const OTHER_JOB_TITLES: &[&str] = &["Account Executive", "Office Manager", "Customer Success Manager"];

const TECHNOLOGIES: &[&str] = &["AWS", "Snowflake", "Python", "Kubernetes", "dbt", "Databricks"];

/// Generator of synthetic companies, contacts, and job postings.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    limit: Option<usize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of generated companies.
    pub fn with_limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    /// Apollo-shaped organization payloads plus flat funding fields.
    pub fn companies(&self) -> Vec<Value> {
        let count = self.limit.unwrap_or(COMPANIES.len()).min(COMPANIES.len());
        COMPANIES[..count]
            .iter()
            .enumerate()
            .map(|(i, template)| company_payload(i, template))
            .collect()
    }

    /// Apollo-shaped person payloads at `domain`.
    pub fn contacts(&self, domain: &str, count: usize) -> Vec<Value> {
        let domain = if domain.trim().is_empty() {
            "example.com"
        } else {
            domain.trim()
        };
        CONTACTS
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, (first, last, title))| {
                let first_lower = first.to_lowercase();
                let last_lower = last.to_lowercase();
                let departments = if title.contains("Data") {
                    json!(["Data Science", "Engineering"])
                } else {
                    json!(["Engineering"])
                };
                json!({
                    "id": format!("mock_contact_{i}"),
                    "first_name": first,
                    "last_name": last,
                    "title": title,
                    "email": format!("{first_lower}.{last_lower}@{domain}"),
                    "linkedin_url": format!("linkedin.com/in/{first_lower}{last_lower}"),
                    "seniority": if title.contains("VP") { "VP" } else { "Director" },
                    "departments": departments,
                })
            })
            .collect()
    }

    /// Google-Jobs-shaped payload with up to five data roles listed first.
    pub fn job_postings(&self, company_name: &str) -> Value {
        let seed = Seed::new(company_name);
        let data_roles = seed.range(8, 0, 5) as usize;
        let jobs_found = seed.range(12, 5, 20) as usize;

        let jobs: Vec<Value> = (0..jobs_found)
            .map(|i| {
                let title = if i < data_roles {
                    DATA_JOB_TITLES[i % DATA_JOB_TITLES.len()]
                } else {
                    OTHER_JOB_TITLES[i % OTHER_JOB_TITLES.len()]
                };
                json!({ "title": title, "company_name": company_name })
            })
            .collect();

        let tech_count = seed.range(16, 1, 3) as usize;
        let offset = seed.range(20, 0, TECHNOLOGIES.len() as u64 - 1) as usize;
        let tech_stack: Vec<&str> = (0..tech_count)
            .map(|i| TECHNOLOGIES[(offset + i) % TECHNOLOGIES.len()])
            .collect();

        json!({ "jobs_results": jobs, "tech_stack": tech_stack })
    }
}

fn company_payload(index: usize, template: &CompanyTemplate) -> Value {
    let seed = Seed::new(template.name);
    let employees = seed.range(0, 100, 2_000);
    let city = CITIES[seed.range(4, 0, CITIES.len() as u64 - 1) as usize];
    let founded_year = seed.range(8, 2010, 2020);
    let (stage, funding_min, funding_max) =
        FUNDING_STAGES[seed.range(12, 0, FUNDING_STAGES.len() as u64 - 1) as usize];
    let funding_total = seed.range(16, funding_min, funding_max);
    let phone = format!(
        "+1-{}-{}-{}",
        seed.range(20, 100, 999),
        seed.range(24, 100, 999),
        seed.range(28, 1_000, 9_999)
    );

    json!({
        "id": format!("mock_{index}"),
        "name": template.name,
        "domain": template.domain,
        "website_url": format!("https://{}", template.domain),
        "industry": template.industry,
        "primary_industry": template.industry,
        "estimated_num_employees": employees,
        "city": city,
        "country": "USA",
        "short_description": format!(
            "Leading {} company specializing in AI and data analytics solutions",
            template.industry
        ),
        "founded_year": founded_year,
        "phone": phone,
        "last_funding_type": stage,
        "funding_total": funding_total,
    })
}

/// SHA-256 digest used as a reproducible source of small integers.
struct Seed([u8; 32]);

impl Seed {
    fn new(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Value in `[lo, hi]` from the four bytes at `offset`.
    fn range(&self, offset: usize, lo: u64, hi: u64) -> u64 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.0[offset..offset + 4]);
        let n = u64::from(u32::from_be_bytes(word));
        lo + n % (hi - lo + 1)
    }
}

#[async_trait]
impl CompanySource for MockSource {
    fn name(&self) -> &str {
        SourceKind::Mock.as_str()
    }

    async fn fetch_companies(&self, _icp: &IcpSpec) -> Result<Vec<RawRecord>> {
        let records: Vec<RawRecord> = self
            .companies()
            .into_iter()
            .map(|payload| RawRecord::new(SourceKind::Mock, payload))
            .collect();
        info!(count = records.len(), "generated mock companies");
        Ok(records)
    }
}

#[async_trait]
impl ContactSource for MockSource {
    fn name(&self) -> &str {
        SourceKind::Mock.as_str()
    }

    async fn fetch_contacts(
        &self,
        company: &CompanyRecord,
        _icp: &IcpSpec,
        max_count: usize,
    ) -> Result<Vec<RawRecord>> {
        Ok(self
            .contacts(&company.domain, max_count)
            .into_iter()
            .map(|payload| RawRecord::new(SourceKind::Mock, payload))
            .collect())
    }
}

#[async_trait]
impl SignalSource for MockSource {
    fn name(&self) -> &str {
        SourceKind::Mock.as_str()
    }

    async fn fetch_signals(&self, company: &CompanyRecord, _icp: &IcpSpec) -> Result<RawRecord> {
        Ok(RawRecord::new(
            SourceKind::SerpApi,
            self.job_postings(&company.company_name),
        ))
    }
}
