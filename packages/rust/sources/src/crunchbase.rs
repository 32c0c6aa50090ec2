//! Crunchbase organization search and funding-round lookup.

use async_trait::async_trait;
use prospector_shared::{CompanyRecord, IcpSpec, RawRecord, Result, SourceKind, SourcesConfig};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::{CompanySource, FundingSource};
use crate::client::{ApiKeyPlacement, ClientSettings, HttpClient};

pub const DEFAULT_BASE_URL: &str = "https://api.crunchbase.com/api/v4";
const CALLS_PER_MINUTE: u32 = 20;
const MAX_LIMIT: u32 = 100;
const FUNDING_ROUNDS_LIMIT: u32 = 10;

const FIELD_IDS: &[&str] = &[
    "identifier",
    "name",
    "short_description",
    "website",
    "revenue_range",
    "num_employees_enum",
    "categories",
    "location_identifiers",
    "funding_total",
    "last_funding_type",
    "founded_on",
    "ipo_status",
];

const FUNDING_ROUND_FIELD_IDS: &[&str] = &[
    "identifier",
    "announced_on",
    "investment_type",
    "money_raised",
    "organization_identifier",
    "investor_identifiers",
];

pub struct CrunchbaseSource {
    client: HttpClient,
    fetch_limit: u32,
}

impl CrunchbaseSource {
    pub fn new(api_key: &str, config: &SourcesConfig) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, config)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, config: &SourcesConfig) -> Result<Self> {
        let settings = ClientSettings::from_config(config, CALLS_PER_MINUTE);
        Self::with_settings(base_url, api_key, config.fetch_limit, settings)
    }

    pub(crate) fn with_settings(
        base_url: &str,
        api_key: &str,
        fetch_limit: u32,
        settings: ClientSettings,
    ) -> Result<Self> {
        let client = HttpClient::new(
            SourceKind::Crunchbase.as_str(),
            base_url,
            api_key,
            ApiKeyPlacement::Header("X-cb-user-key"),
            settings,
        )?;
        Ok(Self {
            client,
            fetch_limit,
        })
    }

    fn search_body(&self, icp: &IcpSpec) -> Value {
        let mut predicates = Vec::new();
        if !icp.icp.industry.is_empty() {
            predicates.push(predicate("categories", &icp.icp.industry));
        }
        if !icp.icp.geography.is_empty() {
            predicates.push(predicate("location_identifiers", &icp.icp.geography));
        }

        let mut body = json!({
            "field_ids": FIELD_IDS,
            "limit": self.fetch_limit.clamp(1, MAX_LIMIT),
            "order": [{ "field_id": "rank_org", "sort": "asc" }],
        });
        if !predicates.is_empty() {
            body["query"] = Value::Array(predicates);
        }
        body
    }
}

fn funding_rounds_body(organization: &str) -> Value {
    json!({
        "field_ids": FUNDING_ROUND_FIELD_IDS,
        "limit": FUNDING_ROUNDS_LIMIT,
        "order": [{ "field_id": "announced_on", "sort": "desc" }],
        "query": [predicate("organization_identifier", &[organization.to_string()])],
    })
}

/// `properties` of every entity in a search response.
fn entity_properties(response: &Value) -> Vec<RawRecord> {
    response
        .get("entities")
        .and_then(Value::as_array)
        .map(|entities| {
            entities
                .iter()
                .filter_map(|entity| entity.get("properties"))
                .map(|props| RawRecord::new(SourceKind::Crunchbase, props.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn predicate(field_id: &str, values: &[String]) -> Value {
    json!({
        "type": "predicate",
        "field_id": field_id,
        "operator_id": "includes",
        "values": values,
    })
}

#[async_trait]
impl CompanySource for CrunchbaseSource {
    fn name(&self) -> &str {
        self.client.name()
    }

    #[instrument(skip_all, fields(source = "Crunchbase"))]
    async fn fetch_companies(&self, icp: &IcpSpec) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .post_json("searches/organizations", &self.search_body(icp))
            .await?;

        let records = entity_properties(&response);
        info!(count = records.len(), "Crunchbase organizations fetched");
        Ok(records)
    }
}

#[async_trait]
impl FundingSource for CrunchbaseSource {
    fn name(&self) -> &str {
        self.client.name()
    }

    #[instrument(skip_all, fields(source = "Crunchbase", company = %company.log_key()))]
    async fn fetch_funding_rounds(&self, company: &CompanyRecord) -> Result<Vec<RawRecord>> {
        let name = company.company_name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post_json("searches/funding_rounds", &funding_rounds_body(name))
            .await?;

        let rounds = entity_properties(&response);
        debug!(count = rounds.len(), "Crunchbase funding rounds fetched");
        Ok(rounds)
    }
}
