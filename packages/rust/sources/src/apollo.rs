//! Apollo.io: organization search and people search.

use async_trait::async_trait;
use prospector_shared::{
    CompanyRecord, IcpSpec, RawRecord, Result, SourceKind, SourcesConfig,
};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::client::{ApiKeyPlacement, ClientSettings, HttpClient};
use crate::{CompanySource, ContactSource};

pub const DEFAULT_BASE_URL: &str = "https://api.apollo.io/v1";
const CALLS_PER_MINUTE: u32 = 30;
/// Apollo caps `per_page` at 25.
const MAX_PER_PAGE: u32 = 25;

pub struct ApolloSource {
    client: HttpClient,
    fetch_limit: u32,
}

impl ApolloSource {
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
            SourceKind::Apollo.as_str(),
            base_url,
            api_key,
            ApiKeyPlacement::Header("X-Api-Key"),
            settings,
        )?;
        Ok(Self {
            client,
            fetch_limit,
        })
    }

    fn organization_query(&self, icp: &IcpSpec) -> Value {
        let criteria = &icp.icp;
        let mut tags: Vec<&str> = criteria.industry.iter().map(String::as_str).collect();
        tags.extend(criteria.keywords.iter().map(String::as_str));

        let mut body = json!({
            "page": 1,
            "per_page": self.fetch_limit.clamp(1, MAX_PER_PAGE),
        });
        if !tags.is_empty() {
            body["q_organization_keyword_tags"] = json!(tags);
        }
        if !criteria.geography.is_empty() {
            body["organization_locations"] = json!(criteria.geography);
        }
        if criteria.employee_count_min > 0 || criteria.employee_count_max < u64::MAX {
            let max = if criteria.employee_count_max == u64::MAX {
                String::new()
            } else {
                criteria.employee_count_max.to_string()
            };
            body["organization_num_employees_ranges"] =
                json!([format!("{},{max}", criteria.employee_count_min)]);
        }
        body
    }
}

#[async_trait]
impl CompanySource for ApolloSource {
    fn name(&self) -> &str {
        self.client.name()
    }

    #[instrument(skip_all, fields(source = "Apollo"))]
    async fn fetch_companies(&self, icp: &IcpSpec) -> Result<Vec<RawRecord>> {
        let response = self
            .client
            .post_json("mixed_companies/search", &self.organization_query(icp))
            .await?;

        let organizations = records_at(&response, "organizations", SourceKind::Apollo);
        if organizations.is_empty() {
            // Free-tier keys get an empty list here
            warn!("Apollo returned no organizations");
        } else {
            info!(count = organizations.len(), "Apollo organizations fetched");
        }
        Ok(organizations)
    }
}

#[async_trait]
impl ContactSource for ApolloSource {
    fn name(&self) -> &str {
        self.client.name()
    }

    #[instrument(skip_all, fields(source = "Apollo", company = %company.log_key()))]
    async fn fetch_contacts(
        &self,
        company: &CompanyRecord,
        icp: &IcpSpec,
        max_count: usize,
    ) -> Result<Vec<RawRecord>> {
        let per_page = u32::try_from(max_count).unwrap_or(MAX_PER_PAGE).clamp(1, MAX_PER_PAGE);
        let mut body = json!({ "page": 1, "per_page": per_page });
        if !icp.signals.job_titles_to_search.is_empty() {
            body["person_titles"] = json!(icp.signals.job_titles_to_search);
        }
        if !company.domain.is_empty() {
            body["q_organization_domains"] = json!(company.domain);
        }

        let response = self.client.post_json("mixed_people/search", &body).await?;
        let mut people = records_at(&response, "people", SourceKind::Apollo);
        people.truncate(max_count);
        Ok(people)
    }
}

/// Wrap each element of the array at `key` as a raw record.
pub(crate) fn records_at(response: &Value, key: &str, kind: SourceKind) -> Vec<RawRecord> {
    response
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| RawRecord::new(kind, item.clone()))
                .collect()
        })
        .unwrap_or_default()
}
