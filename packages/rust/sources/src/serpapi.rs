//! SerpAPI Google Jobs search, used as a hiring-signal collaborator.

use async_trait::async_trait;
use prospector_shared::{CompanyRecord, IcpSpec, RawRecord, Result, SourceKind, SourcesConfig};
use tracing::{debug, instrument};

use crate::SignalSource;
use crate::client::{ApiKeyPlacement, ClientSettings, HttpClient};

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";
const CALLS_PER_MINUTE: u32 = 20;
const DEFAULT_LOCATION: &str = "United States";
/// Results requested per query.
const RESULTS_PER_QUERY: u32 = 10;

pub struct SerpApiSignals {
    client: HttpClient,
}

impl SerpApiSignals {
    pub fn new(api_key: &str, config: &SourcesConfig) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, config)
    }

    pub fn with_base_url(base_url: &str, api_key: &str, config: &SourcesConfig) -> Result<Self> {
        Self::with_settings(
            base_url,
            api_key,
            ClientSettings::from_config(config, CALLS_PER_MINUTE),
        )
    }

    pub(crate) fn with_settings(
        base_url: &str,
        api_key: &str,
        settings: ClientSettings,
    ) -> Result<Self> {
        let client = HttpClient::new(
            SourceKind::SerpApi.as_str(),
            base_url,
            api_key,
            ApiKeyPlacement::Query("api_key"),
            settings,
        )?;
        Ok(Self { client })
    }
}

/// `<company> <title1> OR <title2> ...`
pub fn jobs_query(company_name: &str, titles: &[String]) -> String {
    if titles.is_empty() {
        company_name.to_string()
    } else {
        format!("{company_name} {}", titles.join(" OR "))
    }
}

#[async_trait]
impl SignalSource for SerpApiSignals {
    fn name(&self) -> &str {
        self.client.name()
    }

    #[instrument(skip_all, fields(source = "SerpAPI", company = %company.log_key()))]
    async fn fetch_signals(&self, company: &CompanyRecord, icp: &IcpSpec) -> Result<RawRecord> {
        let query = jobs_query(&company.company_name, &icp.signals.job_titles_to_search);
        let location = icp
            .icp
            .geography
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        debug!(%query, "searching job postings");
        let response = self
            .client
            .get_json(
                "search",
                &[
                    ("engine", "google_jobs".to_string()),
                    ("q", query),
                    ("location", location),
                    ("num", RESULTS_PER_QUERY.to_string()),
                ],
            )
            .await?;

        Ok(RawRecord::new(SourceKind::SerpApi, response))
    }
}
