//! External data collaborators: company search, hiring and funding signals,
//! and contacts.
//!
//! Collaborators return raw payloads tagged with their [`prospector_shared::SourceKind`]; mapping
//! them into the unified schema is the normalizer's job. Live collaborators
//! (Apollo, Crunchbase, SerpAPI) share a rate-limited [`HttpClient`]. The
//! deterministic [`MockSource`] implements every collaborator trait and serves
//! as the fallback whenever a live source is missing, empty, or failing.

mod apollo;
mod client;
mod crunchbase;
mod mock;
mod serpapi;

use std::sync::Arc;

use async_trait::async_trait;
use prospector_shared::{
    AppConfig, CompanyRecord, IcpSpec, RawRecord, Result, api_key_from_env,
};
use tracing::{info, warn};

pub use apollo::ApolloSource;
pub use client::{ApiKeyPlacement, ClientSettings, HttpClient};
pub use crunchbase::CrunchbaseSource;
pub use mock::MockSource;
pub use serpapi::{SerpApiSignals, jobs_query};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Searches for companies matching an ICP.
///
/// An empty result is not an error; the orchestrator falls back on it.
#[async_trait]
pub trait CompanySource: Send + Sync {
    /// Human-readable source name for tracing.
    fn name(&self) -> &str;

    async fn fetch_companies(&self, icp: &IcpSpec) -> Result<Vec<RawRecord>>;
}

/// Looks up buying signals (job postings) for one company.
#[async_trait]
pub trait SignalSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_signals(&self, company: &CompanyRecord, icp: &IcpSpec) -> Result<RawRecord>;
}

/// Looks up announced funding rounds for one company, most recent first.
///
/// An empty result means no rounds were found.
#[async_trait]
pub trait FundingSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_funding_rounds(&self, company: &CompanyRecord) -> Result<Vec<RawRecord>>;
}

/// Looks up people at one company.
#[async_trait]
pub trait ContactSource: Send + Sync {
    fn name(&self) -> &str;

    /// At most `max_count` person payloads.
    async fn fetch_contacts(
        &self,
        company: &CompanyRecord,
        icp: &IcpSpec,
        max_count: usize,
    ) -> Result<Vec<RawRecord>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// The collaborator set handed to a search run.
///
/// Primary company sources are queried in order. The fallback source stands in
/// for any primary that fails or returns nothing, and for the whole fetch
/// stage when no primary is configured.
pub struct SourceRegistry {
    primaries: Vec<Arc<dyn CompanySource>>,
    fallback: Arc<dyn CompanySource>,
    signals: Option<Arc<dyn SignalSource>>,
    funding: Option<Arc<dyn FundingSource>>,
    contacts: Option<Arc<dyn ContactSource>>,
    fallback_contacts: Arc<dyn ContactSource>,
}

impl SourceRegistry {
    pub fn new(
        fallback: Arc<dyn CompanySource>,
        fallback_contacts: Arc<dyn ContactSource>,
    ) -> Self {
        Self {
            primaries: Vec::new(),
            fallback,
            signals: None,
            funding: None,
            contacts: None,
            fallback_contacts,
        }
    }

    /// Synthetic data only: mock companies, mock signals, mock contacts.
    pub fn mock_only(mock: MockSource) -> Self {
        let mock = Arc::new(mock);
        Self::new(mock.clone(), mock.clone()).with_signals(mock)
    }

    pub fn with_primary(mut self, source: Arc<dyn CompanySource>) -> Self {
        self.primaries.push(source);
        self
    }

    pub fn with_signals(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.signals = Some(source);
        self
    }

    pub fn with_funding(mut self, source: Arc<dyn FundingSource>) -> Self {
        self.funding = Some(source);
        self
    }

    pub fn with_contacts(mut self, source: Arc<dyn ContactSource>) -> Self {
        self.contacts = Some(source);
        self
    }

    /// Build the collaborator set from configuration and the environment.
    ///
    /// A live source is enabled when its API key env var holds a real key.
    /// Without a job-postings key, mock signals are used only when no live
    /// company source is configured either.
    pub fn from_config(config: &AppConfig, mock_only: bool) -> Result<Self> {
        let sources = &config.sources;
        let mock = MockSource::with_limit(usize::try_from(sources.fetch_limit).unwrap_or(usize::MAX));

        if mock_only {
            info!("mock-only mode: live sources disabled");
            return Ok(Self::mock_only(mock));
        }

        let mock = Arc::new(mock);
        let mut registry = Self::new(mock.clone(), mock.clone());

        match api_key_from_env(&sources.apollo_api_key_env) {
            Some(key) => {
                let apollo = Arc::new(ApolloSource::new(&key, sources)?);
                registry = registry.with_primary(apollo.clone()).with_contacts(apollo);
                info!("Apollo source enabled");
            }
            None => warn!(env = %sources.apollo_api_key_env, "Apollo API key not provided"),
        }

        match api_key_from_env(&sources.crunchbase_api_key_env) {
            Some(key) => {
                let crunchbase = Arc::new(CrunchbaseSource::new(&key, sources)?);
                registry = registry.with_primary(crunchbase.clone()).with_funding(crunchbase);
                info!("Crunchbase source enabled");
            }
            None => warn!(env = %sources.crunchbase_api_key_env, "Crunchbase API key not provided"),
        }

        match api_key_from_env(&sources.serp_api_key_env) {
            Some(key) => {
                registry = registry.with_signals(Arc::new(SerpApiSignals::new(&key, sources)?));
                info!("SerpAPI signals enabled");
            }
            None if registry.primaries.is_empty() => {
                warn!("no live sources configured, using mock data throughout");
                registry = registry.with_signals(mock);
            }
            None => warn!(env = %sources.serp_api_key_env, "SerpAPI key not provided"),
        }

        Ok(registry)
    }

    pub fn primaries(&self) -> &[Arc<dyn CompanySource>] {
        &self.primaries
    }

    pub fn fallback(&self) -> &dyn CompanySource {
        self.fallback.as_ref()
    }

    pub fn signals(&self) -> Option<&dyn SignalSource> {
        self.signals.as_deref()
    }

    pub fn funding(&self) -> Option<&dyn FundingSource> {
        self.funding.as_deref()
    }

    pub fn contacts(&self) -> Option<&dyn ContactSource> {
        self.contacts.as_deref()
    }

    pub fn fallback_contacts(&self) -> &dyn ContactSource {
        self.fallback_contacts.as_ref()
    }

    /// Names of the configured primaries, for run summaries.
    pub fn primary_names(&self) -> Vec<String> {
        self.primaries.iter().map(|s| s.name().to_string()).collect()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::mock_only(MockSource::new())
    }
}
