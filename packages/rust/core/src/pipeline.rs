//! End-to-end search: fetch → merge → dedupe → enrich → score → filter → rank.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use prospector_normalize::{BucketTables, Normalizer};
use prospector_shared::{
    AppConfig, CompanyRecord, ContactRecord, IcpSpec, Prospect, RawRecord, Result, SearchRunId,
    Signals,
};
use prospector_sources::{CompanySource, SourceRegistry};

use crate::dedupe::{
    DEFAULT_COMPANY_THRESHOLD, DEFAULT_CONTACT_THRESHOLD, dedupe_companies, dedupe_contacts,
};
use crate::merge::{MergeKey, merge_companies};
use crate::scoring::score_breakdown;

/// Stage a search run is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Fetching,
    Merging,
    Deduping,
    Enriching,
    Scoring,
    Filtering,
    Ranking,
    Done,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "Idle",
            Self::Fetching => "Fetching companies",
            Self::Merging => "Merging records",
            Self::Deduping => "Removing duplicates",
            Self::Enriching => "Enriching with signals and contacts",
            Self::Scoring => "Scoring against ICP",
            Self::Filtering => "Filtering by confidence",
            Self::Ranking => "Ranking",
            Self::Done => "Done",
        };
        f.write_str(label)
    }
}

/// Per-stage record counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Non-empty company records after normalization.
    pub fetched: usize,
    pub merged: usize,
    pub unique: usize,
    pub below_threshold: usize,
    pub returned: usize,
}

/// Result of [`SearchPipeline::search`].
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub run_id: SearchRunId,
    /// Ranked, best first.
    pub prospects: Vec<Prospect>,
    pub stats: PipelineStats,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new stage.
    fn state(&self, state: PipelineState);
    /// Called after each company's signals and contacts are in.
    fn company_enriched(&self, company: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, outcome: &SearchOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn state(&self, _state: PipelineState) {}
    fn company_enriched(&self, _company: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &SearchOutcome) {}
}

struct Enriched {
    company: CompanyRecord,
    contacts: Vec<ContactRecord>,
    signals: Signals,
}

/// Owns the collaborators and thresholds for search runs.
pub struct SearchPipeline {
    registry: SourceRegistry,
    normalizer: Normalizer,
    company_threshold: f64,
    contact_threshold: f64,
}

impl SearchPipeline {
    pub fn new(registry: SourceRegistry, normalizer: Normalizer) -> Self {
        Self {
            registry,
            normalizer,
            company_threshold: DEFAULT_COMPANY_THRESHOLD,
            contact_threshold: DEFAULT_CONTACT_THRESHOLD,
        }
    }

    pub fn with_thresholds(mut self, company: f64, contact: f64) -> Self {
        self.company_threshold = company;
        self.contact_threshold = contact;
        self
    }

    /// Collaborators from the environment, buckets and thresholds from `config`.
    pub fn from_config(config: &AppConfig, mock_only: bool) -> Result<Self> {
        let registry = SourceRegistry::from_config(config, mock_only)?;
        let normalizer = Normalizer::new(BucketTables::with_overrides(&config.buckets));
        Ok(Self::new(registry, normalizer).with_thresholds(
            config.dedupe.company_threshold,
            config.dedupe.contact_threshold,
        ))
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Run one search against `icp`.
    ///
    /// Only an invalid ICP is an error. Source and enrichment failures are
    /// logged and degrade to fallback data or fewer results.
    #[instrument(skip_all, fields(primaries = self.registry.primaries().len()))]
    pub async fn search(
        &self,
        icp: &IcpSpec,
        progress: &dyn ProgressReporter,
    ) -> Result<SearchOutcome> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = SearchRunId::new();
        let mut stats = PipelineStats::default();

        progress.state(PipelineState::Idle);
        icp.validate()?;
        info!(%run_id, "starting prospect search");

        // --- Fetch ---
        progress.state(PipelineState::Fetching);
        let companies: Vec<CompanyRecord> = self
            .fetch_all(icp)
            .await
            .iter()
            .map(|raw| self.normalizer.company(raw))
            .filter(|c| !c.is_empty())
            .collect();
        stats.fetched = companies.len();
        info!(count = stats.fetched, "fetched companies from all sources");

        // --- Merge ---
        progress.state(PipelineState::Merging);
        let merged = merge_companies(companies, MergeKey::DomainOrName);
        stats.merged = merged.len();

        // --- Dedupe ---
        progress.state(PipelineState::Deduping);
        let unique = dedupe_companies(merged, self.company_threshold);
        stats.unique = unique.len();
        info!(merged = stats.merged, unique = stats.unique, "merged and deduplicated");

        // --- Enrich ---
        progress.state(PipelineState::Enriching);
        let total = unique.len();
        let mut enriched = Vec::with_capacity(total);
        for (i, company) in unique.into_iter().enumerate() {
            let signals = self.signals_for(&company, icp).await;
            let contacts = if icp.search_params.include_contacts {
                self.contacts_for(&company, icp).await
            } else {
                Vec::new()
            };
            progress.company_enriched(&company.company_name, i + 1, total);
            enriched.push(Enriched {
                company,
                contacts,
                signals,
            });
        }

        // --- Score ---
        progress.state(PipelineState::Scoring);
        let scored: Vec<Prospect> = enriched
            .into_iter()
            .map(|e| {
                let breakdown = score_breakdown(&e.company, &e.contacts, &e.signals, icp);
                debug!(company = %e.company.log_key(), ?breakdown, "scored");
                Prospect::from_company(e.company, e.contacts, e.signals, breakdown.total)
            })
            .collect();

        // --- Filter ---
        progress.state(PipelineState::Filtering);
        let min = icp.search_params.min_confidence_score;
        let before = scored.len();
        let passing = filter_by_confidence(scored, min);
        stats.below_threshold = before - passing.len();

        // --- Rank ---
        progress.state(PipelineState::Ranking);
        let prospects = rank_and_limit(passing, icp.search_params.max_results);
        stats.returned = prospects.len();

        let outcome = SearchOutcome {
            run_id,
            prospects,
            stats,
            started_at,
            elapsed: start.elapsed(),
        };

        progress.state(PipelineState::Done);
        progress.done(&outcome);

        info!(
            run_id = %outcome.run_id,
            fetched = stats.fetched,
            unique = stats.unique,
            below_threshold = stats.below_threshold,
            returned = stats.returned,
            elapsed_ms = outcome.elapsed.as_millis(),
            "search complete"
        );

        Ok(outcome)
    }

    /// Query every primary in order. The fallback stands in, at most once per
    /// run, for primaries that fail or come back empty.
    async fn fetch_all(&self, icp: &IcpSpec) -> Vec<RawRecord> {
        if self.registry.primaries().is_empty() {
            info!("no primary sources configured, using fallback");
            return fetch_from(self.registry.fallback(), icp).await;
        }

        let mut raw = Vec::new();
        let mut fallback_used = false;

        for source in self.registry.primaries() {
            let records = fetch_from(source.as_ref(), icp).await;
            if records.is_empty() {
                if fallback_used {
                    continue;
                }
                warn!(source = source.name(), "no results, using fallback data");
                raw.extend(fetch_from(self.registry.fallback(), icp).await);
                fallback_used = true;
            } else {
                raw.extend(records);
            }
        }
        raw
    }

    async fn signals_for(&self, company: &CompanyRecord, icp: &IcpSpec) -> Signals {
        let mut signals = Signals::seeded_from(company);
        if company.company_name.trim().is_empty() {
            return signals;
        }

        if let Some(source) = self.registry.signals() {
            match source.fetch_signals(company, icp).await {
                Ok(raw) => signals.apply_hiring(self.normalizer.hiring(&raw)),
                Err(e) => warn!(
                    source = source.name(),
                    company = %company.log_key(),
                    error = %e,
                    "failed to fetch hiring signals"
                ),
            }
        }

        // Rounds are looked up only when funding is scored and not already known.
        if icp.signals.funding && !signals.new_funding {
            if let Some(source) = self.registry.funding() {
                match source.fetch_funding_rounds(company).await {
                    Ok(raw) => signals.apply_funding(&self.normalizer.funding_rounds(&raw)),
                    Err(e) => warn!(
                        source = source.name(),
                        company = %company.log_key(),
                        error = %e,
                        "failed to fetch funding rounds"
                    ),
                }
            }
        }
        signals
    }

    async fn contacts_for(&self, company: &CompanyRecord, icp: &IcpSpec) -> Vec<ContactRecord> {
        let max = icp.search_params.max_contacts_per_company;

        let mut raw = Vec::new();
        if let Some(source) = self.registry.contacts() {
            match source.fetch_contacts(company, icp, max).await {
                Ok(found) => raw = found,
                Err(e) => warn!(
                    source = source.name(),
                    company = %company.log_key(),
                    error = %e,
                    "failed to fetch contacts"
                ),
            }
        }

        if raw.is_empty() {
            let fallback = self.registry.fallback_contacts();
            debug!(company = %company.log_key(), "using fallback contacts");
            raw = fallback
                .fetch_contacts(company, icp, max)
                .await
                .unwrap_or_else(|e| {
                    warn!(source = fallback.name(), error = %e, "fallback contacts failed");
                    Vec::new()
                });
        }

        let contacts: Vec<ContactRecord> = raw
            .iter()
            .map(|r| self.normalizer.contact(r))
            .filter(ContactRecord::is_retainable)
            .collect();
        let mut contacts = dedupe_contacts(contacts, self.contact_threshold);
        contacts.truncate(max);
        contacts
    }
}

async fn fetch_from(source: &dyn CompanySource, icp: &IcpSpec) -> Vec<RawRecord> {
    match source.fetch_companies(icp).await {
        Ok(records) => {
            debug!(source = source.name(), count = records.len(), "source returned");
            records
        }
        Err(e) => {
            warn!(source = source.name(), error = %e, "source failed");
            Vec::new()
        }
    }
}

/// Keep prospects with `confidence >= min`, order preserved.
pub fn filter_by_confidence(prospects: Vec<Prospect>, min: f64) -> Vec<Prospect> {
    prospects
        .into_iter()
        .filter(|p| {
            let keep = p.confidence >= min;
            if !keep {
                debug!(company = %p.company_name, confidence = p.confidence, min, "below threshold");
            }
            keep
        })
        .collect()
}

/// Stable sort by confidence, best first, then keep the top `max_results`.
pub fn rank_and_limit(mut prospects: Vec<Prospect>, max_results: usize) -> Vec<Prospect> {
    prospects.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    prospects.truncate(max_results);
    prospects
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use prospector_shared::{ProspectorError, SourceKind};
    use prospector_sources::{ContactSource, FundingSource, MockSource, SignalSource};
    use serde_json::{Value, json};

    use super::*;

    // -----------------------------------------------------------------------
    // Fakes
    // -----------------------------------------------------------------------

    struct StaticSource {
        name: &'static str,
        records: Vec<RawRecord>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(name: &'static str, kind: SourceKind, payloads: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                name,
                records: payloads.into_iter().map(|p| RawRecord::new(kind, p)).collect(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompanySource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_companies(&self, _icp: &IcpSpec) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    #[async_trait]
    impl ContactSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_contacts(
            &self,
            _company: &CompanyRecord,
            _icp: &IcpSpec,
            _max_count: usize,
        ) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    #[async_trait]
    impl FundingSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_funding_rounds(&self, _company: &CompanyRecord) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CompanySource for FailingSource {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn fetch_companies(&self, _icp: &IcpSpec) -> Result<Vec<RawRecord>> {
            Err(ProspectorError::source("Failing", "HTTP 500"))
        }
    }

    #[async_trait]
    impl ContactSource for FailingSource {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn fetch_contacts(
            &self,
            _company: &CompanyRecord,
            _icp: &IcpSpec,
            _max_count: usize,
        ) -> Result<Vec<RawRecord>> {
            Err(ProspectorError::source("Failing", "HTTP 429"))
        }
    }

    #[async_trait]
    impl SignalSource for FailingSource {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn fetch_signals(&self, _company: &CompanyRecord, _icp: &IcpSpec) -> Result<RawRecord> {
            Err(ProspectorError::source("Failing", "timeout"))
        }
    }

    #[async_trait]
    impl FundingSource for FailingSource {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn fetch_funding_rounds(&self, _company: &CompanyRecord) -> Result<Vec<RawRecord>> {
            Err(ProspectorError::source("Failing", "HTTP 503"))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        states: Mutex<Vec<PipelineState>>,
        enriched: AtomicUsize,
    }

    impl ProgressReporter for RecordingProgress {
        fn state(&self, state: PipelineState) {
            self.states.lock().unwrap().push(state);
        }
        fn company_enriched(&self, _company: &str, _current: usize, _total: usize) {
            self.enriched.fetch_add(1, Ordering::SeqCst);
        }
        fn done(&self, _outcome: &SearchOutcome) {}
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn open_icp() -> IcpSpec {
        IcpSpec::from_json(
            r#"{"icp": {}, "search_params": {"min_confidence_score": 0.0, "include_contacts": false}}"#,
        )
        .unwrap()
    }

    fn apollo_org(name: &str, domain: &str) -> Value {
        json!({ "name": name, "domain": domain, "industry": "FinTech" })
    }

    fn empty_fallback() -> Arc<StaticSource> {
        StaticSource::new("Fallback", SourceKind::Mock, vec![])
    }

    fn pipeline(registry: SourceRegistry) -> SearchPipeline {
        SearchPipeline::new(registry, Normalizer::default())
    }

    fn prospect(name: &str, confidence: f64) -> Prospect {
        let company = CompanyRecord {
            company_name: name.into(),
            ..Default::default()
        };
        Prospect::from_company(company, vec![], Signals::default(), confidence)
    }

    fn names(prospects: &[Prospect]) -> Vec<&str> {
        prospects.iter().map(|p| p.company_name.as_str()).collect()
    }

    // -----------------------------------------------------------------------
    // Ranking and filtering
    // -----------------------------------------------------------------------

    #[test]
    fn ties_keep_fetch_order() {
        let ranked = rank_and_limit(
            vec![prospect("B", 0.95), prospect("C", 0.80), prospect("A", 0.80)],
            10,
        );
        assert_eq!(names(&ranked), vec!["B", "C", "A"]);

        let reordered = rank_and_limit(
            vec![prospect("C", 0.80), prospect("A", 0.80), prospect("B", 0.95)],
            10,
        );
        assert_eq!(names(&reordered), vec!["B", "C", "A"]);
    }

    #[test]
    fn truncation_happens_after_sorting() {
        let ranked = rank_and_limit(
            vec![prospect("low", 0.1), prospect("high", 0.9), prospect("mid", 0.5)],
            2,
        );
        assert_eq!(names(&ranked), vec!["high", "mid"]);
    }

    #[test]
    fn threshold_is_inclusive() {
        let kept = filter_by_confidence(vec![prospect("x", 0.85), prospect("y", 0.90)], 0.9);
        assert_eq!(names(&kept), vec!["y"]);
    }

    // -----------------------------------------------------------------------
    // Orchestration
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failing_primary_falls_back_to_mock_data() {
        let mock = Arc::new(MockSource::new());
        let registry = SourceRegistry::new(mock.clone(), mock).with_primary(Arc::new(FailingSource));

        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(outcome.stats.fetched, 10);
        assert!(!outcome.prospects.is_empty());
        assert!(outcome.prospects.iter().all(|p| p.sources == vec!["Mock"]));
    }

    #[tokio::test]
    async fn empty_primaries_use_fallback_once() {
        let fallback = StaticSource::new("Fallback", SourceKind::Mock, vec![apollo_org("Acme", "acme.io")]);
        let registry = SourceRegistry::new(fallback.clone(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new("A", SourceKind::Apollo, vec![]))
            .with_primary(StaticSource::new("B", SourceKind::Crunchbase, vec![]));

        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(fallback.calls(), 1);
        assert_eq!(names(&outcome.prospects), vec!["Acme"]);
    }

    #[tokio::test]
    async fn records_from_two_sources_merge_on_domain() {
        let apollo = StaticSource::new(
            "Apollo",
            SourceKind::Apollo,
            vec![json!({ "name": "Acme", "website_url": "https://www.acme.io" })],
        );
        let crunchbase = StaticSource::new(
            "Crunchbase",
            SourceKind::Crunchbase,
            vec![json!({
                "name": { "value": "Acme Inc" },
                "website": { "value": "acme.io" },
                "revenue_range": { "value": "r_00100000" },
            })],
        );
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(apollo)
            .with_primary(crunchbase);

        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(outcome.stats.fetched, 2);
        assert_eq!(outcome.stats.merged, 1);
        let acme = &outcome.prospects[0];
        assert_eq!(acme.company_name, "Acme");
        assert_eq!(acme.revenue, Some(50_000_000));
        assert_eq!(acme.sources, vec!["Apollo", "Crunchbase"]);
    }

    #[tokio::test]
    async fn invalid_icp_fails_before_fetching() {
        let primary = StaticSource::new("A", SourceKind::Apollo, vec![apollo_org("Acme", "acme.io")]);
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(primary.clone());

        let mut icp = open_icp();
        icp.icp.revenue_min = 10;
        icp.icp.revenue_max = 1;

        let err = pipeline(registry).search(&icp, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, ProspectorError::Config { .. }));
        assert_eq!(primary.calls(), 0);
    }

    #[tokio::test]
    async fn min_confidence_and_max_results_shape_output() {
        let payloads = ["Acme", "Globex", "Initech", "Umbrella", "Hooli"]
            .iter()
            .map(|name| apollo_org(name, &format!("{}.io", name.to_lowercase())))
            .collect();
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new("A", SourceKind::Apollo, payloads));

        let mut icp = open_icp();
        icp.search_params.max_results = 3;
        let outcome = pipeline(registry).search(&icp, &SilentProgress).await.unwrap();
        assert_eq!(outcome.stats.unique, 5);
        assert_eq!(outcome.stats.returned, 3);
        assert_eq!(names(&outcome.prospects), vec!["Acme", "Globex", "Initech"]);

        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ));
        let mut strict = open_icp();
        strict.search_params.min_confidence_score = 0.99;
        let outcome = pipeline(registry).search(&strict, &SilentProgress).await.unwrap();
        assert!(outcome.prospects.is_empty());
        assert_eq!(outcome.stats.below_threshold, 1);
    }

    #[tokio::test]
    async fn contacts_fall_back_and_respect_limits() {
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ))
            .with_contacts(Arc::new(FailingSource));

        let mut icp = open_icp();
        icp.search_params.include_contacts = true;
        icp.search_params.max_contacts_per_company = 2;

        let outcome = pipeline(registry).search(&icp, &SilentProgress).await.unwrap();
        let contacts = &outcome.prospects[0].contacts;
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].email.as_deref(), Some("sarah.johnson@acme.io"));
    }

    #[tokio::test]
    async fn duplicate_and_unusable_contacts_are_dropped() {
        let people = StaticSource::new(
            "People",
            SourceKind::Apollo,
            vec![
                json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada@acme.io" }),
                json!({ "first_name": "Ada", "last_name": "L.", "email": "ADA@acme.io" }),
                json!({ "title": "Ghost" }),
                json!({ "first_name": "Grace", "last_name": "Hopper" }),
            ],
        );
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ))
            .with_contacts(people);

        let mut icp = open_icp();
        icp.search_params.include_contacts = true;
        icp.search_params.max_contacts_per_company = 5;

        let outcome = pipeline(registry).search(&icp, &SilentProgress).await.unwrap();
        let contact_names: Vec<&str> = outcome.prospects[0]
            .contacts
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(contact_names, vec!["Ada Lovelace", "Grace Hopper"]);
    }

    #[tokio::test]
    async fn contacts_skipped_when_not_requested() {
        let people = StaticSource::new("People", SourceKind::Apollo, vec![]);
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ))
            .with_contacts(people.clone());

        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(people.calls(), 0);
        assert!(outcome.prospects[0].contacts.is_empty());
    }

    #[tokio::test]
    async fn signal_failures_keep_seeded_funding() {
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Mock,
                vec![json!({
                    "name": "Acme",
                    "domain": "acme.io",
                    "last_funding_type": "Series A",
                })],
            ))
            .with_signals(Arc::new(FailingSource));

        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        let signals = &outcome.prospects[0].signals;
        assert!(signals.new_funding);
        assert_eq!(signals.funding_stage.as_deref(), Some("Series A"));
        assert!(!signals.recent_hiring);
    }

    fn funding_icp() -> IcpSpec {
        IcpSpec::from_json(
            r#"{"icp": {}, "signals": {"funding": true},
                "search_params": {"min_confidence_score": 0.0, "include_contacts": false}}"#,
        )
        .unwrap()
    }

    fn funding_rounds() -> Arc<StaticSource> {
        StaticSource::new(
            "Rounds",
            SourceKind::Crunchbase,
            vec![
                json!({ "investment_type": "series_b", "announced_on": "2024-03-12" }),
                json!({ "investment_type": "series_a", "announced_on": "2022-01-05" }),
            ],
        )
    }

    #[tokio::test]
    async fn funding_rounds_fill_missing_funding_signal() {
        let rounds = funding_rounds();
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ))
            .with_funding(rounds.clone());

        let outcome = pipeline(registry).search(&funding_icp(), &SilentProgress).await.unwrap();
        let signals = &outcome.prospects[0].signals;
        assert_eq!(rounds.calls(), 1);
        assert!(signals.new_funding);
        assert_eq!(signals.funding_stage.as_deref(), Some("series_b"));
    }

    #[tokio::test]
    async fn funding_rounds_skipped_when_known_or_unscored() {
        let rounds = funding_rounds();
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Mock,
                vec![json!({
                    "name": "Acme",
                    "domain": "acme.io",
                    "last_funding_type": "Seed",
                })],
            ))
            .with_funding(rounds.clone());
        let pipeline = pipeline(registry);

        let outcome = pipeline.search(&funding_icp(), &SilentProgress).await.unwrap();
        assert_eq!(outcome.prospects[0].signals.funding_stage.as_deref(), Some("Seed"));

        pipeline.search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(rounds.calls(), 0);
    }

    #[tokio::test]
    async fn funding_round_failures_leave_signal_unset() {
        let registry = SourceRegistry::new(empty_fallback(), Arc::new(MockSource::new()))
            .with_primary(StaticSource::new(
                "A",
                SourceKind::Apollo,
                vec![apollo_org("Acme", "acme.io")],
            ))
            .with_funding(Arc::new(FailingSource));

        let outcome = pipeline(registry).search(&funding_icp(), &SilentProgress).await.unwrap();
        assert_eq!(outcome.prospects.len(), 1);
        assert!(!outcome.prospects[0].signals.new_funding);
    }

    #[tokio::test]
    async fn mock_signals_drive_hiring_fields() {
        let registry = SourceRegistry::mock_only(MockSource::with_limit(3));
        let outcome = pipeline(registry).search(&open_icp(), &SilentProgress).await.unwrap();
        assert_eq!(outcome.stats.fetched, 3);
        for p in &outcome.prospects {
            assert_eq!(p.signals.recent_hiring, p.signals.data_roles_count > 0);
        }
    }

    #[tokio::test]
    async fn states_are_reported_in_order() {
        let progress = RecordingProgress::default();
        let registry = SourceRegistry::mock_only(MockSource::with_limit(2));
        pipeline(registry).search(&open_icp(), &progress).await.unwrap();

        let states = progress.states.lock().unwrap().clone();
        assert_eq!(
            states,
            vec![
                PipelineState::Idle,
                PipelineState::Fetching,
                PipelineState::Merging,
                PipelineState::Deduping,
                PipelineState::Enriching,
                PipelineState::Scoring,
                PipelineState::Filtering,
                PipelineState::Ranking,
                PipelineState::Done,
            ]
        );
        assert_eq!(progress.enriched.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_mock_runs_are_identical() {
        let icp = open_icp();
        let first = pipeline(SourceRegistry::default()).search(&icp, &SilentProgress).await.unwrap();
        let second = pipeline(SourceRegistry::default()).search(&icp, &SilentProgress).await.unwrap();
        assert_eq!(first.prospects, second.prospects);
        assert_ne!(first.run_id, second.run_id);
    }
}
