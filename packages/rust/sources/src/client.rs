//! Rate-limited JSON HTTP client shared by the live collaborators.

use std::time::{Duration, Instant};

use prospector_shared::{ProspectorError, Result, SourcesConfig};
use reqwest::{Client, Method};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// User-Agent string for source requests.
const USER_AGENT: &str = concat!("Prospector/", env!("CARGO_PKG_VERSION"));

/// Where the API key travels on each request.
#[derive(Debug, Clone)]
pub enum ApiKeyPlacement {
    Header(&'static str),
    Query(&'static str),
}

/// Timeout, retry, and pacing settings for one client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    /// Attempts per request, including the first.
    pub max_attempts: u32,
    /// Base delay; attempt `n` waits `retry_delay * n` before the next try.
    pub retry_delay: Duration,
    /// Zero disables pacing.
    pub calls_per_minute: u32,
}

impl ClientSettings {
    pub fn from_config(config: &SourcesConfig, calls_per_minute: u32) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            calls_per_minute,
        }
    }

    fn min_interval(&self) -> Duration {
        if self.calls_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / self.calls_per_minute
        }
    }
}

/// A JSON API client bound to one base URL and one API key.
pub struct HttpClient {
    name: &'static str,
    client: Client,
    base_url: String,
    api_key: String,
    key_placement: ApiKeyPlacement,
    settings: ClientSettings,
    last_call: Mutex<Option<Instant>>,
}

impl HttpClient {
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        key_placement: ApiKeyPlacement,
        settings: ClientSettings,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProspectorError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            key_placement,
            settings,
            last_call: Mutex::new(None),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `GET <base>/<path>?<query>` decoded as JSON.
    pub async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    /// `POST <base>/<path>` with a JSON body, decoded as JSON.
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.endpoint(path)?;
        let attempts = self.settings.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            self.pace().await;
            debug!(source = self.name, %method, %url, attempt, "sending request");

            match self.send_once(method.clone(), url.clone(), query, body).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    warn!(source = self.name, %url, attempts, error = %e, "request failed");
                    return Err(ProspectorError::source(self.name, e.to_string()));
                }
                Err(e) => {
                    warn!(source = self.name, %url, attempt, error = %e, "request failed, retrying");
                    tokio::time::sleep(self.settings.retry_delay * attempt).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(method, url.clone())
            .header("Accept", "application/json");

        request = match &self.key_placement {
            ApiKeyPlacement::Header(name) => request.header(*name, self.api_key.as_str()),
            ApiKeyPlacement::Query(name) => request.query(&[(*name, self.api_key.as_str())]),
        };
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProspectorError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProspectorError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProspectorError::Serialization(format!("{url}: invalid JSON: {e}")))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| ProspectorError::config(format!("invalid URL {raw}: {e}")))
    }

    /// Wait until the minimum interval since the previous call has passed.
    async fn pace(&self) {
        let interval = self.settings.min_interval();
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last_call = Some(Instant::now());
    }
}
