//! Application configuration for Prospector.
//!
//! User config lives at `~/.prospector/prospector.toml`.
//! CLI flags override config file values, which override defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProspectorError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "prospector.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".prospector";

/// Values shipped in `.env` templates that must not count as a configured key.
const PLACEHOLDER_KEYS: &[&str] = &[
    "your_apollo_api_key",
    "your_apollo_api_key_here",
    "your_crunchbase_api_key",
    "your_crunchbase_api_key_here",
    "your_serpapi_api_key",
    "your_serpapi_key_here",
    "your_api_key_here",
    "changeme",
];

// ---------------------------------------------------------------------------
// Config structs (matching prospector.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// External data source settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Deduplication thresholds.
    #[serde(default)]
    pub dedupe: DedupeConfig,

    /// Bucket midpoint overrides.
    #[serde(default)]
    pub buckets: BucketsConfig,

    /// Export settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Env var holding the Apollo key (never store the key itself).
    #[serde(default = "default_apollo_key_env")]
    pub apollo_api_key_env: String,

    #[serde(default = "default_crunchbase_key_env")]
    pub crunchbase_api_key_env: String,

    #[serde(default = "default_serp_key_env")]
    pub serp_api_key_env: String,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts; multiplied by the attempt number.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Page size requested from company sources.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            apollo_api_key_env: default_apollo_key_env(),
            crunchbase_api_key_env: default_crunchbase_key_env(),
            serp_api_key_env: default_serp_key_env(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

fn default_apollo_key_env() -> String {
    "APOLLO_API_KEY".into()
}
fn default_crunchbase_key_env() -> String {
    "CRUNCHBASE_API_KEY".into()
}
fn default_serp_key_env() -> String {
    "SERP_API_KEY".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    1000
}
fn default_fetch_limit() -> u32 {
    25
}

/// `[dedupe]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeConfig {
    /// Name similarity at or above which two companies are the same entity.
    #[serde(default = "default_company_threshold")]
    pub company_threshold: f64,

    /// Accepted for symmetry with companies; contact matching is exact.
    #[serde(default = "default_contact_threshold")]
    pub contact_threshold: f64,
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            company_threshold: default_company_threshold(),
            contact_threshold: default_contact_threshold(),
        }
    }
}

fn default_company_threshold() -> f64 {
    0.85
}
fn default_contact_threshold() -> f64 {
    0.9
}

/// `[buckets]` section. Entries replace or extend the built-in midpoint tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketsConfig {
    #[serde(default)]
    pub employees: BTreeMap<String, u64>,

    #[serde(default)]
    pub revenue: BTreeMap<String, u64>,
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for exports when no explicit path is given.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.prospector/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProspectorError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.prospector/prospector.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProspectorError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ProspectorError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ProspectorError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = render_config(&AppConfig::default())?;

    std::fs::write(&path, content).map_err(|e| ProspectorError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Render a config as pretty TOML.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| ProspectorError::Serialization(e.to_string()))
}

fn validate_config(config: &AppConfig) -> Result<()> {
    for (name, value) in [
        ("dedupe.company_threshold", config.dedupe.company_threshold),
        ("dedupe.contact_threshold", config.dedupe.contact_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProspectorError::config(format!(
                "{name} must be within [0, 1], got {value}"
            )));
        }
    }
    if config.sources.max_retries == 0 {
        return Err(ProspectorError::config("sources.max_retries must be at least 1"));
    }
    Ok(())
}

/// Read an API key from the named env var.
///
/// Returns `None` when the variable is unset, empty, or still holds a template placeholder.
pub fn api_key_from_env(var_name: &str) -> Option<String> {
    let value = std::env::var(var_name).ok()?;
    let value = value.trim();
    if value.is_empty() || is_placeholder_key(value) {
        return None;
    }
    Some(value.to_string())
}

fn is_placeholder_key(value: &str) -> bool {
    PLACEHOLDER_KEYS
        .iter()
        .any(|p| value.eq_ignore_ascii_case(p))
}

/// Check that at least one company source key is configured.
///
/// A search continues on mock data when this fails. `config show` prints the result.
pub fn validate_api_keys(config: &AppConfig) -> Result<()> {
    let vars = [
        &config.sources.apollo_api_key_env,
        &config.sources.crunchbase_api_key_env,
    ];
    if vars.iter().any(|v| api_key_from_env(v).is_some()) {
        return Ok(());
    }
    Err(ProspectorError::config(format!(
        "no company source API key found. Set {} or {} to query live sources.",
        vars[0], vars[1]
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let toml_str = render_config(&AppConfig::default()).expect("serialize default config");
        assert!(toml_str.contains("APOLLO_API_KEY"));
        assert!(toml_str.contains("company_threshold"));
        assert!(toml_str.contains("[output]"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = render_config(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.sources.timeout_secs, 30);
        assert_eq!(parsed.sources.max_retries, 3);
        assert_eq!(parsed.dedupe.company_threshold, 0.85);
        assert_eq!(parsed.output.dir, "output");
    }

    #[test]
    fn config_with_bucket_overrides() {
        let toml_str = r#"
[buckets.employees]
c_00001_00010 = 8

[buckets.revenue]
r_00100000 = 75000000
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.buckets.employees.get("c_00001_00010"), Some(&8));
        assert_eq!(config.buckets.revenue.get("r_00100000"), Some(&75_000_000));
        assert_eq!(config.sources.fetch_limit, 25);
    }

    #[test]
    fn out_of_range_threshold_rejected() {
        let dir = std::env::temp_dir().join("prospector-config-test");
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[dedupe]\ncompany_threshold = 1.2\n").expect("write");
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("company_threshold"));
    }

    #[test]
    fn missing_key_var_yields_none() {
        assert_eq!(api_key_from_env("PROSPECTOR_TEST_NONEXISTENT_KEY_12345"), None);
    }

    #[test]
    fn placeholders_are_not_keys() {
        assert!(is_placeholder_key("your_apollo_api_key"));
        assert!(is_placeholder_key("CHANGEME"));
        assert!(!is_placeholder_key("sk_live_abc123"));
    }

    #[test]
    fn env_template_placeholders_are_not_keys() {
        let cases = [
            ("PROSPECTOR_TEST_TEMPLATE_APOLLO", "your_apollo_api_key_here"),
            ("PROSPECTOR_TEST_TEMPLATE_CB", "your_crunchbase_api_key_here"),
            ("PROSPECTOR_TEST_TEMPLATE_SERP", "your_serpapi_key_here"),
        ];
        for (var, value) in cases {
            // SAFETY: each test variable name is unique to this test
            unsafe { std::env::set_var(var, value) };
            assert_eq!(api_key_from_env(var), None, "{value} treated as a key");
        }

        let mut config = AppConfig::default();
        config.sources.apollo_api_key_env = cases[0].0.into();
        config.sources.crunchbase_api_key_env = cases[1].0.into();
        assert!(validate_api_keys(&config).is_err());
    }

    #[test]
    fn real_key_is_trimmed() {
        // SAFETY: variable name is unique to this test
        unsafe { std::env::set_var("PROSPECTOR_TEST_REAL_KEY_4242", "  sk_live_abc123 ") };
        assert_eq!(
            api_key_from_env("PROSPECTOR_TEST_REAL_KEY_4242").as_deref(),
            Some("sk_live_abc123")
        );
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Unique names so other tests' environment does not interfere
        config.sources.apollo_api_key_env = "PROSPECTOR_TEST_NO_APOLLO_98765".into();
        config.sources.crunchbase_api_key_env = "PROSPECTOR_TEST_NO_CB_98765".into();
        let result = validate_api_keys(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key found"));
    }
}
