//! Ideal Customer Profile: the immutable target a search run is scored against.
//!
//! An ICP file has three sections, `icp`, `signals`, and `search_params`, and may be
//! written as YAML, JSON, or TOML (selected by file extension).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProspectorError, Result};

/// The full ICP document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcpSpec {
    /// Firmographic criteria. Required.
    pub icp: IcpCriteria,

    /// Which buying signals are required, and what to look for.
    #[serde(default)]
    pub signals: SignalPreferences,

    /// Result shaping.
    #[serde(default)]
    pub search_params: SearchParams,
}

/// `icp:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcpCriteria {
    #[serde(default)]
    pub industry: Vec<String>,

    #[serde(default)]
    pub revenue_min: u64,

    #[serde(default = "unbounded")]
    pub revenue_max: u64,

    #[serde(default)]
    pub employee_count_min: u64,

    #[serde(default = "unbounded")]
    pub employee_count_max: u64,

    #[serde(default)]
    pub geography: Vec<String>,

    /// Case-insensitive match terms.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Default for IcpCriteria {
    fn default() -> Self {
        Self {
            industry: Vec::new(),
            revenue_min: 0,
            revenue_max: unbounded(),
            employee_count_min: 0,
            employee_count_max: unbounded(),
            geography: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

fn unbounded() -> u64 {
    u64::MAX
}

/// `signals:` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalPreferences {
    /// Require a funding signal.
    #[serde(default)]
    pub funding: bool,

    /// Require hiring activity on data roles.
    #[serde(default)]
    pub hiring_data_roles: bool,

    /// Target technologies.
    #[serde(default)]
    pub tech_stack: Vec<String>,

    /// Titles used to target contact and job-posting searches.
    #[serde(default)]
    pub job_titles_to_search: Vec<String>,
}

/// `search_params:` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default = "default_min_confidence")]
    pub min_confidence_score: f64,

    #[serde(default = "default_true")]
    pub include_contacts: bool,

    #[serde(default = "default_max_contacts")]
    pub max_contacts_per_company: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            min_confidence_score: default_min_confidence(),
            include_contacts: true,
            max_contacts_per_company: default_max_contacts(),
        }
    }
}

fn default_max_results() -> usize {
    50
}
fn default_min_confidence() -> f64 {
    0.7
}
fn default_true() -> bool {
    true
}
fn default_max_contacts() -> usize {
    3
}

impl IcpSpec {
    /// Load and validate an ICP file. The format is chosen by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ProspectorError::io(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let spec = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            "toml" => Self::from_toml(&content),
            other => Err(ProspectorError::config(format!(
                "unsupported ICP file extension '{other}' for {}: expected .yaml, .yml, .json, or .toml",
                path.display()
            ))),
        }?;

        tracing::info!(
            path = %path.display(),
            industries = spec.icp.industry.len(),
            keywords = spec.icp.keywords.len(),
            "ICP loaded"
        );
        Ok(spec)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(content)
            .map_err(|e| ProspectorError::config(format!("invalid ICP YAML: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(content)
            .map_err(|e| ProspectorError::config(format!("invalid ICP JSON: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let spec: Self = toml::from_str(content)
            .map_err(|e| ProspectorError::config(format!("invalid ICP TOML: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check structural invariants. Any failure is a [`ProspectorError::Config`].
    pub fn validate(&self) -> Result<()> {
        let icp = &self.icp;
        if icp.revenue_min > icp.revenue_max {
            return Err(ProspectorError::config(format!(
                "revenue_min ({}) is greater than revenue_max ({})",
                icp.revenue_min, icp.revenue_max
            )));
        }
        if icp.employee_count_min > icp.employee_count_max {
            return Err(ProspectorError::config(format!(
                "employee_count_min ({}) is greater than employee_count_max ({})",
                icp.employee_count_min, icp.employee_count_max
            )));
        }

        let params = &self.search_params;
        if params.max_results == 0 {
            return Err(ProspectorError::config("max_results must be at least 1"));
        }
        if params.max_contacts_per_company == 0 {
            return Err(ProspectorError::config(
                "max_contacts_per_company must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&params.min_confidence_score) {
            return Err(ProspectorError::config(format!(
                "min_confidence_score must be within [0, 1], got {}",
                params.min_confidence_score
            )));
        }
        Ok(())
    }
}
