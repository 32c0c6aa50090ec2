//! Post-run narrowing of a ranked prospect list.

use prospector_shared::{Prospect, ProspectorError, Result};

/// Industry label used for prospects with no industry.
pub const UNKNOWN_INDUSTRY: &str = "Unknown";

/// Criteria applied after a search. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultFilter {
    /// Keep only these industries (case-insensitive). Empty means any.
    pub industries: Vec<String>,
    /// Keep only prospects at or above this confidence.
    pub min_confidence: Option<f64>,
    /// Keep only prospects with a funding signal.
    pub funded_only: bool,
}

impl ResultFilter {
    /// Build a filter, rejecting a confidence floor outside `[0, 1]`.
    pub fn new(
        industries: Vec<String>,
        min_confidence: Option<f64>,
        funded_only: bool,
    ) -> Result<Self> {
        if let Some(min) = min_confidence {
            if !(0.0..=1.0).contains(&min) {
                return Err(ProspectorError::validation(format!(
                    "min confidence must be within [0, 1], got {min}"
                )));
            }
        }
        Ok(Self {
            industries,
            min_confidence,
            funded_only,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.industries.is_empty() && self.min_confidence.is_none() && !self.funded_only
    }

    pub fn matches(&self, prospect: &Prospect) -> bool {
        if !self.industries.is_empty() {
            let industry = prospect
                .industry
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNKNOWN_INDUSTRY);
            if !self
                .industries
                .iter()
                .any(|wanted| wanted.trim().eq_ignore_ascii_case(industry))
            {
                return false;
            }
        }

        if let Some(min) = self.min_confidence {
            if prospect.confidence < min {
                return false;
            }
        }

        !self.funded_only || prospect.signals.new_funding
    }

    /// Matching prospects, order preserved.
    pub fn apply(&self, prospects: &[Prospect]) -> Vec<Prospect> {
        prospects.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Display band for a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn of(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Self::High
        } else if confidence >= 0.6 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}
