//! Persisted forms of a search result: a JSON array of prospects and a flat CSV.
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! crashed run never leaves a truncated export behind.

use std::path::Path;

use prospector_shared::{Prospect, ProspectorError, Result};
use serde::Serialize;
use tracing::{debug, info};

/// Column order of the CSV export.
pub const CSV_COLUMNS: [&str; 8] = [
    "company_name",
    "domain",
    "industry",
    "revenue",
    "employee_count",
    "confidence",
    "location",
    "funding_stage",
];

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Pretty-printed JSON array of prospects.
pub fn to_json_string(prospects: &[Prospect]) -> Result<String> {
    serde_json::to_string_pretty(prospects)
        .map_err(|e| ProspectorError::Serialization(format!("prospects to JSON: {e}")))
}

pub fn write_json(path: &Path, prospects: &[Prospect]) -> Result<()> {
    let json = to_json_string(prospects)?;
    write_atomic(path, json.as_bytes())?;
    info!(path = %path.display(), count = prospects.len(), "wrote JSON export");
    Ok(())
}

/// Load a previously written JSON export.
pub fn read_json(path: &Path) -> Result<Vec<Prospect>> {
    let content = std::fs::read_to_string(path).map_err(|e| ProspectorError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        ProspectorError::Serialization(format!("invalid prospects file {}: {e}", path.display()))
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// One CSV line. Field order must match [`CSV_COLUMNS`].
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    company_name: &'a str,
    domain: &'a str,
    industry: Option<&'a str>,
    revenue: Option<u64>,
    employee_count: Option<u64>,
    confidence: f64,
    location: Option<&'a str>,
    funding_stage: Option<&'a str>,
}

impl<'a> From<&'a Prospect> for CsvRow<'a> {
    fn from(p: &'a Prospect) -> Self {
        Self {
            company_name: &p.company_name,
            domain: &p.domain,
            industry: p.industry.as_deref(),
            revenue: p.revenue,
            employee_count: p.employee_count,
            confidence: p.confidence,
            location: p.location.as_deref(),
            funding_stage: p.funding_stage.as_deref(),
        }
    }
}

/// CSV with a header row and one line per prospect. Missing values are empty cells.
pub fn to_csv_string(prospects: &[Prospect]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for prospect in prospects {
        writer
            .serialize(CsvRow::from(prospect))
            .map_err(|e| ProspectorError::Serialization(format!("CSV row: {e}")))?;
    }
    if prospects.is_empty() {
        writer
            .write_record(CSV_COLUMNS)
            .map_err(|e| ProspectorError::Serialization(format!("CSV header: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ProspectorError::Serialization(format!("CSV flush: {e}")))?;
    String::from_utf8(bytes).map_err(|e| ProspectorError::Serialization(format!("CSV encoding: {e}")))
}

pub fn write_csv(path: &Path, prospects: &[Prospect]) -> Result<()> {
    let csv = to_csv_string(prospects)?;
    write_atomic(path, csv.as_bytes())?;
    info!(path = %path.display(), count = prospects.len(), "wrote CSV export");
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Headline numbers for a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProspectSummary {
    pub total: usize,
    pub avg_confidence: f64,
    pub total_contacts: usize,
    pub with_funding: usize,
    pub hiring: usize,
}

impl ProspectSummary {
    pub fn of(prospects: &[Prospect]) -> Self {
        if prospects.is_empty() {
            return Self::default();
        }
        let total = prospects.len();
        Self {
            total,
            avg_confidence: prospects.iter().map(|p| p.confidence).sum::<f64>() / total as f64,
            total_contacts: prospects.iter().map(|p| p.contacts.len()).sum(),
            with_funding: prospects.iter().filter(|p| p.signals.new_funding).count(),
            hiring: prospects.iter().filter(|p| p.signals.recent_hiring).count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ProspectorError::io(parent, e))?;
    }

    let temp = path.with_extension("tmp");
    std::fs::write(&temp, content).map_err(|e| ProspectorError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| ProspectorError::io(path, e))?;
    debug!(path = %path.display(), size = content.len(), "wrote export file");
    Ok(())
}
