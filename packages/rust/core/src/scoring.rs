//! Weighted ICP fit scoring.
//!
//! Every factor yields a value in `[0, 1]`, with 0.5 meaning "no evidence
//! either way". The total is the weighted sum, rounded to two decimals.

use prospector_shared::{CompanyRecord, ContactRecord, IcpSpec, Prospect, Signals};
use serde::Serialize;

use crate::dedupe::similarity;

pub const INDUSTRY_WEIGHT: f64 = 0.30;
pub const REVENUE_SIZE_WEIGHT: f64 = 0.20;
pub const KEYWORDS_WEIGHT: f64 = 0.15;
pub const FUNDING_WEIGHT: f64 = 0.15;
pub const HIRING_WEIGHT: f64 = 0.10;
pub const TECH_STACK_WEIGHT: f64 = 0.10;

const NEUTRAL: f64 = 0.5;
/// Fuzzy industry matches must be strictly above this ratio.
const INDUSTRY_SIMILARITY_FLOOR: f64 = 0.6;
/// Data-role openings at which the hiring factor saturates.
const DATA_ROLES_FOR_FULL_SCORE: f64 = 3.0;

/// Per-factor sub-scores and the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub industry: f64,
    pub revenue_size: f64,
    pub keywords: f64,
    pub funding: f64,
    pub hiring: f64,
    pub tech_stack: f64,
    pub total: f64,
}

/// Confidence that `company` matches `icp`, in `[0, 1]`.
pub fn score(
    company: &CompanyRecord,
    contacts: &[ContactRecord],
    signals: &Signals,
    icp: &IcpSpec,
) -> f64 {
    score_breakdown(company, contacts, signals, icp).total
}

/// Like [`score`], keeping the individual factors.
///
/// Contacts do not currently influence the score.
pub fn score_breakdown(
    company: &CompanyRecord,
    _contacts: &[ContactRecord],
    signals: &Signals,
    icp: &IcpSpec,
) -> ScoreBreakdown {
    let industry = industry_fit(company, icp);
    let revenue_size = revenue_size_fit(company, icp);
    let keywords = keyword_fit(company, icp);
    let funding = funding_fit(signals, icp);
    let hiring = hiring_fit(signals, icp);
    let tech_stack = tech_fit(signals, icp);

    let weighted = industry * INDUSTRY_WEIGHT
        + revenue_size * REVENUE_SIZE_WEIGHT
        + keywords * KEYWORDS_WEIGHT
        + funding * FUNDING_WEIGHT
        + hiring * HIRING_WEIGHT
        + tech_stack * TECH_STACK_WEIGHT;

    ScoreBreakdown {
        industry,
        revenue_size,
        keywords,
        funding,
        hiring,
        tech_stack,
        total: round2(weighted).clamp(0.0, 1.0),
    }
}

/// Recompute the breakdown for an already-scored prospect.
pub fn explain(prospect: &Prospect, icp: &IcpSpec) -> ScoreBreakdown {
    let company = CompanyRecord {
        company_name: prospect.company_name.clone(),
        domain: prospect.domain.clone(),
        revenue: prospect.revenue,
        employee_count: prospect.employee_count,
        industry: prospect.industry.clone(),
        location: prospect.location.clone(),
        description: prospect.description.clone(),
        funding_stage: prospect.funding_stage.clone(),
        funding_total: prospect.funding_total,
        ..Default::default()
    };
    score_breakdown(&company, &prospect.contacts, &prospect.signals, icp)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Factors
// ---------------------------------------------------------------------------

fn industry_fit(company: &CompanyRecord, icp: &IcpSpec) -> f64 {
    let company_industry = company
        .industry
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_default();
    let wanted = folded_terms(&icp.icp.industry);
    if company_industry.is_empty() || wanted.is_empty() {
        return NEUTRAL;
    }

    // First ICP industry with any match decides.
    for wanted in &wanted {
        if company_industry.contains(wanted.as_str()) || wanted.contains(&company_industry) {
            return 1.0;
        }
        let ratio = similarity(wanted, &company_industry);
        if ratio > INDUSTRY_SIMILARITY_FLOOR {
            return ratio;
        }
    }
    0.0
}

fn revenue_size_fit(company: &CompanyRecord, icp: &IcpSpec) -> f64 {
    let criteria = &icp.icp;
    let fits: Vec<f64> = [
        company
            .revenue
            .map(|r| range_fit(r, criteria.revenue_min, criteria.revenue_max)),
        company.employee_count.map(|n| {
            range_fit(n, criteria.employee_count_min, criteria.employee_count_max)
        }),
    ]
    .into_iter()
    .flatten()
    .collect();

    if fits.is_empty() {
        NEUTRAL
    } else {
        fits.iter().sum::<f64>() / fits.len() as f64
    }
}

/// 1.0 inside `[min, max]`, decaying linearly with distance relative to the violated bound.
pub fn range_fit(value: u64, min: u64, max: u64) -> f64 {
    if (min..=max).contains(&value) {
        return 1.0;
    }
    let (distance, bound) = if value < min {
        (min - value, min)
    } else {
        (value - max, max)
    };
    if bound == 0 {
        return 0.0;
    }
    (1.0 - distance as f64 / bound as f64).max(0.0)
}

fn keyword_fit(company: &CompanyRecord, icp: &IcpSpec) -> f64 {
    let keywords = folded_terms(&icp.icp.keywords);
    let description = company.description.trim();
    let name = company.company_name.trim();
    if keywords.is_empty() || (description.is_empty() && name.is_empty()) {
        return NEUTRAL;
    }

    let text = format!("{description} {name}").to_lowercase();
    let matched = keywords.iter().filter(|k| text.contains(k.as_str())).count();
    matched as f64 / keywords.len() as f64
}

fn funding_fit(signals: &Signals, icp: &IcpSpec) -> f64 {
    if !icp.signals.funding {
        return NEUTRAL;
    }
    let has_stage = signals
        .funding_stage
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty());
    if signals.new_funding || has_stage { 1.0 } else { 0.0 }
}

fn hiring_fit(signals: &Signals, icp: &IcpSpec) -> f64 {
    if !icp.signals.hiring_data_roles {
        return NEUTRAL;
    }
    if signals.data_roles_count > 0 {
        (f64::from(signals.data_roles_count) / DATA_ROLES_FOR_FULL_SCORE).min(1.0)
    } else if signals.recent_hiring {
        NEUTRAL
    } else {
        0.0
    }
}

fn tech_fit(signals: &Signals, icp: &IcpSpec) -> f64 {
    let wanted = folded_terms(&icp.signals.tech_stack);
    let have = folded_terms(&signals.tech_stack);
    if wanted.is_empty() || have.is_empty() {
        return NEUTRAL;
    }
    let matched = wanted.iter().filter(|t| have.contains(t)).count();
    matched as f64 / wanted.len() as f64
}

/// Trimmed, lowercased, blanks dropped.
fn folded_terms(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_shared::{IcpCriteria, SignalPreferences};

    fn icp(criteria: IcpCriteria, signals: SignalPreferences) -> IcpSpec {
        IcpSpec {
            icp: criteria,
            signals,
            search_params: Default::default(),
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn weights_sum_to_one() {
        let sum = INDUSTRY_WEIGHT
            + REVENUE_SIZE_WEIGHT
            + KEYWORDS_WEIGHT
            + FUNDING_WEIGHT
            + HIRING_WEIGHT
            + TECH_STACK_WEIGHT;
        assert_close(sum, 1.0);
    }

    #[test]
    fn no_evidence_scores_neutral() {
        let spec = icp(IcpCriteria::default(), SignalPreferences::default());
        let breakdown = score_breakdown(&CompanyRecord::default(), &[], &Signals::default(), &spec);
        assert_close(breakdown.total, 0.5);
        assert_close(breakdown.industry, 0.5);
        assert_close(breakdown.revenue_size, 0.5);
    }

    #[test]
    fn revenue_at_bounds_fits_fully() {
        assert_close(range_fit(10_000_000, 10_000_000, 50_000_000), 1.0);
        assert_close(range_fit(50_000_000, 10_000_000, 50_000_000), 1.0);
        assert_close(range_fit(5_000_000, 10_000_000, 50_000_000), 0.5);
        assert_close(range_fit(75_000_000, 10_000_000, 50_000_000), 0.5);
        assert_close(range_fit(200_000_000, 10_000_000, 50_000_000), 0.0);
    }

    #[test]
    fn zero_upper_bound_does_not_divide_by_zero() {
        assert_close(range_fit(0, 0, 0), 1.0);
        assert_close(range_fit(5, 0, 0), 0.0);
    }

    #[test]
    fn revenue_and_size_average_present_metrics() {
        let spec = icp(
            IcpCriteria {
                revenue_min: 10,
                revenue_max: 100,
                employee_count_min: 100,
                employee_count_max: 1_000,
                ..Default::default()
            },
            SignalPreferences::default(),
        );
        let company = CompanyRecord {
            revenue: Some(50),
            employee_count: Some(50),
            ..Default::default()
        };
        assert_close(revenue_size_fit(&company, &spec), 0.75);

        let zero_revenue = CompanyRecord {
            revenue: Some(0),
            ..Default::default()
        };
        assert_close(revenue_size_fit(&zero_revenue, &spec), 0.0);
    }

    #[test]
    fn required_funding_absent_scores_zero() {
        let spec = icp(
            IcpCriteria::default(),
            SignalPreferences {
                funding: true,
                ..Default::default()
            },
        );
        assert_close(funding_fit(&Signals::default(), &spec), 0.0);

        let funded = Signals {
            funding_stage: Some("Series A".into()),
            ..Default::default()
        };
        assert_close(funding_fit(&funded, &spec), 1.0);

        let total = score(&CompanyRecord::default(), &[], &Signals::default(), &spec);
        // funding drops from 0.5 to 0.0: 0.5 - 0.15 * 0.5, then rounded
        assert!((total - 0.425).abs() <= 0.005 + 1e-9, "got {total}");
    }

    #[test]
    fn industry_matching() {
        let spec = icp(
            IcpCriteria {
                industry: vec!["FinTech".into(), "B2B Software".into()],
                ..Default::default()
            },
            SignalPreferences::default(),
        );
        let with = |industry: &str| CompanyRecord {
            industry: Some(industry.into()),
            ..Default::default()
        };
        assert_close(industry_fit(&with("fintech"), &spec), 1.0);
        assert_close(industry_fit(&with("Enterprise B2B Software"), &spec), 1.0);
        assert_close(industry_fit(&with("Agriculture"), &spec), 0.0);

        let fuzzy = industry_fit(&with("FinTeck"), &spec);
        assert!(fuzzy > 0.6 && fuzzy < 1.0);
    }

    #[test]
    fn blank_icp_entries_count_as_no_data() {
        let spec = icp(
            IcpCriteria {
                industry: vec!["".into(), "  ".into()],
                keywords: vec!["".into()],
                ..Default::default()
            },
            SignalPreferences {
                tech_stack: vec![" ".into()],
                ..Default::default()
            },
        );
        let company = CompanyRecord {
            company_name: "Acme".into(),
            industry: Some("FinTech".into()),
            description: "Payments platform".into(),
            ..Default::default()
        };
        let signals = Signals {
            tech_stack: vec!["Snowflake".into()],
            ..Default::default()
        };
        assert_close(industry_fit(&company, &spec), NEUTRAL);
        assert_close(keyword_fit(&company, &spec), NEUTRAL);
        assert_close(tech_fit(&signals, &spec), NEUTRAL);

        let mixed = icp(
            IcpCriteria {
                industry: vec!["".into(), "FinTech".into()],
                keywords: vec!["".into(), "payments".into()],
                ..Default::default()
            },
            SignalPreferences::default(),
        );
        assert_close(industry_fit(&company, &mixed), 1.0);
        assert_close(keyword_fit(&company, &mixed), 1.0);
    }

    #[test]
    fn keyword_fraction_over_description_and_name() {
        let spec = icp(
            IcpCriteria {
                keywords: vec!["analytics".into(), "AI".into(), "blockchain".into(), "pro".into()],
                ..Default::default()
            },
            SignalPreferences::default(),
        );
        let company = CompanyRecord {
            company_name: "DataMetrics Pro".into(),
            description: "AI-powered analytics".into(),
            ..Default::default()
        };
        assert_close(keyword_fit(&company, &spec), 0.75);
    }

    #[test]
    fn hiring_saturates_at_three_roles() {
        let spec = icp(
            IcpCriteria::default(),
            SignalPreferences {
                hiring_data_roles: true,
                ..Default::default()
            },
        );
        let roles = |n: u32, recent: bool| Signals {
            data_roles_count: n,
            recent_hiring: recent,
            ..Default::default()
        };
        assert_close(hiring_fit(&roles(0, false), &spec), 0.0);
        assert_close(hiring_fit(&roles(0, true), &spec), 0.5);
        assert_close(hiring_fit(&roles(1, true), &spec), 1.0 / 3.0);
        assert_close(hiring_fit(&roles(5, true), &spec), 1.0);
    }

    #[test]
    fn tech_stack_matches_case_insensitively() {
        let spec = icp(
            IcpCriteria::default(),
            SignalPreferences {
                tech_stack: vec!["AWS".into(), "Snowflake".into()],
                ..Default::default()
            },
        );
        let signals = Signals {
            tech_stack: vec!["aws".into(), "Python".into()],
            ..Default::default()
        };
        assert_close(tech_fit(&signals, &spec), 0.5);
        assert_close(tech_fit(&Signals::default(), &spec), 0.5);
    }

    #[test]
    fn perfect_fit_caps_at_one() {
        let spec = icp(
            IcpCriteria {
                industry: vec!["FinTech".into()],
                revenue_min: 1,
                revenue_max: 100,
                keywords: vec!["payments".into()],
                ..Default::default()
            },
            SignalPreferences {
                funding: true,
                hiring_data_roles: true,
                tech_stack: vec!["AWS".into()],
                ..Default::default()
            },
        );
        let company = CompanyRecord {
            company_name: "PayCo".into(),
            industry: Some("FinTech".into()),
            revenue: Some(50),
            description: "payments platform".into(),
            ..Default::default()
        };
        let signals = Signals {
            new_funding: true,
            data_roles_count: 4,
            tech_stack: vec!["AWS".into()],
            ..Default::default()
        };
        let total = score(&company, &[], &signals, &spec);
        assert_close(total, 1.0);
    }

    #[test]
    fn explain_matches_the_recorded_score() {
        let spec = icp(
            IcpCriteria {
                industry: vec!["FinTech".into()],
                employee_count_min: 100,
                employee_count_max: 500,
                keywords: vec!["ledger".into()],
                ..Default::default()
            },
            SignalPreferences {
                funding: true,
                ..Default::default()
            },
        );
        let company = CompanyRecord {
            company_name: "LedgerWorks".into(),
            industry: Some("Financial Services".into()),
            employee_count: Some(50),
            funding_stage: Some("Seed".into()),
            raw: serde_json::json!({"ignored": true}),
            ..Default::default()
        };
        let signals = Signals::seeded_from(&company);
        let total = score(&company, &[], &signals, &spec);
        let prospect = Prospect::from_company(company, vec![], signals, total);
        assert_close(explain(&prospect, &spec).total, total);
    }

    #[test]
    fn totals_have_two_decimals() {
        let spec = icp(
            IcpCriteria {
                keywords: vec!["a".into(), "b".into(), "c".into()],
                ..Default::default()
            },
            SignalPreferences::default(),
        );
        let company = CompanyRecord {
            company_name: "a".into(),
            ..Default::default()
        };
        let total = score(&company, &[], &Signals::default(), &spec);
        assert_close(total, (total * 100.0).round() / 100.0);
        assert!((0.0..=1.0).contains(&total));
    }
}
