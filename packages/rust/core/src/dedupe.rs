//! Near-duplicate elimination for companies and contacts. Stable, first-seen wins.

use std::collections::HashSet;

use prospector_shared::{CompanyRecord, ContactRecord};
use tracing::debug;

pub const DEFAULT_COMPANY_THRESHOLD: f64 = 0.85;
pub const DEFAULT_CONTACT_THRESHOLD: f64 = 0.9;

/// Normalized Levenshtein similarity in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Drop companies whose domain was already seen or whose name is at least
/// `threshold` similar to an accepted name.
pub fn dedupe_companies(records: Vec<CompanyRecord>, threshold: f64) -> Vec<CompanyRecord> {
    let input = records.len();
    let mut seen_domains: HashSet<String> = HashSet::new();
    let mut seen_names: Vec<String> = Vec::new();
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        let domain = record.domain.trim().to_lowercase();
        let name = record.company_name.trim().to_lowercase();

        if !domain.is_empty() && seen_domains.contains(&domain) {
            debug!(%domain, "duplicate domain");
            continue;
        }

        if !name.is_empty() {
            if let Some(matched) = seen_names.iter().find(|seen| similarity(&name, seen) >= threshold) {
                debug!(%name, %matched, "duplicate name");
                continue;
            }
        }

        if !domain.is_empty() {
            seen_domains.insert(domain);
        }
        if !name.is_empty() {
            seen_names.push(name);
        }
        unique.push(record);
    }

    debug!(input, output = unique.len(), "deduplicated companies");
    unique
}

/// Drop repeated contacts.
///
/// Email is the identity when present. Contacts without email match on exact
/// normalized name. Contacts with neither are dropped. `threshold` is accepted
/// alongside [`dedupe_companies`] but contact matching is always exact.
pub fn dedupe_contacts(records: Vec<ContactRecord>, _threshold: f64) -> Vec<ContactRecord> {
    let input = records.len();
    let mut seen_emails: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());

    for contact in records {
        if let Some(email) = contact.email() {
            if !seen_emails.insert(normalize_email(email)) {
                continue;
            }
        } else {
            let name = normalize_name(&contact.name);
            if name.is_empty() || !seen_names.insert(name) {
                continue;
            }
        }
        unique.push(contact);
    }

    debug!(input, output = unique.len(), "deduplicated contacts");
    unique
}

/// Contact identity key: lowercased and trimmed, otherwise exact.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_normalize::clean_domain;

    fn company(name: &str, domain: &str) -> CompanyRecord {
        CompanyRecord {
            company_name: name.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    fn contact(name: &str, email: Option<&str>) -> ContactRecord {
        ContactRecord {
            name: name.into(),
            email: email.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn domains_compare_case_and_whitespace_insensitively() {
        let out = dedupe_companies(
            vec![company("Foo", " Foo.COM "), company("Totally Different", "foo.com")],
            DEFAULT_COMPANY_THRESHOLD,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company_name, "Foo");
    }

    #[test]
    fn similar_names_without_domains_collapse() {
        let out = dedupe_companies(
            vec![company("DataMetrics Pro", ""), company("DataMetrics Pro.", "")],
            DEFAULT_COMPANY_THRESHOLD,
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        // 3 substitutions over 20 characters: similarity exactly 0.85
        let a = "abcdefghijklmnopqrst";
        let b = "abcdefghijklmnopqxyz";
        assert!((similarity(a, b) - 0.85).abs() < 1e-9);

        let at_boundary = dedupe_companies(vec![company(a, ""), company(b, "")], 0.85);
        assert_eq!(at_boundary.len(), 1);

        let above = dedupe_companies(vec![company(a, ""), company(b, "")], 0.86);
        assert_eq!(above.len(), 2);
    }

    #[test]
    fn empty_keys_never_count_as_seen() {
        let out = dedupe_companies(
            vec![company("", ""), company("", ""), company("Alpha", ""), company("Omega", "")],
            DEFAULT_COMPANY_THRESHOLD,
        );
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn output_never_grows() {
        let input = vec![
            company("Acme", "acme.io"),
            company("Acme", "acme.io"),
            company("Globex", "globex.com"),
        ];
        let n = input.len();
        assert!(dedupe_companies(input, DEFAULT_COMPANY_THRESHOLD).len() <= n);
    }

    #[test]
    fn contacts_dedupe_by_email_then_name() {
        let out = dedupe_contacts(
            vec![
                contact("Ada Lovelace", Some("ada@acme.io")),
                contact("A. Lovelace", Some(" ADA@acme.io ")),
                contact("Grace Hopper", None),
                contact("grace  hopper", None),
                contact("", None),
                contact("Grace Hopper", Some("grace@acme.io")),
            ],
            DEFAULT_CONTACT_THRESHOLD,
        );
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lovelace", "Grace Hopper", "Grace Hopper"]);
    }

    #[test]
    fn email_identity_is_exact_after_case_and_trim() {
        assert_eq!(normalize_email(" Jane.Doe+crm@Gmail.com "), "jane.doe+crm@gmail.com");
        assert_eq!(normalize_email(""), "");

        let out = dedupe_contacts(
            vec![
                contact("Jane Doe", Some("jane@gmail.com")),
                contact("Jane Doe", Some("jane+crm@gmail.com")),
                contact("Jane Doe", Some(" JANE@gmail.com")),
            ],
            DEFAULT_CONTACT_THRESHOLD,
        );
        let emails: Vec<_> = out.iter().filter_map(|c| c.email()).collect();
        assert_eq!(emails, vec!["jane@gmail.com", "jane+crm@gmail.com"]);
    }

    #[test]
    fn companies_under_shared_public_suffixes_stay_distinct() {
        let records = vec![
            company("MercadoLibre", &clean_domain("https://www.mercadolibre.com.ar")),
            company("Globant", &clean_domain("globant.com.ar")),
            company("Wix", &clean_domain("https://www.wix.co.il")),
            company("Acme Docs", &clean_domain("https://acme.github.io")),
            company("Globex Pages", &clean_domain("https://globex.github.io")),
        ];
        let out = dedupe_companies(records, DEFAULT_COMPANY_THRESHOLD);
        let domains: Vec<&str> = out.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(
            domains,
            vec![
                "mercadolibre.com.ar",
                "globant.com.ar",
                "wix.co.il",
                "acme.github.io",
                "globex.github.io",
            ]
        );
    }
}
