//! Canonical domain extraction.
//!
//! A canonical domain is lowercase, carries no scheme, `www.` or path, and is
//! reduced to its registrable form: the public suffix plus one label
//! (`https://www.blog.acme.co.uk/about` becomes `acme.co.uk`). Suffixes come
//! from the Public Suffix List, private entries such as `github.io` included.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

/// Reduce any URL-like string to its canonical domain. Empty input yields `""`.
pub fn clean_domain(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match registrable_domain(trimmed) {
        Some(domain) => domain,
        None => {
            tracing::debug!(input = trimmed, "no registrable domain, stripping by hand");
            strip_domain(trimmed)
        }
    }
}

fn registrable_domain(input: &str) -> Option<String> {
    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("http://{input}")
    };
    let url = Url::parse(&with_scheme).ok()?;

    match url.host()? {
        Host::Ipv4(ip) => Some(ip.to_string()),
        Host::Ipv6(ip) => Some(ip.to_string()),
        Host::Domain(host) => {
            let host = host.trim_end_matches('.').to_ascii_lowercase();
            psl::domain_str(&host).map(str::to_string)
        }
    }
}

/// Best-effort cleanup when the input does not parse as a URL.
fn strip_domain(input: &str) -> String {
    static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^(?:https?://)?(?:www\.)?").expect("valid regex")
    });

    let stripped = PREFIX_RE.replace(input, "");
    stripped
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
