//! Target classification.
//!
//! Splits raw input strings into IP, domain and invalid buckets and computes the
//! normalized `formatted` key every later stage uses:
//! - `classify_target()` - classifies a single string
//! - `classify_targets()` - classifies a batch, preserving relative order per bucket

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::config::{MAX_DOMAIN_LENGTH, MAX_LABEL_LENGTH};

/// What a target turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    Ipv4,
    Ipv6,
    Domain,
    Invalid,
}

impl TargetKind {
    pub fn is_ip(&self) -> bool {
        matches!(self, TargetKind::Ipv4 | TargetKind::Ipv6)
    }
}

/// One input item after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// The string exactly as supplied
    pub raw: String,
    /// Normalized form used as the lookup key
    pub formatted: String,
    pub kind: TargetKind,
    /// True when the target was read from a file rather than given inline
    pub from_batch_source: bool,
}

impl TargetEntry {
    /// Parsed address of an IP entry.
    pub fn ip(&self) -> Option<IpAddr> {
        if self.kind.is_ip() {
            self.formatted.parse().ok()
        } else {
            None
        }
    }
}

/// Classifier output: three disjoint, order-preserving buckets.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedTargets {
    /// IPv4 and IPv6 entries
    pub ip_entries: Vec<TargetEntry>,
    pub domain_entries: Vec<TargetEntry>,
    pub invalid_entries: Vec<TargetEntry>,
}

impl ClassifiedTargets {
    /// Number of targets that will be processed (everything but invalid entries).
    pub fn valid_count(&self) -> usize {
        self.ip_entries.len() + self.domain_entries.len()
    }

    pub fn total(&self) -> usize {
        self.valid_count() + self.invalid_entries.len()
    }
}

/// Classifies every raw string, keeping input order within each bucket.
pub fn classify_targets<S: AsRef<str>>(raws: &[S], from_batch_source: bool) -> ClassifiedTargets {
    let mut classified = ClassifiedTargets::default();
    for raw in raws {
        let entry = classify_target(raw.as_ref(), from_batch_source);
        match entry.kind {
            TargetKind::Ipv4 | TargetKind::Ipv6 => classified.ip_entries.push(entry),
            TargetKind::Domain => classified.domain_entries.push(entry),
            TargetKind::Invalid => {
                log::warn!("Skipping invalid target: {:?}", entry.raw);
                classified.invalid_entries.push(entry);
            }
        }
    }
    log::debug!(
        "Classified {} targets: {} IP, {} domain, {} invalid",
        classified.total(),
        classified.ip_entries.len(),
        classified.domain_entries.len(),
        classified.invalid_entries.len()
    );
    classified
}

/// Classifies a single raw string.
pub fn classify_target(raw: &str, from_batch_source: bool) -> TargetEntry {
    let host = extract_host(raw);

    let (formatted, kind) = match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => (v4.to_string(), TargetKind::Ipv4),
        Ok(IpAddr::V6(v6)) => (v6.to_string(), TargetKind::Ipv6),
        Err(_) if is_plausible_domain(&host) => (host, TargetKind::Domain),
        Err(_) => (host, TargetKind::Invalid),
    };

    TargetEntry {
        raw: raw.to_string(),
        formatted,
        kind,
        from_batch_source,
    }
}

/// Reduces a raw target to a lower-cased host: drops scheme, userinfo, path,
/// query, fragment, port, IPv6 brackets and trailing root dots.
fn extract_host(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.contains("://") {
        if let Ok(parsed) = url::Url::parse(trimmed) {
            if let Some(host) = parsed.host_str() {
                return normalize_host(host);
            }
        }
    }

    // Bare IPv6 literals contain colons but no port
    if trimmed.parse::<IpAddr>().is_ok() {
        return trimmed.to_ascii_lowercase();
    }

    let mut rest = trimmed;
    if let Some(idx) = rest.find(['/', '?', '#']) {
        rest = &rest[..idx];
    }
    if let Some(idx) = rest.rfind('@') {
        rest = &rest[idx + 1..];
    }
    if let Some(stripped) = rest.strip_prefix('[') {
        // [v6]:port
        if let Some(end) = stripped.find(']') {
            return normalize_host(&stripped[..end]);
        }
    } else if let Some((host, port)) = rest.rsplit_once(':') {
        if !host.contains(':') && port.chars().all(|c| c.is_ascii_digit()) {
            rest = host;
        }
    }

    normalize_host(rest)
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    // All of them: `formatted` must land in the same bucket when classified again
    let host = host.trim_end_matches('.');
    host.to_ascii_lowercase()
}

/// Syntactic hostname check: at least two labels, LDH (plus `_`) labels of
/// 1-63 characters that don't start or end with `-`, and a non-numeric TLD.
fn is_plausible_domain(host: &str) -> bool {
    if host.is_empty() || host.len() > MAX_DOMAIN_LENGTH {
        return false;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });

    let tld_ok = labels
        .last()
        .map(|tld| !tld.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);

    labels_ok && tld_ok
}
