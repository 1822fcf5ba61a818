//! Attribution of targets to CDN, WAF and CLOUD providers.

use ipnetwork::IpNetwork;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use strum::IntoEnumIterator;

use super::models::{Category, FingerprintDataset};
use crate::models::CheckInfo;
use crate::target::TargetKind;

/// Kind of evidence behind a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Cname,
    Ip,
    Credential,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Cname => "cname",
            Signal::Ip => "ip",
            Signal::Credential => "credential",
        })
    }
}

/// One provider fingerprint that matched a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMatch {
    pub provider: String,
    pub signal: Signal,
    /// The dataset pattern that matched: CNAME suffix, CIDR or credential pattern
    pub evidence: String,
}

/// Verdict for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub raw: String,
    pub target: String,
    /// `None` when nothing matched
    pub category: Option<Category>,
    pub matches: Vec<ProviderMatch>,
}

/// Provider names of `matches`, first occurrence kept.
pub fn distinct_providers(matches: &[ProviderMatch]) -> Vec<&str> {
    let mut providers: Vec<&str> = Vec::new();
    for m in matches {
        if !providers.contains(&m.provider.as_str()) {
            providers.push(&m.provider);
        }
    }
    providers
}

impl CheckResult {
    /// First matching provider.
    pub fn provider(&self) -> Option<&str> {
        self.matches.first().map(|m| m.provider.as_str())
    }

    /// Every distinct matching provider, in match order.
    pub fn providers(&self) -> Vec<&str> {
        distinct_providers(&self.matches)
    }

    pub fn is_matched(&self) -> bool {
        self.category.is_some()
    }
}

/// Order in which categories are tried; the first with any match wins.
///
/// Categories left out are never reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence(Vec<Category>);

impl Precedence {
    /// # Errors
    ///
    /// Rejects an order that lists a category twice.
    pub fn new(order: Vec<Category>) -> Result<Self, String> {
        let unique: BTreeSet<_> = order.iter().collect();
        if unique.len() != order.len() {
            return Err(format!("category listed twice in precedence {order:?}"));
        }
        Ok(Self(order))
    }

    pub fn order(&self) -> &[Category] {
        &self.0
    }
}

impl Default for Precedence {
    /// CDN, then WAF, then CLOUD.
    fn default() -> Self {
        Self(Category::iter().collect())
    }
}

struct SuffixRule {
    category: Category,
    provider: String,
    pattern: String,
}

struct RangeRule {
    category: Category,
    provider: String,
    network: IpNetwork,
}

struct KeyRule {
    provider: String,
    pattern: String,
}

/// Classifies `CheckInfo`s against a shared dataset.
///
/// Pure over its inputs; one classifier can serve any number of threads.
pub struct Classifier {
    precedence: Precedence,
    /// Lower-cased suffix -> rules registering it
    suffixes: HashMap<String, Vec<SuffixRule>>,
    ranges: Vec<RangeRule>,
    keys: Vec<KeyRule>,
}

impl Classifier {
    pub fn new(dataset: Arc<FingerprintDataset>) -> Self {
        let mut suffixes: HashMap<String, Vec<SuffixRule>> = HashMap::new();
        let mut ranges = Vec::new();
        for category in Category::iter() {
            let data = dataset.category(category);
            for (provider, patterns) in data.cname() {
                for pattern in patterns {
                    suffixes.entry(pattern.clone()).or_default().push(SuffixRule {
                        category,
                        provider: provider.clone(),
                        pattern: pattern.clone(),
                    });
                }
            }
            for (provider, networks) in data.ip() {
                for network in networks {
                    ranges.push(RangeRule {
                        category,
                        provider: provider.clone(),
                        network: *network,
                    });
                }
            }
        }

        let keys = dataset
            .cloud
            .keys()
            .iter()
            .flat_map(|(provider, patterns)| {
                patterns.iter().map(move |pattern| KeyRule {
                    provider: provider.clone(),
                    pattern: pattern.clone(),
                })
            })
            .collect();

        log::debug!(
            "Classifier built: {} CNAME suffixes, {} ranges",
            suffixes.len(),
            ranges.len()
        );

        Self {
            precedence: Precedence::default(),
            suffixes,
            ranges,
            keys,
        }
    }

    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// One result per input, in input order.
    pub fn classify(&self, infos: &[CheckInfo]) -> Vec<CheckResult> {
        infos.iter().map(|info| self.classify_one(info)).collect()
    }

    /// Same output as `classify`, computed on up to `workers` scoped threads.
    pub fn classify_parallel(&self, infos: &[CheckInfo], workers: usize) -> Vec<CheckResult> {
        let workers = workers.max(1);
        if workers == 1 || infos.len() < 2 {
            return self.classify(infos);
        }
        let chunk_size = infos.len().div_ceil(workers);

        std::thread::scope(|scope| {
            let handles: Vec<_> = infos
                .chunks(chunk_size)
                .map(|chunk| scope.spawn(move || self.classify(chunk)))
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    pub fn classify_one(&self, info: &CheckInfo) -> CheckResult {
        let mut found: HashMap<Category, Vec<ProviderMatch>> = HashMap::new();
        let mut record = |category: Category, provider: &str, signal: Signal, evidence: &str| {
            let matches = found.entry(category).or_default();
            let duplicate = matches
                .iter()
                .any(|m| m.provider == provider && m.signal == signal && m.evidence == evidence);
            if !duplicate {
                matches.push(ProviderMatch {
                    provider: provider.to_string(),
                    signal,
                    evidence: evidence.to_string(),
                });
            }
        };

        // CNAME signal: the target itself (for domains) and its chain
        let own_name = (info.kind == TargetKind::Domain).then_some(info.formatted.as_str());
        for name in own_name.into_iter().chain(info.cname.iter().map(String::as_str)) {
            for rule in self.suffix_rules(name) {
                record(rule.category, &rule.provider, Signal::Cname, &rule.pattern);
            }
        }

        // IP signal
        for addr in info.addresses() {
            for rule in self.range_rules(addr) {
                record(
                    rule.category,
                    &rule.provider,
                    Signal::Ip,
                    &rule.network.to_string(),
                );
            }
        }

        // Credential signal, CLOUD only
        for rule in &self.keys {
            if info.raw.contains(&rule.pattern) {
                record(Category::Cloud, &rule.provider, Signal::Credential, &rule.pattern);
            }
        }

        let verdict = self
            .precedence
            .order()
            .iter()
            .find_map(|category| found.remove(category).map(|matches| (*category, matches)));

        match verdict {
            Some((category, matches)) => CheckResult {
                raw: info.raw.clone(),
                target: info.formatted.clone(),
                category: Some(category),
                matches,
            },
            None => CheckResult {
                raw: info.raw.clone(),
                target: info.formatted.clone(),
                category: None,
                matches: Vec::new(),
            },
        }
    }

    /// Rules whose suffix equals `name` or ends it at a label boundary.
    fn suffix_rules<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a SuffixRule> + 'a {
        let name = name.trim_end_matches('.').to_ascii_lowercase();
        let mut candidates = vec![name.clone()];
        let mut rest = name.as_str();
        while let Some((_, parent)) = rest.split_once('.') {
            candidates.push(parent.to_string());
            rest = parent;
        }
        candidates
            .into_iter()
            .filter_map(|suffix| self.suffixes.get(&suffix))
            .flatten()
    }

    fn range_rules(&self, addr: IpAddr) -> impl Iterator<Item = &RangeRule> + '_ {
        self.ranges.iter().filter(move |rule| rule.network.contains(addr))
    }
}
