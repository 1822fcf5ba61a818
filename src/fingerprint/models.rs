//! Data structures for the fingerprint dataset.
//!
//! - `Category`: CDN, WAF or CLOUD
//! - `CategoryData`: per-provider CNAME suffixes, CIDR ranges and credential patterns
//! - `FingerprintDataset`: the three categories, loaded once and shared read-only

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use strum_macros::EnumIter;

use crate::error_handling::DatasetError;

/// Provider category a target can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Cdn,
    Waf,
    Cloud,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cdn => "CDN",
            Category::Waf => "WAF",
            Category::Cloud => "CLOUD",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fingerprints of every provider in one category.
///
/// Provider names are trimmed and merged case-insensitively under the first
/// spelling seen. CNAME suffixes are lower-cased without a trailing dot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryData {
    cname: BTreeMap<String, BTreeSet<String>>,
    ip: BTreeMap<String, Vec<IpNetwork>>,
    keys: BTreeMap<String, BTreeSet<String>>,
}

/// Parses a CIDR, or a bare address as a single-host network.
pub(crate) fn parse_cidr(value: &str) -> Option<IpNetwork> {
    let value = value.trim();
    if value.contains('/') {
        return value.parse::<IpNetwork>().ok();
    }
    match value.parse::<IpAddr>().ok()? {
        IpAddr::V4(addr) => IpNetwork::new(IpAddr::V4(addr), 32).ok(),
        IpAddr::V6(addr) => IpNetwork::new(IpAddr::V6(addr), 128).ok(),
    }
}

fn normalize_suffix(suffix: &str) -> String {
    suffix
        .trim()
        .trim_start_matches("*.")
        .trim_start_matches('.')
        .trim_end_matches('.')
        .to_ascii_lowercase()
}

impl CategoryData {
    pub fn cname(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.cname
    }

    pub fn ip(&self) -> &BTreeMap<String, Vec<IpNetwork>> {
        &self.ip
    }

    pub fn keys(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.keys
    }

    /// Every provider with at least one fingerprint.
    pub fn providers(&self) -> BTreeSet<&str> {
        self.cname
            .keys()
            .chain(self.ip.keys())
            .chain(self.keys.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cname.is_empty() && self.ip.is_empty() && self.keys.is_empty()
    }

    /// The spelling this category already uses for `name`, or `name` itself.
    fn canonical_provider(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let existing = self
            .providers()
            .into_iter()
            .find(|known| known.eq_ignore_ascii_case(name))
            .map(str::to_string);
        Some(existing.unwrap_or_else(|| name.to_string()))
    }

    pub fn add_cname(&mut self, provider: &str, suffix: &str) {
        let suffix = normalize_suffix(suffix);
        let Some(provider) = self.canonical_provider(provider) else {
            return;
        };
        if suffix.is_empty() {
            return;
        }
        self.cname.entry(provider).or_default().insert(suffix);
    }

    /// Adds a range; a bare address becomes a /32 or /128.
    ///
    /// # Errors
    ///
    /// `DatasetError::InvalidCidr` when the value is neither a CIDR nor an address.
    pub fn add_cidr(&mut self, provider: &str, value: &str) -> Result<(), DatasetError> {
        let Some(canonical) = self.canonical_provider(provider) else {
            return Ok(());
        };
        if value.trim().is_empty() {
            return Ok(());
        }
        let network = parse_cidr(value).ok_or_else(|| DatasetError::InvalidCidr {
            provider: canonical.clone(),
            value: value.trim().to_string(),
        })?;
        let ranges = self.ip.entry(canonical).or_default();
        if !ranges.contains(&network) {
            ranges.push(network);
        }
        Ok(())
    }

    pub fn add_key(&mut self, provider: &str, pattern: &str) {
        let pattern = pattern.trim();
        let Some(provider) = self.canonical_provider(provider) else {
            return;
        };
        if pattern.is_empty() {
            return;
        }
        self.keys
            .entry(provider)
            .or_default()
            .insert(pattern.to_string());
    }

    /// Adds every fingerprint of `other` to this category.
    pub fn merge(&mut self, other: &CategoryData) {
        for (provider, suffixes) in &other.cname {
            for suffix in suffixes {
                self.add_cname(provider, suffix);
            }
        }
        for (provider, ranges) in &other.ip {
            if let Some(canonical) = self.canonical_provider(provider) {
                let existing = self.ip.entry(canonical).or_default();
                for range in ranges {
                    if !existing.contains(range) {
                        existing.push(*range);
                    }
                }
            }
        }
        for (provider, patterns) in &other.keys {
            for pattern in patterns {
                self.add_key(provider, pattern);
            }
        }
    }

    fn from_raw(raw: &RawCategory) -> Result<Self, DatasetError> {
        let mut data = Self::default();
        for (provider, suffixes) in &raw.cname {
            for suffix in suffixes {
                data.add_cname(provider, suffix);
            }
        }
        for (provider, ranges) in &raw.ip {
            for range in ranges {
                data.add_cidr(provider, range)?;
            }
        }
        for (provider, patterns) in &raw.keys {
            for pattern in patterns {
                data.add_key(provider, pattern);
            }
        }
        Ok(data)
    }

    fn to_raw(&self) -> RawCategory {
        RawCategory {
            cname: self
                .cname
                .iter()
                .map(|(p, s)| (p.clone(), s.iter().cloned().collect()))
                .collect(),
            ip: self
                .ip
                .iter()
                .map(|(p, r)| (p.clone(), r.iter().map(ToString::to_string).collect()))
                .collect(),
            keys: self
                .keys
                .iter()
                .map(|(p, k)| (p.clone(), k.iter().cloned().collect()))
                .collect(),
        }
    }
}

/// On-disk shape of one category. Every map is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawCategory {
    #[serde(default, alias = "CNAME")]
    cname: BTreeMap<String, Vec<String>>,
    #[serde(default, alias = "IP")]
    ip: BTreeMap<String, Vec<String>>,
    #[serde(default, alias = "KEYS")]
    keys: BTreeMap<String, Vec<String>>,
}

/// On-disk dataset shape: `{"cdn": {...}, "waf": {...}, "cloud": {...}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawDataset {
    #[serde(default, alias = "CDN")]
    cdn: RawCategory,
    #[serde(default, alias = "WAF")]
    waf: RawCategory,
    #[serde(default, alias = "CLOUD")]
    cloud: RawCategory,
}

/// CDN, WAF and CLOUD fingerprints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintDataset {
    pub cdn: CategoryData,
    pub waf: CategoryData,
    pub cloud: CategoryData,
}

impl FingerprintDataset {
    pub fn category(&self, category: Category) -> &CategoryData {
        match category {
            Category::Cdn => &self.cdn,
            Category::Waf => &self.waf,
            Category::Cloud => &self.cloud,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut CategoryData {
        match category {
            Category::Cdn => &mut self.cdn,
            Category::Waf => &mut self.waf,
            Category::Cloud => &mut self.cloud,
        }
    }

    /// Parses the internal JSON format.
    ///
    /// # Errors
    ///
    /// Malformed JSON or an invalid CIDR.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_str(json)?;
        Ok(Self {
            cdn: CategoryData::from_raw(&raw.cdn)?,
            waf: CategoryData::from_raw(&raw.waf)?,
            cloud: CategoryData::from_raw(&raw.cloud)?,
        })
    }

    pub fn to_json_string(&self) -> Result<String, DatasetError> {
        let raw = RawDataset {
            cdn: self.cdn.to_raw(),
            waf: self.waf.to_raw(),
            cloud: self.cloud.to_raw(),
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    /// Loads a dataset saved in the internal JSON format.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::FileError {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_json_str(&json)?;
        log::info!(
            "Loaded fingerprint dataset from {}: {} CDN, {} WAF, {} CLOUD providers",
            path.display(),
            dataset.cdn.providers().len(),
            dataset.waf.providers().len(),
            dataset.cloud.providers().len()
        );
        Ok(dataset)
    }

    pub fn save(&self, path: &Path) -> Result<(), DatasetError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|source| DatasetError::FileError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Adds every fingerprint of `other`.
    pub fn merge(&mut self, other: &FingerprintDataset) {
        self.cdn.merge(&other.cdn);
        self.waf.merge(&other.waf);
        self.cloud.merge(&other.cloud);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names_merge_case_insensitively() {
        let mut data = CategoryData::default();
        data.add_cname(" Acme ", "cdn.acme.test");
        data.add_cname("ACME", "Edge.Acme.Test.");
        data.add_cname("", "ignored.test");
        data.add_cname("Other", "   ");

        assert_eq!(data.providers().into_iter().collect::<Vec<_>>(), vec!["Acme"]);
        let suffixes: Vec<_> = data.cname()["Acme"].iter().cloned().collect();
        assert_eq!(suffixes, vec!["cdn.acme.test", "edge.acme.test"]);
    }

    #[test]
    fn test_bare_address_becomes_host_network() {
        let mut data = CategoryData::default();
        data.add_cidr("Acme", "198.51.100.7").unwrap();
        data.add_cidr("Acme", "2001:db8::1").unwrap();
        let ranges = &data.ip()["Acme"];
        assert_eq!(ranges[0].prefix(), 32);
        assert_eq!(ranges[1].prefix(), 128);
    }

    #[test]
    fn test_invalid_cidr_is_rejected() {
        let json = r#"{"waf": {"ip": {"Shield": ["10.0.0.0/8", "not-a-range"]}}}"#;
        match FingerprintDataset::from_json_str(json) {
            Err(DatasetError::InvalidCidr { provider, value }) => {
                assert_eq!(provider, "Shield");
                assert_eq!(value, "not-a-range");
            }
            other => panic!("expected InvalidCidr, got {other:?}"),
        }
    }

    #[test]
    fn test_load_save_preserves_dataset() {
        let json = r#"{
            "cdn": {"cname": {"Acme": ["cdn.acme.test"]}, "ip": {"Acme": ["198.51.100.0/24"]}},
            "cloud": {"keys": {"Nimbus": ["nimbus-bucket"]}}
        }"#;
        let dataset = FingerprintDataset::from_json_str(json).unwrap();
        assert!(dataset.waf.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.json");
        dataset.save(&path).unwrap();
        assert_eq!(FingerprintDataset::load(&path).unwrap(), dataset);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            FingerprintDataset::load(Path::new("/nonexistent/source.json")),
            Err(DatasetError::FileError { .. })
        ));
    }

    #[test]
    fn test_merge_unions_categories() {
        let mut first = FingerprintDataset::default();
        first.cdn.add_cname("Acme", "acme.test");
        let mut second = FingerprintDataset::default();
        second.cdn.add_cname("acme", "acme-cdn.test");
        second.cdn.add_cidr("acme", "198.51.100.0/24").unwrap();
        second.waf.add_cname("Shield", "shield.test");

        first.merge(&second);
        assert_eq!(first.cdn.cname()["Acme"].len(), 2);
        assert_eq!(first.cdn.ip()["Acme"].len(), 1);
        assert_eq!(first.waf.providers().len(), 1);
    }
}
