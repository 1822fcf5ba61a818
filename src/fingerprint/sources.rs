//! Translation of third-party fingerprint sources into a `FingerprintDataset`.
//!
//! - Source A: YAML `domain -> {name, link}`, one CDN CNAME suffix per domain
//! - Source B: JSON `{cdn, waf, cloud, common}` of `provider -> [string]`; the
//!   first three hold CIDR ranges, `common` holds CDN CNAME suffixes
//! - Source C: YAML `provider -> {keys: [..]}`, CLOUD credential patterns

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::models::{Category, FingerprintDataset};
use crate::error_handling::DatasetError;

#[derive(Debug, Deserialize)]
struct DomainEntry {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RangeSource {
    #[serde(default)]
    cdn: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    waf: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    cloud: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    common: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct KeysEntry {
    #[serde(default)]
    keys: Vec<String>,
}

fn read_source(path: &Path) -> Result<String, DatasetError> {
    std::fs::read_to_string(path).map_err(|source| DatasetError::FileError {
        path: path.to_path_buf(),
        source,
    })
}

/// Source A: each domain is a CDN CNAME suffix of its provider.
pub fn from_domain_yaml(yaml: &str) -> Result<FingerprintDataset, DatasetError> {
    let entries: BTreeMap<String, DomainEntry> = serde_yaml::from_str(yaml)?;
    let mut dataset = FingerprintDataset::default();
    for (domain, entry) in &entries {
        dataset.cdn.add_cname(&entry.name, domain);
    }
    Ok(dataset)
}

/// Source B: provider ranges per category plus shared CDN CNAME suffixes.
pub fn from_range_json(json: &str) -> Result<FingerprintDataset, DatasetError> {
    let source: RangeSource = serde_json::from_str(json)?;
    let mut dataset = FingerprintDataset::default();
    for (category, ranges) in [
        (Category::Cdn, &source.cdn),
        (Category::Waf, &source.waf),
        (Category::Cloud, &source.cloud),
    ] {
        let target = dataset.category_mut(category);
        for (provider, values) in ranges {
            for value in values {
                target.add_cidr(provider, value)?;
            }
        }
    }
    for (provider, suffixes) in &source.common {
        for suffix in suffixes {
            dataset.cdn.add_cname(provider, suffix);
        }
    }
    Ok(dataset)
}

/// Source C: CLOUD credential patterns.
pub fn from_keys_yaml(yaml: &str) -> Result<FingerprintDataset, DatasetError> {
    let entries: BTreeMap<String, KeysEntry> = serde_yaml::from_str(yaml)?;
    let mut dataset = FingerprintDataset::default();
    for (provider, entry) in &entries {
        for key in &entry.keys {
            dataset.cloud.add_key(provider, key);
        }
    }
    Ok(dataset)
}

pub fn load_domain_yaml(path: &Path) -> Result<FingerprintDataset, DatasetError> {
    from_domain_yaml(&read_source(path)?)
}

pub fn load_range_json(path: &Path) -> Result<FingerprintDataset, DatasetError> {
    from_range_json(&read_source(path)?)
}

pub fn load_keys_yaml(path: &Path) -> Result<FingerprintDataset, DatasetError> {
    from_keys_yaml(&read_source(path)?)
}
