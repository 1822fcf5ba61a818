//! Provider fingerprints and target classification.
//!
//! The dataset maps CDN, WAF and CLOUD providers to CNAME suffixes, IP ranges
//! and credential patterns. It is loaded once (internal JSON, or translated from
//! one of the supported third-party sources) and shared read-only by the
//! `Classifier`.

mod classify;
mod models;
pub mod sources;

pub use classify::{
    distinct_providers, CheckResult, Classifier, Precedence, ProviderMatch, Signal,
};
pub use models::{Category, CategoryData, FingerprintDataset};
