//! Output shapes.

use serde::Serialize;

use crate::fingerprint::{distinct_providers, Category, CheckResult, ProviderMatch};
use crate::models::CheckInfo;

/// A `CheckInfo` together with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckDetail {
    #[serde(flatten)]
    pub info: CheckInfo,
    pub category: Option<Category>,
    pub matches: Vec<ProviderMatch>,
}

impl CheckDetail {
    pub fn providers(&self) -> Vec<&str> {
        distinct_providers(&self.matches)
    }
}

/// What gets written, as selected by the output level.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputRows {
    /// Plain verdicts (every target, or only unmatched ones)
    Results(Vec<CheckResult>),
    /// Verdicts merged with the evidence behind them
    Details(Vec<CheckDetail>),
}

impl OutputRows {
    pub fn len(&self) -> usize {
        match self {
            OutputRows::Results(rows) => rows.len(),
            OutputRows::Details(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
