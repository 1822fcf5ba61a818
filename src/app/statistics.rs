//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};
use crate::fingerprint::{Category, CheckResult};

/// Per-category counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerdictCounts {
    pub cdn: usize,
    pub waf: usize,
    pub cloud: usize,
    pub unmatched: usize,
}

impl VerdictCounts {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.category {
                Some(Category::Cdn) => counts.cdn += 1,
                Some(Category::Waf) => counts.waf += 1,
                Some(Category::Cloud) => counts.cloud += 1,
                None => counts.unmatched += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.cdn + self.waf + self.cloud + self.unmatched
    }
}

/// Prints a one-line summary of the run.
pub fn print_run_summary(counts: &VerdictCounts, elapsed_seconds: f64) {
    info!(
        "✅ Checked {} target{} ({} CDN, {} WAF, {} CLOUD, {} unmatched) in {:.1}s",
        counts.total(),
        if counts.total() == 1 { "" } else { "s" },
        counts.cdn,
        counts.waf,
        counts.cloud,
        counts.unmatched,
        elapsed_seconds
    );
}

/// Prints error, warning, and info statistics to the log.
pub fn print_error_statistics(error_stats: &ProcessingStats) {
    let total_errors = error_stats.total_errors();
    let total_warnings = error_stats.total_warnings();
    let total_info = error_stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = error_stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = error_stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = error_stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}
