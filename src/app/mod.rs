//! Main application modules.
//!
//! Statistics printing used at the end of a run.

pub mod statistics;

pub use statistics::{print_error_statistics, print_run_summary, VerdictCounts};
