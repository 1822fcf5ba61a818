//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for every fatal boundary (initialization, IP
//!   databases, fingerprint datasets, export) and for recoverable probe failures
//! - Processing statistics tracking (errors, warnings, info metrics)
//!
//! Counted types are categorized into:
//! - **Errors**: Probe or domain failures that remove evidence
//! - **Warnings**: Missing optional data that doesn't prevent classification
//! - **Info**: Informational metrics (TCP retries, answered geo probes)

mod stats;
mod types;

// Re-export public API
pub use stats::ProcessingStats;
pub use types::{
    DatasetError, ErrorType, ExportError, InfoType, InitializationError, IpDbError, ProbeError,
    WarningType,
};
