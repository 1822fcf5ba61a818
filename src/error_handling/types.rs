//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use hickory_resolver::proto::error::ProtoError;
use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
///
/// All of these are fatal: they are raised before any probing starts.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// A resolver entry could not be parsed, or no usable resolver remains.
    #[error("DNS resolver configuration error: {0}")]
    ResolverConfigError(String),

    /// The host resolver configuration could not be read.
    #[error("System resolver configuration error: {0}")]
    SystemResolverError(String),

    /// An input file (targets, resolvers, cities) could not be read or parsed.
    #[error("Input error in {path}: {message}")]
    InputError { path: PathBuf, message: String },

    /// Every target was rejected by the classifier.
    #[error("No valid targets: every input was rejected as invalid")]
    NoValidTargetsError,
}

/// Failure of a single DNS probe.
///
/// Probe errors are recoverable: they are counted and logged, and the probe
/// contributes no evidence.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No answer within the per-query timeout.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// Socket level failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The query could not be encoded or the response could not be decoded.
    #[error("malformed DNS message: {0}")]
    Proto(#[from] ProtoError),

    /// The response did not belong to our query.
    #[error("response id {actual} does not match query id {expected} from {resolver}")]
    IdMismatch {
        resolver: SocketAddr,
        expected: u16,
        actual: u16,
    },

    /// The server answered with an error response code (SERVFAIL, REFUSED, ...).
    #[error("server returned {0}")]
    ResponseCode(String),
}

/// Error types for IP database operations.
#[derive(Error, Debug)]
pub enum IpDbError {
    /// The database file could not be read.
    #[error("Failed to read IP database {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file was read but is not a valid database.
    #[error("Failed to parse IP database {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Error types for fingerprint dataset loading and translation.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read or written.
    #[error("Dataset file error for {path}: {source}")]
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON dataset could not be decoded or encoded.
    #[error("Invalid JSON dataset: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML source could not be decoded.
    #[error("Invalid YAML source: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A provider range is neither a CIDR nor an IP address.
    #[error("Invalid CIDR '{value}' for provider '{provider}'")]
    InvalidCidr { provider: String, value: String },
}

/// Error types for result export.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A file output type was chosen without an output path.
    #[error("Output type {0} requires an output file")]
    MissingOutputFile(String),

    /// Writing the output failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("Failed to serialize JSON output: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("Failed to serialize CSV output: {0}")]
    Csv(#[from] csv::Error),
}

/// Types of recoverable errors that can occur while probing.
///
/// Each of these removes one probe (or one domain) from the evidence without
/// stopping the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    DnsQueryTimeout,
    DnsQueryIoError,
    DnsMalformedResponse,
    DnsResponseCodeError,
    EdnsProbeTimeout,
    EdnsProbeError,
    DomainResolutionFailed,
}

/// Types of warnings that can occur during a run.
///
/// Warnings indicate missing optional data that doesn't prevent classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    InvalidTarget,
    IpInfoMissing,
}

/// Types of informational metrics collected during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    TruncatedRetriedOverTcp,
    EdnsProbeAnswered,
    StrayReplyDiscarded,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::DnsQueryTimeout => "DNS query timeout",
            ErrorType::DnsQueryIoError => "DNS query I/O error",
            ErrorType::DnsMalformedResponse => "Malformed DNS response",
            ErrorType::DnsResponseCodeError => "DNS error response code",
            ErrorType::EdnsProbeTimeout => "EDNS probe timeout",
            ErrorType::EdnsProbeError => "EDNS probe error",
            ErrorType::DomainResolutionFailed => "Domain resolution failed",
        }
    }

    /// Maps a failed probe to its counter; geo probes are counted separately.
    pub fn from_probe_error(error: &ProbeError, geo: bool) -> Self {
        match (error, geo) {
            (ProbeError::Timeout(_), true) => ErrorType::EdnsProbeTimeout,
            (_, true) => ErrorType::EdnsProbeError,
            (ProbeError::Timeout(_), false) => ErrorType::DnsQueryTimeout,
            (ProbeError::Io(_), false) => ErrorType::DnsQueryIoError,
            (ProbeError::Proto(_) | ProbeError::IdMismatch { .. }, false) => {
                ErrorType::DnsMalformedResponse
            }
            (ProbeError::ResponseCode(_), false) => ErrorType::DnsResponseCodeError,
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::InvalidTarget => "Invalid target",
            WarningType::IpInfoMissing => "No IP database record",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::TruncatedRetriedOverTcp => "Truncated response retried over TCP",
            InfoType::EdnsProbeAnswered => "EDNS probe answered",
            InfoType::StrayReplyDiscarded => "Stray UDP reply discarded",
        }
    }
}
