//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CITY_MAP_FILE, DEFAULT_CITY_NUM, DEFAULT_DNS_CONCURRENCY, DEFAULT_EDNS_CONCURRENCY,
    DEFAULT_RESOLVERS_FILE, DEFAULT_RESOLVERS_NUM, DEFAULT_SOURCE_JSON, DNS_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Where and how results are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputType {
    /// Pretty JSON on stdout
    Sys,
    /// JSON file
    Json,
    /// CSV file
    Csv,
    /// One target per line
    Txt,
}

/// How much of the run is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputLevel {
    /// Every classification result
    Default,
    /// Only targets that matched no provider
    Quiet,
    /// Classification results merged with DNS and IP evidence
    Detail,
}

/// Run configuration.
///
/// Parsed from the command line by the binary, or built programmatically by
/// library users:
///
/// ```no_run
/// use cdn_check::Config;
///
/// let config = Config {
///     target: "example.com,198.51.100.7".to_string(),
///     query_edns_cnames: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cdn_check",
    version,
    about = "Checks whether domains and IPs are fronted by a CDN, WAF or cloud provider"
)]
pub struct Config {
    /// Target file path, or targets given inline (comma separated)
    #[arg(short = 't', long = "target")]
    pub target: String,

    /// DNS resolver list file
    #[arg(short = 'r', long = "resolvers", default_value = DEFAULT_RESOLVERS_FILE)]
    pub resolvers_file: PathBuf,

    /// Maximum number of resolvers sampled for the run
    #[arg(short = 'n', long = "resolvers-num", default_value_t = DEFAULT_RESOLVERS_NUM)]
    pub resolvers_num: usize,

    /// City to client-subnet mapping (CSV) used for EDNS probing
    #[arg(short = 'c', long = "city-map", default_value = DEFAULT_CITY_MAP_FILE)]
    pub city_map_file: PathBuf,

    /// Number of cities sampled for the run
    #[arg(short = 'm', long = "city-num", default_value_t = DEFAULT_CITY_NUM)]
    pub city_num: usize,

    /// Domains resolved in parallel
    #[arg(short = 'd', long = "dns-concurrency", default_value_t = DEFAULT_DNS_CONCURRENCY)]
    pub dns_concurrency: usize,

    /// In-flight probes per domain
    #[arg(short = 'e', long = "edns-concurrency", default_value_t = DEFAULT_EDNS_CONCURRENCY)]
    pub edns_concurrency: usize,

    /// Per-query timeout in seconds
    #[arg(short = 'w', long = "timeout", default_value_t = DNS_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Enable EDNS Client Subnet probing from the sampled cities
    #[arg(short = 'C', long = "query-edns-cnames")]
    pub query_edns_cnames: bool,

    /// Send EDNS probes through the system resolver instead of the resolver list
    #[arg(short = 'S', long = "query-edns-use-sys-ns")]
    pub query_edns_use_sys_ns: bool,

    /// IPv4 ASN database (.mmdb)
    #[arg(short = 'a', long = "asn-ipv4")]
    pub asn_ipv4_db: Option<PathBuf>,

    /// IPv6 ASN database (.mmdb)
    #[arg(short = 'A', long = "asn-ipv6")]
    pub asn_ipv6_db: Option<PathBuf>,

    /// IPv4 geolocation database (.mmdb)
    #[arg(short = '4', long = "ipv4-db")]
    pub ipv4_locate_db: Option<PathBuf>,

    /// IPv6 geolocation database (.mmdb)
    #[arg(short = '6', long = "ipv6-db")]
    pub ipv6_locate_db: Option<PathBuf>,

    /// Fingerprint dataset (internal JSON format)
    #[arg(short = 's', long = "source", default_value = DEFAULT_SOURCE_JSON)]
    pub source_json: PathBuf,

    /// Output file (required for json/csv/txt output types)
    #[arg(short = 'o', long = "output-file")]
    pub output_file: Option<PathBuf>,

    /// Output type
    #[arg(short = 'y', long = "output-type", value_enum, default_value_t = OutputType::Sys)]
    pub output_type: OutputType,

    /// Output detail level
    #[arg(short = 'l', long = "output-level", value_enum, default_value_t = OutputLevel::Default)]
    pub output_level: OutputLevel,

    /// Seed for resolver and city sampling (random when omitted)
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Log level
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Config {
    /// Per-query DNS timeout.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: String::new(),
            resolvers_file: PathBuf::from(DEFAULT_RESOLVERS_FILE),
            resolvers_num: DEFAULT_RESOLVERS_NUM,
            city_map_file: PathBuf::from(DEFAULT_CITY_MAP_FILE),
            city_num: DEFAULT_CITY_NUM,
            dns_concurrency: DEFAULT_DNS_CONCURRENCY,
            edns_concurrency: DEFAULT_EDNS_CONCURRENCY,
            timeout_seconds: DNS_TIMEOUT_SECS,
            query_edns_cnames: false,
            query_edns_use_sys_ns: false,
            asn_ipv4_db: None,
            asn_ipv6_db: None,
            ipv4_locate_db: None,
            ipv6_locate_db: None,
            source_json: PathBuf::from(DEFAULT_SOURCE_JSON),
            output_file: None,
            output_type: OutputType::Sys,
            output_level: OutputLevel::Default,
            seed: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
