//! Configuration constants.
//!
//! This module defines the defaults and protocol limits used throughout the
//! application.

use std::time::Duration;

// Default asset locations (relative to the working directory)
pub const DEFAULT_RESOLVERS_FILE: &str = "asset/resolvers.txt";
pub const DEFAULT_CITY_MAP_FILE: &str = "asset/city_ip.csv";
pub const DEFAULT_SOURCE_JSON: &str = "asset/source.json";

/// Number of resolvers sampled from the resolver file for each run
pub const DEFAULT_RESOLVERS_NUM: usize = 5;
/// Number of city probe points sampled from the city table for each run
pub const DEFAULT_CITY_NUM: usize = 5;
/// Domains probed in parallel (outer pool width)
pub const DEFAULT_DNS_CONCURRENCY: usize = 5;
/// In-flight probes per domain (inner pool width)
pub const DEFAULT_EDNS_CONCURRENCY: usize = 5;

/// Per-query DNS timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;
pub const DNS_TIMEOUT: Duration = Duration::from_secs(DNS_TIMEOUT_SECS);

// DNS wire parameters
pub const DNS_PORT: u16 = 53;
/// EDNS UDP payload size advertised in queries (DNS flag day 2020 recommendation)
pub const EDNS_UDP_PAYLOAD: u16 = 1232;
/// Receive buffer for UDP responses
pub const MAX_UDP_RESPONSE_SIZE: usize = 4096;
/// EDNS option code for Client Subnet (RFC 7871)
pub const EDNS_CLIENT_SUBNET_CODE: u16 = 8;

/// Source prefix used when a city table row holds a bare IPv4 address
pub const DEFAULT_ECS_PREFIX_V4: u8 = 24;
/// Source prefix used when a city table row holds a bare IPv6 address
pub const DEFAULT_ECS_PREFIX_V6: u8 = 56;

// Hostname syntax limits (RFC 1035)
pub const MAX_DOMAIN_LENGTH: usize = 253;
pub const MAX_LABEL_LENGTH: usize = 63;

/// Separator used when list fields are flattened into a single CSV cell
pub const CSV_LIST_SEPARATOR: &str = "|";
