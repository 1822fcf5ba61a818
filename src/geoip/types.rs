//! IP enrichment data structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where an address is located.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

/// Autonomous system an address is announced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnInfo {
    pub number: u32,
    pub organization: Option<String>,
}

/// Enrichment for one address. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub location: Option<GeoLocation>,
    pub asn: Option<AsnInfo>,
}

impl IpInfo {
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.asn.is_none()
    }
}

/// Database file paths. Every database is optional.
#[derive(Debug, Clone, Default)]
pub struct IpDbConfig {
    pub asn_ipv4: Option<PathBuf>,
    pub asn_ipv6: Option<PathBuf>,
    pub locate_ipv4: Option<PathBuf>,
    pub locate_ipv6: Option<PathBuf>,
}

impl IpDbConfig {
    /// True when at least one database is configured.
    pub fn any(&self) -> bool {
        self.asn_ipv4.is_some()
            || self.asn_ipv6.is_some()
            || self.locate_ipv4.is_some()
            || self.locate_ipv6.is_some()
    }
}
