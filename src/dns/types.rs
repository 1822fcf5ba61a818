//! DNS probing data structures.

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use hickory_resolver::proto::rr::RecordType;
use ipnetwork::IpNetwork;
use serde::Serialize;

use crate::config::{
    DEFAULT_ECS_PREFIX_V4, DEFAULT_ECS_PREFIX_V6, DNS_TIMEOUT, DEFAULT_DNS_CONCURRENCY,
    DEFAULT_EDNS_CONCURRENCY,
};
use crate::error_handling::InitializationError;

/// Client network announced through the EDNS Client Subnet option (RFC 7871).
///
/// The stored network is always masked to its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSubnet {
    network: IpNetwork,
}

impl ClientSubnet {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, String> {
        let network = IpNetwork::new(addr, prefix).map_err(|e| e.to_string())?;
        let network = IpNetwork::new(network.network(), prefix).map_err(|e| e.to_string())?;
        Ok(Self { network })
    }

    pub fn network(&self) -> IpNetwork {
        self.network
    }

    /// Encodes the option body: FAMILY, SOURCE PREFIX-LENGTH, SCOPE PREFIX-LENGTH
    /// (always 0 in queries) and the address truncated to the prefix's octets.
    pub fn to_option_data(&self) -> Vec<u8> {
        let (family, octets): (u16, Vec<u8>) = match self.network.network() {
            IpAddr::V4(addr) => (1, addr.octets().to_vec()),
            IpAddr::V6(addr) => (2, addr.octets().to_vec()),
        };
        let prefix = self.network.prefix();
        let address_len = usize::from(prefix).div_ceil(8);

        let mut data = Vec::with_capacity(4 + address_len);
        data.extend_from_slice(&family.to_be_bytes());
        data.push(prefix);
        data.push(0);
        data.extend_from_slice(&octets[..address_len]);
        data
    }
}

impl FromStr for ClientSubnet {
    type Err = String;

    /// Accepts `addr/prefix` or a bare address (/24 for IPv4, /56 for IPv6).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('/') {
            Some((addr, prefix)) => {
                let addr: IpAddr = addr
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid subnet address '{s}'"))?;
                let prefix: u8 = prefix
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid subnet prefix '{s}'"))?;
                Self::new(addr, prefix)
            }
            None => {
                let addr: IpAddr = s
                    .parse()
                    .map_err(|_| format!("invalid subnet address '{s}'"))?;
                let prefix = match addr {
                    IpAddr::V4(_) => DEFAULT_ECS_PREFIX_V4,
                    IpAddr::V6(_) => DEFAULT_ECS_PREFIX_V6,
                };
                Self::new(addr, prefix)
            }
        }
    }
}

impl fmt::Display for ClientSubnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.network.prefix())
    }
}

/// A simulated client location used for geo probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityProbe {
    pub label: String,
    pub subnet: ClientSubnet,
}

impl CityProbe {
    pub fn parse(label: &str, subnet: &str) -> Result<Self, String> {
        Ok(Self {
            label: label.trim().to_string(),
            subnet: subnet.parse()?,
        })
    }
}

/// Settings for one probing run. Immutable once probing starts.
#[derive(Debug, Clone)]
pub struct DnsProbeConfig {
    /// Sampled resolver set used by the standard phase
    pub resolvers: Vec<SocketAddr>,
    /// Sampled city probe points used by the geo phase
    pub city_probes: Vec<CityProbe>,
    /// Host nameservers, used by the geo phase when `use_system_resolver_for_geo`
    pub system_resolvers: Vec<SocketAddr>,
    pub query_timeout: Duration,
    pub max_domain_concurrency: usize,
    pub max_probe_concurrency: usize,
    pub enable_geo_probing: bool,
    pub use_system_resolver_for_geo: bool,
}

impl Default for DnsProbeConfig {
    fn default() -> Self {
        Self {
            resolvers: Vec::new(),
            city_probes: Vec::new(),
            system_resolvers: Vec::new(),
            query_timeout: DNS_TIMEOUT,
            max_domain_concurrency: DEFAULT_DNS_CONCURRENCY,
            max_probe_concurrency: DEFAULT_EDNS_CONCURRENCY,
            enable_geo_probing: false,
            use_system_resolver_for_geo: false,
        }
    }
}

impl DnsProbeConfig {
    /// Resolvers the geo phase sends its ECS queries to.
    pub fn geo_resolvers(&self) -> &[SocketAddr] {
        if self.use_system_resolver_for_geo {
            &self.system_resolvers
        } else {
            &self.resolvers
        }
    }

    /// Whether the geo phase will issue any query.
    pub fn geo_active(&self) -> bool {
        self.enable_geo_probing && !self.city_probes.is_empty() && !self.geo_resolvers().is_empty()
    }

    /// Rejects configurations that could never produce a probe.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ResolverConfigError` when no resolver is
    /// available, or when system-resolver geo probing was requested without any
    /// system nameserver.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.enable_geo_probing
            && self.use_system_resolver_for_geo
            && self.system_resolvers.is_empty()
        {
            return Err(InitializationError::ResolverConfigError(
                "geo probing through the system resolver requested, but no system nameserver is known"
                    .to_string(),
            ));
        }
        if self.resolvers.is_empty() && !self.geo_active() {
            return Err(InitializationError::ResolverConfigError(
                "resolver set is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which phase of the per-domain state machine a probe belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePhase {
    Standard,
    Geo,
}

/// A single query sent to a single resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub domain: String,
    pub record_type: RecordType,
    pub resolver: SocketAddr,
    pub client_subnet: Option<ClientSubnet>,
    pub phase: ProbePhase,
}

impl fmt::Display for ProbeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.domain, self.record_type, self.resolver)?;
        if let Some(subnet) = &self.client_subnet {
            write!(f, " ecs={subnet}")?;
        }
        Ok(())
    }
}

/// Records extracted from one successful response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeAnswer {
    pub a: Vec<Ipv4Addr>,
    pub aaaa: Vec<Ipv6Addr>,
    /// CNAME targets in answer order, lower-cased, without the root dot
    pub cname: Vec<String>,
}

/// Aggregated DNS evidence for one domain: the union of every successful probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsResult {
    pub a: BTreeSet<Ipv4Addr>,
    pub aaaa: BTreeSet<Ipv6Addr>,
    /// Canonical names in first-seen order, without duplicates
    pub cname: Vec<String>,
}

impl DnsResult {
    pub fn absorb(&mut self, answer: ProbeAnswer) {
        self.a.extend(answer.a);
        self.aaaa.extend(answer.aaaa);
        for name in answer.cname {
            if !self.cname.contains(&name) {
                self.cname.push(name);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty() && self.aaaa.is_empty() && self.cname.is_empty()
    }
}
