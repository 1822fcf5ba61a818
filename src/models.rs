use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::Serialize;

use crate::dns::DnsResult;
use crate::geoip::IpInfo;
use crate::target::{TargetEntry, TargetKind};

/// Everything known about one target once probing and enrichment are done.
///
/// IP targets carry their own address in `a` or `aaaa`, so classification can
/// treat both kinds the same way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInfo {
    pub raw: String,
    pub formatted: String,
    pub from_batch_source: bool,
    pub kind: TargetKind,
    pub a: BTreeSet<Ipv4Addr>,
    pub aaaa: BTreeSet<Ipv6Addr>,
    pub cname: Vec<String>,
    pub ip_info: BTreeMap<IpAddr, IpInfo>,
}

impl CheckInfo {
    fn empty(entry: &TargetEntry) -> Self {
        Self {
            raw: entry.raw.clone(),
            formatted: entry.formatted.clone(),
            from_batch_source: entry.from_batch_source,
            kind: entry.kind,
            a: BTreeSet::new(),
            aaaa: BTreeSet::new(),
            cname: Vec::new(),
            ip_info: BTreeMap::new(),
        }
    }

    /// A domain target with its aggregated DNS evidence, or none when every
    /// probe failed.
    pub fn from_domain(entry: &TargetEntry, dns: Option<&DnsResult>) -> Self {
        let mut info = Self::empty(entry);
        if let Some(dns) = dns {
            info.a = dns.a.clone();
            info.aaaa = dns.aaaa.clone();
            info.cname = dns.cname.clone();
        }
        info
    }

    /// An IP target, carrying its own address.
    pub fn from_ip(entry: &TargetEntry) -> Self {
        let mut info = Self::empty(entry);
        match entry.ip() {
            Some(IpAddr::V4(addr)) => {
                info.a.insert(addr);
            }
            Some(IpAddr::V6(addr)) => {
                info.aaaa.insert(addr);
            }
            None => {}
        }
        info
    }

    /// Every address attached to this target, IPv4 first.
    pub fn addresses(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.a
            .iter()
            .map(|addr| IpAddr::V4(*addr))
            .chain(self.aaaa.iter().map(|addr| IpAddr::V6(*addr)))
    }

    /// Whether DNS (or the target itself) produced any evidence.
    pub fn has_evidence(&self) -> bool {
        !self.a.is_empty() || !self.aaaa.is_empty() || !self.cname.is_empty()
    }
}
