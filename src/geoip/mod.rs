//! IP enrichment: ASN and geolocation lookups.
//!
//! Four optional databases (ASN and location, one of each per address family)
//! are opened once per run and queried synchronously. The engines sit behind the
//! `AsnDatabase` and `LocationDatabase` traits; MaxMind DB files are the
//! provided format.

mod lookup;
mod types;

pub use lookup::{AsnDatabase, LocationDatabase, MmdbAsnDatabase, MmdbLocationDatabase};
pub use types::{AsnInfo, GeoLocation, IpDbConfig, IpInfo};

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use crate::error_handling::{IpDbError, ProcessingStats, WarningType};
use crate::models::CheckInfo;

type AsnEngine = Box<dyn AsnDatabase>;
type LocationEngine = Box<dyn LocationDatabase>;

/// The open database engines for one run.
#[derive(Default)]
pub struct IpDbEngines {
    asn_v4: Option<AsnEngine>,
    asn_v6: Option<AsnEngine>,
    locate_v4: Option<LocationEngine>,
    locate_v6: Option<LocationEngine>,
}

fn open_asn(path: Option<&Path>) -> Result<Option<AsnEngine>, IpDbError> {
    path.map(|p| MmdbAsnDatabase::open(p).map(|db| Box::new(db) as AsnEngine))
        .transpose()
}

fn open_location(path: Option<&Path>) -> Result<Option<LocationEngine>, IpDbError> {
    path.map(|p| MmdbLocationDatabase::open(p).map(|db| Box::new(db) as LocationEngine))
        .transpose()
}

impl IpDbEngines {
    /// Opens every configured database.
    ///
    /// # Errors
    ///
    /// A configured file that is missing or cannot be parsed fails the whole
    /// open; nothing is partially opened.
    pub fn open(config: &IpDbConfig) -> Result<Self, IpDbError> {
        let engines = Self {
            asn_v4: open_asn(config.asn_ipv4.as_deref())?,
            asn_v6: open_asn(config.asn_ipv6.as_deref())?,
            locate_v4: open_location(config.locate_ipv4.as_deref())?,
            locate_v6: open_location(config.locate_ipv6.as_deref())?,
        };
        log::info!("Opened {} IP database(s)", engines.engine_count());
        Ok(engines)
    }

    pub fn with_asn_v4(mut self, engine: impl AsnDatabase + 'static) -> Self {
        self.asn_v4 = Some(Box::new(engine));
        self
    }

    pub fn with_asn_v6(mut self, engine: impl AsnDatabase + 'static) -> Self {
        self.asn_v6 = Some(Box::new(engine));
        self
    }

    pub fn with_locate_v4(mut self, engine: impl LocationDatabase + 'static) -> Self {
        self.locate_v4 = Some(Box::new(engine));
        self
    }

    pub fn with_locate_v6(mut self, engine: impl LocationDatabase + 'static) -> Self {
        self.locate_v6 = Some(Box::new(engine));
        self
    }

    fn engine_count(&self) -> usize {
        usize::from(self.asn_v4.is_some())
            + usize::from(self.asn_v6.is_some())
            + usize::from(self.locate_v4.is_some())
            + usize::from(self.locate_v6.is_some())
    }

    fn covers_v4(&self) -> bool {
        self.asn_v4.is_some() || self.locate_v4.is_some()
    }

    fn covers_v6(&self) -> bool {
        self.asn_v6.is_some() || self.locate_v6.is_some()
    }

    /// Looks one address up in the databases of its family.
    ///
    /// `None` when the family has no database or no database knows the address.
    pub fn lookup(&self, ip: IpAddr) -> Option<IpInfo> {
        let (asn, location) = match ip {
            IpAddr::V4(_) => (&self.asn_v4, &self.locate_v4),
            IpAddr::V6(_) => (&self.asn_v6, &self.locate_v6),
        };
        let info = IpInfo {
            asn: asn.as_ref().and_then(|db| db.lookup(ip)),
            location: location.as_ref().and_then(|db| db.lookup(ip)),
        };
        if info.is_empty() {
            None
        } else {
            Some(info)
        }
    }

    /// Looks up every address; misses and unconfigured families get no entry.
    pub fn query_ip_info(&self, ipv4: &[Ipv4Addr], ipv6: &[Ipv6Addr]) -> BTreeMap<IpAddr, IpInfo> {
        let mut infos = BTreeMap::new();
        if self.covers_v4() {
            for addr in ipv4 {
                let ip = IpAddr::V4(*addr);
                if let Some(info) = self.lookup(ip) {
                    infos.insert(ip, info);
                }
            }
        }
        if self.covers_v6() {
            for addr in ipv6 {
                let ip = IpAddr::V6(*addr);
                if let Some(info) = self.lookup(ip) {
                    infos.insert(ip, info);
                }
            }
        }
        infos
    }

    /// Fills `ip_info` for every address attached to each target.
    pub fn enrich(&self, infos: &mut [CheckInfo], stats: &ProcessingStats) {
        for info in infos.iter_mut() {
            let ipv4: Vec<Ipv4Addr> = info.a.iter().copied().collect();
            let ipv6: Vec<Ipv6Addr> = info.aaaa.iter().copied().collect();
            let found = self.query_ip_info(&ipv4, &ipv6);

            let covered = if self.covers_v4() { ipv4.len() } else { 0 }
                + if self.covers_v6() { ipv6.len() } else { 0 };
            for _ in found.len()..covered {
                stats.increment_warning(WarningType::IpInfoMissing);
            }
            if found.len() < covered {
                log::debug!(
                    "{}: {} of {} addresses have no IP database entry",
                    info.formatted,
                    covered - found.len(),
                    covered
                );
            }
            info.ip_info = found;
        }
    }

    /// Releases every engine.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for IpDbEngines {
    fn drop(&mut self) {
        let count = self.engine_count();
        if count > 0 {
            log::debug!("Closed {count} IP database(s)");
        }
    }
}
