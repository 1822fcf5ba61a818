//! MaxMind DB backed lookup engines.

use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use super::types::{AsnInfo, GeoLocation};
use crate::error_handling::IpDbError;

/// Maps an address to its autonomous system.
pub trait AsnDatabase: Send + Sync {
    fn lookup(&self, ip: IpAddr) -> Option<AsnInfo>;
}

/// Maps an address to a location.
pub trait LocationDatabase: Send + Sync {
    fn lookup(&self, ip: IpAddr) -> Option<GeoLocation>;
}

/// Reads a database file fully into memory and parses it.
fn open_reader(path: &Path) -> Result<Reader<Vec<u8>>, IpDbError> {
    log::info!("Loading IP database from: {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| IpDbError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    Reader::from_source(bytes).map_err(|e| IpDbError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// GeoLite2-ASN style database.
pub struct MmdbAsnDatabase {
    reader: Reader<Vec<u8>>,
    path: PathBuf,
}

impl MmdbAsnDatabase {
    pub fn open(path: &Path) -> Result<Self, IpDbError> {
        Ok(Self {
            reader: open_reader(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsnDatabase for MmdbAsnDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<AsnInfo> {
        // maxminddb 0.27: lookup() yields a LookupResult, decode() the record
        let result = self.reader.lookup(ip).ok()?;
        if !result.has_data() {
            return None;
        }
        let asn: geoip2::Asn = match result.decode() {
            Ok(Some(asn)) => asn,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("ASN record for {ip} in {} is unreadable: {e}", self.path.display());
                return None;
            }
        };

        Some(AsnInfo {
            number: asn.autonomous_system_number?,
            organization: asn.autonomous_system_organization.map(|s| s.to_string()),
        })
    }
}

/// GeoLite2-City style database.
pub struct MmdbLocationDatabase {
    reader: Reader<Vec<u8>>,
    path: PathBuf,
}

impl MmdbLocationDatabase {
    pub fn open(path: &Path) -> Result<Self, IpDbError> {
        Ok(Self {
            reader: open_reader(path)?,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocationDatabase for MmdbLocationDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<GeoLocation> {
        let result = self.reader.lookup(ip).ok()?;
        if !result.has_data() {
            return None;
        }
        let city: geoip2::City = match result.decode() {
            Ok(Some(city)) => city,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("City record for {ip} in {} is unreadable: {e}", self.path.display());
                return None;
            }
        };

        let location = GeoLocation {
            country_code: city.country.iso_code.map(|s| s.to_string()),
            country: city.country.names.english.map(|s| s.to_string()),
            region: city
                .subdivisions
                .first()
                .and_then(|subdivision| subdivision.names.english)
                .map(|s| s.to_string()),
            city: city.city.names.english.map(|s| s.to_string()),
        };
        if location == GeoLocation::default() {
            None
        } else {
            Some(location)
        }
    }
}
