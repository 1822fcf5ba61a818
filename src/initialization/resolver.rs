//! System DNS resolver discovery.
//!
//! EDNS Client Subnet support differs between public resolvers; when asked to,
//! geo probes go through the nameservers the host itself is configured with.

use std::net::SocketAddr;

use crate::error_handling::InitializationError;

/// Returns the host's configured nameservers (deduplicated, in configuration order).
///
/// Reads the platform resolver configuration (`/etc/resolv.conf` on Unix) through
/// `hickory-resolver`.
///
/// # Errors
///
/// Returns `InitializationError::SystemResolverError` if the configuration cannot be
/// read or lists no nameserver.
pub fn system_nameservers() -> Result<Vec<SocketAddr>, InitializationError> {
    let (config, _opts) = hickory_resolver::system_conf::read_system_conf()
        .map_err(|e| InitializationError::SystemResolverError(e.to_string()))?;

    // hickory lists every server once per protocol (UDP and TCP)
    let mut servers: Vec<SocketAddr> = Vec::new();
    for ns in config.name_servers() {
        if !servers.contains(&ns.socket_addr) {
            servers.push(ns.socket_addr);
        }
    }

    if servers.is_empty() {
        return Err(InitializationError::SystemResolverError(
            "no nameserver configured on this host".to_string(),
        ));
    }

    log::debug!("System nameservers: {:?}", servers);
    Ok(servers)
}
