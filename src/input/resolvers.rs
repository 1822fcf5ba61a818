//! Resolver list loading.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

use super::{content_lines, read_input_file};
use crate::config::DNS_PORT;
use crate::error_handling::InitializationError;

/// Parses `addr`, `addr:port`, `[v6addr]` or `[v6addr]:port`. Port defaults to 53.
pub fn parse_resolver(value: &str) -> Result<SocketAddr, String> {
    let value = value.trim();
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let bare = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    bare.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| format!("invalid resolver address '{value}'"))
}

/// Parses a resolver list, dropping duplicates but keeping first-seen order.
///
/// # Errors
///
/// `InitializationError::ResolverConfigError` naming the first malformed line.
pub fn parse_resolvers(text: &str, origin: &str) -> Result<Vec<SocketAddr>, InitializationError> {
    let mut seen = HashSet::new();
    let mut resolvers = Vec::new();
    for (line_no, line) in content_lines(text) {
        let resolver = parse_resolver(line).map_err(|e| {
            InitializationError::ResolverConfigError(format!("{origin}:{line_no}: {e}"))
        })?;
        if seen.insert(resolver) {
            resolvers.push(resolver);
        }
    }
    Ok(resolvers)
}

pub fn read_resolvers(path: &Path) -> Result<Vec<SocketAddr>, InitializationError> {
    let text = read_input_file(path)?;
    let resolvers = parse_resolvers(&text, &path.display().to_string())?;
    log::info!("Loaded {} resolvers from {}", resolvers.len(), path.display());
    Ok(resolvers)
}
