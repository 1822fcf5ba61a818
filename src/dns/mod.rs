//! DNS/EDNS probing engine.
//!
//! This module resolves domain targets from several vantage points:
//! - Standard probes: A, AAAA and CNAME against every sampled resolver
//! - Geo probes: CNAME and A carrying an EDNS Client Subnet option for each
//!   sampled city, so geo-routed CDNs reveal location-specific answers
//!
//! Every successful answer is unioned into one `DnsResult` per domain. Single
//! probe failures are counted and dropped; they never abort a domain or a run.

mod message;
mod processor;
mod transport;
mod types;

// Re-export public API
pub use processor::DnsProcessor;
pub use transport::{DnsTransport, UdpTransport};
pub use types::{
    CityProbe, ClientSubnet, DnsProbeConfig, DnsResult, ProbeAnswer, ProbePhase, ProbeRequest,
};
