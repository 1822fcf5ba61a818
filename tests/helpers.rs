// Shared test helpers: a scripted DNS transport and small dataset builders.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use cdn_check::dns::{DnsTransport, ProbeAnswer, ProbeRequest};
use cdn_check::error_handling::ProbeError;
use hickory_resolver::proto::rr::RecordType;

/// Answers from a fixed zone: domain -> records. Unknown domains get an empty
/// answer, like an NXDOMAIN would.
pub struct ZoneTransport {
    zone: HashMap<String, ProbeAnswer>,
    failing: Vec<SocketAddr>,
}

impl ZoneTransport {
    pub fn new() -> Self {
        Self {
            zone: HashMap::new(),
            failing: Vec::new(),
        }
    }

    pub fn with_record(mut self, domain: &str, cname: &[&str], a: &[Ipv4Addr]) -> Self {
        self.zone.insert(
            domain.to_string(),
            ProbeAnswer {
                a: a.to_vec(),
                aaaa: Vec::new(),
                cname: cname.iter().map(|c| c.to_string()).collect(),
            },
        );
        self
    }

    /// Every query to `resolver` fails.
    #[allow(dead_code)] // Used by some test files
    pub fn with_failing_resolver(mut self, resolver: SocketAddr) -> Self {
        self.failing.push(resolver);
        self
    }
}

impl DnsTransport for ZoneTransport {
    async fn exchange(&self, request: &ProbeRequest) -> Result<ProbeAnswer, ProbeError> {
        if self.failing.contains(&request.resolver) {
            return Err(ProbeError::ResponseCode("ServFail".to_string()));
        }
        let Some(records) = self.zone.get(&request.domain) else {
            return Ok(ProbeAnswer::default());
        };
        Ok(ProbeAnswer {
            a: if request.record_type == RecordType::A {
                records.a.clone()
            } else {
                Vec::new()
            },
            aaaa: Vec::new(),
            cname: records.cname.clone(),
        })
    }
}

/// Writes `contents` to `name` inside `dir` and returns the path.
#[allow(dead_code)] // Used by some test files
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}
