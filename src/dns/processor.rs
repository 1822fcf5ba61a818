//! Concurrent DNS/EDNS probing engine.
//!
//! Each domain moves through `Pending -> ProbingStandard -> (ProbingGeo) ->
//! Aggregated | Failed`. Domains run on an outer pool of tokio tasks bounded by
//! `max_domain_concurrency`; inside a domain, probes are bounded by a separate
//! per-domain semaphore of width `max_probe_concurrency`, so one slow domain
//! cannot starve the others and a domain with many cities cannot monopolise the
//! resolvers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use hickory_resolver::proto::rr::RecordType;
use tokio::sync::{mpsc, Semaphore};

use super::transport::DnsTransport;
use super::types::{DnsProbeConfig, DnsResult, ProbePhase, ProbeRequest};
use crate::error_handling::{ErrorType, InfoType, ProbeError, ProcessingStats};
use crate::initialization::init_semaphore;
use crate::target::{TargetEntry, TargetKind};

const STANDARD_RECORD_TYPES: [RecordType; 3] = [RecordType::A, RecordType::AAAA, RecordType::CNAME];
const GEO_RECORD_TYPES: [RecordType; 2] = [RecordType::CNAME, RecordType::A];

/// Per-domain progress, logged at trace level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DomainState {
    Pending,
    ProbingStandard,
    ProbingGeo,
    Aggregated,
    Failed,
}

/// Resolves domain targets from every sampled resolver and city.
pub struct DnsProcessor<T: DnsTransport> {
    config: Arc<DnsProbeConfig>,
    transport: Arc<T>,
    stats: Arc<ProcessingStats>,
}

impl<T: DnsTransport> DnsProcessor<T> {
    pub fn new(config: Arc<DnsProbeConfig>, transport: Arc<T>, stats: Arc<ProcessingStats>) -> Self {
        Self {
            config,
            transport,
            stats,
        }
    }

    /// Probes every domain entry and returns the evidence keyed by `formatted`.
    ///
    /// Domains whose probes all failed have no entry. Non-domain entries and
    /// repeated keys are skipped.
    pub async fn process(&self, entries: &[TargetEntry]) -> HashMap<String, DnsResult> {
        let domain_limiter = init_semaphore(self.config.max_domain_concurrency);
        let (tx, mut rx) = mpsc::channel::<(String, Option<DnsResult>)>(entries.len().max(1));

        let mut seen = HashSet::new();
        for entry in entries {
            if entry.kind != TargetKind::Domain || !seen.insert(entry.formatted.clone()) {
                continue;
            }

            let permit = match Arc::clone(&domain_limiter).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Domain pool closed, skipping {}", entry.formatted);
                    continue;
                }
            };

            let domain = entry.formatted.clone();
            let config = Arc::clone(&self.config);
            let transport = Arc::clone(&self.transport);
            let stats = Arc::clone(&self.stats);
            let tx = tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let result = probe_domain(&domain, &config, &transport, &stats).await;
                if tx.send((domain, result)).await.is_err() {
                    log::warn!("Result collector closed before all domains completed");
                }
            });
        }
        drop(tx);

        // Single merge point: one message per completed domain
        let mut results = HashMap::with_capacity(seen.len());
        while let Some((domain, result)) = rx.recv().await {
            if let Some(result) = result {
                results.insert(domain, result);
            }
        }

        log::info!(
            "DNS probing finished: {}/{} domains resolved",
            results.len(),
            seen.len()
        );
        results
    }
}

/// Runs both phases for one domain. `None` when no probe succeeded.
async fn probe_domain<T: DnsTransport>(
    domain: &str,
    config: &DnsProbeConfig,
    transport: &Arc<T>,
    stats: &ProcessingStats,
) -> Option<DnsResult> {
    let mut state = DomainState::Pending;
    log::trace!("{domain}: {state:?}");

    let probe_limiter = init_semaphore(config.max_probe_concurrency);
    let mut result = DnsResult::default();

    state = DomainState::ProbingStandard;
    log::trace!("{domain}: {state:?}");
    let mut answered = run_phase(
        standard_requests(domain, config),
        config,
        transport,
        &probe_limiter,
        stats,
        &mut result,
    )
    .await;

    if config.geo_active() {
        state = DomainState::ProbingGeo;
        log::trace!("{domain}: {state:?}");
        answered += run_phase(
            geo_requests(domain, config),
            config,
            transport,
            &probe_limiter,
            stats,
            &mut result,
        )
        .await;
    }

    if answered == 0 {
        state = DomainState::Failed;
        log::trace!("{domain}: {state:?}");
        log::warn!("Every DNS probe failed for {domain}");
        stats.increment_error(ErrorType::DomainResolutionFailed);
        return None;
    }

    state = DomainState::Aggregated;
    log::trace!("{domain}: {state:?}");
    log::debug!(
        "{domain}: {} probes answered, {} CNAME, {} A, {} AAAA",
        answered,
        result.cname.len(),
        result.a.len(),
        result.aaaa.len()
    );
    Some(result)
}

/// Issues one phase's probes concurrently and folds the answers into `result`.
///
/// Answers are folded in request order, so the CNAME chain doesn't depend on
/// which resolver replied first. Returns how many probes succeeded.
async fn run_phase<T: DnsTransport>(
    requests: Vec<ProbeRequest>,
    config: &DnsProbeConfig,
    transport: &Arc<T>,
    limiter: &Arc<Semaphore>,
    stats: &ProcessingStats,
    result: &mut DnsResult,
) -> usize {
    let timeout = config.query_timeout;

    let mut in_flight: FuturesUnordered<_> = requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| async move {
            let _permit = limiter.acquire().await.ok();
            let outcome = match tokio::time::timeout(timeout, transport.exchange(&request)).await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(ProbeError::Timeout(timeout)),
            };
            (index, request, outcome)
        })
        .collect();

    let mut completed = Vec::new();
    while let Some(done) = in_flight.next().await {
        completed.push(done);
    }
    completed.sort_by_key(|(index, _, _)| *index);

    let mut answered = 0;
    for (_, request, outcome) in completed {
        match outcome {
            Ok(answer) => {
                answered += 1;
                if request.phase == ProbePhase::Geo {
                    stats.increment_info(InfoType::EdnsProbeAnswered);
                }
                result.absorb(answer);
            }
            Err(e) => {
                stats.increment_error(ErrorType::from_probe_error(
                    &e,
                    request.phase == ProbePhase::Geo,
                ));
                log::debug!("Probe {request} failed: {e}");
            }
        }
    }
    answered
}

/// A, AAAA and CNAME against every sampled resolver.
pub(crate) fn standard_requests(domain: &str, config: &DnsProbeConfig) -> Vec<ProbeRequest> {
    config
        .resolvers
        .iter()
        .flat_map(|resolver| {
            STANDARD_RECORD_TYPES.iter().map(move |record_type| ProbeRequest {
                domain: domain.to_string(),
                record_type: *record_type,
                resolver: *resolver,
                client_subnet: None,
                phase: ProbePhase::Standard,
            })
        })
        .collect()
}

/// CNAME and A per city, each city pinned to one geo resolver (round robin).
pub(crate) fn geo_requests(domain: &str, config: &DnsProbeConfig) -> Vec<ProbeRequest> {
    let resolvers = config.geo_resolvers();
    if resolvers.is_empty() {
        return Vec::new();
    }

    config
        .city_probes
        .iter()
        .enumerate()
        .flat_map(|(index, city)| {
            let resolver = resolvers[index % resolvers.len()];
            GEO_RECORD_TYPES.iter().map(move |record_type| ProbeRequest {
                domain: domain.to_string(),
                record_type: *record_type,
                resolver,
                client_subnet: Some(city.subnet),
                phase: ProbePhase::Geo,
            })
        })
        .collect()
}
