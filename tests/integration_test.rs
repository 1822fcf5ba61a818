//! End-to-end pipeline tests.
//!
//! DNS is served by a scripted transport, so these tests make no network
//! requests. `run_pipeline()` is driven with the same inputs `run_check()`
//! would build.

mod helpers;

use std::net::Ipv4Addr;
use std::sync::Arc;

use cdn_check::dns::DnsProbeConfig;
use cdn_check::error_handling::{ErrorType, ProcessingStats};
use cdn_check::fingerprint::{Category, Classifier, FingerprintDataset, Signal};
use cdn_check::geoip::{AsnDatabase, AsnInfo, IpDbEngines};
use cdn_check::run_pipeline;
use cdn_check::target::classify_targets;

use helpers::ZoneTransport;

fn probe_config() -> DnsProbeConfig {
    DnsProbeConfig {
        resolvers: vec![
            "192.0.2.1:53".parse().unwrap(),
            "192.0.2.2:53".parse().unwrap(),
        ],
        ..Default::default()
    }
}

fn acme_zone() -> ZoneTransport {
    ZoneTransport::new().with_record(
        "www.example.org",
        &["d111.edge.acme.test"],
        &[Ipv4Addr::new(198, 51, 100, 7)],
    )
}

fn acme_dataset(with_range: bool) -> FingerprintDataset {
    let mut dataset = FingerprintDataset::default();
    dataset.cdn.add_cname("Acme", "acme.test");
    if with_range {
        dataset.cdn.add_cidr("Acme", "198.51.100.0/24").unwrap();
    }
    dataset
}

#[tokio::test]
async fn test_both_targets_attributed_when_range_registered() {
    let targets = classify_targets(&["198.51.100.7", "www.example.org"], false);
    let classifier = Classifier::new(Arc::new(acme_dataset(true)));

    let output = run_pipeline(
        &targets,
        probe_config(),
        Arc::new(acme_zone()),
        None,
        &classifier,
        Arc::new(ProcessingStats::new()),
    )
    .await;

    // Domains first, then IPs
    assert_eq!(output.infos[0].formatted, "www.example.org");
    assert_eq!(output.infos[1].formatted, "198.51.100.7");
    assert_eq!(output.resolved_domains, 1);

    for result in &output.results {
        assert_eq!(result.category, Some(Category::Cdn), "{}", result.target);
        assert_eq!(result.provider(), Some("Acme"));
    }
    assert_eq!(output.results[1].matches[0].signal, Signal::Ip);
}

#[tokio::test]
async fn test_bare_ip_unmatched_without_range() {
    let targets = classify_targets(&["198.51.100.7", "www.example.org"], false);
    let classifier = Classifier::new(Arc::new(acme_dataset(false)));

    let output = run_pipeline(
        &targets,
        probe_config(),
        Arc::new(acme_zone()),
        None,
        &classifier,
        Arc::new(ProcessingStats::new()),
    )
    .await;

    assert_eq!(output.results[0].target, "www.example.org");
    assert_eq!(output.results[0].category, Some(Category::Cdn));
    assert_eq!(output.results[0].matches[0].signal, Signal::Cname);
    assert_eq!(output.results[1].target, "198.51.100.7");
    assert_eq!(output.results[1].category, None);
}

#[tokio::test]
async fn test_failing_resolver_does_not_lose_evidence() {
    let targets = classify_targets(&["www.example.org"], false);
    let classifier = Classifier::new(Arc::new(acme_dataset(false)));
    let stats = Arc::new(ProcessingStats::new());
    let transport = acme_zone().with_failing_resolver("192.0.2.1:53".parse().unwrap());

    let output = run_pipeline(
        &targets,
        probe_config(),
        Arc::new(transport),
        None,
        &classifier,
        Arc::clone(&stats),
    )
    .await;

    assert_eq!(output.infos[0].cname, vec!["d111.edge.acme.test".to_string()]);
    assert_eq!(output.results[0].category, Some(Category::Cdn));
    assert_eq!(stats.get_error_count(ErrorType::DnsResponseCodeError), 3);
}

#[tokio::test]
async fn test_unresolvable_domain_is_kept_without_evidence() {
    let targets = classify_targets(&["down.example.org", "not a target"], true);
    let classifier = Classifier::new(Arc::new(acme_dataset(true)));
    let stats = Arc::new(ProcessingStats::new());
    let transport = ZoneTransport::new()
        .with_failing_resolver("192.0.2.1:53".parse().unwrap())
        .with_failing_resolver("192.0.2.2:53".parse().unwrap());

    let output = run_pipeline(
        &targets,
        probe_config(),
        Arc::new(transport),
        None,
        &classifier,
        Arc::clone(&stats),
    )
    .await;

    assert_eq!(output.infos.len(), 1);
    assert!(!output.infos[0].has_evidence());
    assert!(output.infos[0].from_batch_source);
    assert_eq!(output.results[0].category, None);
    assert_eq!(output.resolved_domains, 0);
    assert_eq!(stats.get_error_count(ErrorType::DomainResolutionFailed), 1);
}

struct OneAsn;

impl AsnDatabase for OneAsn {
    fn lookup(&self, ip: std::net::IpAddr) -> Option<AsnInfo> {
        (ip.to_string() == "198.51.100.7").then(|| AsnInfo {
            number: 64500,
            organization: Some("Acme Edge".to_string()),
        })
    }
}

#[tokio::test]
async fn test_enrichment_covers_resolved_addresses() {
    let targets = classify_targets(&["www.example.org"], false);
    let classifier = Classifier::new(Arc::new(acme_dataset(false)));
    let engines = IpDbEngines::default().with_asn_v4(OneAsn);

    let output = run_pipeline(
        &targets,
        probe_config(),
        Arc::new(acme_zone()),
        Some(&engines),
        &classifier,
        Arc::new(ProcessingStats::new()),
    )
    .await;

    let info = &output.infos[0];
    assert_eq!(info.ip_info.len(), 1);
    let asn = info.ip_info.values().next().unwrap().asn.as_ref().unwrap();
    assert_eq!(asn.number, 64500);
}
