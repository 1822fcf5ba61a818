//! cdn_check library: CDN, WAF and cloud provider detection
//!
//! Given a list of domains and IP addresses, this library resolves the domains
//! through a sampled set of public resolvers (optionally from several simulated
//! client locations via EDNS Client Subnet), enriches every address with ASN and
//! geolocation data, and attributes each target to a CDN, WAF or cloud provider
//! using a fingerprint dataset of CNAME suffixes, IP ranges and credential
//! patterns.
//!
//! # Example
//!
//! ```no_run
//! use cdn_check::{run_check, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     target: "www.example.org,198.51.100.7".to_string(),
//!     query_edns_cnames: true,
//!     ..Default::default()
//! };
//!
//! let report = run_check(config).await?;
//! println!("{} of {} targets matched a provider",
//!          report.counts.total() - report.counts.unmatched, report.counts.total());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod dns;
pub mod error_handling;
pub mod export;
pub mod fingerprint;
pub mod geoip;
pub mod initialization;
pub mod input;
pub mod models;
pub mod target;

// Re-export public API
pub use app::VerdictCounts;
pub use config::{Config, LogFormat, LogLevel, OutputLevel, OutputType};
pub use run::{run_check, run_pipeline, CheckReport, PipelineOutput, RunInputs};

// Internal run module (contains the main check pipeline)
mod run {
    use anyhow::{Context, Result};
    use log::{info, warn};
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Instant;

    use crate::app::{print_error_statistics, print_run_summary, VerdictCounts};
    use crate::config::Config;
    use crate::dns::{DnsProbeConfig, DnsProcessor, DnsTransport, UdpTransport};
    use crate::error_handling::{InitializationError, ProcessingStats, WarningType};
    use crate::export::{shape_output, write_output};
    use crate::fingerprint::{CheckResult, Classifier, FingerprintDataset};
    use crate::geoip::{IpDbConfig, IpDbEngines};
    use crate::initialization::system_nameservers;
    use crate::input::{read_city_map, read_resolvers, read_targets, Sampler};
    use crate::models::CheckInfo;
    use crate::target::{classify_targets, ClassifiedTargets};

    /// Results of a check run.
    #[derive(Debug, Clone)]
    pub struct CheckReport {
        /// Targets supplied, including invalid ones
        pub total_targets: usize,
        /// Targets rejected by the classifier
        pub invalid_targets: usize,
        /// Domains for which at least one probe answered
        pub resolved_domains: usize,
        /// Verdicts, one per valid target
        pub results: Vec<CheckResult>,
        pub counts: VerdictCounts,
        /// Rows handed to the output writer
        pub rows_written: usize,
        pub elapsed_seconds: f64,
    }

    /// Everything loaded before probing starts.
    pub struct RunInputs {
        pub targets: ClassifiedTargets,
        pub probe_config: DnsProbeConfig,
        pub dataset: FingerprintDataset,
        pub ip_db_config: IpDbConfig,
    }

    /// Per-target records and their verdicts, in final order.
    #[derive(Debug, Clone)]
    pub struct PipelineOutput {
        pub infos: Vec<CheckInfo>,
        pub results: Vec<CheckResult>,
        pub resolved_domains: usize,
    }

    /// Reads and validates every input. All fatal configuration errors surface here.
    fn load_inputs(config: &Config, stats: &ProcessingStats) -> Result<RunInputs> {
        let list = read_targets(&config.target).context("Failed to read targets")?;
        let targets = classify_targets(&list.targets, list.from_batch_source);
        for _ in &targets.invalid_entries {
            stats.increment_warning(WarningType::InvalidTarget);
        }
        if targets.valid_count() == 0 {
            return Err(InitializationError::NoValidTargetsError.into());
        }
        info!(
            "Loaded {} targets: {} domains, {} IPs, {} invalid",
            targets.total(),
            targets.domain_entries.len(),
            targets.ip_entries.len(),
            targets.invalid_entries.len()
        );

        let mut probe_config = DnsProbeConfig {
            query_timeout: config.query_timeout(),
            max_domain_concurrency: config.dns_concurrency,
            max_probe_concurrency: config.edns_concurrency,
            enable_geo_probing: config.query_edns_cnames,
            use_system_resolver_for_geo: config.query_edns_cnames && config.query_edns_use_sys_ns,
            ..Default::default()
        };

        // Resolvers and cities only matter when there is something to resolve
        if !targets.domain_entries.is_empty() {
            let mut sampler = Sampler::new(config.seed);

            let resolvers = read_resolvers(&config.resolvers_file)
                .context("Failed to load resolver list")?;
            probe_config.resolvers = sampler.sample(&resolvers, config.resolvers_num);
            info!(
                "Using {} of {} resolvers",
                probe_config.resolvers.len(),
                resolvers.len()
            );

            if probe_config.enable_geo_probing {
                let cities =
                    read_city_map(&config.city_map_file).context("Failed to load city map")?;
                probe_config.city_probes = sampler.sample(&cities, config.city_num);
                info!(
                    "Probing from {} of {} cities",
                    probe_config.city_probes.len(),
                    cities.len()
                );
                if probe_config.use_system_resolver_for_geo {
                    probe_config.system_resolvers =
                        system_nameservers().context("Failed to read system resolvers")?;
                }
            }

            probe_config
                .validate()
                .context("Invalid DNS probing configuration")?;
        }

        let dataset = FingerprintDataset::load(&config.source_json)
            .context("Failed to load fingerprint dataset")?;

        let ip_db_config = IpDbConfig {
            asn_ipv4: config.asn_ipv4_db.clone(),
            asn_ipv6: config.asn_ipv6_db.clone(),
            locate_ipv4: config.ipv4_locate_db.clone(),
            locate_ipv6: config.ipv6_locate_db.clone(),
        };

        Ok(RunInputs {
            targets,
            probe_config,
            dataset,
            ip_db_config,
        })
    }

    /// Probes, enriches and classifies already-loaded targets.
    ///
    /// The transport is a parameter so callers can substitute their own.
    /// Records come out domains first, then IPs, each in input order.
    pub async fn run_pipeline<T: DnsTransport>(
        targets: &ClassifiedTargets,
        probe_config: DnsProbeConfig,
        transport: Arc<T>,
        ip_dbs: Option<&IpDbEngines>,
        classifier: &Classifier,
        stats: Arc<ProcessingStats>,
    ) -> PipelineOutput {
        let dns_results = if targets.domain_entries.is_empty() {
            HashMap::new()
        } else {
            let processor = DnsProcessor::new(Arc::new(probe_config), transport, Arc::clone(&stats));
            processor.process(&targets.domain_entries).await
        };

        let mut infos: Vec<CheckInfo> = targets
            .domain_entries
            .iter()
            .map(|entry| {
                let dns = dns_results.get(&entry.formatted);
                if dns.is_none() {
                    warn!("No DNS evidence for {}", entry.formatted);
                }
                CheckInfo::from_domain(entry, dns)
            })
            .chain(targets.ip_entries.iter().map(CheckInfo::from_ip))
            .collect();

        if let Some(engines) = ip_dbs {
            engines.enrich(&mut infos, &stats);
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let results = classifier.classify_parallel(&infos, workers);

        PipelineOutput {
            infos,
            results,
            resolved_domains: dns_results.len(),
        }
    }

    /// Runs a full check with the provided configuration.
    ///
    /// This is the main entry point for the library. It loads targets, resolvers,
    /// cities and the fingerprint dataset, probes every domain, enriches and
    /// classifies every target, and writes the configured output.
    ///
    /// # Errors
    ///
    /// Returns an error for any fatal configuration problem (unreadable input,
    /// malformed resolver list, no valid targets, missing database or dataset)
    /// and for output failures. Individual probe failures are not errors.
    pub async fn run_check(config: Config) -> Result<CheckReport> {
        let start_time = Instant::now();
        let stats = Arc::new(ProcessingStats::new());

        let inputs = load_inputs(&config, &stats)?;
        let ip_dbs = if inputs.ip_db_config.any() {
            Some(IpDbEngines::open(&inputs.ip_db_config).context("Failed to open IP databases")?)
        } else {
            None
        };
        let classifier = Classifier::new(Arc::new(inputs.dataset));
        let transport = Arc::new(UdpTransport::new(Arc::clone(&stats)));

        let output = run_pipeline(
            &inputs.targets,
            inputs.probe_config,
            transport,
            ip_dbs.as_ref(),
            &classifier,
            Arc::clone(&stats),
        )
        .await;

        if let Some(engines) = ip_dbs {
            engines.close();
        }

        let counts = VerdictCounts::from_results(&output.results);
        let rows = shape_output(config.output_level, &output.infos, output.results.clone());
        let rows_written = write_output(&rows, config.output_type, config.output_file.as_deref())
            .context("Failed to write output")?;

        let elapsed_seconds = start_time.elapsed().as_secs_f64();
        print_error_statistics(&stats);
        print_run_summary(&counts, elapsed_seconds);

        Ok(CheckReport {
            total_targets: inputs.targets.total(),
            invalid_targets: inputs.targets.invalid_entries.len(),
            resolved_domains: output.resolved_domains,
            results: output.results,
            counts,
            rows_written,
            elapsed_seconds,
        })
    }
}
