//! `run_check()` tests that need no network: IP-only target lists skip DNS.

mod helpers;

use cdn_check::fingerprint::Category;
use cdn_check::{run_check, Config, OutputLevel, OutputType};
use tempfile::TempDir;

use helpers::write_file;

const DATASET: &str = r#"{
    "cdn": {"cname": {"Acme": ["acme.test"]}, "ip": {"Acme": ["198.51.100.0/24"]}},
    "waf": {"ip": {"Shield": ["203.0.113.0/24"]}}
}"#;

fn config(dir: &TempDir, target: &str) -> Config {
    Config {
        target: target.to_string(),
        source_json: write_file(dir.path(), "source.json", DATASET),
        output_type: OutputType::Json,
        output_file: Some(dir.path().join("out.json")),
        // Never read for IP-only runs
        resolvers_file: dir.path().join("missing-resolvers.txt"),
        seed: Some(1),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_ip_targets_end_to_end() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir, "198.51.100.7, 203.0.113.255, 192.0.2.1, not valid");

    let report = run_check(config).await.expect("run should succeed");

    assert_eq!(report.total_targets, 4);
    assert_eq!(report.invalid_targets, 1);
    assert_eq!(report.counts.cdn, 1);
    assert_eq!(report.counts.waf, 1);
    assert_eq!(report.counts.unmatched, 1);
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.results[0].category, Some(Category::Cdn));

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("out.json")).unwrap())
            .unwrap();
    assert_eq!(written.as_array().unwrap().len(), 3);
    assert_eq!(written[1]["category"], "WAF");
}

#[tokio::test]
async fn test_quiet_csv_output_from_target_file() {
    let dir = TempDir::new().unwrap();
    let targets = write_file(dir.path(), "targets.txt", "198.51.100.7\n192.0.2.1\n");
    let mut config = config(&dir, targets.to_str().unwrap());
    config.output_type = OutputType::Csv;
    config.output_level = OutputLevel::Quiet;
    config.output_file = Some(dir.path().join("out.csv"));

    let report = run_check(config).await.expect("run should succeed");
    assert_eq!(report.rows_written, 1);

    let csv = std::fs::read_to_string(dir.path().join("out.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("192.0.2.1,192.0.2.1,None"));
}

#[tokio::test]
async fn test_no_valid_targets_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = run_check(config(&dir, "not valid, also..bad"))
        .await
        .expect_err("run should fail");
    assert!(format!("{err:#}").contains("No valid targets"));
}

#[tokio::test]
async fn test_missing_dataset_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "198.51.100.7");
    config.source_json = dir.path().join("missing.json");

    let err = run_check(config).await.expect_err("run should fail");
    assert!(format!("{err:#}").contains("fingerprint dataset"));
}

#[tokio::test]
async fn test_missing_resolvers_is_fatal_for_domains() {
    let dir = TempDir::new().unwrap();
    let err = run_check(config(&dir, "www.example.org"))
        .await
        .expect_err("run should fail");
    assert!(format!("{err:#}").contains("resolver list"));
}

#[tokio::test]
async fn test_missing_ip_database_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "198.51.100.7");
    config.asn_ipv4_db = Some(dir.path().join("missing.mmdb"));

    let err = run_check(config).await.expect_err("run should fail");
    assert!(format!("{err:#}").contains("IP database"));
}

#[tokio::test]
async fn test_file_output_without_path_is_fatal() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir, "198.51.100.7");
    config.output_type = OutputType::Txt;
    config.output_file = None;

    let err = run_check(config).await.expect_err("run should fail");
    assert!(format!("{err:#}").contains("requires an output file"));
}
