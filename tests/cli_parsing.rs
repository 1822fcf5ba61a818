//! Tests for command-line parsing of `Config`.

use clap::Parser;
use std::path::PathBuf;

use cdn_check::{Config, OutputLevel, OutputType};

#[test]
fn test_minimal_command_line_uses_defaults() {
    let config = Config::try_parse_from(["cdn_check", "-t", "www.example.org"]).unwrap();
    assert_eq!(config.target, "www.example.org");
    assert_eq!(config.resolvers_file, PathBuf::from("asset/resolvers.txt"));
    assert_eq!(config.output_type, OutputType::Sys);
    assert_eq!(config.output_level, OutputLevel::Default);
    assert!(!config.query_edns_cnames);
    assert!(config.seed.is_none());
}

#[test]
fn test_full_command_line() {
    let config = Config::try_parse_from([
        "cdn_check",
        "-t",
        "targets.txt",
        "-r",
        "my-resolvers.txt",
        "-n",
        "3",
        "-c",
        "cities.csv",
        "-m",
        "8",
        "-d",
        "20",
        "-e",
        "4",
        "-w",
        "2",
        "-C",
        "-S",
        "-a",
        "asn4.mmdb",
        "-A",
        "asn6.mmdb",
        "-4",
        "city4.mmdb",
        "-6",
        "city6.mmdb",
        "-s",
        "dataset.json",
        "-o",
        "out.csv",
        "-y",
        "csv",
        "-l",
        "detail",
        "--seed",
        "99",
        "--log-level",
        "debug",
        "--log-format",
        "json",
    ])
    .unwrap();

    assert_eq!(config.resolvers_num, 3);
    assert_eq!(config.city_num, 8);
    assert_eq!(config.dns_concurrency, 20);
    assert_eq!(config.edns_concurrency, 4);
    assert_eq!(config.timeout_seconds, 2);
    assert!(config.query_edns_cnames);
    assert!(config.query_edns_use_sys_ns);
    assert_eq!(config.ipv6_locate_db, Some(PathBuf::from("city6.mmdb")));
    assert_eq!(config.output_type, OutputType::Csv);
    assert_eq!(config.output_level, OutputLevel::Detail);
    assert_eq!(config.seed, Some(99));
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Config::try_parse_from(["cdn_check"]).is_err());
    assert!(Config::try_parse_from(["cdn_check", "-t", "x.test", "-l", "loud"]).is_err());
    assert!(Config::try_parse_from(["cdn_check", "-t", "x.test", "-w", "soon"]).is_err());
}
